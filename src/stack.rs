//! Stack grammar and history preprocessing.
//!
//! A LIFO stack's valid call/return interleavings are exactly the well-nested
//! strings of a small grammar over `(symbol, value)` non-terminals — this is
//! what [`crate::cfg`] exists to decide. Before the frontier graph is built,
//! every stack history is run through two structural transforms:
//! [`handle_empty`] injects a synthetic bottom-of-stack marker so an
//! empty-stack pop observation has something to match, and [`make_match`]
//! mirrors every push and pop to the far end of the timeline so every push
//! has exactly one matching pop and vice versa. Only then is the history
//! reducible, end to end, to the single `(S, ε)` accept marker.

use crate::cfg::{self, Grammar};
use crate::event::{bit_patterns_filtered, build_events};
use crate::frontier::FrontierGraph;
use crate::history::{History, HistoryError, Method, Operation, EMPTY_SENTINEL};

/// The alphabet the stack grammar reasons about; any other method present in
/// a mixed-method trace is ignored by the frontier graph.
const STACK_METHODS: [Method; 3] = [Method::Push, Method::Peek, Method::Pop];

/// The stack grammar's non-terminal symbols.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Sym {
    /// A fully reduced span: a completed push/pop pair, or the accept marker.
    S,
    /// An unmatched push, still carrying its value.
    Push,
    /// A peek, still carrying the value it observed.
    Peek,
}

/// `(symbol, value)`; `value = None` stands in for `ε`, the accept marker's
/// payload.
type NonTerminal = (Sym, Option<i64>);

struct StackGrammar;

impl Grammar<i64> for StackGrammar {
    type NonTerminal = NonTerminal;

    fn start(&self) -> NonTerminal {
        (Sym::S, None)
    }

    fn init_entry(&self, op: &Operation<i64>) -> NonTerminal {
        match op.method {
            Method::Push => (Sym::Push, Some(op.value)),
            Method::Peek => (Sym::Peek, Some(op.value)),
            Method::Pop => (Sym::S, Some(op.value)),
            other => unreachable!("stack grammar only ever sees Push/Peek/Pop, got {other}"),
        }
    }

    fn entry_mul(&self, left: NonTerminal, right: NonTerminal) -> Option<NonTerminal> {
        let (right_sym, right_val) = right;
        if right_sym != Sym::S {
            return None;
        }
        let v = right_val?;

        match left {
            (Sym::Push, Some(lv)) if lv == v => Some((Sym::S, None)),
            (Sym::Peek, Some(lv)) if lv == v => Some((Sym::S, Some(v))),
            (Sym::S, None) => Some((Sym::S, Some(v))),
            _ => None,
        }
    }
}

/// Prepends a synthetic `Push(empty_val)` at `(start=0, end=1)` and shifts
/// every existing operation's times by `+2`, so the synthetic push's
/// response always precedes everything originally recorded.
pub fn handle_empty(history: &mut History<i64>, empty_val: i64) {
    let next_id = history.iter().map(|op| op.id).max().unwrap_or(0) + 1;
    let proc = history.last().map(|op| op.proc).unwrap_or(0);

    for op in history.iter_mut() {
        op.start_time += 2;
        op.end_time += 2;
    }

    history.push(Operation {
        id: next_id,
        proc,
        method: Method::Push,
        value: empty_val,
        start_time: 0,
        end_time: 1,
    });
}

/// Mirrors every non-`Peek` operation to the far end of the timeline with
/// the opposite method (`Push` ↔ `Pop`) and the same value, establishing a
/// bijection between pushes and pops.
pub fn make_match(history: &mut History<i64>) {
    let last_time = history.iter().map(|op| op.end_time + 1).max().unwrap_or(0) * 2;
    let mut next_id = history.iter().map(|op| op.id).max().unwrap_or(0) + 1;

    let originals: Vec<Operation<i64>> = history.iter().copied().collect();
    for op in originals {
        if op.method == Method::Peek {
            continue;
        }
        let mirrored_method = if op.method == Method::Push {
            Method::Pop
        } else {
            Method::Push
        };
        history.push(Operation {
            id: next_id,
            proc: op.proc,
            method: mirrored_method,
            value: op.value,
            start_time: last_time - op.end_time,
            end_time: last_time - op.start_time,
        });
        next_id += 1;
    }
}

/// Rejects a stack history that would confuse the empty-stack sentinel with
/// a genuine user value, or that names a method invalid for a stack, before
/// any engine runs.
pub fn validate(history: &History<i64>) -> Result<(), HistoryError> {
    for op in history.iter() {
        if op.value == EMPTY_SENTINEL && !matches!(op.method, Method::Pop | Method::Peek) {
            return Err(HistoryError::ReservedValue(op.value));
        }
        if !matches!(op.method, Method::Push | Method::Pop | Method::Peek) {
            return Err(HistoryError::Parse {
                path: String::new(),
                line: op.id as usize,
                reason: format!("method `{}` is not valid for a stack", op.method),
            });
        }
    }
    Ok(())
}

/// Decides whether `history` is a linearizable execution of a LIFO stack.
pub fn is_linearizable(history: &History<i64>) -> Result<bool, HistoryError> {
    validate(history)?;
    if history.is_empty() {
        return Ok(true);
    }

    let mut prepared = history.clone();
    handle_empty(&mut prepared, EMPTY_SENTINEL);
    make_match(&mut prepared);

    let events = build_events(&prepared);
    let patterns = bit_patterns_filtered(&events, &STACK_METHODS);
    let graph = FrontierGraph::build(&events, &patterns);
    Ok(cfg::decide(&graph, &StackGrammar))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(id: u64, proc: u32, method: Method, value: i64, start: u64, end: u64) -> Operation<i64> {
        Operation {
            id,
            proc,
            method,
            value,
            start_time: start,
            end_time: end,
        }
    }

    #[test]
    fn sequential_push_pop_is_linearizable() {
        let hist: History<i64> = vec![
            op(1, 0, Method::Push, 1, 0, 1),
            op(2, 0, Method::Push, 2, 2, 3),
            op(3, 0, Method::Pop, 2, 4, 5),
            op(4, 0, Method::Pop, 1, 6, 7),
        ]
        .into();
        assert!(is_linearizable(&hist).unwrap());
    }

    #[test]
    fn fifo_order_pop_is_rejected() {
        let hist: History<i64> = vec![
            op(1, 0, Method::Push, 1, 0, 1),
            op(2, 0, Method::Push, 2, 2, 3),
            op(3, 0, Method::Pop, 1, 4, 5),
        ]
        .into();
        assert!(!is_linearizable(&hist).unwrap());
    }

    #[test]
    fn concurrent_pushes_allow_either_pop_order() {
        let hist: History<i64> = vec![
            op(1, 0, Method::Push, 1, 0, 10),
            op(2, 1, Method::Push, 2, 2, 5),
            op(3, 2, Method::Pop, 2, 11, 12),
        ]
        .into();
        assert!(is_linearizable(&hist).unwrap());
    }

    #[test]
    fn pop_against_empty_stack_observes_sentinel() {
        let hist: History<i64> = vec![op(1, 0, Method::Pop, EMPTY_SENTINEL, 0, 1)].into();
        assert!(is_linearizable(&hist).unwrap());
    }

    #[test]
    fn pop_of_a_never_pushed_value_is_rejected() {
        let hist: History<i64> = vec![op(1, 0, Method::Pop, 42, 0, 1)].into();
        assert!(!is_linearizable(&hist).unwrap());
    }

    #[test]
    fn unpopped_pushes_remain_valid_at_history_end() {
        let hist: History<i64> = vec![
            op(1, 0, Method::Push, 1, 0, 1),
            op(2, 0, Method::Push, 2, 2, 3),
        ]
        .into();
        assert!(is_linearizable(&hist).unwrap());
    }

    #[test]
    fn peek_observes_the_current_top_without_removing_it() {
        let hist: History<i64> = vec![
            op(1, 0, Method::Push, 1, 0, 1),
            op(2, 0, Method::Peek, 1, 2, 3),
            op(3, 0, Method::Pop, 1, 4, 5),
        ]
        .into();
        assert!(is_linearizable(&hist).unwrap());
    }

    #[test]
    fn reserved_sentinel_value_on_a_push_is_rejected_up_front() {
        let hist: History<i64> = vec![op(1, 0, Method::Push, EMPTY_SENTINEL, 0, 1)].into();
        assert!(matches!(
            is_linearizable(&hist),
            Err(HistoryError::ReservedValue(_))
        ));
    }

    #[test]
    fn handle_empty_shifts_times_and_prepends_a_bottom_marker() {
        let mut hist: History<i64> = vec![op(1, 0, Method::Push, 1, 0, 1)].into();
        handle_empty(&mut hist, EMPTY_SENTINEL);
        assert_eq!(hist.len(), 2);
        assert_eq!(hist[0].start_time, 2);
        assert_eq!(hist[0].end_time, 3);
        assert_eq!(hist[1].method, Method::Push);
        assert_eq!(hist[1].value, EMPTY_SENTINEL);
        assert_eq!(hist[1].start_time, 0);
        assert_eq!(hist[1].end_time, 1);
    }

    #[test]
    fn make_match_doubles_every_non_peek_operation() {
        let mut hist: History<i64> = vec![
            op(1, 0, Method::Push, 1, 0, 1),
            op(2, 0, Method::Peek, 1, 2, 3),
            op(3, 0, Method::Pop, 1, 4, 5),
        ]
        .into();
        make_match(&mut hist);
        assert_eq!(hist.len(), 5);
        let pushes = hist.iter().filter(|op| op.method == Method::Push).count();
        let pops = hist.iter().filter(|op| op.method == Method::Pop).count();
        assert_eq!(pushes, pops);
    }
}
