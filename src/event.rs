//! Event stream and per-event bit-pattern construction.
//!
//! Every decision engine in this crate starts from the same time-ordered
//! [`Event`] stream and the same [`BitPattern`]s computed over it: the AADT
//! engine ([`crate::aadt`]) walks them directly, while the CFG engine
//! ([`crate::cfg`]) has [`crate::frontier::FrontierGraph`] consume them to
//! build its lattice. Neither representation carries any object-specific
//! logic; they exist purely to describe *when things happened*.

use crate::history::{History, Method, Operation};

/// Whether an [`Event`] is an operation's invocation or its response.
///
/// Declaration order matters: deriving `Ord` on this gives `Invocation <
/// Response`, which is the tie-break the sequential order relies on when an
/// invocation and a response land on the same real-time instant — a process
/// cannot observe its own response before issuing the call that produces it,
/// but nothing stops a *different* process from invoking at that same
/// instant, and history ordering requires invocations to sort first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventKind {
    /// The start of an operation.
    Invocation,
    /// The operation's response, carrying its claimed return value.
    Response,
}

/// A single point in the time-ordered event stream.
#[derive(Clone, Copy, Debug)]
pub struct Event<'op, V> {
    /// Real time at which this event occurred.
    pub time: u64,
    /// Whether this is the operation's invocation or its response.
    pub kind: EventKind,
    /// The operation this event belongs to.
    pub op: &'op Operation<V>,
}

/// Builds the time-ordered event stream for a history.
///
/// Each operation contributes exactly two events (its invocation and its
/// response); ties are broken by [`EventKind`]'s derived order. The result
/// has `2 * history.len()` entries, and layer indices elsewhere in this crate
/// range over `[0, events.len()]`.
pub fn build_events<V>(history: &History<V>) -> Vec<Event<'_, V>> {
    let mut events = Vec::with_capacity(history.len() * 2);
    for op in history.iter() {
        events.push(Event {
            time: op.start_time,
            kind: EventKind::Invocation,
            op,
        });
        events.push(Event {
            time: op.end_time,
            kind: EventKind::Response,
            op,
        });
    }
    events.sort_by_key(|e| (e.time, e.kind));
    events
}

/// The bitmask state of the world at a single event.
///
/// A process's bit is `1u32 << proc`; this crate supports at most
/// [`crate::MAX_PROCESSES`] of them, which is why these fields are a plain
/// `u32` rather than a growable bitset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BitPattern {
    /// Every process that has invoked but not yet had its bit retired, as of
    /// just before this event is applied.
    pub max_bit: u32,
    /// The responding process's bit, set only on a response event.
    pub critical_bit: u32,
    /// The invoking process's bit, set only on an invocation event.
    pub pending_bit: u32,
}

/// Computes one [`BitPattern`] per event in `events`, in stream order.
///
/// A single left-to-right pass carries a running `max_bit`, starting at `0`:
///
/// - Invocation: emit `{max_bit, 0, opbit}`, then fold `opbit` into `max_bit`.
/// - Response: emit `{max_bit, opbit, 0}`, then retire `opbit` from `max_bit`.
///
/// The returned vector has exactly `events.len()` entries, one per layer
/// boundary `[0, events.len())`.
pub fn bit_patterns<V>(events: &[Event<'_, V>]) -> Vec<BitPattern> {
    let mut patterns = Vec::with_capacity(events.len());
    let mut max_bit: u32 = 0;

    for event in events {
        let opbit = 1u32 << event.op.proc;
        match event.kind {
            EventKind::Invocation => {
                patterns.push(BitPattern {
                    max_bit,
                    critical_bit: 0,
                    pending_bit: opbit,
                });
                max_bit |= opbit;
            }
            EventKind::Response => {
                patterns.push(BitPattern {
                    max_bit,
                    critical_bit: opbit,
                    pending_bit: 0,
                });
                max_bit ^= opbit;
            }
        }
    }

    patterns
}

/// Like [`bit_patterns`], but restricted to an `allowed` alphabet of methods.
///
/// Events whose method is not in `allowed` still produce a pattern, one per
/// event as usual (so layer indices line up with the full, unfiltered event
/// stream), but it carries a zeroed `{max_bit, 0, 0}` and does not fold the
/// event's bit into `max_bit` — the filtered-out process is treated as
/// though it never invoked. [`crate::stack`] uses this to restrict the
/// grammar's view of a history to `Push`/`Peek`/`Pop`, ignoring any other
/// method that might coexist in a mixed-method trace.
pub fn bit_patterns_filtered<V>(events: &[Event<'_, V>], allowed: &[Method]) -> Vec<BitPattern> {
    let mut patterns = Vec::with_capacity(events.len());
    let mut max_bit: u32 = 0;

    for event in events {
        if !allowed.contains(&event.op.method) {
            patterns.push(BitPattern {
                max_bit,
                critical_bit: 0,
                pending_bit: 0,
            });
            continue;
        }

        let opbit = 1u32 << event.op.proc;
        match event.kind {
            EventKind::Invocation => {
                patterns.push(BitPattern {
                    max_bit,
                    critical_bit: 0,
                    pending_bit: opbit,
                });
                max_bit |= opbit;
            }
            EventKind::Response => {
                patterns.push(BitPattern {
                    max_bit,
                    critical_bit: opbit,
                    pending_bit: 0,
                });
                max_bit ^= opbit;
            }
        }
    }

    patterns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::Method;

    fn op(id: u64, proc: u32, method: Method, start: u64, end: u64) -> Operation<i64> {
        Operation {
            id,
            proc,
            method,
            value: 0,
            start_time: start,
            end_time: end,
        }
    }

    #[test]
    fn invocation_sorts_before_response_at_equal_time() {
        let a = op(1, 0, Method::Push, 0, 5);
        let b = op(2, 1, Method::Push, 5, 10);
        let hist: History<i64> = vec![a, b].into();
        let events = build_events(&hist);
        assert_eq!(events[2].kind, EventKind::Response);
        assert_eq!(events[2].op.proc, 0);
        assert_eq!(events[3].kind, EventKind::Invocation);
        assert_eq!(events[3].op.proc, 1);
    }

    #[test]
    fn one_pattern_per_event_not_per_operation() {
        let a = op(1, 0, Method::Push, 0, 1);
        let b = op(2, 1, Method::Push, 2, 3);
        let hist: History<i64> = vec![a, b].into();
        let events = build_events(&hist);
        let patterns = bit_patterns(&events);
        assert_eq!(patterns.len(), events.len());
        assert_eq!(patterns.len(), 4);
    }

    #[test]
    fn invocation_pattern_carries_only_its_own_pending_bit() {
        let a = op(1, 0, Method::Push, 0, 10);
        let b = op(2, 1, Method::Push, 2, 5);
        let hist: History<i64> = vec![a, b].into();
        let events = build_events(&hist);
        let patterns = bit_patterns(&events);

        // events[1] is proc 1's invocation, landing while proc 0 is still pending.
        assert_eq!(events[1].kind, EventKind::Invocation);
        assert_eq!(events[1].op.proc, 1);
        assert_eq!(patterns[1].max_bit, 1 << 0);
        assert_eq!(patterns[1].pending_bit, 1 << 1);
        assert_eq!(patterns[1].critical_bit, 0);
    }

    #[test]
    fn response_pattern_still_carries_its_own_bit_in_max_bit() {
        let a = op(1, 0, Method::Push, 0, 10);
        let b = op(2, 1, Method::Push, 2, 5);
        let hist: History<i64> = vec![a, b].into();
        let events = build_events(&hist);
        let patterns = bit_patterns(&events);

        // events[2] is proc 1's response; max_bit still includes proc 1's own bit.
        assert_eq!(events[2].kind, EventKind::Response);
        assert_eq!(events[2].op.proc, 1);
        assert_eq!(patterns[2].max_bit, (1 << 0) | (1 << 1));
        assert_eq!(patterns[2].critical_bit, 1 << 1);
        assert_eq!(patterns[2].pending_bit, 0);
    }

    #[test]
    fn filtered_patterns_zero_out_disallowed_methods_without_touching_max_bit() {
        let push = op(1, 0, Method::Push, 0, 1);
        let other = op(2, 1, Method::Incr, 2, 3);
        let hist: History<i64> = vec![push, other].into();
        let events = build_events(&hist);
        let patterns = bit_patterns_filtered(&events, &[Method::Push, Method::Pop, Method::Peek]);

        assert_eq!(patterns.len(), events.len());
        // events[2] and events[3] belong to the ignored `Incr` operation.
        assert_eq!(events[2].op.method, Method::Incr);
        assert_eq!(patterns[2].critical_bit, 0);
        assert_eq!(patterns[2].pending_bit, 0);
        assert_eq!(events[3].op.method, Method::Incr);
        assert_eq!(patterns[3].critical_bit, 0);
        assert_eq!(patterns[3].pending_bit, 0);
        // the ignored process's bit never enters max_bit at any later layer.
        assert!(patterns.iter().all(|p| p.max_bit & (1 << 1) == 0));
    }
}
