//! Priority queue simulator: an `insert`/`poll`/`peek` multiset ordered by value.

use crate::history::{Method, Operation, EMPTY_SENTINEL};

use super::Simulator;

/// Sequential state for a max-priority queue of `i64` values.
///
/// `poll` and `peek` return [`EMPTY_SENTINEL`] against an empty queue, the
/// same convention the on-disk format uses for "no value".
#[derive(Debug, Default)]
pub struct PriorityQueueSimulator {
    multiset: Vec<i64>,
}

impl PriorityQueueSimulator {
    /// A simulator starting from an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    fn max(&self) -> i64 {
        self.multiset.iter().copied().max().unwrap_or(EMPTY_SENTINEL)
    }
}

impl Simulator<i64> for PriorityQueueSimulator {
    fn apply(&mut self, op: &Operation<i64>) -> bool {
        match op.method {
            Method::Insert => {
                self.multiset.push(op.value);
                true
            }
            Method::Peek => op.value == self.max(),
            Method::Poll => {
                let expected = self.max();
                if op.value != expected {
                    return false;
                }
                if op.value != EMPTY_SENTINEL {
                    let pos = self
                        .multiset
                        .iter()
                        .position(|&v| v == op.value)
                        .expect("max() only returns values present in the multiset");
                    self.multiset.remove(pos);
                }
                true
            }
            _ => false,
        }
    }

    fn undo(&mut self, op: &Operation<i64>) {
        match op.method {
            Method::Insert => {
                if let Some(pos) = self.multiset.iter().position(|&v| v == op.value) {
                    self.multiset.remove(pos);
                }
            }
            Method::Poll => {
                if op.value != EMPTY_SENTINEL {
                    self.multiset.push(op.value);
                }
            }
            Method::Peek => {}
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(method: Method, value: i64) -> Operation<i64> {
        Operation {
            id: 0,
            proc: 0,
            method,
            value,
            start_time: 0,
            end_time: 0,
        }
    }

    #[test]
    fn poll_returns_the_maximum_inserted_value() {
        let mut sim = PriorityQueueSimulator::new();
        assert!(sim.apply(&op(Method::Insert, 3)));
        assert!(sim.apply(&op(Method::Insert, 7)));
        assert!(sim.apply(&op(Method::Insert, 5)));
        assert!(sim.apply(&op(Method::Poll, 7)));
        assert!(sim.apply(&op(Method::Poll, 5)));
    }

    #[test]
    fn poll_of_wrong_value_is_rejected() {
        let mut sim = PriorityQueueSimulator::new();
        sim.apply(&op(Method::Insert, 3));
        assert!(!sim.apply(&op(Method::Poll, 9)));
    }

    #[test]
    fn poll_against_empty_queue_observes_sentinel() {
        let mut sim = PriorityQueueSimulator::new();
        assert!(sim.apply(&op(Method::Poll, EMPTY_SENTINEL)));
    }

    #[test]
    fn undo_restores_prior_state() {
        let mut sim = PriorityQueueSimulator::new();
        sim.apply(&op(Method::Insert, 3));
        sim.apply(&op(Method::Insert, 7));
        let poll = op(Method::Poll, 7);
        assert!(sim.apply(&poll));
        sim.undo(&poll);
        assert_eq!(sim.max(), 7);
    }
}
