//! Semaphore simulator: `incr` (release) and `decr` (try-acquire) over a counter.
//!
//! The payload is the single `bool` the operation claims: `incr` always
//! succeeds and claims `true`; `decr` claims whether it acquired (`true`) or
//! found the counter at zero and returned without blocking (`false`).

use crate::history::{Method, Operation};

use super::Simulator;

/// Sequential state for a counting semaphore, initialized to zero permits.
#[derive(Debug, Default)]
pub struct SemaphoreSimulator {
    permits: i64,
}

impl SemaphoreSimulator {
    /// A simulator starting from zero available permits.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Simulator<bool> for SemaphoreSimulator {
    fn apply(&mut self, op: &Operation<bool>) -> bool {
        match op.method {
            Method::Incr => {
                if !op.value {
                    return false;
                }
                self.permits += 1;
                true
            }
            Method::Decr => {
                let acquired = self.permits > 0;
                if acquired != op.value {
                    return false;
                }
                if acquired {
                    self.permits -= 1;
                }
                true
            }
            _ => false,
        }
    }

    fn undo(&mut self, op: &Operation<bool>) {
        match op.method {
            Method::Incr => self.permits -= 1,
            Method::Decr => {
                if op.value {
                    self.permits += 1;
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(method: Method, value: bool) -> Operation<bool> {
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
    fn decr_fails_without_a_matching_incr() {
        let mut sim = SemaphoreSimulator::new();
        assert!(sim.apply(&op(Method::Decr, false)));
        assert!(!sim.apply(&op(Method::Decr, true)));
    }

    #[test]
    fn incr_then_decr_acquires() {
        let mut sim = SemaphoreSimulator::new();
        assert!(sim.apply(&op(Method::Incr, true)));
        assert!(sim.apply(&op(Method::Decr, true)));
        assert!(sim.apply(&op(Method::Decr, false)));
    }

    #[test]
    fn undo_restores_permit_count() {
        let mut sim = SemaphoreSimulator::new();
        let incr = op(Method::Incr, true);
        sim.apply(&incr);
        sim.undo(&incr);
        assert_eq!(sim.permits, 0);
    }
}
