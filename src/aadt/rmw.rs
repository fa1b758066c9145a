//! Read-modify-write simulator: a single `i64` register updated by compare-and-set.
//!
//! The payload is `(expected, new_value)`: the operation claims the register
//! held `expected` immediately before it ran, and leaves `new_value` in its
//! place. This is the AADT analogue of a hardware compare-and-swap.

use crate::history::{Method, Operation};

use super::Simulator;

/// Sequential state for a single register, initialized to zero.
#[derive(Debug, Default)]
pub struct RmwSimulator {
    register: i64,
}

impl RmwSimulator {
    /// A simulator starting from a register holding `0`.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Simulator<(i64, i64)> for RmwSimulator {
    fn apply(&mut self, op: &Operation<(i64, i64)>) -> bool {
        let (expected, new_value) = op.value;
        match op.method {
            Method::ReadModifyWrite => {
                if self.register != expected {
                    return false;
                }
                self.register = new_value;
                true
            }
            _ => false,
        }
    }

    fn undo(&mut self, op: &Operation<(i64, i64)>) {
        let (expected, _) = op.value;
        if let Method::ReadModifyWrite = op.method {
            self.register = expected;
        }
    }
}
