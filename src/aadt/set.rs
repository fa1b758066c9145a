//! Set simulator: `insert`/`remove`/`contains` over a set of `i64` values.
//!
//! The payload type is `(i64, bool)`: the value an operation names, and the
//! boolean outcome it claims — whether the insert actually added a new
//! element, whether the remove actually removed a present one, or whether
//! the element was present for a `contains`.

use std::collections::HashSet as StdHashSet;

use crate::history::{Method, Operation};

use super::Simulator;

/// Sequential state for a set of `i64` values.
#[derive(Debug, Default)]
pub struct SetSimulator {
    members: StdHashSet<i64>,
}

impl SetSimulator {
    /// A simulator starting from the empty set.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Simulator<(i64, bool)> for SetSimulator {
    fn apply(&mut self, op: &Operation<(i64, bool)>) -> bool {
        let (value, claimed) = op.value;
        match op.method {
            Method::Insert => {
                if claimed {
                    self.members.insert(value)
                } else {
                    self.members.contains(&value)
                }
            }
            Method::Remove => {
                if claimed {
                    self.members.remove(&value)
                } else {
                    !self.members.contains(&value)
                }
            }
            Method::Contains => self.members.contains(&value) == claimed,
            _ => false,
        }
    }

    fn undo(&mut self, op: &Operation<(i64, bool)>) {
        let (value, claimed) = op.value;
        match op.method {
            Method::Insert => {
                if claimed {
                    self.members.remove(&value);
                }
            }
            Method::Remove => {
                if claimed {
                    self.members.insert(value);
                }
            }
            Method::Contains => {}
            _ => {}
        }
    }
}
