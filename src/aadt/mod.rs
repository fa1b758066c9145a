//! Generic AADT depth-first search engine and its per-object simulators.
//!
//! An abstract admissible data type (AADT) is any sequential object whose
//! behaviour can be checked one operation at a time: "if I apply this
//! operation to the object's current state, is the claimed return value
//! correct?" The [`Simulator`] trait captures exactly that, and
//! [`is_linearizable`] walks the lattice of `(layer, scheduled-bits)` nodes
//! directly off the event stream's [`BitPattern`]s, trying every admissible
//! ordering until it finds one the simulator accepts start to finish, or
//! exhausts the search. Unlike [`crate::cfg`], this engine never builds
//! [`crate::frontier::FrontierGraph`] — it only needs the ongoing table, not
//! the equivalence-class adjacency the CFG engine indexes its matrix by.
//!
//! This covers every object kind whose sequential specification does not
//! need a context-free grammar to describe (see [`crate::cfg`] and
//! [`crate::stack`] for the one that does).

use std::collections::HashSet;

use crate::event::{BitPattern, Event};
use crate::frontier::Node;
use crate::history::Operation;

pub mod priority_queue;
pub mod rmw;
pub mod semaphore;
pub mod set;

/// A sequential simulator for one object kind.
///
/// `apply` must be a pure function of the simulator's own state and `op`:
/// given the same state and the same operation, it must always return the
/// same verdict and leave the state in the same shape. `undo` must exactly
/// reverse the most recent successful `apply` of that same operation — the
/// engine never calls `undo` on an operation whose `apply` returned `false`.
pub trait Simulator<V> {
    /// Attempts to apply `op` to the current state.
    ///
    /// Returns `true` if `op`'s claimed value is consistent with the
    /// object's sequential specification in the current state, in which case
    /// the state is updated accordingly. Returns `false`, leaving the state
    /// unchanged, otherwise.
    fn apply(&mut self, op: &Operation<V>) -> bool;

    /// Reverses the effect of the most recent successful `apply(op)`.
    fn undo(&mut self, op: &Operation<V>);
}

/// Decides whether `events` admits a linearization accepted by `sim`.
///
/// `patterns` must be [`crate::event::bit_patterns`] computed over the same
/// `events`. `sim` should be freshly constructed (its initial state is the
/// object's initial sequential state); this function mutates it during the
/// search but always leaves it in its initial state again on return, having
/// undone every operation it applied along abandoned branches.
pub fn is_linearizable<V, S: Simulator<V>>(
    events: &[Event<'_, V>],
    patterns: &[BitPattern],
    sim: &mut S,
) -> bool {
    if events.is_empty() {
        return true;
    }
    let mut visited: HashSet<Node> = HashSet::new();
    let mut ongoing: [Option<&Operation<V>>; 32] = [None; 32];
    dfs(events, patterns, Node { layer: 0, bits: 0 }, sim, &mut ongoing, &mut visited)
}

fn dfs<V, S: Simulator<V>>(
    events: &[Event<'_, V>],
    patterns: &[BitPattern],
    node: Node,
    sim: &mut S,
    ongoing: &mut [Option<&Operation<V>>; 32],
    visited: &mut HashSet<Node>,
) -> bool {
    if node.layer == events.len() {
        return true;
    }
    if !visited.insert(node) {
        return false;
    }

    let pattern = patterns[node.layer];
    intra_layer(events, patterns, node, pattern.max_bit, sim, ongoing, visited)
        || inter_layer(events, patterns, node, pattern.critical_bit, pattern.pending_bit, sim, ongoing, visited)
}

/// Tries each unscheduled bit of `max_bit` one at a time: apply its ongoing
/// operation, recurse, undo on a failing return.
fn intra_layer<V, S: Simulator<V>>(
    events: &[Event<'_, V>],
    patterns: &[BitPattern],
    node: Node,
    max_bit: u32,
    sim: &mut S,
    ongoing: &mut [Option<&Operation<V>>; 32],
    visited: &mut HashSet<Node>,
) -> bool {
    let mut remaining = max_bit;
    while remaining != 0 {
        let curr_bit = remaining & remaining.wrapping_neg();
        remaining &= remaining - 1;

        if curr_bit & node.bits != 0 {
            continue;
        }
        let proc = curr_bit.trailing_zeros() as usize;
        let Some(op) = ongoing[proc] else { continue };

        let next = Node {
            layer: node.layer,
            bits: node.bits | curr_bit,
        };
        if sim.apply(op) {
            if dfs(events, patterns, next, sim, ongoing, visited) {
                return true;
            }
            sim.undo(op);
        }
    }
    false
}

/// Reachable only once `critical_bit` is satisfied by `node.bits`. Installs
/// the invoking operation into `ongoing` on an invocation, recurses into the
/// next layer, and restores the responding operation's slot afterward —
/// a shallower frame may still reference it through a captured `ongoing`
/// entry, and a deeper recursion can overwrite that same slot if the same
/// process invokes again later, so the slot is volatile across this
/// recursive boundary.
#[allow(clippy::too_many_arguments)]
fn inter_layer<V, S: Simulator<V>>(
    events: &[Event<'_, V>],
    patterns: &[BitPattern],
    node: Node,
    critical_bit: u32,
    pending_bit: u32,
    sim: &mut S,
    ongoing: &mut [Option<&Operation<V>>; 32],
    visited: &mut HashSet<Node>,
) -> bool {
    if critical_bit & !node.bits != 0 {
        return false;
    }

    if pending_bit != 0 {
        let proc = pending_bit.trailing_zeros() as usize;
        ongoing[proc] = Some(events[node.layer].op);
    }

    let next = Node {
        layer: node.layer + 1,
        bits: node.bits ^ critical_bit,
    };
    let good = dfs(events, patterns, next, sim, ongoing, visited);

    if critical_bit != 0 {
        let proc = critical_bit.trailing_zeros() as usize;
        ongoing[proc] = Some(events[node.layer].op);
    }

    good
}
