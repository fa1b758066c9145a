//! Frontier graph: the equivalence-class lattice the CFG engine walks.
//!
//! A [`Node`] is a point in the search space of partial linearizations: after
//! `layer` events have been accounted for, the operations named by `bits`
//! have *also* been linearized even though their own response has not
//! happened yet. Many `(layer, bits)` pairs reached by different paths denote
//! the same real-time state; [`FrontierGraph::build`] collapses them into a
//! representative node as it goes, the "equivalence class" this module is
//! named for, so [`crate::cfg`] never has to reason about more nodes than it
//! needs to.
//!
//! Construction consumes the same [`crate::event::BitPattern`] slice the
//! AADT engine does (via [`crate::event::bit_patterns`] or, for an
//! alphabet-restricted view, [`crate::event::bit_patterns_filtered`]); it
//! only additionally needs the ongoing table, to know which operation labels
//! each adjacency edge.

use std::collections::HashMap;

use crate::event::{BitPattern, Event, EventKind};
use crate::history::Operation;

/// A point in the frontier lattice.
///
/// `bits` is always a subset of the pending set at `layer`. Equal
/// `(layer, bits)` pairs reached by different paths are the same node;
/// `Ord` is derived purely so callers (e.g. [`crate::cfg`]'s BFS-distance
/// sort) get a deterministic tie-break, not because nodes have a meaningful
/// linear order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Node {
    /// Number of events accounted for so far.
    pub layer: usize,
    /// Pending operations additionally linearized ahead of their response.
    pub bits: u32,
}

/// The frontier graph derived from a history's time-ordered events.
///
/// Built once via [`FrontierGraph::build`]; read-only afterwards through
/// [`next`](FrontierGraph::next), [`first_same_node`](FrontierGraph::first_same_node),
/// and [`last_same_node`](FrontierGraph::last_same_node).
pub struct FrontierGraph<'h, V> {
    parent: HashMap<Node, Node>,
    last_child: HashMap<Node, Node>,
    adjacency: HashMap<Node, Vec<(Node, &'h Operation<V>)>>,
    event_count: usize,
}

impl<'h, V> FrontierGraph<'h, V> {
    /// Builds the graph from a history's time-ordered events and the
    /// [`BitPattern`]s computed over them.
    ///
    /// `patterns` must have one entry per event, in the same order — the
    /// output of [`crate::event::bit_patterns`] or
    /// [`crate::event::bit_patterns_filtered`] on the same `events`. Passing
    /// a filtered pattern set restricts which operations the resulting graph
    /// reasons about without disturbing layer indices; [`crate::stack`] uses
    /// this to build a graph that only sees `Push`/`Peek`/`Pop`.
    pub fn build(events: &[Event<'h, V>], patterns: &[BitPattern]) -> Self {
        let mut parent: HashMap<Node, Node> = HashMap::new();
        let mut last_child: HashMap<Node, Node> = HashMap::new();
        let mut adjacency: HashMap<Node, Vec<(Node, &'h Operation<V>)>> = HashMap::new();
        let mut ongoing: [Option<&'h Operation<V>>; 32] = [None; 32];

        for (layer, (event, pattern)) in events.iter().zip(patterns.iter()).enumerate() {
            let BitPattern {
                max_bit,
                critical_bit,
                pending_bit,
            } = *pattern;

            let mut sub = max_bit;
            loop {
                let curr = Node { layer, bits: sub };
                let first = *parent.entry(curr).or_insert(curr);

                if critical_bit == 0 || critical_bit & sub != 0 {
                    let target = Node {
                        layer: layer + 1,
                        bits: sub ^ critical_bit,
                    };
                    parent.insert(target, first);
                    last_child.insert(first, target);
                }

                let mut free = max_bit & !sub;
                while free != 0 {
                    let bit = free & free.wrapping_neg();
                    free &= free - 1;
                    let proc = bit.trailing_zeros() as usize;
                    let next = Node { layer, bits: sub | bit };
                    let next_repr = *parent.entry(next).or_insert(next);
                    if let Some(op) = ongoing[proc] {
                        adjacency.entry(first).or_default().push((next_repr, op));
                    }
                }

                if sub == 0 {
                    break;
                }
                sub = (sub - 1) & max_bit;
            }

            if matches!(event.kind, EventKind::Invocation) && pending_bit != 0 {
                ongoing[event.op.proc as usize] = Some(event.op);
            }
        }

        FrontierGraph {
            parent,
            last_child,
            adjacency,
            event_count: events.len(),
        }
    }

    /// Every admissible step out of `node`'s equivalence class, paired with
    /// the operation that labels it.
    pub fn next(&self, node: Node) -> &[(Node, &'h Operation<V>)] {
        self.adjacency.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The representative node of `node`'s equivalence class.
    pub fn first_same_node(&self, node: Node) -> Node {
        self.parent.get(&node).copied().unwrap_or(node)
    }

    /// The most recently added member of `first_node`'s equivalence class.
    pub fn last_same_node(&self, first_node: Node) -> Node {
        self.last_child.get(&first_node).copied().unwrap_or(first_node)
    }

    /// The full adjacency map, keyed by representative node.
    pub fn adjacency(&self) -> &HashMap<Node, Vec<(Node, &'h Operation<V>)>> {
        &self.adjacency
    }

    /// Number of events the graph was built over.
    pub fn event_count(&self) -> usize {
        self.event_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{bit_patterns, bit_patterns_filtered, build_events};
    use crate::history::{History, Method};

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
    fn sequential_history_has_exactly_one_path_to_the_sink() {
        let a = op(1, 0, Method::Push, 0, 1);
        let b = op(2, 1, Method::Push, 2, 3);
        let hist: History<i64> = vec![a, b].into();
        let events = build_events(&hist);
        let patterns = bit_patterns(&events);
        let graph = FrontierGraph::build(&events, &patterns);

        let start = Node { layer: 0, bits: 0 };
        let step1 = graph.next(start);
        assert_eq!(step1.len(), 1);
        assert_eq!(step1[0].1.proc, 0);

        let step2 = graph.next(graph.first_same_node(step1[0].0));
        assert_eq!(step2.len(), 1);
        assert_eq!(step2[0].1.proc, 1);

        let sink = graph.first_same_node(Node {
            layer: graph.event_count(),
            bits: 0,
        });
        let after = graph.first_same_node(step2[0].0);
        assert_eq!(after, sink);
    }

    #[test]
    fn overlapping_operations_branch_on_which_to_linearize_early() {
        let a = op(1, 0, Method::Push, 0, 10);
        let b = op(2, 1, Method::Push, 2, 5);
        let hist: History<i64> = vec![a, b].into();
        let events = build_events(&hist);
        let patterns = bit_patterns(&events);
        let graph = FrontierGraph::build(&events, &patterns);

        let start = Node { layer: 0, bits: 0 };
        // proc 1 invokes before proc 0 responds: from the start node, either
        // proc 0 or proc 1 can be the one linearized first.
        let mut targets: Vec<Node> = graph
            .next(start)
            .iter()
            .map(|&(node, _)| graph.first_same_node(node))
            .collect();
        targets.sort();
        targets.dedup();
        assert_eq!(targets.len(), 2);
    }

    #[test]
    fn method_filter_ignores_events_without_mutating_max_bit() {
        let push = op(1, 0, Method::Push, 0, 1);
        let other = op(2, 1, Method::Incr, 2, 3);
        let hist: History<i64> = vec![push, other].into();
        let events = build_events(&hist);
        let patterns = bit_patterns_filtered(&events, &[Method::Push, Method::Pop, Method::Peek]);
        let graph = FrontierGraph::build(&events, &patterns);

        // only the push's two events ever carry a real edge; proc 1 never
        // contributes a bit, so the ignored operation is a pure passthrough.
        let start = Node { layer: 0, bits: 0 };
        let step1 = graph.next(start);
        assert_eq!(step1.len(), 1);
        assert_eq!(step1[0].1.method, Method::Push);
    }
}
