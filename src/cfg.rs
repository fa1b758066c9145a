//! Context-free grammar matrix-closure engine.
//!
//! Some sequential specifications are naturally languages rather than state
//! machines — a stack's valid call/return interleavings are exactly the
//! well-nested strings of a small grammar. This module provides a generic
//! matrix-closure decision procedure over a [`crate::frontier::FrontierGraph`]:
//! a [`Grammar`] describes what a single labeled edge means
//! ([`Grammar::init_entry`]) and how two chained derivations combine into one
//! ([`Grammar::entry_mul`]); [`decide`] assigns dense indices to the graph's
//! equivalence-class nodes, seeds each adjacency edge's cell, then closes the
//! matrix in ascending BFS-distance order and reports whether the source-to-sink
//! cell derives the grammar's start symbol.
//!
//! [`crate::stack`] is the only grammar implemented against this engine
//! today; the abstraction exists so a second bracket-matching object (e.g. a
//! correctly specified queue) could be added without touching this file.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::frontier::{FrontierGraph, Node};
use crate::history::Operation;

/// A context-free grammar over frontier-graph edge operations, decided by
/// matrix closure.
///
/// `NonTerminal` should be cheap to copy and hash; grammars in this crate use
/// small enums or tuples of enums and `i64` values.
pub trait Grammar<V> {
    /// The grammar's non-terminal symbols.
    type NonTerminal: Copy + Eq + std::hash::Hash;

    /// The symbol a fully accepted sequence must derive.
    fn start(&self) -> Self::NonTerminal;

    /// The non-terminal a single labeled edge's operation derives on its own.
    fn init_entry(&self, op: &Operation<V>) -> Self::NonTerminal;

    /// Combines a derivation of a left edge with a derivation of the adjacent
    /// right edge into a derivation of their concatenation, if the grammar
    /// has a production for that pair.
    fn entry_mul(&self, left: Self::NonTerminal, right: Self::NonTerminal) -> Option<Self::NonTerminal>;
}

fn intern(node: Node, index: &mut HashMap<Node, usize>, nodes: &mut Vec<Node>) -> usize {
    *index.entry(node).or_insert_with(|| {
        nodes.push(node);
        nodes.len() - 1
    })
}

/// Decides whether `graph` admits a path from `(0, 0)` to the canonical sink
/// that spells a string in the language of `grammar`.
pub fn decide<V, G: Grammar<V>>(graph: &FrontierGraph<'_, V>, grammar: &G) -> bool {
    if graph.event_count() == 0 {
        return true;
    }

    let source = Node { layer: 0, bits: 0 };
    let sink = graph.first_same_node(Node {
        layer: graph.event_count(),
        bits: 0,
    });

    // 1. Enumerate class nodes reachable from the adjacency list; assign dense indices.
    let mut index: HashMap<Node, usize> = HashMap::new();
    let mut nodes: Vec<Node> = Vec::new();
    intern(source, &mut index, &mut nodes);
    intern(sink, &mut index, &mut nodes);
    for (&a, edges) in graph.adjacency() {
        intern(a, &mut index, &mut nodes);
        for &(b, _) in edges {
            intern(b, &mut index, &mut nodes);
        }
    }
    let n = nodes.len();

    // 2. Seed every adjacency edge's cell with `init_entry`, and build the
    //    plain (label-free) adjacency used for BFS distances.
    let mut matrix: Vec<Vec<HashSet<G::NonTerminal>>> = vec![vec![HashSet::new(); n]; n];
    let mut plain_adj: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (&a, edges) in graph.adjacency() {
        let a_i = index[&a];
        for &(b, op) in edges {
            let b_i = index[&b];
            matrix[a_i][b_i].insert(grammar.init_entry(op));
            plain_adj[a_i].push(b_i);
        }
    }

    // 3. BFS distances from every node, collecting reachable pairs ascending by distance.
    let mut order: Vec<(usize, usize, usize)> = Vec::new();
    for start in 0..n {
        let mut dist = vec![usize::MAX; n];
        dist[start] = 0;
        let mut queue = VecDeque::new();
        queue.push_back(start);
        while let Some(u) = queue.pop_front() {
            for &v in &plain_adj[u] {
                if dist[v] == usize::MAX {
                    dist[v] = dist[u] + 1;
                    queue.push_back(v);
                }
            }
        }
        for (b, &d) in dist.iter().enumerate() {
            if d != usize::MAX && d > 0 {
                order.push((d, start, b));
            }
        }
    }
    order.sort();

    // 4. Close the matrix in that order, full set accumulation, no early break.
    for (_, a, b) in order {
        for c in 0..n {
            let lefts: Vec<_> = matrix[a][c].iter().copied().collect();
            let rights: Vec<_> = matrix[c][b].iter().copied().collect();
            for &x in &lefts {
                for &y in &rights {
                    if let Some(z) = grammar.entry_mul(x, y) {
                        matrix[a][b].insert(z);
                    }
                }
            }
        }
    }

    // 5. Accept iff the source-to-sink cell derives the start symbol.
    let source_i = index[&source];
    let sink_i = index[&sink];
    matrix[source_i][sink_i].contains(&grammar.start())
}
