//! Crate root: public surface and the invariants every module below builds on.
//!
//! This crate decides **linearizability** of a recorded execution history of a
//! concurrent data structure: given a sequence of operation invocations and
//! responses issued by up to 32 processes against a shared object, it answers
//! whether there is a total order of those operations — consistent with the
//! object's sequential specification, and respecting real-time precedence —
//! that could have produced the recorded responses.
//!
//! ## Invariants
//!
//! - **Process width.** At most [`MAX_PROCESSES`] concurrent processes are
//!   supported; histories naming a wider process id are rejected by
//!   [`history`] before any engine runs.
//! - **Completeness.** Every invocation in a history is assumed to have a
//!   matching response; there is no support for partial (dangling) histories.
//! - **Immutability.** Nothing in this crate mutates an [`history::Operation`].
//!   Per-object simulators (see [`aadt`]) mutate only their own private
//!   state, and undo exactly what they did on backtracking.
//! - **Totality.** The decision procedures in [`aadt`] and [`cfg`] are total
//!   functions of a well-formed history: they return a `bool`, never an
//!   error. Malformed input is rejected earlier, during parsing.
//!
//! Two independent algorithm families answer the question, chosen by object
//! kind:
//!
//! - The **AADT engine** ([`aadt`]) depth-first searches a lattice of partial
//!   schedulings, parameterized by a pluggable sequential-object simulator.
//!   It covers priority queues, sets, semaphores, and read-modify-write
//!   registers.
//! - The **CFG engine** ([`cfg`]) reduces the history to a frontier graph and
//!   decides membership in a context-free language via matrix closure. It
//!   covers stacks ([`stack`]); a FIFO analogue for queues is deliberately
//!   not implemented (see [`queue`]).
//!
//! Both start from the same time-ordered [`event`] stream and the
//! [`event::BitPattern`]s computed over it; the CFG engine additionally
//! builds the [`frontier`] lattice from those patterns, while the AADT
//! engine walks them directly without ever constructing that lattice.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

/// Maximum number of concurrent processes a history may name.
pub const MAX_PROCESSES: u32 = 32;

/// History parsing: operations, methods, object kinds, and the on-disk
/// history file format.
pub mod history;
/// Event stream and per-layer bit-pattern construction (components A/B).
pub mod event;
/// Frontier graph: equivalence-class lattice shared by both engines (component C).
pub mod frontier;
/// AADT depth-first search engine and its per-object simulators (components D/E).
pub mod aadt;
/// Context-free grammar matrix-closure engine (component F).
pub mod cfg;
/// Stack grammar and history preprocessing (component G).
pub mod stack;
/// Queue engine: intentionally unimplemented; see module docs (component H).
pub mod queue;

pub use history::{History, HistoryError, Method, ObjectKind, Operation};
