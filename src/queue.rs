//! Queue object kind: parsing only, no decision procedure.
//!
//! FIFO queue linearizability needs a grammar shaped differently from the
//! stack's — `enq`/`deq` pairs must match *in order of arrival* rather than
//! LIFO nesting, which (unlike the stack) cannot be decided with the plain
//! [`crate::aadt`] engine's per-operation simulator; it genuinely needs a
//! grammar whose non-terminals track queue position, not just top-of-stack
//! identity. No such grammar is implemented here.
//!
//! [`ObjectKind::Queue`](crate::history::ObjectKind::Queue) still parses: a
//! queue history can be read and validated like any other, it simply cannot
//! be decided. [`is_linearizable`] always reports
//! [`HistoryError::Unsupported`].

use crate::history::{History, HistoryError, ObjectKind};

/// Always returns [`HistoryError::Unsupported`]; queue histories parse but do
/// not decide.
pub fn is_linearizable(_history: &History<i64>) -> Result<bool, HistoryError> {
    Err(HistoryError::Unsupported(ObjectKind::Queue))
}
