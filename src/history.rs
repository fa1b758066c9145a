//! Operations, methods, object kinds, and the on-disk history file format.
//!
//! This module is the thin glue layer between a history file on disk and the
//! typed [`History<V>`] the engines in [`crate::aadt`], [`crate::cfg`], and
//! [`crate::stack`] operate on. None of the algorithmic weight of this crate
//! lives here; it exists so the engines have something to decide about.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Reserved value standing in for "the stack/queue was empty" in a response.
///
/// For `i64` payloads this is the maximum representable value. The stack
/// preprocessor in [`crate::stack`] refuses to run if a user-supplied
/// operation already carries this value, since it would be indistinguishable
/// from the synthetic empty marker it injects.
pub const EMPTY_SENTINEL: i64 = i64::MAX;

/// Errors arising from reading or validating a history.
///
/// The decision engines themselves never fail — only getting a well-formed
/// [`History<V>`] in front of them can.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    /// A history line did not have the expected `proc start end method value…` shape.
    #[error("{path}:{line}: {reason}")]
    Parse {
        /// Path of the offending file, for the diagnostic.
        path: String,
        /// 1-based line number.
        line: usize,
        /// Human-readable reason.
        reason: String,
    },
    /// The `method` token did not name one of the closed set of methods.
    #[error("unknown method `{0}`")]
    UnknownMethod(String),
    /// The `#`-prefixed header did not name one of the supported object kinds.
    #[error("unknown object type `{0}`")]
    UnknownObjectType(String),
    /// The history file had no `#`-prefixed object-type header line.
    #[error("history file has no object-type header (expected a first line like `# stack`)")]
    MissingObjectType,
    /// A `proc` field named a process id the engines cannot represent.
    #[error("process id {proc} is out of range (maximum is {})", crate::MAX_PROCESSES - 1)]
    ProcessOutOfRange {
        /// The offending process id.
        proc: u32,
    },
    /// A user-supplied value collided with a reserved sentinel.
    #[error("value {0} collides with the reserved empty-stack sentinel")]
    ReservedValue(i64),
    /// The object kind has no decision procedure implemented.
    #[error("{0} has no linearizability decision procedure implemented")]
    Unsupported(ObjectKind),
    /// The history file could not be read.
    #[error("failed to read history file: {0}")]
    Io(#[from] std::io::Error),
}

/// The closed set of operation methods this system understands.
///
/// Which methods are meaningful for a given [`ObjectKind`] is enforced by the
/// per-object simulator or grammar, not by this enum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    /// Stack push.
    Push,
    /// Stack pop.
    Pop,
    /// Stack/queue peek (non-destructive read of the next value).
    Peek,
    /// Queue enqueue.
    Enq,
    /// Queue dequeue.
    Deq,
    /// Set/priority-queue insert.
    Insert,
    /// Priority-queue poll (destructive read of the max).
    Poll,
    /// Set remove.
    Remove,
    /// Set membership test.
    Contains,
    /// Semaphore increment.
    Incr,
    /// Semaphore decrement.
    Decr,
    /// Read-modify-write register update.
    ReadModifyWrite,
}

impl FromStr for Method {
    type Err = HistoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "push" => Method::Push,
            "pop" => Method::Pop,
            "peek" => Method::Peek,
            "enq" => Method::Enq,
            "deq" => Method::Deq,
            "insert" => Method::Insert,
            "poll" => Method::Poll,
            "remove" => Method::Remove,
            "contains" => Method::Contains,
            "incr" => Method::Incr,
            "decr" => Method::Decr,
            "read_modify_write" => Method::ReadModifyWrite,
            other => return Err(HistoryError::UnknownMethod(other.to_string())),
        })
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Method::Push => "push",
            Method::Pop => "pop",
            Method::Peek => "peek",
            Method::Enq => "enq",
            Method::Deq => "deq",
            Method::Insert => "insert",
            Method::Poll => "poll",
            Method::Remove => "remove",
            Method::Contains => "contains",
            Method::Incr => "incr",
            Method::Decr => "decr",
            Method::ReadModifyWrite => "read_modify_write",
        };
        f.write_str(s)
    }
}

/// The object kinds a history file may declare in its `#`-prefixed header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// LIFO stack; decided by [`crate::stack`] via the CFG engine.
    Stack,
    /// FIFO queue; parses, but has no decision procedure (see [`crate::queue`]).
    Queue,
    /// Priority queue; decided by [`crate::aadt::priority_queue`].
    PriorityQueue,
    /// Read-modify-write register; decided by [`crate::aadt::rmw`].
    Rmw,
    /// Set with insert/remove/contains; decided by [`crate::aadt::set`].
    Set,
    /// Counting semaphore; decided by [`crate::aadt::semaphore`].
    Semaphore,
}

impl FromStr for ObjectKind {
    type Err = HistoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "stack" => ObjectKind::Stack,
            "queue" => ObjectKind::Queue,
            "priorityqueue" => ObjectKind::PriorityQueue,
            "rmw" => ObjectKind::Rmw,
            "set" => ObjectKind::Set,
            "semaphore" => ObjectKind::Semaphore,
            other => return Err(HistoryError::UnknownObjectType(other.to_string())),
        })
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ObjectKind::Stack => "stack",
            ObjectKind::Queue => "queue",
            ObjectKind::PriorityQueue => "priorityqueue",
            ObjectKind::Rmw => "rmw",
            ObjectKind::Set => "set",
            ObjectKind::Semaphore => "semaphore",
        };
        f.write_str(s)
    }
}

/// A single recorded invocation/response pair.
///
/// Immutable after construction; every engine in this crate treats it as a
/// read-only fact about the recorded execution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Operation<V> {
    /// Assigned in file order, starting at 1; used only for diagnostics.
    pub id: u64,
    /// Process id in `[0, MAX_PROCESSES)`.
    pub proc: u32,
    /// The method invoked.
    pub method: Method,
    /// Object-specific payload (the claimed argument/return value).
    pub value: V,
    /// Real time at which the operation was invoked.
    pub start_time: u64,
    /// Real time at which the response was observed.
    pub end_time: u64,
}

/// A finite ordered sequence of operations.
///
/// A thin, owning wrapper over `Vec<Operation<V>>`. Every other module
/// borrows from it; nothing downstream ever needs to mutate an operation in
/// place, only append synthetic ones (see [`crate::stack`]'s preprocessing).
#[derive(Clone, Debug, Default)]
pub struct History<V>(Vec<Operation<V>>);

impl<V> History<V> {
    /// Wrap an already-built vector of operations.
    pub fn new(ops: Vec<Operation<V>>) -> Self {
        History(ops)
    }

    /// Append an operation (used by history preprocessors to inject synthetic ops).
    pub fn push(&mut self, op: Operation<V>) {
        self.0.push(op);
    }

    /// Consume the history, returning the underlying vector.
    pub fn into_inner(self) -> Vec<Operation<V>> {
        self.0
    }
}

impl<V> std::ops::Deref for History<V> {
    type Target = [Operation<V>];

    fn deref(&self) -> &[Operation<V>] {
        &self.0
    }
}

impl<V> std::ops::DerefMut for History<V> {
    fn deref_mut(&mut self) -> &mut [Operation<V>] {
        &mut self.0
    }
}

impl<V> From<Vec<Operation<V>>> for History<V> {
    fn from(ops: Vec<Operation<V>>) -> Self {
        History(ops)
    }
}

/// Reads the `#`-prefixed object-type header from the first line of a history
/// file, if present.
pub fn read_object_kind(path: &Path) -> Result<ObjectKind, HistoryError> {
    let text = fs::read_to_string(path)?;
    let first = text.lines().next().unwrap_or("");
    if !first.starts_with('#') {
        return Err(HistoryError::MissingObjectType);
    }
    first.trim_start_matches('#').trim().parse()
}

/// One whitespace-tokenized, non-comment data line of a history file.
struct RawLine {
    line_no: usize,
    proc: u32,
    start_time: u64,
    end_time: u64,
    method: Method,
    value_tokens: Vec<String>,
}

fn read_raw_lines(path: &Path) -> Result<Vec<RawLine>, HistoryError> {
    let text = fs::read_to_string(path)?;
    let path_s = path.display().to_string();
    let mut raw = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut tokens = line.split_whitespace();
        let err = |reason: &str| HistoryError::Parse {
            path: path_s.clone(),
            line: line_no,
            reason: reason.to_string(),
        };

        let proc: u32 = tokens
            .next()
            .ok_or_else(|| err("missing `proc` field"))?
            .parse()
            .map_err(|_| err("`proc` is not an unsigned integer"))?;
        if proc >= crate::MAX_PROCESSES {
            return Err(HistoryError::ProcessOutOfRange { proc });
        }

        let start_time: u64 = tokens
            .next()
            .ok_or_else(|| err("missing `startTime` field"))?
            .parse()
            .map_err(|_| err("`startTime` is not an unsigned integer"))?;
        let end_time: u64 = tokens
            .next()
            .ok_or_else(|| err("missing `endTime` field"))?
            .parse()
            .map_err(|_| err("`endTime` is not an unsigned integer"))?;
        if start_time > end_time {
            return Err(err("startTime must not exceed endTime"));
        }

        let method_tok = tokens.next().ok_or_else(|| err("missing `method` field"))?;
        let method: Method = method_tok.parse()?;

        let value_tokens: Vec<String> = tokens.map(str::to_string).collect();

        raw.push(RawLine {
            line_no,
            proc,
            start_time,
            end_time,
            method,
            value_tokens,
        });
    }

    Ok(raw)
}

/// Parses a history file into a typed [`History<V>`] using `build_value` to
/// interpret each line's trailing value tokens.
///
/// `build_value` receives the whitespace-split tokens following `method` and
/// returns either the typed payload or a human-readable reason it could not
/// be parsed (wrapped into [`HistoryError::Parse`] with the originating line
/// number).
pub fn parse_history<V>(
    path: &Path,
    build_value: impl Fn(&[String]) -> Result<V, String>,
) -> Result<History<V>, HistoryError> {
    let raw = read_raw_lines(path)?;
    let path_s = path.display().to_string();
    let mut ops = Vec::with_capacity(raw.len());

    for (i, line) in raw.into_iter().enumerate() {
        let value = build_value(&line.value_tokens).map_err(|reason| HistoryError::Parse {
            path: path_s.clone(),
            line: line.line_no,
            reason,
        })?;
        ops.push(Operation {
            id: (i + 1) as u64,
            proc: line.proc,
            method: line.method,
            value,
            start_time: line.start_time,
            end_time: line.end_time,
        });
    }

    Ok(History::new(ops))
}

/// Parses a single `i64` value token (used by `stack`, `queue`, `priorityqueue`).
pub fn parse_i64_value(tokens: &[String]) -> Result<i64, String> {
    match tokens {
        [v] => v.parse::<i64>().map_err(|e| format!("value `{v}` is not an integer: {e}")),
        [] => Err("missing value field".to_string()),
        _ => Err(format!("expected one value token, got {}", tokens.len())),
    }
}

/// Parses a `(i64, i64)` value pair (used by `rmw`).
pub fn parse_i64_pair_value(tokens: &[String]) -> Result<(i64, i64), String> {
    match tokens {
        [a, b] => {
            let a = a.parse::<i64>().map_err(|e| format!("value `{a}` is not an integer: {e}"))?;
            let b = b.parse::<i64>().map_err(|e| format!("value `{b}` is not an integer: {e}"))?;
            Ok((a, b))
        }
        _ => Err(format!("expected two value tokens, got {}", tokens.len())),
    }
}

/// Parses a `(i64, bool)` value pair (used by `set`).
pub fn parse_i64_bool_value(tokens: &[String]) -> Result<(i64, bool), String> {
    match tokens {
        [a, b] => {
            let a = a.parse::<i64>().map_err(|e| format!("value `{a}` is not an integer: {e}"))?;
            let b = parse_bool_token(b)?;
            Ok((a, b))
        }
        _ => Err(format!("expected two value tokens, got {}", tokens.len())),
    }
}

/// Parses a single `bool` value token (used by `semaphore`).
pub fn parse_bool_value(tokens: &[String]) -> Result<bool, String> {
    match tokens {
        [v] => parse_bool_token(v),
        [] => Err("missing value field".to_string()),
        _ => Err(format!("expected one value token, got {}", tokens.len())),
    }
}

fn parse_bool_token(tok: &str) -> Result<bool, String> {
    match tok {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(format!("`{other}` is not a boolean (expected true/false/1/0)")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_round_trips_through_display_and_parse() {
        for m in [
            Method::Push,
            Method::Pop,
            Method::Peek,
            Method::Enq,
            Method::Deq,
            Method::Insert,
            Method::Poll,
            Method::Remove,
            Method::Contains,
            Method::Incr,
            Method::Decr,
            Method::ReadModifyWrite,
        ] {
            let s = m.to_string();
            assert_eq!(s.parse::<Method>().unwrap(), m);
        }
    }

    #[test]
    fn unknown_method_is_an_error() {
        assert!(matches!(
            "frobnicate".parse::<Method>(),
            Err(HistoryError::UnknownMethod(_))
        ));
    }

    #[test]
    fn object_kind_round_trips() {
        for k in [
            ObjectKind::Stack,
            ObjectKind::Queue,
            ObjectKind::PriorityQueue,
            ObjectKind::Rmw,
            ObjectKind::Set,
            ObjectKind::Semaphore,
        ] {
            assert_eq!(k.to_string().parse::<ObjectKind>().unwrap(), k);
        }
    }

    #[test]
    fn parses_scalar_history_file() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("lintrace-test-{}.hist", std::process::id()));
        std::fs::write(
            &path,
            "# priorityqueue\n0 0 1 insert 5\n1 2 3 poll 5\n",
        )
        .unwrap();

        let kind = read_object_kind(&path).unwrap();
        assert_eq!(kind, ObjectKind::PriorityQueue);

        let hist = parse_history(&path, parse_i64_value).unwrap();
        assert_eq!(hist.len(), 2);
        assert_eq!(hist[0].method, Method::Insert);
        assert_eq!(hist[0].value, 5);
        assert_eq!(hist[1].proc, 1);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn rejects_process_ids_at_or_above_the_limit() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("lintrace-test-proc-{}.hist", std::process::id()));
        std::fs::write(&path, "# set\n32 0 1 insert 5 true\n").unwrap();

        let err = parse_history(&path, parse_i64_bool_value).unwrap_err();
        assert!(matches!(err, HistoryError::ProcessOutOfRange { proc: 32 }));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn missing_header_is_an_error() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("lintrace-test-header-{}.hist", std::process::id()));
        std::fs::write(&path, "0 0 1 push 5\n").unwrap();

        assert!(matches!(
            read_object_kind(&path),
            Err(HistoryError::MissingObjectType)
        ));

        std::fs::remove_file(&path).ok();
    }
}
