//! Command-line driver: reads a history file, decides its linearizability,
//! and reports the verdict.
//!
//! Flags are parsed by hand rather than through an argument-parsing crate —
//! there are only three of them, and the dependency isn't worth carrying for
//! that.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};

use lintrace::aadt::priority_queue::PriorityQueueSimulator;
use lintrace::aadt::rmw::RmwSimulator;
use lintrace::aadt::semaphore::SemaphoreSimulator;
use lintrace::aadt::set::SetSimulator;
use lintrace::aadt::{self, Simulator};
use lintrace::event::{bit_patterns, build_events};
use lintrace::history::{self, History, ObjectKind};
use lintrace::{queue, stack};

const USAGE: &str = "\
lintrace -t <history-file> [-v] [-h]

  -t, --trace <path>   path to the history file to decide
  -v, --verbose        print the object kind, operation count, and elapsed time
  -h, --help           print this message
";

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if has_flag(&args, "-h") || has_flag(&args, "--help") {
        print!("{USAGE}");
        return Ok(());
    }

    let trace = parse_flag(&args, "-t")
        .or_else(|| parse_flag(&args, "--trace"))
        .context("missing required -t <history-file> (see -h)")?;
    let verbose = has_flag(&args, "-v") || has_flag(&args, "--verbose");

    let path = PathBuf::from(trace);
    let kind = history::read_object_kind(&path)?;

    let start = Instant::now();
    let (linearizable, operations) = decide(&path, kind)?;
    let elapsed = start.elapsed();

    println!("{}", if linearizable { "yes" } else { "no" });
    if verbose {
        eprintln!("object: {kind}");
        eprintln!("operations: {operations}");
        eprintln!("elapsed: {elapsed:?}");
    }

    std::process::exit(if linearizable { 0 } else { 1 });
}

fn decide(path: &Path, kind: ObjectKind) -> Result<(bool, usize)> {
    Ok(match kind {
        ObjectKind::Stack => {
            let hist = history::parse_history(path, history::parse_i64_value)?;
            let linearizable = stack::is_linearizable(&hist)?;
            (linearizable, hist.len())
        }
        ObjectKind::Queue => {
            let hist = history::parse_history(path, history::parse_i64_value)?;
            let linearizable = queue::is_linearizable(&hist)?;
            (linearizable, hist.len())
        }
        ObjectKind::PriorityQueue => {
            let hist = history::parse_history(path, history::parse_i64_value)?;
            let linearizable = decide_aadt(&hist, PriorityQueueSimulator::new());
            (linearizable, hist.len())
        }
        ObjectKind::Rmw => {
            let hist = history::parse_history(path, history::parse_i64_pair_value)?;
            let linearizable = decide_aadt(&hist, RmwSimulator::new());
            (linearizable, hist.len())
        }
        ObjectKind::Set => {
            let hist = history::parse_history(path, history::parse_i64_bool_value)?;
            let linearizable = decide_aadt(&hist, SetSimulator::new());
            (linearizable, hist.len())
        }
        ObjectKind::Semaphore => {
            let hist = history::parse_history(path, history::parse_bool_value)?;
            let linearizable = decide_aadt(&hist, SemaphoreSimulator::new());
            (linearizable, hist.len())
        }
    })
}

fn decide_aadt<V, S: Simulator<V>>(history: &History<V>, mut sim: S) -> bool {
    let events = build_events(history);
    let patterns = bit_patterns(&events);
    aadt::is_linearizable(&events, &patterns, &mut sim)
}

fn parse_flag(args: &[String], name: &str) -> Option<String> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn has_flag(args: &[String], name: &str) -> bool {
    args.iter().any(|a| a == name)
}
