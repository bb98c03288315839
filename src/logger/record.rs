//! Records emitted by the simulation loops and the sink trait they flow through.

#![allow(missing_docs)]

use std::fmt;

use serde::Serialize;

use crate::sim::permutation::Permutation;

/// One line of the experiment log.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LogRecord<'a> {
    /// A single trial of a fixed-N batch. `index` is 1-based.
    Trial {
        index: usize,
        permutation: &'a Permutation,
        success: bool,
    },
    /// One point of an N sweep.
    SweepPoint { prisoners: usize, success_rate: f64 },
}

impl fmt::Display for LogRecord<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trial {
                index,
                permutation,
                success,
            } => {
                let result = if *success { "success" } else { "fail" };
                write!(
                    f,
                    "Experiment {index}: Permutation: {permutation} | Result: {result}"
                )
            }
            Self::SweepPoint {
                prisoners,
                success_rate,
            } => write!(
                f,
                "Plot: Prisoners: {prisoners} -> Success Rate: {success_rate:.4}"
            ),
        }
    }
}

/// Destination for per-trial and per-point records.
///
/// Writes are fire-and-forget: a sink that cannot persist a record must degrade
/// on its own rather than abort the simulation.
pub trait RecordSink {
    fn record(&mut self, record: &LogRecord<'_>);
}

/// In-memory sink holding the text rendering of each record.
impl RecordSink for Vec<String> {
    fn record(&mut self, record: &LogRecord<'_>) {
        self.push(record.to_string());
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl RecordSink for NullSink {
    fn record(&mut self, _record: &LogRecord<'_>) {}
}

impl<S: RecordSink + ?Sized> RecordSink for &mut S {
    fn record(&mut self, record: &LogRecord<'_>) {
        (**self).record(record);
    }
}
