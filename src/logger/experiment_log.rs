//! Experiment log: append-only, one record per line, text or JSONL.
//!
//! Lines are assembled in memory and written with a single `write_all` so a
//! concurrent `tail -f` never sees half a record.
//!
//! The handle is scoped: [`ExperimentLog::close`] flushes and syncs and reports
//! failures, and `Drop` does the same best-effort on every other exit path
//! (validation error, interruption, panic unwinding).
//!
//! Write failures never abort a simulation. The writer degrades:
//! 1. Log file
//! 2. stderr with `[PSIM-LOG]` prefix
//! 3. Silent discard

#![allow(missing_docs)]

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::config::LogFormat;
use crate::core::errors::{Result, SimError};
use crate::logger::record::{LogRecord, RecordSink};

/// Where lines currently go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    /// The log file.
    Normal,
    /// The file failed; lines are echoed to stderr with `[PSIM-LOG]`.
    Stderr,
    /// stderr failed too; lines are dropped.
    Discard,
}

/// JSONL envelope: the record plus a wall-clock stamp.
#[derive(Serialize)]
struct JsonlLine<'a> {
    ts: String,
    #[serde(flatten)]
    record: &'a LogRecord<'a>,
}

/// Append-only experiment log bound to one file for one command invocation.
pub struct ExperimentLog {
    path: PathBuf,
    format: LogFormat,
    writer: Option<BufWriter<File>>,
    state: WriterState,
    lines_written: u64,
}

impl ExperimentLog {
    /// Start a fresh log: delete whatever a previous invocation left behind,
    /// then open for appending. A missing previous file is not an error.
    pub fn reset(path: impl AsRef<Path>, format: LogFormat) -> Result<Self> {
        let path = path.as_ref();
        match fs::remove_file(path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(source) => return Err(SimError::io(path, source)),
        }
        Self::append(path, format)
    }

    /// Open (or create) the log and keep existing contents.
    pub fn append(path: impl AsRef<Path>, format: LogFormat) -> Result<Self> {
        let path = path.as_ref();
        let file = open_append(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            format,
            writer: Some(BufWriter::with_capacity(64 * 1024, file)),
            state: WriterState::Normal,
            lines_written: 0,
        })
    }

    /// Write one record as one line.
    pub fn write_record(&mut self, record: &LogRecord<'_>) {
        let line = match self.format {
            LogFormat::Text => format!("{record}\n"),
            LogFormat::Jsonl => {
                let envelope = JsonlLine {
                    ts: format_utc_now(),
                    record,
                };
                match serde_json::to_string(&envelope) {
                    Ok(json) => format!("{json}\n"),
                    Err(e) => {
                        let _ = writeln!(io::stderr(), "[PSIM-LOG] serialize error: {e}");
                        return;
                    }
                }
            }
        };
        self.write_line(&line);
    }

    /// Flush, sync to disk and release the file. Reports the first failure.
    pub fn close(mut self) -> Result<()> {
        let Some(writer) = self.writer.take() else {
            return Ok(());
        };
        let file = writer
            .into_inner()
            .map_err(|e| SimError::io(&self.path, e.into_error()))?;
        file.sync_data().map_err(|e| SimError::io(&self.path, e))
    }

    /// Number of lines accepted since the log was opened.
    pub fn lines_written(&self) -> u64 {
        self.lines_written
    }

    /// Current degradation state.
    pub fn state(&self) -> WriterState {
        self.state
    }

    // ──────────────────────── internals ────────────────────────

    fn write_line(&mut self, line: &str) {
        match self.state {
            WriterState::Normal => {
                if let Some(w) = self.writer.as_mut() {
                    if w.write_all(line.as_bytes()).is_err() {
                        self.degrade();
                        self.write_line(line);
                        return;
                    }
                    self.lines_written += 1;
                } else {
                    self.degrade();
                    self.write_line(line);
                }
            }
            WriterState::Stderr => {
                if write!(io::stderr(), "[PSIM-LOG] {line}").is_err() {
                    self.state = WriterState::Discard;
                }
            }
            WriterState::Discard => {}
        }
    }

    fn degrade(&mut self) {
        self.writer = None;
        match self.state {
            WriterState::Normal => {
                self.state = WriterState::Stderr;
                let _ = writeln!(
                    io::stderr(),
                    "[PSIM-LOG] write to {} failed, using stderr",
                    self.path.display()
                );
            }
            WriterState::Stderr => self.state = WriterState::Discard,
            WriterState::Discard => {}
        }
    }
}

impl RecordSink for ExperimentLog {
    fn record(&mut self, record: &LogRecord<'_>) {
        self.write_record(record);
    }
}

impl Drop for ExperimentLog {
    fn drop(&mut self) {
        if let Some(w) = self.writer.as_mut() {
            let _ = w.flush();
            let _ = w.get_ref().sync_data();
        }
    }
}

// ──────────────────────── helpers ────────────────────────

/// Open or create a file for appending, creating parent directories.
fn open_append(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| SimError::io(parent, source))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| SimError::io(path, source))
}

/// Format current UTC time as ISO 8601.
fn format_utc_now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

// ──────────────────────── tests ────────────────────────
