//! Experiment log: per-trial and per-point records, text or JSONL.

pub mod experiment_log;
pub mod record;
