//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use prisoner_sim::prelude::*;
//! ```

// Core
pub use crate::core::config::{Config, LogFormat};
pub use crate::core::errors::{Result, SimError};

// Control
pub use crate::control::signals::CancelToken;

// Logging
pub use crate::logger::experiment_log::ExperimentLog;
pub use crate::logger::record::{LogRecord, NullSink, RecordSink};

// Simulation
pub use crate::sim::cycles::{
    TrialOutcome, cycle_lengths, evaluate, longest_cycle, success_threshold,
};
pub use crate::sim::permutation::{Permutation, seeded_rng};
pub use crate::sim::runner::{ExperimentParams, ExperimentSummary, run_experiments};
pub use crate::sim::scaling::{ScalingReport, ScalingSample, StopReason, run_scaling};
pub use crate::sim::sweep::{
    SeriesRenderer, SweepDriver, SweepParams, SweepPoint, SweepReport, SweepSeries,
};

// Rendering
#[cfg(feature = "plot")]
pub use crate::render::chart::SvgChartRenderer;
