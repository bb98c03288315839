//! Scaling run: time a single trial at geometrically growing N.
//!
//! Runs until the cancel token fires or the next N would pass the ceiling.
//! Nothing is logged to the experiment log.

#![allow(missing_docs)]

use std::time::{Duration, Instant};

use rand::Rng;
use serde::Serialize;

use crate::control::signals::CancelToken;
use crate::core::config::ScalingConfig;
use crate::sim::cycles::evaluate;
use crate::sim::permutation::Permutation;

/// Timing of one trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScalingSample {
    pub prisoners: usize,
    pub success: bool,
    pub elapsed: Duration,
}

/// Why the scaling run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Cancelled,
    /// The next N would exceed the configured ceiling (or overflow `usize`).
    Ceiling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScalingReport {
    pub samples: usize,
    pub largest: Option<usize>,
    pub stop: StopReason,
}

/// Time one trial at `start`, `start * factor`, `start * factor^2`, ... up to
/// `max`, checking `cancel` before each.
pub fn run_scaling<R, F>(
    config: &ScalingConfig,
    rng: &mut R,
    cancel: &CancelToken,
    mut on_sample: F,
) -> ScalingReport
where
    R: Rng + ?Sized,
    F: FnMut(&ScalingSample),
{
    assert!(config.start_prisoners >= 1, "scaling must start at N >= 1");
    assert!(config.growth_factor >= 2, "scaling growth factor must be >= 2");

    let mut samples = 0;
    let mut largest = None;
    let mut next = Some(config.start_prisoners);

    let stop = loop {
        if cancel.is_cancelled() {
            break StopReason::Cancelled;
        }
        let prisoners = match next {
            Some(n) if n <= config.max_prisoners => n,
            _ => break StopReason::Ceiling,
        };

        let started = Instant::now();
        let outcome = evaluate(Permutation::random(prisoners, rng));
        let sample = ScalingSample {
            prisoners,
            success: outcome.success,
            elapsed: started.elapsed(),
        };

        samples += 1;
        largest = Some(prisoners);
        on_sample(&sample);

        next = prisoners.checked_mul(config.growth_factor);
    };

    ScalingReport {
        samples,
        largest,
        stop,
    }
}
