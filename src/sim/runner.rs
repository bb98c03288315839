//! Fixed-N experiment batches.

#![allow(missing_docs)]

use std::time::{Duration, Instant};

use rand::Rng;
use serde::Serialize;

use crate::control::signals::CancelToken;
use crate::core::errors::{Result, SimError};
use crate::logger::record::{LogRecord, RecordSink};
use crate::sim::cycles::{TrialOutcome, evaluate};
use crate::sim::permutation::Permutation;

/// Validated prisoner count: even and at least 2.
pub fn check_prisoner_count(prisoners: usize) -> Result<usize> {
    if prisoners < 2 || prisoners % 2 != 0 {
        return Err(SimError::invalid_input(format!(
            "only even numbers (>= 2) are accepted for the number of prisoners, got {prisoners}"
        )));
    }
    Ok(prisoners)
}

/// Validated trial count: at least 1, so a success rate is always defined.
pub fn check_trial_count(trials: usize) -> Result<usize> {
    if trials == 0 {
        return Err(SimError::invalid_input(
            "the number of experiments must be >= 1",
        ));
    }
    Ok(trials)
}

/// Inputs for one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExperimentParams {
    prisoners: usize,
    trials: usize,
}

impl ExperimentParams {
    pub fn new(prisoners: usize, trials: usize) -> Result<Self> {
        Ok(Self {
            prisoners: check_prisoner_count(prisoners)?,
            trials: check_trial_count(trials)?,
        })
    }

    pub const fn prisoners(&self) -> usize {
        self.prisoners
    }

    pub const fn trials(&self) -> usize {
        self.trials
    }
}

/// Aggregate of a batch. `trials` counts completed trials, which is less than
/// `requested` only when the batch was interrupted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExperimentSummary {
    pub prisoners: usize,
    pub requested: usize,
    pub trials: usize,
    pub successes: usize,
    pub elapsed: Duration,
    pub interrupted: bool,
}

impl ExperimentSummary {
    /// Fraction of successful trials, in `[0, 1]`. Zero when no trial completed.
    #[allow(clippy::cast_precision_loss)]
    pub fn success_rate(&self) -> f64 {
        if self.trials == 0 {
            return 0.0;
        }
        self.successes as f64 / self.trials as f64
    }
}

/// Trials a batch got through and how many of them succeeded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchTally {
    pub completed: usize,
    pub successes: usize,
}

/// Run up to `trials` independent trials at `prisoners`, calling `on_trial`
/// with the 1-based index of each. `cancel` is checked before every trial.
///
/// `trials == 0` is a caller bug and panics.
pub fn run_batch<R, F>(
    prisoners: usize,
    trials: usize,
    rng: &mut R,
    cancel: Option<&CancelToken>,
    mut on_trial: F,
) -> BatchTally
where
    R: Rng + ?Sized,
    F: FnMut(usize, &TrialOutcome),
{
    assert!(trials >= 1, "a batch needs at least one trial");
    let mut tally = BatchTally::default();
    for index in 1..=trials {
        if cancel.is_some_and(CancelToken::is_cancelled) {
            break;
        }
        let outcome = evaluate(Permutation::random(prisoners, rng));
        if outcome.success {
            tally.successes += 1;
        }
        tally.completed += 1;
        on_trial(index, &outcome);
    }
    tally
}

/// Run one fixed-N batch, logging every trial to `sink`. Stops early, with a
/// partial summary, once `cancel` fires.
pub fn run_experiments<R, S>(
    params: &ExperimentParams,
    rng: &mut R,
    sink: &mut S,
    cancel: Option<&CancelToken>,
) -> ExperimentSummary
where
    R: Rng + ?Sized,
    S: RecordSink + ?Sized,
{
    let started = Instant::now();
    let tally = run_batch(params.prisoners, params.trials, rng, cancel, |index, outcome| {
        sink.record(&LogRecord::Trial {
            index,
            permutation: &outcome.permutation,
            success: outcome.success,
        });
    });

    ExperimentSummary {
        prisoners: params.prisoners,
        requested: params.trials,
        trials: tally.completed,
        successes: tally.successes,
        elapsed: started.elapsed(),
        interrupted: tally.completed < params.trials,
    }
}
