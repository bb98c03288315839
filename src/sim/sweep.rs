//! N sweeps: one batch per even prisoner count, rates collected into a series
//! and handed to a chart renderer.

#![allow(missing_docs)]

use std::path::Path;
use std::time::{Duration, Instant};

use rand::Rng;
use serde::Serialize;

use crate::control::signals::CancelToken;
use crate::core::errors::{Result, SimError};
use crate::logger::record::{LogRecord, RecordSink};
use crate::sim::runner::{check_prisoner_count, check_trial_count, run_batch};

/// Validated sweep range. `start` and `end` are even, `start <= end`, and
/// every point runs at least one trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SweepParams {
    start: usize,
    end: usize,
    trials: usize,
}

impl SweepParams {
    pub fn new(start: usize, end: usize, trials: usize) -> Result<Self> {
        check_prisoner_count(start)?;
        check_prisoner_count(end)?;
        if start > end {
            return Err(SimError::invalid_input(format!(
                "the start number ({start}) must be less than or equal to the end number ({end})"
            )));
        }
        check_trial_count(trials)?;
        Ok(Self { start, end, trials })
    }

    pub const fn start(&self) -> usize {
        self.start
    }

    pub const fn end(&self) -> usize {
        self.end
    }

    pub const fn trials(&self) -> usize {
        self.trials
    }

    /// `start, start + 2, ..., end`.
    pub fn prisoner_counts(&self) -> impl Iterator<Item = usize> + use<> {
        (self.start..=self.end).step_by(2)
    }

    /// Number of points in the sweep.
    pub const fn len(&self) -> usize {
        (self.end - self.start) / 2 + 1
    }

    pub const fn is_empty(&self) -> bool {
        false
    }
}

/// Success rate measured at one prisoner count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SweepPoint {
    pub prisoners: usize,
    pub success_rate: f64,
}

/// Points in increasing N order, plus the requested x-axis range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepSeries {
    pub start: usize,
    pub end: usize,
    pub points: Vec<SweepPoint>,
}

/// Upper bound on the points preallocated for a series. Ranges are only
/// validated for parity and order, so `len()` can be far beyond memory.
const MAX_PREALLOCATED_POINTS: usize = 4_096;

impl SweepSeries {
    fn for_params(params: &SweepParams) -> Self {
        Self {
            start: params.start,
            end: params.end,
            points: Vec::with_capacity(params.len().min(MAX_PREALLOCATED_POINTS)),
        }
    }
}

/// Plotting collaborator: turns a finished series into a persisted chart.
pub trait SeriesRenderer {
    fn render(&mut self, series: &SweepSeries) -> Result<()>;

    /// Where the chart ends up, for user-facing messages.
    fn destination(&self) -> Option<&Path> {
        None
    }
}

/// Renderer that keeps every series it is given. Useful when the caller only
/// wants the numbers.
impl SeriesRenderer for Vec<SweepSeries> {
    fn render(&mut self, series: &SweepSeries) -> Result<()> {
        self.push(series.clone());
        Ok(())
    }
}

/// Result of a sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepReport {
    pub series: SweepSeries,
    pub elapsed: Duration,
    /// Stopped early by the cancel token; the series is partial and was not rendered.
    pub interrupted: bool,
}

/// Runs sweeps against a borrowed RNG and log sink.
pub struct SweepDriver<'a, R: ?Sized, S: ?Sized> {
    rng: &'a mut R,
    sink: &'a mut S,
    cancel: Option<&'a CancelToken>,
}

impl<'a, R, S> SweepDriver<'a, R, S>
where
    R: Rng + ?Sized,
    S: RecordSink + ?Sized,
{
    pub fn new(rng: &'a mut R, sink: &'a mut S) -> Self {
        Self {
            rng,
            sink,
            cancel: None,
        }
    }

    /// Check `cancel` before each point and each trial. A point cut short is
    /// neither logged nor kept.
    #[must_use]
    pub fn with_cancel(mut self, cancel: &'a CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Measure every point in `params`, log one record per point, call
    /// `on_point` as each completes, then render the full series.
    pub fn run<P, F>(
        &mut self,
        params: &SweepParams,
        renderer: &mut P,
        mut on_point: F,
    ) -> Result<SweepReport>
    where
        P: SeriesRenderer + ?Sized,
        F: FnMut(&SweepPoint),
    {
        let started = Instant::now();
        let mut series = SweepSeries::for_params(params);

        for prisoners in params.prisoner_counts() {
            if self.cancel.is_some_and(CancelToken::is_cancelled) {
                return Ok(Self::interrupted(series, started));
            }

            let tally = run_batch(
                prisoners,
                params.trials,
                &mut *self.rng,
                self.cancel,
                |_, _| {},
            );
            if tally.completed < params.trials {
                return Ok(Self::interrupted(series, started));
            }

            #[allow(clippy::cast_precision_loss)]
            let point = SweepPoint {
                prisoners,
                success_rate: tally.successes as f64 / params.trials as f64,
            };
            self.sink.record(&LogRecord::SweepPoint {
                prisoners,
                success_rate: point.success_rate,
            });
            on_point(&point);
            series.points.push(point);
        }

        renderer.render(&series)?;

        Ok(SweepReport {
            series,
            elapsed: started.elapsed(),
            interrupted: false,
        })
    }

    fn interrupted(series: SweepSeries, started: Instant) -> SweepReport {
        SweepReport {
            series,
            elapsed: started.elapsed(),
            interrupted: true,
        }
    }
}
