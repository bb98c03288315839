#![forbid(unsafe_code)]

//! Monte Carlo simulator for the 100 prisoners problem.
//!
//! Each trial draws a uniformly random permutation of `0..N` and succeeds when
//! every cycle is no longer than `N / 2`, which is exactly when the
//! cycle-following strategy frees all prisoners.
//!
//! Three drivers sit on top of the trial:
//! 1. **Fixed-N batches** ([`sim::runner`]): estimate the success rate at one N
//! 2. **N sweeps** ([`sim::sweep`]): estimate the rate across a range and chart it
//! 3. **Scaling run** ([`sim::scaling`]): time single trials at growing N
//!
//! # Library usage
//!
//! ```rust,no_run
//! use prisoner_sim::prelude::*;
//!
//! let params = ExperimentParams::new(100, 1_000)?;
//! let mut rng = seeded_rng(Some(7));
//! let summary = run_experiments(&params, &mut rng, &mut NullSink, None);
//! println!("{:.4}", summary.success_rate());
//! # Ok::<(), SimError>(())
//! ```

pub mod prelude;

pub mod control;
pub mod core;
pub mod logger;
#[cfg(feature = "plot")]
pub mod render;
pub mod sim;
