//! Monte Carlo core: permutation sampling, cycle evaluation, experiment
//! batches, N sweeps and the scaling run.

pub mod cycles;
pub mod permutation;
pub mod runner;
pub mod scaling;
pub mod sweep;
