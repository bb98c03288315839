//! Chart rendering for sweep series.

pub mod chart;
