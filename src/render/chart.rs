//! SVG line chart of a sweep series, rendered with `plotters`.

#![allow(missing_docs)]

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use plotters::prelude::*;

use crate::core::config::PlotConfig;
use crate::core::errors::{Result, SimError};
use crate::sim::sweep::{SeriesRenderer, SweepSeries};

pub const X_LABEL: &str = "Number of Prisoners";
pub const Y_LABEL: &str = "Success Rate";

/// Writes one SVG file per render, overwriting the previous chart.
#[derive(Debug, Clone)]
pub struct SvgChartRenderer {
    path: PathBuf,
    width: u32,
    height: u32,
    title: String,
}

impl SvgChartRenderer {
    pub fn new(path: impl Into<PathBuf>, config: &PlotConfig) -> Self {
        Self {
            path: path.into(),
            width: config.width,
            height: config.height,
            title: config.title.clone(),
        }
    }

    fn draw(&self, series: &SweepSeries) -> std::result::Result<(), Box<dyn Error>> {
        let root = SVGBackend::new(&self.path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE)?;

        let (x_lo, x_hi) = x_range(series);
        let mut chart = ChartBuilder::on(&root)
            .caption(&self.title, ("sans-serif", 20))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_lo..x_hi, 0.0f64..1.0f64)?;

        chart
            .configure_mesh()
            .x_desc(X_LABEL)
            .y_desc(Y_LABEL)
            .x_label_formatter(&|x| format!("{x:.0}"))
            .draw()?;

        #[allow(clippy::cast_precision_loss)]
        let points: Vec<(f64, f64)> = series
            .points
            .iter()
            .map(|p| (p.prisoners as f64, p.success_rate))
            .collect();

        chart.draw_series(LineSeries::new(points.iter().copied(), &BLUE))?;
        chart.draw_series(
            points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 3, BLUE.filled())),
        )?;

        root.present()?;
        Ok(())
    }
}

impl SeriesRenderer for SvgChartRenderer {
    fn render(&mut self, series: &SweepSeries) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| SimError::io(parent, source))?;
        }
        self.draw(series).map_err(|e| SimError::Render {
            path: self.path.clone(),
            details: e.to_string(),
        })
    }

    fn destination(&self) -> Option<&Path> {
        Some(&self.path)
    }
}

/// Independent-axis range `[start, end]`, widened by one on each side when the
/// sweep has a single point so the axis is never degenerate.
#[allow(clippy::cast_precision_loss)]
fn x_range(series: &SweepSeries) -> (f64, f64) {
    let (lo, hi) = (series.start as f64, series.end as f64);
    if hi > lo { (lo, hi) } else { (lo - 1.0, hi + 1.0) }
}
