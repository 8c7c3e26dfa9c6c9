use crate::error::{ProcessingError, Result};
use crate::models::MeasurementRecord;
use chrono::{Duration, NaiveDate};
use plotters::prelude::*;
use std::fs;
use std::path::Path;

/// A dated forecast step with an optional two-sided interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotPoint {
    pub date: NaiveDate,
    pub value: f64,
    pub band: Option<(f64, f64)>,
}

/// Renders PNG charts of observed series and forecasts.
pub struct PlotWriter {
    width: u32,
    height: u32,
}

fn plot_err<E: std::fmt::Display>(e: E) -> ProcessingError {
    ProcessingError::Plot(e.to_string())
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Padded value range covering every finite input.
fn value_range<I: IntoIterator<Item = f64>>(values: I) -> (f64, f64) {
    let (min, max) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

    if !min.is_finite() {
        return (0.0, 1.0);
    }
    let pad = ((max - min) * 0.05).max(0.5);
    (min - pad, max + pad)
}

fn date_range<I: IntoIterator<Item = NaiveDate>>(dates: I) -> Option<(NaiveDate, NaiveDate)> {
    let mut dates = dates.into_iter();
    let first = dates.next()?;
    let (start, end) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
    Some((start, end.max(start + Duration::days(1))))
}

impl PlotWriter {
    pub fn new() -> Self {
        Self {
            width: 1200,
            height: 600,
        }
    }

    /// Observed series overlaid with a forecast and, when present, its interval band.
    pub fn plot_forecast(
        &self,
        path: &Path,
        title: &str,
        observed: &[(NaiveDate, f64)],
        forecast: &[PlotPoint],
    ) -> Result<()> {
        ensure_parent(path)?;

        let (start, end) = date_range(
            observed
                .iter()
                .map(|(d, _)| *d)
                .chain(forecast.iter().map(|p| p.date)),
        )
        .ok_or_else(|| ProcessingError::Plot("nothing to plot".to_string()))?;

        let (y_min, y_max) = value_range(
            observed.iter().map(|(_, v)| *v).chain(forecast.iter().flat_map(|p| {
                let (lo, hi) = p.band.unwrap_or((p.value, p.value));
                [p.value, lo, hi]
            })),
        );

        let root = BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(plot_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 24))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(start..end, y_min..y_max)
            .map_err(plot_err)?;

        chart
            .configure_mesh()
            .x_desc("Date")
            .y_desc("CO₂ (ppm)")
            .draw()
            .map_err(plot_err)?;

        let banded: Vec<&PlotPoint> = forecast.iter().filter(|p| p.band.is_some()).collect();
        if !banded.is_empty() {
            let mut outline: Vec<(NaiveDate, f64)> = banded
                .iter()
                .filter_map(|p| p.band.map(|(_, hi)| (p.date, hi)))
                .collect();
            outline.extend(
                banded
                    .iter()
                    .rev()
                    .filter_map(|p| p.band.map(|(lo, _)| (p.date, lo))),
            );
            chart
                .draw_series(std::iter::once(Polygon::new(
                    outline,
                    RED.mix(0.2).filled(),
                )))
                .map_err(plot_err)?;
        }

        chart
            .draw_series(LineSeries::new(
                observed.iter().filter(|(_, v)| v.is_finite()).copied(),
                &BLUE,
            ))
            .map_err(plot_err)?
            .label("Observed")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));

        chart
            .draw_series(LineSeries::new(
                forecast.iter().map(|p| (p.date, p.value)),
                &RED,
            ))
            .map_err(plot_err)?
            .label("Forecast")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(plot_err)?;

        root.present().map_err(plot_err)?;
        tracing::info!("Plot saved to {}", path.display());
        Ok(())
    }

    /// Line chart of a single daily series.
    pub fn plot_daily_series(
        &self,
        path: &Path,
        title: &str,
        series: &[(NaiveDate, f64)],
    ) -> Result<()> {
        self.plot_forecast(path, title, series, &[])
    }

    /// Scatter of cleaned soundings, coloured from blue (low XCO2) to red (high).
    pub fn plot_spatial_distribution(
        &self,
        path: &Path,
        records: &[MeasurementRecord],
    ) -> Result<()> {
        ensure_parent(path)?;
        let (lo, hi) = value_range(records.iter().map(|r| r.xco2));
        let span = (hi - lo).max(f64::EPSILON);

        let root = BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(plot_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption("Spatial distribution of CO₂ measurements", ("sans-serif", 24))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(-180.0f64..180.0f64, -90.0f64..90.0f64)
            .map_err(plot_err)?;

        chart
            .configure_mesh()
            .x_desc("Longitude")
            .y_desc("Latitude")
            .draw()
            .map_err(plot_err)?;

        chart
            .draw_series(records.iter().map(|r| {
                let t = ((r.xco2 - lo) / span).clamp(0.0, 1.0);
                let color = HSLColor(0.66 * (1.0 - t), 0.8, 0.5);
                Circle::new((r.longitude, r.latitude), 1, color.filled())
            }))
            .map_err(plot_err)?;

        root.present().map_err(plot_err)?;
        tracing::info!("Plot saved to {}", path.display());
        Ok(())
    }
}

impl Default for PlotWriter {
    fn default() -> Self {
        Self::new()
    }
}
