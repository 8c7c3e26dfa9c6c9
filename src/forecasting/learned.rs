use crate::error::{ProcessingError, Result};
use crate::forecasting::lstm::TrainingConfig;
use crate::forecasting::recurrent::RecurrentForecaster;
use crate::forecasting::series::country_series;
use crate::forecasting::Forecaster;
use crate::models::{CountryDailyMean, ForecastPoint, ForecastSeries};
use crate::readers::TableReader;
use crate::utils::constants::{
    DEFAULT_FORECAST_CADENCE_DAYS, DEFAULT_LSTM_HORIZON, DEFAULT_LSTM_WINDOW,
};
use crate::utils::filename::lstm_plot_filename;
use crate::writers::{PlotPoint, PlotWriter};
use chrono::{Duration, NaiveDate};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct LearnedForecast {
    pub forecast: ForecastSeries,
    /// Set when a plot directory was given.
    pub plot_path: Option<PathBuf>,
    pub effective_window: usize,
    pub loss_history: Vec<f64>,
}

/// LSTM forecast on a country's raw daily observations.
pub struct LearnedForecastStage {
    n_steps: usize,
    horizon: usize,
    cadence_days: i64,
    training: TrainingConfig,
}

impl LearnedForecastStage {
    pub fn new(training: TrainingConfig) -> Self {
        Self {
            n_steps: DEFAULT_LSTM_WINDOW,
            horizon: DEFAULT_LSTM_HORIZON,
            cadence_days: DEFAULT_FORECAST_CADENCE_DAYS,
            training,
        }
    }

    pub fn with_window(mut self, n_steps: usize) -> Self {
        self.n_steps = n_steps;
        self
    }

    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn with_cadence_days(mut self, cadence_days: i64) -> Self {
        self.cadence_days = cadence_days;
        self
    }

    /// Trains on the country's observations and returns them with the forecast
    /// and the fitted model.
    pub fn forecast_country(
        &self,
        rows: &[CountryDailyMean],
        country: &str,
    ) -> Result<(Vec<(NaiveDate, f64)>, ForecastSeries, RecurrentForecaster)> {
        let observed = country_series(rows, country)?;
        let values: Vec<f64> = observed.iter().map(|(_, v)| *v).collect();

        let mut model = RecurrentForecaster::new(self.training.clone(), self.n_steps);
        model.fit(&values)?;
        let result = model.forecast(self.horizon)?;

        let last_date = observed.last().map(|(date, _)| *date).ok_or_else(|| {
            ProcessingError::InsufficientData(format!("no observations for {}", country))
        })?;
        let mut forecast = ForecastSeries::new(model.name());
        for (step, value) in result.values.iter().enumerate() {
            forecast.points.push(ForecastPoint {
                date: last_date + Duration::days(self.cadence_days * (step as i64 + 1)),
                xco2: *value,
                lower: None,
                upper: None,
            });
        }

        Ok((observed, forecast, model))
    }

    /// Forecasts `country` from the country table. With a plot directory the
    /// chart is saved as `<plot_dir>/<country>_lstm_forecast.png`.
    pub fn run(&self, country_table: &Path, country: &str, plot_dir: Option<&Path>) -> Result<LearnedForecast> {
        let rows: Vec<CountryDailyMean> = TableReader::new().read(country_table)?;
        let (observed, forecast, model) = self.forecast_country(&rows, country)?;
        tracing::info!("{}", forecast.summary().trim_end());

        let plot_path = match plot_dir {
            Some(dir) => {
                let path = lstm_plot_filename(dir, country);
                let points: Vec<PlotPoint> = forecast
                    .points
                    .iter()
                    .map(|p| PlotPoint {
                        date: p.date,
                        value: p.xco2,
                        band: None,
                    })
                    .collect();
                PlotWriter::new().plot_forecast(
                    &path,
                    &format!("{}: CO₂ forecast (LSTM)", country),
                    &observed,
                    &points,
                )?;
                Some(path)
            }
            None => {
                tracing::info!("No plot directory given, skipping LSTM plot");
                None
            }
        };

        Ok(LearnedForecast {
            effective_window: model.effective_window().unwrap_or(self.n_steps),
            loss_history: model.loss_history().to_vec(),
            forecast,
            plot_path,
        })
    }
}

impl Default for LearnedForecastStage {
    fn default() -> Self {
        Self::new(TrainingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProcessingError;

    fn rows(values: &[f64]) -> Vec<CountryDailyMean> {
        values
            .iter()
            .enumerate()
            .map(|(i, &xco2)| CountryDailyMean {
                country: "India".to_string(),
                date: NaiveDate::from_ymd_opt(2018 + i as i32, 7, 1).unwrap(),
                xco2,
            })
            .collect()
    }

    fn stage() -> LearnedForecastStage {
        LearnedForecastStage::new(TrainingConfig::default().with_epochs(3).with_hidden_size(6))
    }

    #[test]
    fn test_short_series_forecast() -> Result<()> {
        let (observed, forecast, model) = stage().forecast_country(&rows(&[407.0, 409.5, 411.8]), "India")?;

        assert_eq!(observed.len(), 3);
        assert_eq!(model.effective_window(), Some(2));
        assert_eq!(forecast.horizon(), 4);
        assert!(!forecast.has_intervals());
        assert_eq!(
            forecast.points[0].date,
            NaiveDate::from_ymd_opt(2020, 7, 1).unwrap() + Duration::days(180)
        );
        assert_eq!(
            forecast.points[3].date - forecast.points[2].date,
            Duration::days(180)
        );
        Ok(())
    }

    #[test]
    fn test_run_without_plot() -> Result<()> {
        let temp_dir = tempfile::TempDir::new()?;
        let table = temp_dir.path().join("country_daily_co2.csv");
        crate::writers::CsvWriter::new().write_records(&rows(&[407.0, 408.0, 409.0, 410.5, 411.0]), &table)?;

        let result = stage().run(&table, "India", None)?;
        assert_eq!(result.forecast.horizon(), 4);
        assert_eq!(result.effective_window, 4);
        assert_eq!(result.loss_history.len(), 3);
        assert!(result.plot_path.is_none());
        Ok(())
    }

    #[test]
    fn test_run_renders_plot() -> Result<()> {
        let temp_dir = tempfile::TempDir::new()?;
        let table = temp_dir.path().join("country_daily_co2.csv");
        crate::writers::CsvWriter::new().write_records(&rows(&[407.0, 408.0, 409.0, 410.5, 411.0]), &table)?;
        let plot_dir = temp_dir.path().join("plots");

        let result = stage().run(&table, "India", Some(&plot_dir))?;

        let expected = plot_dir.join("india_lstm_forecast.png");
        assert_eq!(result.plot_path, Some(expected.clone()));
        assert!(expected.is_file());
        assert!(std::fs::metadata(&expected)?.len() > 0);
        Ok(())
    }

    #[test]
    fn test_single_observation_is_insufficient() {
        let result = stage().forecast_country(&rows(&[407.0]), "India");
        assert!(matches!(result, Err(ProcessingError::InsufficientData(_))));
    }

    #[test]
    fn test_absent_country() {
        let result = stage().forecast_country(&rows(&[407.0, 408.0]), "Chad");
        assert!(matches!(result, Err(ProcessingError::CountryNotFound { .. })));
    }
}
