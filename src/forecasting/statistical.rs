use crate::error::{ProcessingError, Result};
use crate::forecasting::sarima::SeasonalArima;
use crate::forecasting::series::{country_series, monthly_means};
use crate::forecasting::Forecaster;
use crate::models::{CountryDailyMean, ForecastPoint, ForecastSeries, MonthlyMean};
use crate::readers::TableReader;
use crate::utils::constants::{
    DEFAULT_ARIMA_HORIZON, DEFAULT_CONFIDENCE_LEVEL, MIN_RELIABLE_PERIODS, SEASONAL_PERIOD,
};
use crate::utils::dates::add_months_end;
use crate::writers::{CsvWriter, PlotPoint, PlotWriter};
use std::path::Path;

/// Monthly SARIMA forecast for one country.
pub struct StatisticalForecastStage {
    horizon: usize,
    confidence: f64,
    seasonal_period: usize,
}

impl StatisticalForecastStage {
    pub fn new() -> Self {
        Self {
            horizon: DEFAULT_ARIMA_HORIZON,
            confidence: DEFAULT_CONFIDENCE_LEVEL,
            seasonal_period: SEASONAL_PERIOD,
        }
    }

    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    /// Fits the country's monthly series and returns it with the forecast.
    pub fn forecast_country(
        &self,
        rows: &[CountryDailyMean],
        country: &str,
    ) -> Result<(Vec<MonthlyMean>, ForecastSeries)> {
        let daily = country_series(rows, country)?;
        let monthly = monthly_means(&daily);

        if monthly.len() < MIN_RELIABLE_PERIODS {
            tracing::warn!(
                "Only {} monthly periods for {}; seasonal estimates may be unreliable",
                monthly.len(),
                country
            );
        }

        let values: Vec<f64> = monthly
            .iter()
            .map(|m| m.xco2.unwrap_or(f64::NAN))
            .collect();

        let mut model = SeasonalArima::new()
            .with_period(self.seasonal_period)
            .with_confidence(self.confidence);
        model.fit(&values)?;
        let result = model.forecast(self.horizon)?;

        let last_period = monthly.last().map(|m| m.month_end).ok_or_else(|| {
            ProcessingError::InsufficientData(format!("no monthly periods for {}", country))
        })?;

        let mut forecast = ForecastSeries::new(model.name());
        for (step, value) in result.values.iter().enumerate() {
            let bounds = result.intervals.as_ref().and_then(|iv| iv.get(step).copied());
            forecast.points.push(ForecastPoint {
                date: add_months_end(last_period, step as u32 + 1),
                xco2: *value,
                lower: bounds.map(|(lo, _)| lo),
                upper: bounds.map(|(_, hi)| hi),
            });
        }

        Ok((monthly, forecast))
    }

    /// Reads the country table, forecasts, and writes the forecast table and
    /// plot where paths are given.
    pub fn run(
        &self,
        country_table: &Path,
        country: &str,
        plot_path: Option<&Path>,
        table_path: Option<&Path>,
    ) -> Result<ForecastSeries> {
        let rows: Vec<CountryDailyMean> = TableReader::new().read(country_table)?;
        let (monthly, forecast) = self.forecast_country(&rows, country)?;
        tracing::info!("{}", forecast.summary().trim_end());

        if let Some(path) = table_path {
            CsvWriter::new().write_records(&forecast.points, path)?;
        }

        match plot_path {
            Some(path) => {
                let observed: Vec<_> = monthly
                    .iter()
                    .filter_map(|m| m.xco2.map(|v| (m.month_end, v)))
                    .collect();
                let points: Vec<PlotPoint> = forecast
                    .points
                    .iter()
                    .map(|p| PlotPoint {
                        date: p.date,
                        value: p.xco2,
                        band: p.lower.zip(p.upper),
                    })
                    .collect();
                PlotWriter::new().plot_forecast(
                    path,
                    &format!("{}: CO₂ forecast (SARIMA)", country),
                    &observed,
                    &points,
                )?;
            }
            None => tracing::info!("No plot path given, skipping SARIMA plot"),
        }

        Ok(forecast)
    }
}

impl Default for StatisticalForecastStage {
    fn default() -> Self {
        Self::new()
    }
}
