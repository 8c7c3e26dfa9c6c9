//! Seasonal ARIMA(1,1,1)(1,1,1,s) on monthly values.
//!
//! Fitting is delegated to `anofox-forecast`. Short series degrade to
//! ARIMA(1,1,1) and then to a random walk, so a forecast is always produced
//! once at least one month has been observed.

use crate::error::{ProcessingError, Result};
use crate::forecasting::{Forecaster, ModelForecast};
use crate::utils::constants::{DEFAULT_CONFIDENCE_LEVEL, SEASONAL_PERIOD};
use anofox_forecast::core::TimeSeries;
use anofox_forecast::models::arima::{ARIMA, SARIMA};
use anofox_forecast::models::baseline::Naive;
use anofox_forecast::models::{BoxedForecaster, Forecaster as _};
use chrono::{DateTime, Duration, TimeZone, Utc};

/// Spacing of the synthetic index handed to the fitting library.
const INDEX_STEP_DAYS: i64 = 30;

/// Which model was fitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SarimaSpec {
    /// (1,1,1)(1,1,1,period)
    Seasonal { period: usize },
    /// (1,1,1), used when the series is too short for the seasonal factor.
    NonSeasonal,
    /// Last value carried forward with intervals widening as sqrt(h).
    RandomWalk,
}

impl SarimaSpec {
    /// Fewest observations each model is attempted on: differencing span plus
    /// one more value than the model has coefficients.
    fn min_observations(&self) -> usize {
        match self {
            SarimaSpec::Seasonal { period } => period + 1 + 5,
            SarimaSpec::NonSeasonal => 1 + 3,
            SarimaSpec::RandomWalk => 1,
        }
    }

    fn build(&self) -> BoxedForecaster {
        match *self {
            SarimaSpec::Seasonal { period } => Box::new(SARIMA::new(1, 1, 1, 1, 1, 1, period)),
            SarimaSpec::NonSeasonal => Box::new(ARIMA::new(1, 1, 1)),
            SarimaSpec::RandomWalk => Box::new(Naive::new()),
        }
    }
}

/// Linear interpolation across interior gaps. Leading and trailing gaps are
/// removed.
pub fn fill_gaps(series: &[f64]) -> Vec<f64> {
    let observed: Vec<(usize, f64)> = series
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .map(|(i, v)| (i, *v))
        .collect();

    let mut filled = Vec::new();
    for pair in observed.windows(2) {
        let ((i0, v0), (i1, v1)) = (pair[0], pair[1]);
        let span = (i1 - i0) as f64;
        filled.extend((i0..i1).map(|i| v0 + (v1 - v0) * (i - i0) as f64 / span));
    }
    if let Some((_, last)) = observed.last() {
        filled.push(*last);
    }
    filled
}

fn monthly_index(len: usize) -> Result<Vec<DateTime<Utc>>> {
    let start = Utc
        .with_ymd_and_hms(2000, 1, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| ProcessingError::InvalidFormat("invalid index origin".to_string()))?;
    Ok((0..len)
        .map(|i| start + Duration::days(INDEX_STEP_DAYS * i as i64))
        .collect())
}

struct FittedSarima {
    spec: SarimaSpec,
    model: BoxedForecaster,
}

/// Monthly seasonal ARIMA with fixed orders and a fallback chain for short
/// series.
pub struct SeasonalArima {
    period: usize,
    confidence: f64,
    fitted: Option<FittedSarima>,
}

impl SeasonalArima {
    pub fn new() -> Self {
        Self {
            period: SEASONAL_PERIOD,
            confidence: DEFAULT_CONFIDENCE_LEVEL,
            fitted: None,
        }
    }

    pub fn with_period(mut self, period: usize) -> Self {
        self.period = period.max(2);
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    /// The model actually fitted, `None` before fitting.
    pub fn fitted_spec(&self) -> Option<SarimaSpec> {
        self.fitted.as_ref().map(|f| f.spec)
    }

    /// Fits `spec` and checks that it yields a finite one-step forecast.
    fn try_fit(&self, spec: SarimaSpec, series: &TimeSeries) -> Option<BoxedForecaster> {
        let mut model = spec.build();
        let checked = model
            .fit(series)
            .and_then(|_| model.predict_with_intervals(1, self.confidence));
        match checked {
            Ok(forecast) if forecast.primary().iter().all(|v| v.is_finite()) => Some(model),
            Ok(_) => {
                tracing::debug!("{:?} produced a non-finite forecast", spec);
                None
            }
            Err(e) => {
                tracing::debug!("{:?} could not be fitted: {}", spec, e);
                None
            }
        }
    }
}

impl Default for SeasonalArima {
    fn default() -> Self {
        Self::new()
    }
}

impl Forecaster for SeasonalArima {
    fn name(&self) -> &str {
        "SARIMA"
    }

    /// Missing periods are NaN.
    fn fit(&mut self, series: &[f64]) -> Result<()> {
        let values = fill_gaps(series);
        if values.is_empty() {
            return Err(ProcessingError::InsufficientData(
                "no observed months to fit".to_string(),
            ));
        }
        let n = values.len();
        let series = TimeSeries::univariate(monthly_index(n)?, values)?;

        let chain = [
            SarimaSpec::Seasonal { period: self.period },
            SarimaSpec::NonSeasonal,
            SarimaSpec::RandomWalk,
        ];
        for spec in chain.into_iter().filter(|s| n >= s.min_observations()) {
            if let Some(model) = self.try_fit(spec, &series) {
                match spec {
                    SarimaSpec::Seasonal { .. } => {}
                    SarimaSpec::NonSeasonal => tracing::warn!(
                        "{} periods are too few for a seasonal model with period {}; fitted ARIMA(1,1,1)",
                        n,
                        self.period
                    ),
                    SarimaSpec::RandomWalk => tracing::warn!(
                        "{} periods are too few for ARIMA; forecasting with a random walk",
                        n
                    ),
                }
                tracing::debug!("Fitted {} on {} periods", model.name(), n);
                self.fitted = Some(FittedSarima { spec, model });
                return Ok(());
            }
        }

        Err(ProcessingError::InsufficientData(format!(
            "no model could be fitted to {} periods",
            n
        )))
    }

    fn forecast(&self, horizon: usize) -> Result<ModelForecast> {
        let fitted = self.fitted.as_ref().ok_or_else(|| {
            ProcessingError::InsufficientData("model must be fitted before forecasting".to_string())
        })?;

        let forecast = fitted.model.predict_with_intervals(horizon, self.confidence)?;
        let values = forecast.primary().to_vec();

        // A random walk fitted to one month has no spread to estimate.
        let intervals = if forecast.has_lower() && forecast.has_upper() {
            forecast
                .lower_series(0)?
                .iter()
                .copied()
                .zip(forecast.upper_series(0)?.iter().copied())
                .collect()
        } else {
            values.iter().map(|v| (*v, *v)).collect()
        };

        Ok(ModelForecast {
            values,
            intervals: Some(intervals),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Trend + annual cycle + deterministic irregular component.
    fn synthetic_monthly(n: usize) -> Vec<f64> {
        (0..n)
            .map(|t| {
                let t = t as f64;
                400.0
                    + 0.2 * t
                    + 3.0 * (2.0 * std::f64::consts::PI * t / 12.0).sin()
                    + 0.4 * (t * 1.7).sin() * (t * 0.3).cos()
            })
            .collect()
    }

    #[test]
    fn test_fill_gaps_interpolates_interior_only() {
        let filled = fill_gaps(&[f64::NAN, 400.0, f64::NAN, f64::NAN, 406.0, f64::NAN]);
        assert_eq!(filled, vec![400.0, 402.0, 404.0, 406.0]);
        assert!(fill_gaps(&[f64::NAN, f64::NAN]).is_empty());
    }

    #[test]
    fn test_forecast_horizon_and_intervals() -> Result<()> {
        let mut model = SeasonalArima::new();
        model.fit(&synthetic_monthly(36))?;
        assert_eq!(model.fitted_spec(), Some(SarimaSpec::Seasonal { period: 12 }));

        let forecast = model.forecast(12)?;
        assert_eq!(forecast.values.len(), 12);

        let intervals = forecast.intervals.expect("SARIMA produces intervals");
        assert_eq!(intervals.len(), 12);
        for (value, (lower, upper)) in forecast.values.iter().zip(&intervals) {
            assert!(value.is_finite() && lower.is_finite() && upper.is_finite());
            assert!(lower < upper);
            assert!(lower <= value && value <= upper);
        }
        Ok(())
    }

    #[test]
    fn test_missing_months_are_tolerated() -> Result<()> {
        let mut series = synthetic_monthly(36);
        series[5] = f64::NAN;
        series[17] = f64::NAN;
        series[30] = f64::NAN;

        let mut model = SeasonalArima::new();
        model.fit(&series)?;
        let forecast = model.forecast(6)?;
        assert!(forecast.values.iter().all(|v| v.is_finite()));
        Ok(())
    }

    #[test]
    fn test_short_series_drops_seasonal_factor() -> Result<()> {
        let mut model = SeasonalArima::new();
        model.fit(&synthetic_monthly(10))?;
        assert_ne!(model.fitted_spec(), Some(SarimaSpec::Seasonal { period: 12 }));
        assert_eq!(model.forecast(3)?.values.len(), 3);
        Ok(())
    }

    #[test]
    fn test_two_observations_use_random_walk() -> Result<()> {
        let mut model = SeasonalArima::new();
        model.fit(&[400.0, 402.0])?;
        assert_eq!(model.fitted_spec(), Some(SarimaSpec::RandomWalk));

        let forecast = model.forecast(3)?;
        assert_eq!(forecast.values, vec![402.0, 402.0, 402.0]);
        let intervals = forecast.intervals.expect("random walk produces intervals");
        assert!(intervals[0].0 < 402.0 && intervals[0].1 > 402.0);
        assert!(intervals[2].1 - intervals[2].0 > intervals[0].1 - intervals[0].0);
        Ok(())
    }

    #[test]
    fn test_single_observation_has_zero_width_interval() -> Result<()> {
        let mut model = SeasonalArima::new();
        model.fit(&[f64::NAN, 405.0, f64::NAN])?;
        let forecast = model.forecast(2)?;
        assert_eq!(forecast.values, vec![405.0, 405.0]);
        assert_eq!(forecast.intervals, Some(vec![(405.0, 405.0), (405.0, 405.0)]));
        Ok(())
    }

    #[test]
    fn test_no_observations() {
        let mut model = SeasonalArima::new();
        assert!(matches!(
            model.fit(&[f64::NAN, f64::NAN]),
            Err(ProcessingError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_forecast_before_fit_fails() {
        assert!(SeasonalArima::new().forecast(3).is_err());
    }
}
