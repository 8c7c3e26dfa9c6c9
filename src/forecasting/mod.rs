//! Country-level XCO2 forecasting.
//!
//! Both models implement [`Forecaster`] over a plain series of values, so
//! callers can swap or compare them without knowing how either is fitted.

pub mod learned;
pub mod lstm;
pub mod recurrent;
pub mod sarima;
pub mod scaler;
pub mod series;
pub mod statistical;
pub mod windows;

use crate::error::Result;

pub use learned::{LearnedForecast, LearnedForecastStage};
pub use lstm::{LstmNetwork, TrainingConfig};
pub use recurrent::RecurrentForecaster;
pub use sarima::{SarimaSpec, SeasonalArima};
pub use scaler::MinMaxScaler;
pub use series::{country_series, monthly_means};
pub use statistical::StatisticalForecastStage;
pub use windows::{effective_window, prepare_windows};

/// Point forecasts with optional two-sided intervals of the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelForecast {
    pub values: Vec<f64>,
    pub intervals: Option<Vec<(f64, f64)>>,
}

/// A model that can be fitted to a series and projected forward.
pub trait Forecaster {
    fn name(&self) -> &str;

    fn fit(&mut self, series: &[f64]) -> Result<()>;

    fn forecast(&self, horizon: usize) -> Result<ModelForecast>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trending(n: usize) -> Vec<f64> {
        (0..n)
            .map(|t| 405.0 + 0.15 * t as f64 + 2.0 * (t as f64 * 0.52).sin() + 0.3 * (t as f64 * 2.1).cos())
            .collect()
    }

    #[test]
    fn test_models_are_interchangeable() -> Result<()> {
        let series = trending(30);
        let mut models: Vec<Box<dyn Forecaster>> = vec![
            Box::new(SeasonalArima::new()),
            Box::new(RecurrentForecaster::new(
                TrainingConfig::default().with_epochs(5).with_hidden_size(8),
                4,
            )),
        ];

        for model in models.iter_mut() {
            model.fit(&series)?;
            let forecast = model.forecast(4)?;
            assert_eq!(forecast.values.len(), 4, "{}", model.name());
            assert!(forecast.values.iter().all(|v| v.is_finite()), "{}", model.name());
        }

        assert!(models[0].forecast(4)?.intervals.is_some());
        assert!(models[1].forecast(4)?.intervals.is_none());
        Ok(())
    }
}
