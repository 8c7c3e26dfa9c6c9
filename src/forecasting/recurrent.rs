use crate::error::{ProcessingError, Result};
use crate::forecasting::lstm::{LstmNetwork, TrainingConfig};
use crate::forecasting::scaler::MinMaxScaler;
use crate::forecasting::windows::{effective_window, prepare_windows};
use crate::forecasting::{Forecaster, ModelForecast};

struct TrainedState {
    network: LstmNetwork,
    scaler: MinMaxScaler,
    window: usize,
    /// Most recent `window` scaled observations, oldest first.
    tail: Vec<f64>,
    loss_history: Vec<f64>,
}

/// LSTM forecaster that scales the series, trains on sliding windows and
/// rolls predictions forward one step at a time.
pub struct RecurrentForecaster {
    config: TrainingConfig,
    n_steps: usize,
    state: Option<TrainedState>,
}

impl RecurrentForecaster {
    pub fn new(config: TrainingConfig, n_steps: usize) -> Self {
        Self {
            config,
            n_steps,
            state: None,
        }
    }

    /// Window length used in training, which may be shorter than requested.
    pub fn effective_window(&self) -> Option<usize> {
        self.state.as_ref().map(|s| s.window)
    }

    pub fn loss_history(&self) -> &[f64] {
        self.state
            .as_ref()
            .map(|s| s.loss_history.as_slice())
            .unwrap_or(&[])
    }
}

impl Forecaster for RecurrentForecaster {
    fn name(&self) -> &str {
        "LSTM"
    }

    fn fit(&mut self, series: &[f64]) -> Result<()> {
        let window = effective_window(self.n_steps, series.len())?;
        let scaler = MinMaxScaler::fit(series);
        let scaled = scaler.transform_all(series);
        let (inputs, targets) = prepare_windows(&scaled, window)?;

        let (network, loss_history) = LstmNetwork::train(&inputs, &targets, &self.config)?;

        if let Some(loss) = loss_history.last() {
            tracing::info!(
                "Trained LSTM on {} windows of length {}; final loss {:.6}",
                inputs.len(),
                window,
                loss
            );
        }

        self.state = Some(TrainedState {
            network,
            scaler,
            window,
            tail: scaled[scaled.len() - window..].to_vec(),
            loss_history,
        });
        Ok(())
    }

    fn forecast(&self, horizon: usize) -> Result<ModelForecast> {
        let state = self.state.as_ref().ok_or_else(|| {
            ProcessingError::InsufficientData("model must be fitted before forecasting".to_string())
        })?;

        let mut window = state.tail.clone();
        let mut values = Vec::with_capacity(horizon);
        for _ in 0..horizon {
            let next = state.network.predict(&window);
            values.push(state.scaler.inverse(next));
            window.remove(0);
            window.push(next);
        }

        Ok(ModelForecast {
            values,
            intervals: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_config() -> TrainingConfig {
        TrainingConfig::default().with_hidden_size(6).with_epochs(4)
    }

    #[test]
    fn test_three_points_shrink_window_to_two() -> Result<()> {
        let mut model = RecurrentForecaster::new(quick_config(), 4);
        model.fit(&[410.0, 411.0, 412.5])?;

        assert_eq!(model.effective_window(), Some(2));
        assert_eq!(model.loss_history().len(), 4);

        let forecast = model.forecast(4)?;
        assert_eq!(forecast.values.len(), 4);
        assert!(forecast.values.iter().all(|v| v.is_finite()));
        assert!(forecast.intervals.is_none());
        Ok(())
    }

    #[test]
    fn test_single_point_is_insufficient() {
        let mut model = RecurrentForecaster::new(quick_config(), 4);
        assert!(matches!(
            model.fit(&[410.0]),
            Err(ProcessingError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_constant_series_trains() -> Result<()> {
        let mut model = RecurrentForecaster::new(quick_config(), 2);
        model.fit(&[405.0; 6])?;
        let forecast = model.forecast(2)?;
        assert!(forecast.values.iter().all(|v| v.is_finite()));
        Ok(())
    }
}
