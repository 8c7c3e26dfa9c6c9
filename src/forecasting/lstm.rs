//! Single-layer LSTM regressor over univariate windows.
//!
//! The network and its Adam/MSE training loop come from `rust-lstm`. Each
//! window is fed as a sequence of one-feature steps whose target at every
//! step is the next value, so the last output is the one-step forecast.

use crate::error::{ProcessingError, Result};
use crate::utils::constants::{DEFAULT_LEARNING_RATE, DEFAULT_LSTM_EPOCHS, DEFAULT_LSTM_HIDDEN};
use crate::utils::progress::ProgressReporter;
use ndarray::{arr2, Array2};
use rust_lstm::loss::MSELoss;
use rust_lstm::models::lstm_network::LSTMNetwork;
use rust_lstm::optimizers::Adam;
use rust_lstm::training::LSTMTrainer;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    pub hidden_size: usize,
    pub epochs: usize,
    pub learning_rate: f64,
    pub show_progress: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            hidden_size: DEFAULT_LSTM_HIDDEN,
            epochs: DEFAULT_LSTM_EPOCHS,
            learning_rate: DEFAULT_LEARNING_RATE,
            show_progress: false,
        }
    }
}

impl TrainingConfig {
    pub fn with_hidden_size(mut self, hidden_size: usize) -> Self {
        self.hidden_size = hidden_size.max(1);
        self
    }

    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }
}

type Sequence = (Vec<Array2<f64>>, Vec<Array2<f64>>);

fn step(value: f64) -> Array2<f64> {
    arr2(&[[value]])
}

/// Inputs are the window; targets are the window shifted by one with `target`
/// appended.
fn to_sequence(window: &[f64], target: f64) -> Sequence {
    let inputs = window.iter().copied().map(step).collect();
    let targets = window
        .iter()
        .skip(1)
        .copied()
        .chain(std::iter::once(target))
        .map(step)
        .collect();
    (inputs, targets)
}

/// Trained LSTM with one input feature and `hidden_size` units.
pub struct LstmNetwork {
    trainer: Mutex<LSTMTrainer<MSELoss, Adam>>,
}

impl LstmNetwork {
    /// Train on (window, target) pairs. Returns the network and the mean
    /// training loss of every epoch.
    ///
    /// A non-finite epoch loss fails with [`ProcessingError::TrainingDiverged`].
    pub fn train(
        inputs: &[Vec<f64>],
        targets: &[f64],
        config: &TrainingConfig,
    ) -> Result<(Self, Vec<f64>)> {
        if inputs.is_empty() || inputs.len() != targets.len() {
            return Err(ProcessingError::InsufficientData(format!(
                "{} training windows for {} targets",
                inputs.len(),
                targets.len()
            )));
        }

        let sequences: Vec<Sequence> = inputs
            .iter()
            .zip(targets)
            .map(|(window, &target)| to_sequence(window, target))
            .collect();

        let network = LSTMNetwork::new(1, config.hidden_size.max(1), 1);
        let mut trainer = LSTMTrainer::new(network, MSELoss, Adam::new(config.learning_rate));

        let mut trainer_config = rust_lstm::training::TrainingConfig::default();
        trainer_config.epochs = config.epochs;
        trainer_config.print_every = config.epochs + 1;
        trainer = trainer.with_config(trainer_config);

        let progress = ProgressReporter::new_spinner("Training LSTM", !config.show_progress);
        trainer.train(&sequences, None);

        let history: Vec<f64> = trainer
            .get_metrics_history()
            .iter()
            .map(|metrics| metrics.train_loss)
            .collect();

        if let Some(idx) = history.iter().position(|loss| !loss.is_finite()) {
            progress.finish_with_message("Training diverged");
            return Err(ProcessingError::TrainingDiverged { epoch: idx + 1 });
        }

        for (epoch, loss) in history.iter().enumerate() {
            tracing::debug!("Epoch {}/{} - loss: {:.6}", epoch + 1, config.epochs, loss);
        }
        progress.finish_with_message("Training complete");

        Ok((
            Self {
                trainer: Mutex::new(trainer),
            },
            history,
        ))
    }

    /// One-step prediction from the last output of the window.
    pub fn predict(&self, window: &[f64]) -> f64 {
        let inputs: Vec<Array2<f64>> = window.iter().copied().map(step).collect();
        self.trainer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .predict(&inputs)
            .last()
            .map(|output| output[[0, 0]])
            .unwrap_or(f64::NAN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine_windows(window: usize, count: usize) -> (Vec<Vec<f64>>, Vec<f64>) {
        let series: Vec<f64> = (0..count + window)
            .map(|t| 0.5 + 0.4 * (t as f64 * 0.4).sin())
            .collect();
        let inputs = series.windows(window + 1).map(|w| w[..window].to_vec()).collect();
        let targets = series[window..].to_vec();
        (inputs, targets)
    }

    #[test]
    fn test_sequence_targets_are_shifted_window() {
        let (inputs, targets) = to_sequence(&[0.1, 0.2, 0.3], 0.4);
        let flat = |steps: &[Array2<f64>]| steps.iter().map(|s| s[[0, 0]]).collect::<Vec<_>>();

        assert_eq!(flat(&inputs), vec![0.1, 0.2, 0.3]);
        assert_eq!(flat(&targets), vec![0.2, 0.3, 0.4]);
        assert!(inputs.iter().all(|s| s.dim() == (1, 1)));
    }

    #[test]
    fn test_training_reduces_loss() -> Result<()> {
        let (inputs, targets) = sine_windows(4, 40);
        let config = TrainingConfig::default()
            .with_hidden_size(8)
            .with_epochs(60)
            .with_learning_rate(0.01);

        let (network, history) = LstmNetwork::train(&inputs, &targets, &config)?;
        assert_eq!(history.len(), 60);
        assert!(history.last().unwrap() < history.first().unwrap());
        assert!(network.predict(&[0.5, 0.6, 0.7, 0.8]).is_finite());
        Ok(())
    }

    #[test]
    fn test_mismatched_targets_are_rejected() {
        let config = TrainingConfig::default().with_epochs(1);
        let result = LstmNetwork::train(&[vec![0.1, 0.2]], &[], &config);
        assert!(matches!(result, Err(ProcessingError::InsufficientData(_))));
    }

    #[test]
    fn test_nan_loss_is_fatal() {
        let inputs = vec![vec![0.1, f64::NAN], vec![0.2, 0.3]];
        let targets = vec![0.3, 0.4];
        let config = TrainingConfig::default().with_hidden_size(4).with_epochs(5);

        let result = LstmNetwork::train(&inputs, &targets, &config);
        assert!(matches!(result, Err(ProcessingError::TrainingDiverged { epoch: 1 })));
    }
}
