use crate::error::Result;
use crate::forecasting::TrainingConfig;
use crate::utils::constants::{
    DEFAULT_ARIMA_HORIZON, DEFAULT_CONFIDENCE_LEVEL, DEFAULT_DOWNLOAD_DIR,
    DEFAULT_FORECAST_CADENCE_DAYS, DEFAULT_INGESTED_DIR, DEFAULT_LEARNING_RATE,
    DEFAULT_LSTM_EPOCHS, DEFAULT_LSTM_HIDDEN, DEFAULT_LSTM_HORIZON,
    DEFAULT_LSTM_WINDOW, DEFAULT_SHORT_NAME,
};
use crate::utils::filename::ArtifactLayout;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use validator::Validate;

/// Prefix of environment overrides, e.g. `OCO2__COUNTRY=Chad` or
/// `OCO2__LSTM__EPOCHS=20`.
pub const ENV_PREFIX: &str = "OCO2";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PipelineConfig {
    pub download_dir: PathBuf,
    pub ingested_dir: PathBuf,
    pub polygon_path: PathBuf,

    #[validate(length(min = 1))]
    pub years: Vec<i32>,

    #[validate(length(min = 1))]
    pub short_name: String,

    #[validate(length(min = 1))]
    pub country: String,

    pub overwrite: bool,
    pub skip_download: bool,
    pub show_progress: bool,
    /// Write PNG charts. Disable on hosts without system fonts.
    pub render_plots: bool,

    #[validate(nested)]
    pub arima: ArimaConfig,

    #[validate(nested)]
    pub lstm: LstmConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from(DEFAULT_DOWNLOAD_DIR),
            ingested_dir: PathBuf::from(DEFAULT_INGESTED_DIR),
            polygon_path: PathBuf::from("./data/naturalearth/countries.geojson"),
            years: (2018..=2024).collect(),
            short_name: DEFAULT_SHORT_NAME.to_string(),
            country: "India".to_string(),
            overwrite: false,
            skip_download: false,
            show_progress: true,
            render_plots: true,
            arima: ArimaConfig::default(),
            lstm: LstmConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ArimaConfig {
    #[validate(range(min = 1))]
    pub horizon: usize,

    #[validate(range(exclusive_min = 0.0, exclusive_max = 1.0))]
    pub confidence: f64,

    pub plot: bool,
}

impl Default for ArimaConfig {
    fn default() -> Self {
        Self {
            horizon: DEFAULT_ARIMA_HORIZON,
            confidence: DEFAULT_CONFIDENCE_LEVEL,
            plot: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LstmConfig {
    #[validate(range(min = 1))]
    pub n_steps: usize,

    #[validate(range(min = 1))]
    pub horizon: usize,

    #[validate(range(min = 1))]
    pub epochs: usize,

    #[validate(range(min = 1))]
    pub hidden_size: usize,

    #[validate(range(exclusive_min = 0.0))]
    pub learning_rate: f64,

    #[validate(range(min = 1))]
    pub cadence_days: i64,
}

impl Default for LstmConfig {
    fn default() -> Self {
        Self {
            n_steps: DEFAULT_LSTM_WINDOW,
            horizon: DEFAULT_LSTM_HORIZON,
            epochs: DEFAULT_LSTM_EPOCHS,
            hidden_size: DEFAULT_LSTM_HIDDEN,
            learning_rate: DEFAULT_LEARNING_RATE,
            cadence_days: DEFAULT_FORECAST_CADENCE_DAYS,
        }
    }
}

impl LstmConfig {
    pub fn training_config(&self, show_progress: bool) -> TrainingConfig {
        TrainingConfig::default()
            .with_hidden_size(self.hidden_size)
            .with_epochs(self.epochs)
            .with_learning_rate(self.learning_rate)
            .with_progress(show_progress)
    }
}

impl PipelineConfig {
    /// Defaults, overlaid by the optional TOML file, overlaid by `OCO2__*`
    /// environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("years"),
        );

        let config: PipelineConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn layout(&self) -> ArtifactLayout {
        ArtifactLayout::new(&self.ingested_dir)
    }
}
