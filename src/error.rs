use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Date parsing error: {0}")]
    DateParse(#[from] chrono::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    #[cfg(feature = "netcdf")]
    #[error("NetCDF error: {0}")]
    NetCdf(#[from] netcdf::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration source error: {0}")]
    ConfigSource(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("No data found for country: {country}")]
    CountryNotFound { country: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Model fitting error: {0}")]
    Model(#[from] anofox_forecast::ForecastError),

    #[error("Training loss became NaN at epoch {epoch}; check input data")]
    TrainingDiverged { epoch: usize },

    #[error("Failed to read granule {file}: {message}")]
    GranuleRead { file: String, message: String },

    #[error("No valid data: {0}")]
    NoData(String),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Plot rendering error: {0}")]
    Plot(String),
}
