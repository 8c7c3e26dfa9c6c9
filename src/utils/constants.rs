/// Dataset
pub const DEFAULT_SHORT_NAME: &str = "OCO2_L2_Lite_FP";
pub const RAW_FILE_EXTENSIONS: [&str; 2] = ["nc4", "h5"];

/// Representative day queried for each year
pub const ACQUISITION_MONTH: u32 = 7;
pub const ACQUISITION_DAY: u32 = 1;

/// Artifact file names
pub const COMBINED_FILE: &str = "combined_oco2_data.csv";
pub const CLEANED_FILE: &str = "cleaned_oco2_data.csv";
pub const GLOBAL_DAILY_FILE: &str = "daily_global_mean.csv";
pub const LATBAND_DAILY_FILE: &str = "daily_latband_mean.csv";
pub const COUNTRY_DAILY_FILE: &str = "country_daily_co2.csv";

/// Directory names
pub const DEFAULT_DOWNLOAD_DIR: &str = "./oco2_downloads";
pub const DEFAULT_INGESTED_DIR: &str = "./oco2_ingested";

/// XCO2 plausibility window (ppm)
pub const MIN_VALID_XCO2: f64 = 350.0;
pub const MAX_VALID_XCO2: f64 = 500.0;

/// Geographic bounds
pub const MIN_LAT: f64 = -90.0;
pub const MAX_LAT: f64 = 90.0;
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// Country polygon attribute holding the country name
pub const COUNTRY_NAME_PROPERTY: &str = "NAME";

/// Statistical forecast defaults
pub const SEASONAL_PERIOD: usize = 12;
pub const MIN_RELIABLE_PERIODS: usize = 24;
pub const DEFAULT_ARIMA_HORIZON: usize = 12;
pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;

/// Learned forecast defaults
pub const DEFAULT_LSTM_WINDOW: usize = 4;
pub const DEFAULT_LSTM_HORIZON: usize = 4;
pub const DEFAULT_LSTM_EPOCHS: usize = 50;
pub const DEFAULT_LSTM_HIDDEN: usize = 50;
pub const DEFAULT_LEARNING_RATE: f64 = 0.001;
pub const DEFAULT_FORECAST_CADENCE_DAYS: i64 = 180;

/// Processing defaults
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB
