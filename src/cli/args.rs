use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "oco2-processor")]
#[command(about = "Resumable OCO-2 XCO2 processing and forecasting pipeline")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(short, long, global = true, help = "TOML configuration file")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ForecastModel {
    Arima,
    Lstm,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run every stage from download to forecasts, skipping finished ones
    Run {
        #[arg(long, help = "Country to forecast")]
        country: Option<String>,

        #[arg(long, help = "Recompute stages whose outputs already exist")]
        overwrite: bool,

        #[arg(long, help = "Use the raw files already in the download directory")]
        skip_download: bool,

        #[arg(long, help = "Do not write PNG charts")]
        no_plots: bool,
    },

    /// Combine raw granules into one table
    Ingest {
        #[arg(long)]
        overwrite: bool,
    },

    /// Drop incomplete and out-of-range soundings
    Clean {
        #[arg(long, help = "Also plot the spatial distribution")]
        plot: bool,
    },

    /// Compute global and latitude-band daily means
    Aggregate {
        #[arg(long, help = "Also plot the global daily series")]
        plot: bool,
    },

    /// Assign soundings to countries and compute country daily means
    Countries,

    /// Forecast one country from the country daily table
    Forecast {
        #[arg(short, long, value_enum, default_value = "arima")]
        model: ForecastModel,

        #[arg(long, help = "Country to forecast")]
        country: Option<String>,

        #[arg(long, help = "Do not write a PNG chart")]
        no_plot: bool,
    },

    /// Display information about a pipeline CSV file
    Info {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(short, long, default_value = "10")]
        sample: usize,
    },
}
