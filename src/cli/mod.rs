pub mod args;
pub mod commands;

pub use args::{Cli, Commands, ForecastModel};
pub use commands::{init_logging, run};
