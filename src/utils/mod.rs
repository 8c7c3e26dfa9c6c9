pub mod constants;
pub mod dates;
pub mod filename;
pub mod progress;

pub use constants::*;
pub use dates::{add_months_end, month_end, months_between, CfTimeUnits};
pub use filename::{country_file_stem, lstm_plot_filename, ArtifactLayout};
pub use progress::ProgressReporter;
