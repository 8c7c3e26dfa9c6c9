pub mod csv_writer;
pub mod plot_writer;

pub use csv_writer::{CsvFileInfo, CsvWriter};
pub use plot_writer::{PlotPoint, PlotWriter};
