pub mod aggregator;
pub mod cleaner;
pub mod country_assigner;
pub mod ingestor;

pub use aggregator::{band_daily, global_daily, AggregationSummary, Aggregator, MeanAccumulator};
pub use cleaner::{Cleaner, FilterReport};
pub use country_assigner::{country_daily, AssignmentReport, CountryAssigner, CountryIndex, CountryLocator};
pub use ingestor::{list_raw_files, IngestOutcome, IngestReport, Ingestor};
