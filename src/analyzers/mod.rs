pub mod table_analyzer;

pub use table_analyzer::{TableAnalyzer, TableStatistics, ValueStats};
