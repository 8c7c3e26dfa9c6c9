use crate::error::{ProcessingError, Result};
use crate::processors::MeanAccumulator;
use crate::utils::constants::DEFAULT_BUFFER_SIZE;
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct ValueStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// Overview of one pipeline CSV artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct TableStatistics {
    pub total_rows: usize,
    pub columns: Vec<String>,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub countries: BTreeSet<String>,
    pub lat_bands: BTreeSet<String>,
    pub xco2: Option<ValueStats>,
    pub sample: Vec<Vec<String>>,
}

impl TableStatistics {
    pub fn detailed_summary(&self) -> String {
        let mut summary = format!(
            "Table Summary:\n\
            - Rows: {}\n\
            - Columns: {}",
            self.total_rows,
            self.columns.join(", ")
        );

        if let Some((first, last)) = self.date_range {
            summary.push_str(&format!("\n- Date range: {} to {}", first, last));
        }
        if let Some(stats) = &self.xco2 {
            summary.push_str(&format!(
                "\n- XCO2: min {:.2}, mean {:.2}, max {:.2} ppm",
                stats.min, stats.mean, stats.max
            ));
        }
        if !self.countries.is_empty() {
            summary.push_str(&format!("\n- Countries: {}", self.countries.len()));
        }
        if !self.lat_bands.is_empty() {
            let bands: Vec<&str> = self.lat_bands.iter().map(String::as_str).collect();
            summary.push_str(&format!("\n- Latitude bands: {}", bands.join(", ")));
        }

        if !self.sample.is_empty() {
            summary.push_str(&format!("\n\nSample Rows (showing {}):", self.sample.len()));
            for (i, row) in self.sample.iter().enumerate() {
                summary.push_str(&format!("\n{}. {}", i + 1, row.join(", ")));
            }
        }

        summary
    }
}

/// Reads any pipeline table generically by its header names.
pub struct TableAnalyzer {
    sample_size: usize,
}

impl TableAnalyzer {
    pub fn new() -> Self {
        Self { sample_size: 10 }
    }

    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }

    pub fn analyze(&self, path: &Path) -> Result<TableStatistics> {
        if !path.exists() {
            return Err(ProcessingError::InputNotFound(path.to_path_buf()));
        }

        let file = File::open(path)?;
        let mut reader = csv::Reader::from_reader(BufReader::with_capacity(DEFAULT_BUFFER_SIZE, file));
        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let column = |name: &str| columns.iter().position(|c| c == name);
        let (date_col, xco2_col) = (column("date"), column("xco2"));
        let (country_col, band_col) = (column("country"), column("lat_band"));

        let mut total_rows = 0usize;
        let mut date_range: Option<(NaiveDate, NaiveDate)> = None;
        let mut countries = BTreeSet::new();
        let mut lat_bands = BTreeSet::new();
        let mut mean = MeanAccumulator::default();
        let (mut min, mut max) = (f64::INFINITY, f64::NEG_INFINITY);
        let mut sample = Vec::new();

        for row in reader.records() {
            let row = row?;
            total_rows += 1;

            if let Some(date) = date_col
                .and_then(|i| row.get(i))
                .and_then(|s| s.parse::<NaiveDate>().ok())
            {
                date_range = Some(match date_range {
                    Some((first, last)) => (first.min(date), last.max(date)),
                    None => (date, date),
                });
            }
            if let Some(value) = xco2_col
                .and_then(|i| row.get(i))
                .and_then(|s| s.parse::<f64>().ok())
                .filter(|v| v.is_finite())
            {
                mean.add(value);
                min = min.min(value);
                max = max.max(value);
            }
            if let Some(country) = country_col.and_then(|i| row.get(i)).filter(|s| !s.is_empty()) {
                countries.insert(country.to_string());
            }
            if let Some(band) = band_col.and_then(|i| row.get(i)).filter(|s| !s.is_empty()) {
                lat_bands.insert(band.to_string());
            }
            if sample.len() < self.sample_size {
                sample.push(row.iter().map(str::to_string).collect());
            }
        }

        let xco2 = mean.mean().map(|mean| ValueStats { min, max, mean });

        Ok(TableStatistics {
            total_rows,
            columns,
            date_range,
            countries,
            lat_bands,
            xco2,
            sample,
        })
    }
}

impl Default for TableAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
