use crate::error::Result;
use crate::models::{BandDailyMean, DailyMean, LatitudeBand, MeasurementRecord};
use crate::readers::TableReader;
use crate::writers::CsvWriter;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::path::Path;

/// Running arithmetic mean.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanAccumulator {
    sum: f64,
    count: usize,
}

impl MeanAccumulator {
    pub fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Mean of `value` per key, ordered by key. Keys never seen produce no entry.
pub fn group_means<K, I>(items: I) -> BTreeMap<K, f64>
where
    K: Ord,
    I: IntoIterator<Item = (K, f64)>,
{
    let mut groups: BTreeMap<K, MeanAccumulator> = BTreeMap::new();
    for (key, value) in items {
        groups.entry(key).or_default().add(value);
    }
    groups
        .into_iter()
        .filter_map(|(key, acc)| acc.mean().map(|mean| (key, mean)))
        .collect()
}

pub fn global_daily(records: &[MeasurementRecord]) -> Vec<DailyMean> {
    group_means(records.iter().map(|r| (r.date, r.xco2)))
        .into_iter()
        .map(|(date, xco2)| DailyMean { date, xco2 })
        .collect()
}

/// Daily means per latitude band, bands ordered south to north.
pub fn band_daily(records: &[MeasurementRecord]) -> Vec<BandDailyMean> {
    group_means(records.iter().filter_map(|r| {
        LatitudeBand::from_latitude(r.latitude).map(|band| ((band, r.date), r.xco2))
    }))
    .into_iter()
    .map(|((lat_band, date), xco2)| BandDailyMean {
        lat_band,
        date,
        xco2,
    })
    .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregationSummary {
    pub global_days: usize,
    pub band_rows: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

impl AggregationSummary {
    pub fn summary(&self) -> String {
        let range = match (self.first_date, self.last_date) {
            (Some(first), Some(last)) => format!("{} to {}", first, last),
            _ => "n/a".to_string(),
        };
        format!(
            "Aggregation Summary:\n\
            - Days with data: {}\n\
            - Band/day rows: {}\n\
            - Date range: {}",
            self.global_days, self.band_rows, range
        )
    }
}

/// Writes the global and per-band daily mean tables from a cleaned table.
pub struct Aggregator {
    reader: TableReader,
    writer: CsvWriter,
}

impl Aggregator {
    pub fn new() -> Self {
        Self {
            reader: TableReader::new(),
            writer: CsvWriter::new(),
        }
    }

    pub fn aggregate_file(
        &self,
        cleaned: &Path,
        global_output: &Path,
        band_output: &Path,
    ) -> Result<(Vec<DailyMean>, AggregationSummary)> {
        let records = self.reader.read_measurements(cleaned)?;

        let global = global_daily(&records);
        let bands = band_daily(&records);

        self.writer.write_records(&global, global_output)?;
        self.writer.write_records(&bands, band_output)?;

        let summary = AggregationSummary {
            global_days: global.len(),
            band_rows: bands.len(),
            first_date: global.first().map(|d| d.date),
            last_date: global.last().map(|d| d.date),
        };
        tracing::info!(
            "Aggregated {} records into {} daily means and {} band rows",
            records.len(),
            summary.global_days,
            summary.band_rows
        );

        Ok((global, summary))
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}
