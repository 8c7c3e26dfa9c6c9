use crate::error::{ProcessingError, Result};
use crate::models::{MeasurementRecord, PartialMeasurement};
use crate::readers::TableReader;
use crate::writers::CsvWriter;
use std::path::Path;

/// Row counts removed by each cleaning check. A row is charged to the first
/// check it fails, in the order missing, xco2, latitude, longitude.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterReport {
    pub input_rows: usize,
    pub dropped_incomplete: usize,
    pub dropped_xco2: usize,
    pub dropped_latitude: usize,
    pub dropped_longitude: usize,
    pub output_rows: usize,
}

impl FilterReport {
    pub fn total_dropped(&self) -> usize {
        self.dropped_incomplete + self.dropped_xco2 + self.dropped_latitude + self.dropped_longitude
    }

    pub fn summary(&self) -> String {
        format!(
            "Cleaning Summary:\n\
            - Input rows: {}\n\
            - Dropped (missing values): {}\n\
            - Dropped (xco2 outside plausible range): {}\n\
            - Dropped (invalid latitude): {}\n\
            - Dropped (invalid longitude): {}\n\
            - Output rows: {}",
            self.input_rows,
            self.dropped_incomplete,
            self.dropped_xco2,
            self.dropped_latitude,
            self.dropped_longitude,
            self.output_rows
        )
    }
}

/// Applies the validity filters that turn the combined table into the
/// canonical cleaned table.
pub struct Cleaner {
    reader: TableReader,
    writer: CsvWriter,
}

impl Cleaner {
    pub fn new() -> Self {
        Self {
            reader: TableReader::new(),
            writer: CsvWriter::new(),
        }
    }

    pub fn clean(&self, rows: Vec<PartialMeasurement>) -> (Vec<MeasurementRecord>, FilterReport) {
        let mut report = FilterReport {
            input_rows: rows.len(),
            ..Default::default()
        };

        let mut cleaned = Vec::with_capacity(rows.len());
        for row in rows {
            let Some(record) = row.complete() else {
                report.dropped_incomplete += 1;
                continue;
            };

            if !record.is_plausible_xco2() {
                report.dropped_xco2 += 1;
            } else if !record.is_valid_latitude() {
                report.dropped_latitude += 1;
            } else if !record.is_valid_longitude() {
                report.dropped_longitude += 1;
            } else {
                cleaned.push(record);
            }
        }

        report.output_rows = cleaned.len();
        (cleaned, report)
    }

    /// Clean `input` into `output`. A missing input is an error, not an empty result.
    pub fn clean_file(
        &self,
        input: &Path,
        output: &Path,
    ) -> Result<(Vec<MeasurementRecord>, FilterReport)> {
        if !input.exists() {
            return Err(ProcessingError::InputNotFound(input.to_path_buf()));
        }

        let rows = self.reader.read_partial_measurements(input)?;
        let (cleaned, report) = self.clean(rows);

        tracing::info!(
            "Cleaned data: {} of {} rows kept ({} dropped)",
            report.output_rows,
            report.input_rows,
            report.total_dropped()
        );
        tracing::debug!("{}", report.summary());

        self.writer.write_records(&cleaned, output)?;
        Ok((cleaned, report))
    }
}

impl Default for Cleaner {
    fn default() -> Self {
        Self::new()
    }
}
