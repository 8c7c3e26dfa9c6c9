use crate::error::{ProcessingError, Result};
use crate::models::{MeasurementRecord, PartialMeasurement};
use crate::utils::constants::DEFAULT_BUFFER_SIZE;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Reads the CSV artifacts exchanged between pipeline stages.
pub struct TableReader {
    fail_fast: bool,
}

impl TableReader {
    pub fn new() -> Self {
        Self { fail_fast: true }
    }

    /// When disabled, rows that fail to deserialize are skipped instead of
    /// aborting the read.
    pub fn with_fail_fast(fail_fast: bool) -> Self {
        Self { fail_fast }
    }

    /// Read every row of a CSV table into `T`.
    pub fn read<T: DeserializeOwned>(&self, path: &Path) -> Result<Vec<T>> {
        if !path.exists() {
            return Err(ProcessingError::InputNotFound(path.to_path_buf()));
        }

        let file = File::open(path)?;
        let mut reader = csv::Reader::from_reader(BufReader::with_capacity(DEFAULT_BUFFER_SIZE, file));
        let mut rows = Vec::new();
        let mut skipped = 0usize;

        for row in reader.deserialize() {
            match row {
                Ok(row) => rows.push(row),
                Err(e) if !self.fail_fast => {
                    skipped += 1;
                    tracing::debug!("Skipping malformed row in {}: {}", path.display(), e);
                }
                Err(e) => return Err(e.into()),
            }
        }

        if skipped > 0 {
            tracing::warn!("Skipped {} malformed rows in {}", skipped, path.display());
        }

        Ok(rows)
    }

    /// Read a combined measurement table, keeping rows with missing values.
    pub fn read_partial_measurements(&self, path: &Path) -> Result<Vec<PartialMeasurement>> {
        self.read(path)
    }

    /// Read a cleaned measurement table.
    pub fn read_measurements(&self, path: &Path) -> Result<Vec<MeasurementRecord>> {
        self.read(path)
    }
}

impl Default for TableReader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_partial_measurements() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        writeln!(temp_file, "date,latitude,longitude,xco2,source_file")?;
        writeln!(temp_file, "2020-01-01,10.5,20.25,405.1,a.nc4")?;
        writeln!(temp_file, "2020-01-01,10.5,20.25,,a.nc4")?;
        writeln!(temp_file, "2020-01-02,NaN,20.25,401.0,b.nc4")?;

        let rows = TableReader::new().read_partial_measurements(temp_file.path())?;

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].xco2, Some(405.1));
        assert_eq!(rows[1].xco2, None);
        assert!(rows[2].latitude.unwrap().is_nan());
        assert_eq!(rows.into_iter().filter_map(|r| r.complete()).count(), 1);

        Ok(())
    }

    #[test]
    fn test_missing_table_is_input_not_found() {
        let result = TableReader::new().read_measurements(Path::new("does/not/exist.csv"));
        assert!(matches!(result, Err(ProcessingError::InputNotFound(_))));
    }

    #[test]
    fn test_lenient_read_skips_malformed_rows() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        writeln!(temp_file, "date,latitude,longitude,xco2,source_file")?;
        writeln!(temp_file, "2020-01-01,10.5,20.25,405.1,a.nc4")?;
        writeln!(temp_file, "not-a-date,10.5,20.25,405.1,a.nc4")?;

        assert!(TableReader::new().read_measurements(temp_file.path()).is_err());

        let rows = TableReader::with_fail_fast(false).read_measurements(temp_file.path())?;
        assert_eq!(rows.len(), 1);

        Ok(())
    }
}
