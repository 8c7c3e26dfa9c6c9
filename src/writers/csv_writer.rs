use crate::error::{ProcessingError, Result};
use crate::utils::constants::DEFAULT_BUFFER_SIZE;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter};
use std::path::Path;
use tempfile::NamedTempFile;

/// Writes stage artifacts as CSV.
///
/// Output goes to a temporary file beside the target and is renamed into
/// place once complete, so an artifact that exists on disk is always whole.
pub struct CsvWriter;

impl CsvWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write records with a header row derived from `T`'s field names.
    pub fn write_records<T: Serialize>(&self, records: &[T], path: &Path) -> Result<()> {
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        {
            let mut writer = csv::Writer::from_writer(BufWriter::with_capacity(
                DEFAULT_BUFFER_SIZE,
                temp.as_file(),
            ));
            for record in records {
                writer.serialize(record)?;
            }
            writer.flush()?;
        }

        temp.persist(path)
            .map_err(|e| ProcessingError::Io(e.error))?;

        tracing::debug!("Wrote {} rows to {}", records.len(), path.display());
        Ok(())
    }

    /// Get file statistics
    pub fn get_file_info(&self, path: &Path) -> Result<CsvFileInfo> {
        if !path.exists() {
            return Err(ProcessingError::InputNotFound(path.to_path_buf()));
        }

        let file = File::open(path)?;
        let reader = BufReader::with_capacity(DEFAULT_BUFFER_SIZE, file);
        let mut lines = reader.lines();

        let columns = match lines.next() {
            Some(header) => header?.split(',').map(|c| c.trim().to_string()).collect(),
            None => Vec::new(),
        };
        let mut total_rows = 0usize;
        for line in lines {
            if !line?.trim().is_empty() {
                total_rows += 1;
            }
        }

        Ok(CsvFileInfo {
            total_rows,
            columns,
            file_size: fs::metadata(path)?.len(),
        })
    }
}

impl Default for CsvWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct CsvFileInfo {
    pub total_rows: usize,
    pub columns: Vec<String>,
    pub file_size: u64,
}

impl CsvFileInfo {
    pub fn summary(&self) -> String {
        format!(
            "CSV File Summary:\n\
            - Total rows: {}\n\
            - Columns: {}\n\
            - File size: {:.2} MB",
            self.total_rows,
            self.columns.join(", "),
            self.file_size as f64 / 1_048_576.0
        )
    }
}
