use crate::error::Result;
use crate::models::MeasurementRecord;
use crate::readers::{GranuleArrays, GranuleReader};
use crate::utils::constants::RAW_FILE_EXTENSIONS;
use crate::utils::progress::ProgressReporter;
use crate::writers::CsvWriter;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestReport {
    pub files_found: usize,
    pub files_parsed: usize,
    /// (file name, error) for every granule that could not be read.
    pub failed_files: Vec<(String, String)>,
    pub rows_read: usize,
    pub rows_dropped_incomplete: usize,
    pub rows_written: usize,
}

impl IngestReport {
    pub fn summary(&self) -> String {
        format!(
            "Ingestion Summary:\n\
            - Files found: {}\n\
            - Files parsed: {}\n\
            - Files failed: {}\n\
            - Rows read: {}\n\
            - Rows dropped (incomplete): {}\n\
            - Rows written: {}",
            self.files_found,
            self.files_parsed,
            self.failed_files.len(),
            self.rows_read,
            self.rows_dropped_incomplete,
            self.rows_written
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    /// Output already existed and overwrite was off; nothing was read.
    Cached(PathBuf),
    Written { path: PathBuf, report: IngestReport },
    /// No granule produced any rows; nothing was written.
    Empty(IngestReport),
}

impl IngestOutcome {
    pub fn path(&self) -> Option<&Path> {
        match self {
            IngestOutcome::Cached(path) | IngestOutcome::Written { path, .. } => Some(path),
            IngestOutcome::Empty(_) => None,
        }
    }
}

/// Flattens a folder of raw granules into the combined measurement table.
pub struct Ingestor<R: GranuleReader> {
    reader: R,
    overwrite: bool,
    silent: bool,
    writer: CsvWriter,
}

impl<R: GranuleReader> Ingestor<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            overwrite: false,
            silent: true,
            writer: CsvWriter::new(),
        }
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.silent = !show_progress;
        self
    }

    pub fn ingest(&self, raw_dir: &Path, output: &Path) -> Result<IngestOutcome> {
        if output.exists() && !self.overwrite {
            tracing::info!("Combined data already exists at {}, skipping ingestion", output.display());
            return Ok(IngestOutcome::Cached(output.to_path_buf()));
        }

        let files = list_raw_files(raw_dir)?;
        let mut report = IngestReport {
            files_found: files.len(),
            ..Default::default()
        };

        if files.is_empty() {
            tracing::warn!("No raw granules found in {}", raw_dir.display());
            return Ok(IngestOutcome::Empty(report));
        }

        let progress = ProgressReporter::new(files.len() as u64, "Ingesting granules", self.silent);
        let mut records = Vec::new();

        for path in &files {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            progress.set_message(&file_name);

            match self
                .reader
                .read_granule(path)
                .and_then(|arrays| arrays.check_aligned(&file_name).map(|_| arrays))
            {
                Ok(arrays) => {
                    report.files_parsed += 1;
                    report.rows_read += arrays.len();
                    let (rows, dropped) = records_from_arrays(&arrays, &file_name);
                    report.rows_dropped_incomplete += dropped;
                    records.extend(rows);
                }
                Err(e) => {
                    tracing::warn!("Error processing {}: {}", file_name, e);
                    report.failed_files.push((file_name, e.to_string()));
                }
            }
            progress.increment(1);
        }
        progress.finish_with_message("Ingestion complete");

        if report.files_parsed == 0 {
            tracing::warn!("No raw granule could be parsed from {}", raw_dir.display());
            return Ok(IngestOutcome::Empty(report));
        }

        report.rows_written = records.len();
        self.writer.write_records(&records, output)?;
        tracing::info!(
            "Combined {} rows from {} files into {}",
            records.len(),
            report.files_parsed,
            output.display()
        );

        Ok(IngestOutcome::Written {
            path: output.to_path_buf(),
            report,
        })
    }
}

/// Raw granule files directly inside `dir`, sorted by name. A missing
/// directory has no files.
pub fn list_raw_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| {
                    RAW_FILE_EXTENSIONS
                        .iter()
                        .any(|allowed| ext.eq_ignore_ascii_case(allowed))
                })
                .unwrap_or(false)
        })
        .collect();

    files.sort();
    Ok(files)
}

/// Turns aligned granule arrays into records, returning how many rows lacked
/// a core field.
pub fn records_from_arrays(arrays: &GranuleArrays, file_name: &str) -> (Vec<MeasurementRecord>, usize) {
    let mut records = Vec::with_capacity(arrays.len());
    let mut dropped = 0usize;

    for i in 0..arrays.len() {
        let (xco2, latitude, longitude) = (arrays.xco2[i], arrays.latitude[i], arrays.longitude[i]);
        match arrays.time[i] {
            Some(time) if xco2.is_finite() && latitude.is_finite() && longitude.is_finite() => {
                records.push(MeasurementRecord::new(
                    time.date_naive(),
                    latitude,
                    longitude,
                    xco2,
                    file_name,
                ));
            }
            _ => dropped += 1,
        }
    }

    (records, dropped)
}
