//! Retrieval of raw granules from a remote archive.

pub mod cmr;

use crate::error::{ProcessingError, Result};
use crate::utils::constants::{ACQUISITION_DAY, ACQUISITION_MONTH};
use crate::utils::progress::ProgressReporter;
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

pub use cmr::CmrCatalog;

/// Search for one dataset over one UTC day, globally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GranuleQuery {
    pub short_name: String,
    pub date: NaiveDate,
}

/// A remote file and where to fetch it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Granule {
    pub id: String,
    pub url: String,
}

impl Granule {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
        }
    }

    /// Local file name: the last path segment of the download link.
    pub fn file_name(&self) -> String {
        let path = self.url.split(['?', '#']).next().unwrap_or(&self.url);
        path.trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or(&self.id)
            .to_string()
    }
}

/// Search and download capability of a remote granule archive.
#[allow(async_fn_in_trait)]
pub trait GranuleCatalog {
    async fn search(&self, query: &GranuleQuery) -> Result<Vec<Granule>>;

    /// Fetch `granule` into `dest_dir`, returning the local path.
    async fn download(&self, granule: &Granule, dest_dir: &Path) -> Result<PathBuf>;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AcquisitionReport {
    pub days_queried: usize,
    pub days_without_data: Vec<NaiveDate>,
    pub days_skipped: Vec<NaiveDate>,
    pub files_downloaded: Vec<PathBuf>,
}

impl AcquisitionReport {
    pub fn summary(&self) -> String {
        format!(
            "Acquisition Summary:\n\
            - Days queried: {}\n\
            - Days without data: {}\n\
            - Days already present: {}\n\
            - Files downloaded: {}",
            self.days_queried,
            self.days_without_data.len(),
            self.days_skipped.len(),
            self.files_downloaded.len()
        )
    }
}

/// The day queried for `year`.
pub fn representative_day(year: i32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, ACQUISITION_MONTH, ACQUISITION_DAY).ok_or_else(|| {
        ProcessingError::Config(format!("no representative day for year {}", year))
    })
}

/// Download the representative day of each year into `output_dir`, skipping
/// granules already on disk. Catalog errors abort the run.
pub async fn acquire<C: GranuleCatalog>(
    catalog: &C,
    output_dir: &Path,
    years: &[i32],
    short_name: &str,
    show_progress: bool,
) -> Result<AcquisitionReport> {
    fs::create_dir_all(output_dir)?;
    let mut report = AcquisitionReport::default();

    for &year in years {
        let date = representative_day(year)?;
        report.days_queried += 1;

        let query = GranuleQuery {
            short_name: short_name.to_string(),
            date,
        };
        let granules = catalog.search(&query).await?;
        if granules.is_empty() {
            tracing::warn!("No {} data found for {}", short_name, date);
            report.days_without_data.push(date);
            continue;
        }

        let missing: Vec<&Granule> = granules
            .iter()
            .filter(|g| !output_dir.join(g.file_name()).exists())
            .collect();
        if missing.is_empty() {
            tracing::info!("All {} files for {} already present, skipping", granules.len(), date);
            report.days_skipped.push(date);
            continue;
        }

        let spinner = ProgressReporter::new_spinner(&format!("Downloading {}", date), !show_progress);
        for granule in missing {
            spinner.set_message(&format!("Downloading {}", granule.file_name()));
            let path = catalog.download(granule, output_dir).await?;
            tracing::info!("Downloaded {}", path.display());
            report.files_downloaded.push(path);
        }
        spinner.finish_with_message(&format!("Downloaded data for {}", date));
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[derive(Default)]
    struct FakeCatalog {
        by_date: HashMap<NaiveDate, Vec<Granule>>,
        downloads: RefCell<Vec<String>>,
    }

    impl GranuleCatalog for FakeCatalog {
        async fn search(&self, query: &GranuleQuery) -> Result<Vec<Granule>> {
            Ok(self.by_date.get(&query.date).cloned().unwrap_or_default())
        }

        async fn download(&self, granule: &Granule, dest_dir: &Path) -> Result<PathBuf> {
            self.downloads.borrow_mut().push(granule.file_name());
            let path = dest_dir.join(granule.file_name());
            fs::write(&path, b"granule")?;
            Ok(path)
        }
    }

    fn july_first(year: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, 7, 1).unwrap()
    }

    #[test]
    fn test_file_name_is_last_path_segment() {
        let granule = Granule::new("G1", "https://data.example/oco2/2020/oco2_LtCO2_200701.nc4?token=x");
        assert_eq!(granule.file_name(), "oco2_LtCO2_200701.nc4");
    }

    #[tokio::test]
    async fn test_acquire_downloads_only_missing_files() -> Result<()> {
        let temp_dir = TempDir::new()?;
        fs::write(temp_dir.path().join("a.nc4"), b"old")?;

        let mut catalog = FakeCatalog::default();
        catalog.by_date.insert(
            july_first(2019),
            vec![Granule::new("A", "https://x/a.nc4"), Granule::new("B", "https://x/b.nc4")],
        );
        catalog
            .by_date
            .insert(july_first(2020), vec![Granule::new("A", "https://x/a.nc4")]);

        let report = acquire(&catalog, temp_dir.path(), &[2019, 2020, 2021], "OCO2_L2_Lite_FP", false).await?;

        assert_eq!(report.days_queried, 3);
        assert_eq!(report.days_without_data, vec![july_first(2021)]);
        assert_eq!(report.days_skipped, vec![july_first(2020)]);
        assert_eq!(*catalog.downloads.borrow(), vec!["b.nc4".to_string()]);
        assert_eq!(fs::read(temp_dir.path().join("a.nc4"))?, b"old");
        Ok(())
    }
}
