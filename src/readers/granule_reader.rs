use crate::error::{ProcessingError, Result};
use chrono::{DateTime, Utc};
use std::path::Path;

/// The four aligned arrays extracted from one raw OCO-2 granule.
///
/// Missing values are NaN (numeric arrays) or `None` (time).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GranuleArrays {
    pub xco2: Vec<f64>,
    pub latitude: Vec<f64>,
    pub longitude: Vec<f64>,
    pub time: Vec<Option<DateTime<Utc>>>,
}

impl GranuleArrays {
    pub fn len(&self) -> usize {
        self.xco2.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xco2.is_empty()
    }

    /// All four arrays must have the same length.
    pub fn check_aligned(&self, file: &str) -> Result<()> {
        let n = self.xco2.len();
        if self.latitude.len() != n || self.longitude.len() != n || self.time.len() != n {
            return Err(ProcessingError::GranuleRead {
                file: file.to_string(),
                message: format!(
                    "misaligned arrays: xco2={}, latitude={}, longitude={}, time={}",
                    n,
                    self.latitude.len(),
                    self.longitude.len(),
                    self.time.len()
                ),
            });
        }
        Ok(())
    }
}

/// Extracts concentration, latitude, longitude and time from a raw file.
pub trait GranuleReader {
    fn read_granule(&self, path: &Path) -> Result<GranuleArrays>;
}

impl<R: GranuleReader + ?Sized> GranuleReader for &R {
    fn read_granule(&self, path: &Path) -> Result<GranuleArrays> {
        (**self).read_granule(path)
    }
}

/// Placeholder used when the crate is built without a scientific file backend.
pub struct UnsupportedGranuleReader;

impl GranuleReader for UnsupportedGranuleReader {
    fn read_granule(&self, path: &Path) -> Result<GranuleArrays> {
        Err(ProcessingError::GranuleRead {
            file: path.display().to_string(),
            message: "built without the `netcdf` feature".to_string(),
        })
    }
}
