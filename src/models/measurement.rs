use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::constants::{
    MAX_LAT, MAX_LON, MAX_VALID_XCO2, MIN_LAT, MIN_LON, MIN_VALID_XCO2,
};

/// A single XCO2 sounding, one row of the combined and cleaned tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct MeasurementRecord {
    pub date: NaiveDate,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,

    #[validate(range(min = 350.0, max = 500.0))]
    pub xco2: f64,

    pub source_file: String,
}

impl MeasurementRecord {
    pub fn new(
        date: NaiveDate,
        latitude: f64,
        longitude: f64,
        xco2: f64,
        source_file: impl Into<String>,
    ) -> Self {
        Self {
            date,
            latitude,
            longitude,
            xco2,
            source_file: source_file.into(),
        }
    }

    pub fn is_plausible_xco2(&self) -> bool {
        (MIN_VALID_XCO2..=MAX_VALID_XCO2).contains(&self.xco2)
    }

    pub fn is_valid_latitude(&self) -> bool {
        (MIN_LAT..=MAX_LAT).contains(&self.latitude)
    }

    pub fn is_valid_longitude(&self) -> bool {
        (MIN_LON..=MAX_LON).contains(&self.longitude)
    }
}

/// Row shape used when reading a combined table that may contain gaps.
///
/// Empty CSV cells deserialize to `None`, NaN cells are normalised by
/// [`PartialMeasurement::complete`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartialMeasurement {
    pub date: Option<NaiveDate>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub xco2: Option<f64>,
    #[serde(default)]
    pub source_file: Option<String>,
}

impl PartialMeasurement {
    /// Returns the full record if every core field is present and finite.
    pub fn complete(self) -> Option<MeasurementRecord> {
        let finite = |v: Option<f64>| v.filter(|x| x.is_finite());

        Some(MeasurementRecord {
            date: self.date?,
            latitude: finite(self.latitude)?,
            longitude: finite(self.longitude)?,
            xco2: finite(self.xco2)?,
            source_file: self.source_file.unwrap_or_default(),
        })
    }
}

impl From<MeasurementRecord> for PartialMeasurement {
    fn from(record: MeasurementRecord) -> Self {
        Self {
            date: Some(record.date),
            latitude: Some(record.latitude),
            longitude: Some(record.longitude),
            xco2: Some(record.xco2),
            source_file: Some(record.source_file),
        }
    }
}

/// A measurement labelled with the country polygon containing it, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryTaggedRecord {
    pub record: MeasurementRecord,
    pub country: Option<String>,
}
