use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Thirty-degree latitude bands, ordered south to north.
///
/// Bands are lower-closed `[low, high)`; the northernmost band also owns 90°.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LatitudeBand {
    #[serde(rename = "-90 to -60")]
    South90To60,
    #[serde(rename = "-60 to -30")]
    South60To30,
    #[serde(rename = "-30 to 0")]
    South30ToEquator,
    #[serde(rename = "0 to 30")]
    EquatorToNorth30,
    #[serde(rename = "30 to 60")]
    North30To60,
    #[serde(rename = "60 to 90")]
    North60To90,
}

impl LatitudeBand {
    pub const ALL: [LatitudeBand; 6] = [
        LatitudeBand::South90To60,
        LatitudeBand::South60To30,
        LatitudeBand::South30ToEquator,
        LatitudeBand::EquatorToNorth30,
        LatitudeBand::North30To60,
        LatitudeBand::North60To90,
    ];

    /// Band edges shared by all bands.
    pub const EDGES: [f64; 7] = [-90.0, -60.0, -30.0, 0.0, 30.0, 60.0, 90.0];

    /// Returns the band owning `latitude`, or `None` outside [-90, 90] or for NaN.
    pub fn from_latitude(latitude: f64) -> Option<Self> {
        if !(Self::EDGES[0]..=Self::EDGES[6]).contains(&latitude) {
            return None;
        }

        Self::ALL
            .iter()
            .copied()
            .find(|band| {
                let (low, high) = band.bounds();
                latitude >= low && (latitude < high || (high == Self::EDGES[6] && latitude == high))
            })
    }

    pub fn bounds(&self) -> (f64, f64) {
        let index = *self as usize;
        (Self::EDGES[index], Self::EDGES[index + 1])
    }

    pub fn label(&self) -> &'static str {
        match self {
            LatitudeBand::South90To60 => "-90 to -60",
            LatitudeBand::South60To30 => "-60 to -30",
            LatitudeBand::South30ToEquator => "-30 to 0",
            LatitudeBand::EquatorToNorth30 => "0 to 30",
            LatitudeBand::North30To60 => "30 to 60",
            LatitudeBand::North60To90 => "60 to 90",
        }
    }
}

impl fmt::Display for LatitudeBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Global daily mean XCO2.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyMean {
    pub date: NaiveDate,
    pub xco2: f64,
}

/// Daily mean XCO2 within one latitude band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandDailyMean {
    pub lat_band: LatitudeBand,
    pub date: NaiveDate,
    pub xco2: f64,
}

/// Daily mean XCO2 over the soundings that fell inside one country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryDailyMean {
    pub country: String,
    pub date: NaiveDate,
    pub xco2: f64,
}

/// Monthly mean labelled by the last day of the month. `None` marks a month
/// with no observations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyMean {
    pub month_end: NaiveDate,
    pub xco2: Option<f64>,
}
