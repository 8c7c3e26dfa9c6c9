pub mod aggregate;
pub mod forecast;
pub mod measurement;

pub use aggregate::{BandDailyMean, CountryDailyMean, DailyMean, LatitudeBand, MonthlyMean};
pub use forecast::{ForecastPoint, ForecastSeries};
pub use measurement::{CountryTaggedRecord, MeasurementRecord, PartialMeasurement};
