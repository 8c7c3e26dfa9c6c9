use crate::error::Result;
use crate::models::{CountryDailyMean, CountryTaggedRecord, MeasurementRecord};
use crate::processors::aggregator::group_means;
use crate::readers::{CountryPolygon, PolygonReader, TableReader};
use crate::writers::CsvWriter;
use geo::{BoundingRect, Contains, Point, Rect};
use std::collections::BTreeMap;
use std::path::Path;

/// Point-in-polygon lookup from (longitude, latitude) to a country name.
pub trait CountryLocator {
    fn locate(&self, longitude: f64, latitude: f64) -> Option<&str>;
}

/// Country polygons in file order with precomputed bounding boxes.
pub struct CountryIndex {
    entries: Vec<(CountryPolygon, Option<Rect<f64>>)>,
}

impl CountryIndex {
    pub fn new(polygons: Vec<CountryPolygon>) -> Self {
        let entries = polygons
            .into_iter()
            .map(|polygon| {
                let bbox = polygon.geometry.bounding_rect();
                (polygon, bbox)
            })
            .collect();
        Self { entries }
    }

    pub fn from_geojson_file(path: &Path) -> Result<Self> {
        Ok(Self::new(PolygonReader::new().read_polygons(path)?))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn in_rect(rect: &Rect<f64>, x: f64, y: f64) -> bool {
    let (min, max) = (rect.min(), rect.max());
    x >= min.x && x <= max.x && y >= min.y && y <= max.y
}

impl CountryLocator for CountryIndex {
    /// First polygon in file order that strictly contains the point.
    /// Points on a boundary line belong to no country.
    fn locate(&self, longitude: f64, latitude: f64) -> Option<&str> {
        let point = Point::new(longitude, latitude);
        self.entries
            .iter()
            .filter(|(_, bbox)| bbox.map_or(false, |b| in_rect(&b, longitude, latitude)))
            .find(|(polygon, _)| polygon.geometry.contains(&point))
            .map(|(polygon, _)| polygon.name.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignmentReport {
    pub total_points: usize,
    pub assigned_points: usize,
    pub unassigned_points: usize,
    pub points_per_country: BTreeMap<String, usize>,
}

impl AssignmentReport {
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "Country Assignment Summary:\n\
            - Total points: {}\n\
            - Assigned: {}\n\
            - Outside all countries: {}\n\
            - Countries: {}",
            self.total_points,
            self.assigned_points,
            self.unassigned_points,
            self.points_per_country.len()
        );
        for (country, count) in &self.points_per_country {
            summary.push_str(&format!("\n  {}: {}", country, count));
        }
        summary
    }
}

/// Spatially joins cleaned soundings to countries and averages them per day.
pub struct CountryAssigner<L: CountryLocator> {
    locator: L,
    reader: TableReader,
    writer: CsvWriter,
}

impl<L: CountryLocator> CountryAssigner<L> {
    pub fn new(locator: L) -> Self {
        Self {
            locator,
            reader: TableReader::new(),
            writer: CsvWriter::new(),
        }
    }

    pub fn assign(&self, records: Vec<MeasurementRecord>) -> (Vec<CountryTaggedRecord>, AssignmentReport) {
        let mut report = AssignmentReport {
            total_points: records.len(),
            ..Default::default()
        };

        let tagged = records
            .into_iter()
            .map(|record| {
                let country = self
                    .locator
                    .locate(record.longitude, record.latitude)
                    .map(str::to_string);
                match &country {
                    Some(name) => {
                        report.assigned_points += 1;
                        *report.points_per_country.entry(name.clone()).or_default() += 1;
                    }
                    None => report.unassigned_points += 1,
                }
                CountryTaggedRecord { record, country }
            })
            .collect();

        (tagged, report)
    }

    pub fn assign_file(&self, cleaned: &Path, output: &Path) -> Result<(Vec<CountryDailyMean>, AssignmentReport)> {
        let records = self.reader.read_measurements(cleaned)?;
        let (tagged, report) = self.assign(records);
        let daily = country_daily(&tagged);

        self.writer.write_records(&daily, output)?;
        tracing::info!(
            "Assigned {} of {} points to {} countries; {} country/day rows written",
            report.assigned_points,
            report.total_points,
            report.points_per_country.len(),
            daily.len()
        );

        Ok((daily, report))
    }
}

/// Daily means per country, ordered by (country, date). Untagged records are excluded.
pub fn country_daily(tagged: &[CountryTaggedRecord]) -> Vec<CountryDailyMean> {
    group_means(tagged.iter().filter_map(|t| {
        t.country
            .as_ref()
            .map(|country| ((country.clone(), t.record.date), t.record.xco2))
    }))
    .into_iter()
    .map(|((country, date), xco2)| CountryDailyMean { country, date, xco2 })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use geo::{polygon, MultiPolygon};

    fn square(name: &str, x0: f64, y0: f64, size: f64) -> CountryPolygon {
        let poly = polygon![
            (x: x0, y: y0),
            (x: x0 + size, y: y0),
            (x: x0 + size, y: y0 + size),
            (x: x0, y: y0 + size),
            (x: x0, y: y0),
        ];
        CountryPolygon {
            name: name.to_string(),
            geometry: MultiPolygon::new(vec![poly]),
        }
    }

    fn record(lon: f64, lat: f64, xco2: f64, day: u32) -> MeasurementRecord {
        MeasurementRecord::new(NaiveDate::from_ymd_opt(2020, 1, day).unwrap(), lat, lon, xco2, "g.nc4")
    }

    #[test]
    fn test_locate_inside_outside_and_boundary() {
        let index = CountryIndex::new(vec![square("Squareland", 0.0, 0.0, 10.0)]);
        assert_eq!(index.locate(5.0, 5.0), Some("Squareland"));
        assert_eq!(index.locate(-30.0, 5.0), None);
        assert_eq!(index.locate(10.0, 5.0), None);
        assert_eq!(index.locate(f64::NAN, 5.0), None);
    }

    #[test]
    fn test_first_polygon_in_file_order_wins() {
        let index = CountryIndex::new(vec![
            square("First", 0.0, 0.0, 10.0),
            square("Second", 5.0, 5.0, 10.0),
        ]);
        assert_eq!(index.locate(7.0, 7.0), Some("First"));
        assert_eq!(index.locate(12.0, 12.0), Some("Second"));
    }

    #[test]
    fn test_ocean_points_are_excluded_from_daily_means() {
        let assigner = CountryAssigner::new(CountryIndex::new(vec![square("Squareland", 0.0, 0.0, 10.0)]));
        let records = vec![
            record(1.0, 1.0, 400.0, 1),
            record(2.0, 2.0, 410.0, 1),
            record(-100.0, 0.0, 380.0, 1),
            record(3.0, 3.0, 412.0, 2),
        ];

        let (tagged, report) = assigner.assign(records);
        assert_eq!(report.assigned_points, 3);
        assert_eq!(report.unassigned_points, 1);
        assert!(tagged[2].country.is_none());

        let daily = country_daily(&tagged);
        assert_eq!(daily.len(), 2);
        assert_eq!(daily[0].country, "Squareland");
        assert_eq!(daily[0].xco2, 405.0);
        assert_eq!(daily[1].xco2, 412.0);
    }
}
