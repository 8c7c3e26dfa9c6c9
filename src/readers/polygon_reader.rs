use crate::error::{ProcessingError, Result};
use crate::utils::constants::COUNTRY_NAME_PROPERTY;
use geo::{Geometry, MultiPolygon};
use geojson::GeoJson;
use std::fs;
use std::path::Path;

/// A named country boundary in geographic coordinates (lon, lat).
#[derive(Debug, Clone)]
pub struct CountryPolygon {
    pub name: String,
    pub geometry: MultiPolygon<f64>,
}

/// Loads country polygons from a GeoJSON FeatureCollection.
pub struct PolygonReader;

impl PolygonReader {
    pub fn new() -> Self {
        Self
    }

    pub fn read_polygons(&self, path: &Path) -> Result<Vec<CountryPolygon>> {
        if !path.exists() {
            return Err(ProcessingError::InputNotFound(path.to_path_buf()));
        }
        let text = fs::read_to_string(path)?;
        self.parse_polygons(&text)
    }

    /// Parse polygons in feature order. Features without a name or with
    /// non-areal geometry are skipped.
    pub fn parse_polygons(&self, text: &str) -> Result<Vec<CountryPolygon>> {
        let collection = match text.parse::<GeoJson>()? {
            GeoJson::FeatureCollection(collection) => collection,
            _ => {
                return Err(ProcessingError::InvalidFormat(
                    "country polygons must be a GeoJSON FeatureCollection".to_string(),
                ))
            }
        };

        let mut polygons = Vec::with_capacity(collection.features.len());
        let mut skipped = 0usize;

        for feature in collection.features {
            let name = feature
                .property(COUNTRY_NAME_PROPERTY)
                .and_then(|v| v.as_str())
                .map(str::to_string);

            let (Some(name), Some(geometry)) = (name, feature.geometry) else {
                skipped += 1;
                continue;
            };

            let geometry = match Geometry::<f64>::try_from(geometry)? {
                Geometry::Polygon(polygon) => MultiPolygon::new(vec![polygon]),
                Geometry::MultiPolygon(multi) => multi,
                _ => {
                    skipped += 1;
                    continue;
                }
            };

            polygons.push(CountryPolygon { name, geometry });
        }

        if skipped > 0 {
            tracing::warn!("Skipped {} features without a name or polygon geometry", skipped);
        }
        tracing::debug!("Loaded {} country polygons", polygons.len());

        Ok(polygons)
    }
}

impl Default for PolygonReader {
    fn default() -> Self {
        Self::new()
    }
}
