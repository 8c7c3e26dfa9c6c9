use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One forecast step. Bounds are only produced by models with native intervals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub xco2: f64,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

/// Ordered forecast for a fixed horizon.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ForecastSeries {
    pub model: String,
    pub points: Vec<ForecastPoint>,
}

impl ForecastSeries {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            points: Vec::new(),
        }
    }

    pub fn horizon(&self) -> usize {
        self.points.len()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.xco2).collect()
    }

    pub fn has_intervals(&self) -> bool {
        !self.points.is_empty()
            && self
                .points
                .iter()
                .all(|p| p.lower.is_some() && p.upper.is_some())
    }

    pub fn summary(&self) -> String {
        let mut summary = format!("{} forecast ({} steps)\n", self.model, self.horizon());
        for point in &self.points {
            match (point.lower, point.upper) {
                (Some(lower), Some(upper)) => summary.push_str(&format!(
                    "  {}: {:.2} ppm [{:.2}, {:.2}]\n",
                    point.date, point.xco2, lower, upper
                )),
                _ => summary.push_str(&format!("  {}: {:.2} ppm\n", point.date, point.xco2)),
            }
        }
        summary
    }
}
