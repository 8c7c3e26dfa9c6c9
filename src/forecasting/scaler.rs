/// Min–max scaling to [0, 1] fitted on a whole series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinMaxScaler {
    min: f64,
    scale: f64,
}

impl MinMaxScaler {
    /// A constant series gets a scale of 1 so it maps to zeros instead of NaN.
    pub fn fit(values: &[f64]) -> Self {
        let (min, max) = values
            .iter()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));

        if !min.is_finite() {
            return Self { min: 0.0, scale: 1.0 };
        }

        let range = max - min;
        Self {
            min,
            scale: if range > 0.0 { range } else { 1.0 },
        }
    }

    pub fn transform(&self, value: f64) -> f64 {
        (value - self.min) / self.scale
    }

    pub fn inverse(&self, scaled: f64) -> f64 {
        scaled * self.scale + self.min
    }

    pub fn transform_all(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|&v| self.transform(v)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scales_to_unit_interval() {
        let scaler = MinMaxScaler::fit(&[400.0, 405.0, 410.0]);
        assert_eq!(scaler.transform_all(&[400.0, 405.0, 410.0]), vec![0.0, 0.5, 1.0]);
        assert_eq!(scaler.inverse(0.5), 405.0);
    }

    #[test]
    fn test_constant_series_uses_unit_scale() {
        let scaler = MinMaxScaler::fit(&[412.0, 412.0]);
        assert_eq!(scaler.transform(412.0), 0.0);
        assert_eq!(scaler.inverse(0.25), 412.25);
    }
}
