use crate::utils::constants::{
    CLEANED_FILE, COMBINED_FILE, COUNTRY_DAILY_FILE, GLOBAL_DAILY_FILE, LATBAND_DAILY_FILE,
};
use std::path::{Path, PathBuf};

/// Lowercase file stem for a country name, e.g. `United States` -> `united_states`.
pub fn country_file_stem(country: &str) -> String {
    country
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

/// Default `<country>_lstm_forecast.png` location inside `dir`.
pub fn lstm_plot_filename(dir: &Path, country: &str) -> PathBuf {
    dir.join(format!("{}_lstm_forecast.png", country_file_stem(country)))
}

/// Locations of every artifact the pipeline writes under the ingested folder.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactLayout {
    root: PathBuf,
}

impl ArtifactLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn combined(&self) -> PathBuf {
        self.root.join(COMBINED_FILE)
    }

    pub fn cleaned(&self) -> PathBuf {
        self.root.join(CLEANED_FILE)
    }

    pub fn global_daily(&self) -> PathBuf {
        self.root.join(GLOBAL_DAILY_FILE)
    }

    pub fn latband_daily(&self) -> PathBuf {
        self.root.join(LATBAND_DAILY_FILE)
    }

    pub fn country_daily(&self) -> PathBuf {
        self.root.join(COUNTRY_DAILY_FILE)
    }

    pub fn spatial_plot(&self) -> PathBuf {
        self.root.join("spatial_distribution.png")
    }

    pub fn global_daily_plot(&self) -> PathBuf {
        self.root.join("daily_global_mean.png")
    }

    pub fn arima_plot(&self, country: &str) -> PathBuf {
        self.root
            .join(format!("{}_arima_forecast.png", country_file_stem(country)))
    }

    pub fn arima_table(&self, country: &str) -> PathBuf {
        self.root
            .join(format!("{}_arima_forecast.csv", country_file_stem(country)))
    }

    pub fn lstm_plot(&self, country: &str) -> PathBuf {
        lstm_plot_filename(&self.root, country)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_country_file_stem() {
        assert_eq!(country_file_stem("India"), "india");
        assert_eq!(country_file_stem("United States"), "united_states");
        assert_eq!(country_file_stem(" Côte d'Ivoire "), "côte_d_ivoire");
    }

    #[test]
    fn test_artifact_layout() {
        let layout = ArtifactLayout::new("out");
        assert_eq!(layout.combined(), PathBuf::from("out/combined_oco2_data.csv"));
        assert_eq!(layout.country_daily(), PathBuf::from("out/country_daily_co2.csv"));
        assert_eq!(layout.arima_table("India"), PathBuf::from("out/india_arima_forecast.csv"));
        assert_eq!(layout.lstm_plot("India"), PathBuf::from("out/india_lstm_forecast.png"));
    }
}
