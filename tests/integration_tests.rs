use chrono::{Duration, NaiveDate, TimeZone, Utc};
use oco2_processor::acquisition::{Granule, GranuleCatalog, GranuleQuery};
use oco2_processor::config::{LstmConfig, PipelineConfig};
use oco2_processor::pipeline::{FsArtifactStore, Pipeline, Stage, StageOutcome};
use oco2_processor::readers::{GranuleArrays, GranuleReader};
use oco2_processor::{ProcessingError, Result};
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const COUNTRIES: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {
      "type": "Feature",
      "properties": { "NAME": "Squareland" },
      "geometry": {
        "type": "Polygon",
        "coordinates": [[[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0], [0.0, 0.0]]]
      }
    }
  ]
}"#;

/// One granule per year, found on the representative day.
struct FakeCatalog;

impl GranuleCatalog for FakeCatalog {
    async fn search(&self, query: &GranuleQuery) -> Result<Vec<Granule>> {
        let name = format!("oco2_{}.nc4", query.date.format("%Y"));
        Ok(vec![Granule::new(name.clone(), format!("https://data.example/{}", name))])
    }

    async fn download(&self, granule: &Granule, dest_dir: &Path) -> Result<PathBuf> {
        let path = dest_dir.join(granule.file_name());
        fs::write(&path, b"granule")?;
        Ok(path)
    }
}

/// Serves prepared arrays by file name.
struct FakeReader {
    granules: HashMap<String, GranuleArrays>,
}

impl GranuleReader for FakeReader {
    fn read_granule(&self, path: &Path) -> Result<GranuleArrays> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.granules
            .get(&name)
            .cloned()
            .ok_or_else(|| ProcessingError::GranuleRead {
                file: name,
                message: "unknown granule".to_string(),
            })
    }
}

fn push(arrays: &mut GranuleArrays, date: NaiveDate, lat: f64, lon: f64, xco2: f64) {
    let time = date.and_hms_opt(12, 0, 0).map(|t| Utc.from_utc_datetime(&t));
    arrays.xco2.push(xco2);
    arrays.latitude.push(lat);
    arrays.longitude.push(lon);
    arrays.time.push(time);
}

/// Per month: two soundings inside Squareland, one over the ocean and one
/// implausible value. Each granule also carries one row without xco2.
fn yearly_granule(year: i32) -> GranuleArrays {
    let mut arrays = GranuleArrays::default();
    for month in 1..=12u32 {
        let t = ((year - 2018) * 12) as f64 + (month - 1) as f64;
        let level = 405.0 + 0.2 * t + 3.0 * (t * std::f64::consts::PI / 6.0).sin();
        for day in [5u32, 20] {
            let date = NaiveDate::from_ymd_opt(year, month, day).unwrap();
            push(&mut arrays, date, 5.0, 5.0, level + 0.3 * ((t + day as f64) * 1.3).sin());
        }
        let fifth = NaiveDate::from_ymd_opt(year, month, 5).unwrap();
        push(&mut arrays, fifth, 0.0, -100.0, 401.0);
        push(&mut arrays, fifth, 5.0, 5.0, 600.0);
    }
    push(&mut arrays, NaiveDate::from_ymd_opt(year, 1, 1).unwrap(), 5.0, 5.0, f64::NAN);
    arrays
}

fn test_config(root: &Path) -> Result<PipelineConfig> {
    let polygon_path = root.join("countries.geojson");
    fs::write(&polygon_path, COUNTRIES)?;

    Ok(PipelineConfig {
        download_dir: root.join("raw"),
        ingested_dir: root.join("ingested"),
        polygon_path,
        years: vec![2018, 2019, 2020],
        country: "Squareland".to_string(),
        show_progress: false,
        render_plots: false,
        lstm: LstmConfig {
            epochs: 3,
            hidden_size: 4,
            ..Default::default()
        },
        ..Default::default()
    })
}

fn yearly_reader() -> FakeReader {
    FakeReader {
        granules: (2018..=2020)
            .map(|year| (format!("oco2_{}.nc4", year), yearly_granule(year)))
            .collect(),
    }
}

#[tokio::test]
async fn test_full_pipeline_then_resume() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config = test_config(temp_dir.path())?;
    let layout = config.layout();

    let pipeline = Pipeline::new(config.clone(), FsArtifactStore, yearly_reader());
    let report = pipeline.run(&FakeCatalog).await?;

    for stage in [
        Stage::Acquisition,
        Stage::Ingestion,
        Stage::Cleaning,
        Stage::Aggregation,
        Stage::CountryAssignment,
        Stage::StatisticalForecast,
        Stage::LearnedForecast,
    ] {
        assert_eq!(report.outcome(stage), Some(StageOutcome::Ran), "{}", stage);
    }

    let acquisition = report.acquisition.as_ref().unwrap();
    assert_eq!(acquisition.files_downloaded.len(), 3);

    let ingestion = report.ingestion.as_ref().unwrap();
    assert_eq!(ingestion.files_parsed, 3);
    assert_eq!(ingestion.rows_read, 3 * 49);
    assert_eq!(ingestion.rows_dropped_incomplete, 3);
    assert_eq!(ingestion.rows_written, 144);

    let filter = report.filter.as_ref().unwrap();
    assert_eq!(filter.input_rows, 144);
    assert_eq!(filter.dropped_xco2, 36);
    assert_eq!(filter.output_rows, 108);

    let assignment = report.assignment.as_ref().unwrap();
    assert_eq!(assignment.assigned_points, 72);
    assert_eq!(assignment.unassigned_points, 36);
    assert_eq!(assignment.points_per_country.get("Squareland"), Some(&72));

    let arima = report.statistical_forecast.as_ref().unwrap();
    assert_eq!(arima.horizon(), 12);
    assert_eq!(arima.points[0].date, NaiveDate::from_ymd_opt(2021, 1, 31).unwrap());
    assert!(layout.arima_table("Squareland").exists());

    let learned = report.learned_forecast.as_ref().unwrap();
    let last_observed = NaiveDate::from_ymd_opt(2020, 12, 20).unwrap();
    assert_eq!(learned.effective_window, 4);
    assert_eq!(learned.forecast.horizon(), 4);
    assert_eq!(learned.forecast.points[0].date, last_observed + Duration::days(180));
    assert_eq!(learned.plot_path, None);
    assert_eq!(learned.loss_history.len(), 3);

    for path in [layout.global_daily(), layout.latband_daily(), layout.country_daily()] {
        assert!(path.exists(), "{}", path.display());
    }
    assert!(!layout.spatial_plot().exists());

    let cleaned_before = fs::read_to_string(layout.cleaned())?;

    let rerun = Pipeline::new(config, FsArtifactStore, yearly_reader());
    let report = rerun.run(&FakeCatalog).await?;

    assert_eq!(report.acquisition.as_ref().unwrap().days_skipped.len(), 3);
    assert!(report.acquisition.as_ref().unwrap().files_downloaded.is_empty());
    for stage in [
        Stage::Ingestion,
        Stage::Cleaning,
        Stage::Aggregation,
        Stage::CountryAssignment,
        Stage::StatisticalForecast,
    ] {
        assert_eq!(report.outcome(stage), Some(StageOutcome::Skipped), "{}", stage);
    }
    assert_eq!(report.outcome(Stage::LearnedForecast), Some(StageOutcome::Ran));
    assert_eq!(fs::read_to_string(layout.cleaned())?, cleaned_before);
    Ok(())
}

#[tokio::test]
async fn test_two_sparse_years_complete_both_forecasts() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut config = test_config(temp_dir.path())?;
    config.years = vec![2020, 2021];
    let layout = config.layout();

    let reader = FakeReader {
        granules: [2020, 2021]
            .into_iter()
            .map(|year| {
                let day = NaiveDate::from_ymd_opt(year, 7, 1).unwrap();
                let mut arrays = GranuleArrays::default();
                push(&mut arrays, day, 5.0, 5.0, 410.0 + (year - 2020) as f64 * 2.0);
                (format!("oco2_{}.nc4", year), arrays)
            })
            .collect(),
    };

    let report = Pipeline::new(config, FsArtifactStore, reader)
        .run(&FakeCatalog)
        .await?;

    assert_eq!(report.outcome(Stage::StatisticalForecast), Some(StageOutcome::Ran));
    assert_eq!(report.outcome(Stage::LearnedForecast), Some(StageOutcome::Ran));

    let arima = report.statistical_forecast.as_ref().unwrap();
    assert_eq!(arima.horizon(), 12);
    assert_eq!(arima.points[0].date, NaiveDate::from_ymd_opt(2021, 8, 31).unwrap());
    assert!(arima.points.iter().all(|p| p.xco2.is_finite()));
    assert!(layout.arima_table("Squareland").exists());

    let learned = report.learned_forecast.as_ref().unwrap();
    assert_eq!(learned.effective_window, 1);
    assert_eq!(learned.forecast.horizon(), 4);
    Ok(())
}

#[tokio::test]
async fn test_single_day_stops_at_learned_forecast() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut config = test_config(temp_dir.path())?;
    config.skip_download = true;
    fs::create_dir_all(&config.download_dir)?;
    fs::write(config.download_dir.join("day.nc4"), b"granule")?;

    let day = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    let mut arrays = GranuleArrays::default();
    push(&mut arrays, day, 5.0, 5.0, 400.0);
    push(&mut arrays, day, 5.0, 5.0, 410.0);
    let reader = FakeReader {
        granules: HashMap::from([("day.nc4".to_string(), arrays)]),
    };

    let layout = config.layout();
    let result = Pipeline::new(config, FsArtifactStore, reader).run(&FakeCatalog).await;

    assert!(matches!(result, Err(ProcessingError::InsufficientData(_))));
    let arima: Vec<String> = fs::read_to_string(layout.arima_table("Squareland"))?
        .lines()
        .skip(1)
        .map(str::to_string)
        .collect();
    assert_eq!(arima.len(), 12);
    assert!(arima.iter().all(|row| row.ends_with("405.0,405.0,405.0")));
    assert_eq!(
        fs::read_to_string(layout.global_daily())?,
        "date,xco2\n2020-01-01,405.0\n"
    );
    assert_eq!(
        fs::read_to_string(layout.country_daily())?,
        "country,date,xco2\nSquareland,2020-01-01,405.0\n"
    );
    Ok(())
}

#[tokio::test]
async fn test_no_raw_files_is_fatal() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut config = test_config(temp_dir.path())?;
    config.skip_download = true;
    let layout = config.layout();

    let result = Pipeline::new(config, FsArtifactStore, yearly_reader())
        .run(&FakeCatalog)
        .await;

    assert!(matches!(result, Err(ProcessingError::NoData(_))));
    assert!(!layout.combined().exists());
    Ok(())
}

#[tokio::test]
async fn test_unknown_country_is_fatal() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut config = test_config(temp_dir.path())?;
    config.country = "Atlantis".to_string();

    let result = Pipeline::new(config, FsArtifactStore, yearly_reader())
        .run(&FakeCatalog)
        .await;

    assert!(matches!(result, Err(ProcessingError::CountryNotFound { .. })));
    Ok(())
}
