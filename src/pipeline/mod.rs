//! Sequential, resumable orchestration of every processing stage.

use crate::acquisition::{acquire, AcquisitionReport, GranuleCatalog};
use crate::config::PipelineConfig;
use crate::error::{ProcessingError, Result};
use crate::forecasting::{LearnedForecast, LearnedForecastStage, StatisticalForecastStage};
use crate::models::ForecastSeries;
use crate::processors::{
    AggregationSummary, Aggregator, AssignmentReport, Cleaner, CountryAssigner, CountryIndex,
    FilterReport, IngestOutcome, IngestReport, Ingestor,
};
use crate::readers::GranuleReader;
use crate::writers::PlotWriter;
use std::fmt;
use std::path::{Path, PathBuf};

/// Existence check used to decide whether a stage can be skipped.
pub trait ArtifactStore {
    fn exists(&self, path: &Path) -> bool;
}

/// Artifacts on the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsArtifactStore;

impl ArtifactStore for FsArtifactStore {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Acquisition,
    Ingestion,
    Cleaning,
    Aggregation,
    CountryAssignment,
    StatisticalForecast,
    LearnedForecast,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Acquisition => "acquisition",
            Stage::Ingestion => "ingestion",
            Stage::Cleaning => "cleaning",
            Stage::Aggregation => "aggregation",
            Stage::CountryAssignment => "country assignment",
            Stage::StatisticalForecast => "SARIMA forecast",
            Stage::LearnedForecast => "LSTM forecast",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    Ran,
    Skipped,
}

#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    pub stages: Vec<(Stage, StageOutcome)>,
    pub acquisition: Option<AcquisitionReport>,
    pub ingestion: Option<IngestReport>,
    pub filter: Option<FilterReport>,
    pub aggregation: Option<AggregationSummary>,
    pub assignment: Option<AssignmentReport>,
    pub statistical_forecast: Option<ForecastSeries>,
    pub learned_forecast: Option<LearnedForecast>,
}

impl PipelineReport {
    pub fn outcome(&self, stage: Stage) -> Option<StageOutcome> {
        self.stages
            .iter()
            .find(|(s, _)| *s == stage)
            .map(|(_, outcome)| *outcome)
    }

    fn record(&mut self, stage: Stage, outcome: StageOutcome) {
        match outcome {
            StageOutcome::Ran => tracing::info!("Stage {} complete", stage),
            StageOutcome::Skipped => tracing::info!("Stage {} skipped, outputs already exist", stage),
        }
        self.stages.push((stage, outcome));
    }

    pub fn summary(&self) -> String {
        let mut summary = String::from("Pipeline Summary:");
        for (stage, outcome) in &self.stages {
            let status = match outcome {
                StageOutcome::Ran => "ran",
                StageOutcome::Skipped => "skipped",
            };
            summary.push_str(&format!("\n- {}: {}", stage, status));
        }
        summary
    }
}

/// Runs acquisition through forecasting for one target country.
pub struct Pipeline<S: ArtifactStore, R: GranuleReader> {
    config: PipelineConfig,
    store: S,
    reader: R,
}

impl<S: ArtifactStore, R: GranuleReader> Pipeline<S, R> {
    pub fn new(config: PipelineConfig, store: S, reader: R) -> Self {
        Self {
            config,
            store,
            reader,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// A stage runs when overwrite is set, when it writes nothing, or when
    /// any of its outputs is missing.
    fn should_skip(&self, outputs: &[PathBuf]) -> bool {
        !self.config.overwrite
            && !outputs.is_empty()
            && outputs.iter().all(|path| self.store.exists(path))
    }

    pub async fn run<C: GranuleCatalog>(&self, catalog: &C) -> Result<PipelineReport> {
        let config = &self.config;
        let layout = config.layout();
        let country = config.country.as_str();
        let mut report = PipelineReport::default();
        tracing::info!("Starting pipeline for {}", country);

        if config.skip_download {
            report.record(Stage::Acquisition, StageOutcome::Skipped);
        } else {
            let acquisition = acquire(
                catalog,
                &config.download_dir,
                &config.years,
                &config.short_name,
                config.show_progress,
            )
            .await?;
            tracing::info!("{}", acquisition.summary());
            report.acquisition = Some(acquisition);
            report.record(Stage::Acquisition, StageOutcome::Ran);
        }

        let combined = layout.combined();
        if self.should_skip(&[combined.clone()]) {
            report.record(Stage::Ingestion, StageOutcome::Skipped);
        } else {
            let ingestor = Ingestor::new(&self.reader)
                .with_overwrite(true)
                .with_progress(config.show_progress);
            match ingestor.ingest(&config.download_dir, &combined)? {
                IngestOutcome::Written { report: ingest, .. } => {
                    tracing::info!("{}", ingest.summary());
                    report.ingestion = Some(ingest);
                    report.record(Stage::Ingestion, StageOutcome::Ran);
                }
                IngestOutcome::Cached(_) => report.record(Stage::Ingestion, StageOutcome::Skipped),
                IngestOutcome::Empty(ingest) => {
                    tracing::warn!("{}", ingest.summary());
                    return Err(ProcessingError::NoData(format!(
                        "no raw granule in {} could be ingested",
                        config.download_dir.display()
                    )));
                }
            }
        }

        let cleaned = layout.cleaned();
        if self.should_skip(&[cleaned.clone()]) {
            report.record(Stage::Cleaning, StageOutcome::Skipped);
        } else {
            let (records, filter) = Cleaner::new().clean_file(&combined, &cleaned)?;
            if config.render_plots {
                PlotWriter::new().plot_spatial_distribution(&layout.spatial_plot(), &records)?;
            }
            report.filter = Some(filter);
            report.record(Stage::Cleaning, StageOutcome::Ran);
        }

        let (global, bands) = (layout.global_daily(), layout.latband_daily());
        if self.should_skip(&[global.clone(), bands.clone()]) {
            report.record(Stage::Aggregation, StageOutcome::Skipped);
        } else {
            let (daily, summary) = Aggregator::new().aggregate_file(&cleaned, &global, &bands)?;
            if config.render_plots {
                let series: Vec<_> = daily.iter().map(|d| (d.date, d.xco2)).collect();
                PlotWriter::new().plot_daily_series(
                    &layout.global_daily_plot(),
                    "Global daily mean CO₂",
                    &series,
                )?;
            }
            report.aggregation = Some(summary);
            report.record(Stage::Aggregation, StageOutcome::Ran);
        }

        let country_table = layout.country_daily();
        if self.should_skip(&[country_table.clone()]) {
            report.record(Stage::CountryAssignment, StageOutcome::Skipped);
        } else {
            let index = CountryIndex::from_geojson_file(&config.polygon_path)?;
            let (_, assignment) = CountryAssigner::new(index).assign_file(&cleaned, &country_table)?;
            tracing::info!("{}", assignment.summary());
            report.assignment = Some(assignment);
            report.record(Stage::CountryAssignment, StageOutcome::Ran);
        }

        let arima_table = layout.arima_table(country);
        let arima_plot = (config.render_plots && config.arima.plot).then(|| layout.arima_plot(country));
        let mut arima_outputs = vec![arima_table.clone()];
        arima_outputs.extend(arima_plot.clone());
        if self.should_skip(&arima_outputs) {
            report.record(Stage::StatisticalForecast, StageOutcome::Skipped);
        } else {
            let forecast = StatisticalForecastStage::new()
                .with_horizon(config.arima.horizon)
                .with_confidence(config.arima.confidence)
                .run(&country_table, country, arima_plot.as_deref(), Some(&arima_table))?;
            report.statistical_forecast = Some(forecast);
            report.record(Stage::StatisticalForecast, StageOutcome::Ran);
        }

        let plot_dir = config.render_plots.then(|| layout.root().to_path_buf());
        let lstm_outputs: Vec<PathBuf> = plot_dir.iter().map(|_| layout.lstm_plot(country)).collect();
        if self.should_skip(&lstm_outputs) {
            report.record(Stage::LearnedForecast, StageOutcome::Skipped);
        } else {
            let learned = LearnedForecastStage::new(config.lstm.training_config(config.show_progress))
                .with_window(config.lstm.n_steps)
                .with_horizon(config.lstm.horizon)
                .with_cadence_days(config.lstm.cadence_days)
                .run(&country_table, country, plot_dir.as_deref())?;
            report.learned_forecast = Some(learned);
            report.record(Stage::LearnedForecast, StageOutcome::Ran);
        }

        tracing::info!("Pipeline finished for {}", country);
        Ok(report)
    }
}
