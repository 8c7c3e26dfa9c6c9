use crate::acquisition::CmrCatalog;
use crate::analyzers::TableAnalyzer;
use crate::cli::args::{Cli, Commands, ForecastModel};
use crate::config::PipelineConfig;
use crate::error::{ProcessingError, Result};
use crate::forecasting::{LearnedForecastStage, StatisticalForecastStage};
use crate::pipeline::{FsArtifactStore, Pipeline};
use crate::processors::{Aggregator, Cleaner, CountryAssigner, CountryIndex, IngestOutcome, Ingestor};
use crate::readers::GranuleReader;
use crate::utils::progress::ProgressReporter;
use crate::writers::{CsvWriter, PlotWriter};
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// `RUST_LOG` wins; otherwise `--verbose` selects debug output.
pub fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    let installed = match log_file {
        Some(path) => {
            let file = File::create(path)?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };
    installed.map_err(|e| ProcessingError::Config(format!("cannot install logger: {}", e)))
}

#[cfg(feature = "netcdf")]
fn granule_reader() -> impl GranuleReader {
    crate::readers::NetCdfGranuleReader::new()
}

#[cfg(not(feature = "netcdf"))]
fn granule_reader() -> impl GranuleReader {
    tracing::warn!("Built without the `netcdf` feature; raw granules cannot be read");
    crate::readers::UnsupportedGranuleReader
}

pub async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;

    let mut config = PipelineConfig::load(cli.config.as_deref())?;
    let layout = config.layout();

    match cli.command {
        Commands::Run {
            country,
            overwrite,
            skip_download,
            no_plots,
        } => {
            if let Some(country) = country {
                config.country = country;
            }
            config.overwrite |= overwrite;
            config.skip_download |= skip_download;
            config.render_plots &= !no_plots;

            println!("Running OCO-2 pipeline for {}...", config.country);
            println!("Download directory: {}", config.download_dir.display());
            println!("Output directory: {}", config.ingested_dir.display());

            let pipeline = Pipeline::new(config, FsArtifactStore, granule_reader());
            let report = pipeline.run(&CmrCatalog::new()).await?;

            println!("\n{}", report.summary());
            if let Some(forecast) = &report.statistical_forecast {
                println!("\n{}", forecast.summary());
            }
            if let Some(learned) = &report.learned_forecast {
                println!("\n{}", learned.forecast.summary());
            }
            println!("Processing complete!");
        }

        Commands::Ingest { overwrite } => {
            let ingestor = Ingestor::new(granule_reader())
                .with_overwrite(overwrite || config.overwrite)
                .with_progress(config.show_progress);

            match ingestor.ingest(&config.download_dir, &layout.combined())? {
                IngestOutcome::Cached(path) => {
                    println!("Using existing combined table {}", path.display());
                }
                IngestOutcome::Written { path, report } => {
                    println!("{}", report.summary());
                    println!("\n{}", CsvWriter::new().get_file_info(&path)?.summary());
                }
                IngestOutcome::Empty(report) => {
                    println!("{}", report.summary());
                    println!("No records to write");
                }
            }
        }

        Commands::Clean { plot } => {
            let (records, report) = Cleaner::new().clean_file(&layout.combined(), &layout.cleaned())?;
            println!("{}", report.summary());
            if plot {
                PlotWriter::new().plot_spatial_distribution(&layout.spatial_plot(), &records)?;
                println!("Spatial plot written to {}", layout.spatial_plot().display());
            }
        }

        Commands::Aggregate { plot } => {
            let (daily, summary) =
                Aggregator::new().aggregate_file(&layout.cleaned(), &layout.global_daily(), &layout.latband_daily())?;
            println!("{}", summary.summary());
            if plot {
                let series: Vec<_> = daily.iter().map(|d| (d.date, d.xco2)).collect();
                PlotWriter::new().plot_daily_series(&layout.global_daily_plot(), "Global daily mean CO₂", &series)?;
                println!("Daily plot written to {}", layout.global_daily_plot().display());
            }
        }

        Commands::Countries => {
            let progress = ProgressReporter::new_spinner("Assigning countries...", !config.show_progress);
            let index = CountryIndex::from_geojson_file(&config.polygon_path)?;
            progress.set_message(&format!("Assigning points to {} polygons...", index.len()));

            let (daily, report) = CountryAssigner::new(index).assign_file(&layout.cleaned(), &layout.country_daily())?;
            progress.finish_with_message(&format!("Wrote {} country/day rows", daily.len()));
            println!("\n{}", report.summary());
        }

        Commands::Forecast {
            model,
            country,
            no_plot,
        } => {
            let country = country.unwrap_or_else(|| config.country.clone());
            let render = config.render_plots && !no_plot;

            match model {
                ForecastModel::Arima => {
                    let plot = (render && config.arima.plot).then(|| layout.arima_plot(&country));
                    let forecast = StatisticalForecastStage::new()
                        .with_horizon(config.arima.horizon)
                        .with_confidence(config.arima.confidence)
                        .run(
                            &layout.country_daily(),
                            &country,
                            plot.as_deref(),
                            Some(&layout.arima_table(&country)),
                        )?;
                    println!("{}", forecast.summary());
                }
                ForecastModel::Lstm => {
                    let learned = LearnedForecastStage::new(config.lstm.training_config(config.show_progress))
                        .with_window(config.lstm.n_steps)
                        .with_horizon(config.lstm.horizon)
                        .with_cadence_days(config.lstm.cadence_days)
                        .run(&layout.country_daily(), &country, render.then(|| layout.root()))?;
                    println!("{}", learned.forecast.summary());
                    println!("Effective window: {}", learned.effective_window);
                    if let Some(path) = learned.plot_path {
                        println!("Plot written to {}", path.display());
                    }
                }
            }
        }

        Commands::Info { file, sample } => {
            println!("Analyzing CSV file: {}", file.display());

            let file_info = CsvWriter::new().get_file_info(&file)?;
            let stats = TableAnalyzer::new().with_sample_size(sample).analyze(&file)?;

            println!("\n{}", stats.detailed_summary());
            println!("\nFile Details:");
            println!("{}", file_info.summary());
        }
    }

    Ok(())
}
