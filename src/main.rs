//! anomalyscan - cluster an uploaded CSV and flag density outliers

use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anomalyscan::{Pipeline, PipelineOutput, Scaler, Settings, report};
use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// CSV file to analyse (header row required)
    input: PathBuf,

    /// Pre-fitted scaler artifact (JSON)
    #[arg(long, env = "ANOMALYSCAN_SCALER")]
    scaler: Option<PathBuf>,

    /// Settings file (TOML)
    #[arg(long, env = "ANOMALYSCAN_CONFIG")]
    config: Option<PathBuf>,

    /// Where to write the clustered CSV
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Also write PCA1,PCA2,Cluster points for plotting
    #[arg(long)]
    plot_data: Option<PathBuf>,

    /// Rows shown in the dataset preview
    #[arg(long)]
    preview_rows: Option<usize>,
}

fn init_logging(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut settings = match Settings::load(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("failed to load settings: {e}");
            return ExitCode::FAILURE;
        }
    };
    init_logging(&settings.log_level);

    if let Some(path) = cli.scaler.clone() {
        settings.scaler_path = path;
    }
    if let Some(path) = cli.output.clone() {
        settings.output_path = path;
    }
    if let Some(n) = cli.preview_rows {
        settings.pipeline.preview_rows = n;
    }

    info!("=== anomalyscan v{} ===", env!("CARGO_PKG_VERSION"));

    // A missing or broken scaler is fatal before any input is read.
    let pipeline = match startup(&settings) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            error!("startup failed: {e:#}");
            eprintln!("Startup failed: {e:?}");
            return ExitCode::FAILURE;
        }
    };

    match process(&pipeline, &cli, &settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("processing failed: {e:#}");
            eprintln!("Error during processing.");
            eprintln!("{e:?}");
            ExitCode::FAILURE
        }
    }
}

fn startup(settings: &Settings) -> anyhow::Result<Pipeline> {
    let scaler = Scaler::from_path(&settings.scaler_path).with_context(|| {
        format!(
            "loading scaler artifact {}",
            settings.scaler_path.display()
        )
    })?;
    let pipeline = Pipeline::new(Arc::new(scaler), settings.pipeline.clone())?;
    Ok(pipeline)
}

fn process(pipeline: &Pipeline, cli: &Cli, settings: &Settings) -> anyhow::Result<()> {
    let file = File::open(&cli.input)
        .with_context(|| format!("opening {}", cli.input.display()))?;
    let output = pipeline
        .run_csv(file)
        .with_context(|| format!("processing {}", cli.input.display()))?;

    print!("{}", report::render(&output));
    export(&output, cli, settings)?;

    Ok(())
}

// Only reached after every stage succeeded. Each file is written to a
// temporary sibling and renamed into place, so a failed write leaves nothing.
fn export(output: &PipelineOutput, cli: &Cli, settings: &Settings) -> anyhow::Result<()> {
    let path = &settings.output_path;
    output
        .result
        .save(path)
        .with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), rows = output.result.n_rows(), "results written");
    println!("Results written to {}", path.display());

    if let Some(plot_path) = &cli.plot_data {
        report::save_plot_data(&output.projection, output.result.labels(), plot_path)
            .with_context(|| format!("writing {}", plot_path.display()))?;
        println!("Plot data written to {}", plot_path.display());
    }

    Ok(())
}
