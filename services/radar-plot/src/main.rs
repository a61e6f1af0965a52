//! NEXRAD PPI plotter.
//!
//! Finds the Level II volume nearest the configured target time in the
//! public archive, decodes it and writes one PNG per plotted field.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use archive::RadarArchive;
use radar_plot::{pipeline, PlotConfig};

#[derive(Parser, Debug)]
#[command(name = "radar-plot")]
#[command(about = "Render NEXRAD Level II PPI maps for the volume nearest a target time")]
struct Args {
    /// YAML configuration file (defaults are used when omitted)
    #[arg(short, long, env = "RADAR_PLOT_CONFIG")]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config = PlotConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    info!(
        site = %config.site,
        target = %config.target,
        bucket = %config.archive.bucket,
        output_dir = %config.output_dir.display(),
        "Starting radar plot"
    );

    let archive = RadarArchive::new(&config.archive).context("Failed to open archive")?;
    let written = pipeline::run(&config, &archive)
        .await
        .context("Failed to render radar plots")?;

    for path in &written {
        info!(path = %path.display(), "Wrote plot");
    }
    info!(count = written.len(), "Done");

    Ok(())
}
