mod core;
mod decoder;
mod detector;
mod shared;
mod utils;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::core::config::PrepConfig;
use crate::core::label::{resolve_label, unknown_label_warning, Dataset, Label};
use crate::core::walker::DatasetWalker;
use crate::detector::CascadeDetector;
use crate::utils::time_utils::{format_duration, Timer};

#[derive(Parser)]
#[command(author, version, about = "Face crop dataset preparation for anti-spoofing training", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk the raw datasets and write labeled face crops
    Prepare {
        /// JSON configuration file; defaults are used when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        raw_root: Option<PathBuf>,
        #[arg(long)]
        processed_root: Option<PathBuf>,
        /// Only process these datasets (repeatable)
        #[arg(short, long = "dataset")]
        datasets: Vec<String>,
        /// Process every N-th decoded frame
        #[arg(short, long)]
        interval: Option<u32>,
        /// Square output size in pixels
        #[arg(short, long)]
        size: Option<u32>,
        /// Haar cascade XML used for face detection
        #[arg(long)]
        cascade: Option<PathBuf>,
        #[arg(long, default_value_t = false)]
        quiet: bool,
    },
    /// Print the label a video path resolves to
    Label {
        path: PathBuf,
        #[arg(short, long)]
        dataset: String,
    },
    /// Print the default configuration as JSON
    DefaultConfig,
    /// Report GPU, driver and OpenCV capabilities
    Probe,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Prepare {
            config,
            raw_root,
            processed_root,
            datasets,
            interval,
            size,
            cascade,
            quiet,
        } => {
            let mut config = PrepConfig::load_or_default(config.as_deref())?;
            if let Some(raw_root) = raw_root {
                config.raw_root = raw_root;
            }
            if let Some(processed_root) = processed_root {
                config.processed_root = processed_root;
            }
            if let Some(interval) = interval {
                config.frame_interval = interval;
            }
            if let Some(size) = size {
                config.target_width = size;
                config.target_height = size;
            }
            if cascade.is_some() {
                config.detector.cascade_path = cascade;
            }
            config.retain_datasets(&datasets);
            config.validate()?;

            run_prepare(&config, quiet)?;
        }
        Commands::Label { path, dataset } => {
            let dataset = Dataset::from_name(&dataset);
            let label = resolve_label(&path, &dataset);
            if label == Label::Unknown {
                eprintln!("Warning: {}", unknown_label_warning(&path, &dataset));
            }
            println!("{}", label);
        }
        Commands::DefaultConfig => {
            println!("{}", PrepConfig::default().to_json()?);
        }
        Commands::Probe => {
            let info = crate::utils::platform::EnvironmentInfo::detect()?;
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
    }

    Ok(())
}

fn run_prepare(config: &PrepConfig, quiet: bool) -> Result<()> {
    crate::utils::logger::init(&config.log_dir);

    let detector = CascadeDetector::new(&config.detector).context("Face detector unavailable")?;

    if !quiet {
        println!(
            "Starting... target resolution: {}x{}, every {} frames",
            config.target_width, config.target_height, config.frame_interval
        );
        println!("Face cascade: {}", detector.source().display());
    }

    let timer = Timer::new();
    let summary = DatasetWalker::new(config, detector).with_progress(!quiet).run();

    if !quiet {
        println!(
            "Done in {}: {} samples from {} videos ({} skipped by label, {} failed to open)",
            format_duration(timer.elapsed()),
            summary.samples_written,
            summary.videos_processed,
            summary.videos_skipped_label,
            summary.videos_failed_open
        );
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(())
}
