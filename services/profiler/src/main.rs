//! Storm profile batch service.
//!
//! Reads CAPPI radar volumes and tracked storm cells, computes vertical
//! profiles (CFAD, VIL/VII/VIWL, echo tops) and lifecycle summaries.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use profiler::{
    load_families, load_manifest, summarize_all, write_records, write_summaries, LoggingConfig,
    ProfileBatch, ProfilerConfig,
};

#[derive(Parser)]
#[command(name = "profiler")]
#[command(about = "Vertical profiles and lifecycle summaries for tracked storm cells")]
struct Cli {
    /// Configuration file path (defaults are used when omitted)
    #[arg(short, long, env = "PROFILER_CONFIG")]
    config: Option<PathBuf>,

    /// Log level, overriding the configuration file
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Profile every cell listed in a manifest
    Profile {
        /// JSON manifest of cells
        #[arg(short, long)]
        manifest: PathBuf,

        /// Output file (JSON lines)
        #[arg(short, long, default_value = "profiles.jsonl")]
        output: PathBuf,
    },

    /// Derive lifecycle rates and classes for tracked families
    Lifecycle {
        /// JSON array of families
        #[arg(short, long)]
        input: PathBuf,

        /// Output file (JSON)
        #[arg(short, long, default_value = "lifecycle.json")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = ProfilerConfig::load(cli.config.as_deref())?;
    init_tracing(&config.logging, cli.log_level.as_deref())?;

    info!(
        config = ?cli.config,
        levels = config.radar.levels,
        workers = config.batch.workers,
        "Starting storm profiler"
    );

    match cli.command {
        Commands::Profile { manifest, output } => {
            let entries = load_manifest(&manifest)?;
            let report = ProfileBatch::new(&config)?.run(&entries)?;
            write_records(&output, &report.records)?;
            info!(
                output = %output.display(),
                processed = report.processed,
                failed = report.failed,
                "Wrote profiles"
            );
        }
        Commands::Lifecycle { input, output } => {
            let families = load_families(&input)?;
            let summaries = summarize_all(&families, &config.classification);
            write_summaries(&output, &summaries)?;
            info!(
                output = %output.display(),
                families = summaries.len(),
                "Wrote lifecycle summaries"
            );
        }
    }

    Ok(())
}

fn init_tracing(logging: &LoggingConfig, override_level: Option<&str>) -> Result<()> {
    let level = match override_level
        .unwrap_or(&logging.level)
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true);

    if logging.format == "text" {
        tracing::subscriber::set_global_default(builder.finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    }
    Ok(())
}
