//! tourguide - guided product-tour playback engine.
//!
//! Main entry point for the tourguide CLI.

mod cli;
mod cmd_check;
mod cmd_play;
mod cmd_resume;

use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::{error, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tourguide_config::{Config, ConfigLoader, ConfigValidator};

use crate::cli::{Cli, Commands};

/// Get the tourguide home directory (~/.tourguide).
fn tourguide_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".tourguide")
}

fn init_tracing() -> Result<(), Box<dyn std::error::Error>> {
    let log_dir = tourguide_dir().join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("tourguide")
        .filename_suffix("log")
        .max_log_files(14)
        .build(&log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Keeps the writer flushing until exit.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_ansi(true)
        )
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
        )
        .init();

    Ok(())
}

/// Load and validate the configuration. A missing file means defaults.
fn load_config(path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
    let config = ConfigLoader::load_or_default(path)?;

    let result = ConfigValidator::validate(&config)?;
    for warning in &result.warnings {
        warn!("Config {}: {}", warning.path, warning.message);
    }
    if !result.is_valid() {
        for err in &result.errors {
            error!("Config {}: {}", err.path, err.message);
        }
        return Err(format!("invalid configuration in {}", path.display()).into());
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing()?;

    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    match cli.command {
        Commands::Play {
            url,
            attach,
            start,
            project_id,
            script,
        } => {
            let target = cmd_play::PlayTarget::new(url, attach);
            cmd_play::play(config, target, start, project_id, script).await
        }
        Commands::Check {
            path,
            page,
            project_id,
        } => cmd_check::check(config, path, page, project_id).await,
        Commands::Resume { clear } => cmd_resume::resume(&config, clear).await,
    }
}
