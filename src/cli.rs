//! CLI definitions for tourguide.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tourguide_protocols::PlaybackMode;

/// tourguide CLI.
#[derive(Parser)]
#[command(name = "tourguide")]
#[command(about = "Guided product-tour playback for live web pages")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Drive a tour inside a Chrome tab (Chrome must run with --remote-debugging-port)
    Play {
        /// Open a new tab at this URL
        #[arg(long, required_unless_present = "attach")]
        url: Option<String>,

        /// Attach to the first open tab whose URL contains this text
        #[arg(long)]
        attach: Option<String>,

        /// Start this mode right away instead of waiting for the launcher (full, page)
        #[arg(long)]
        start: Option<PlaybackMode>,

        /// Load the script from the presentation API for this project
        #[arg(long, env = "TOURGUIDE_PROJECT_ID")]
        project_id: Option<String>,

        /// Script file or URL (overrides [source].script_path)
        #[arg(long)]
        script: Option<String>,
    },

    /// Load a script, apply repairs and report problems
    Check {
        /// Script file or URL (default: [source].script_path)
        path: Option<String>,

        /// Show only the steps page mode would play on this page
        #[arg(long)]
        page: Option<String>,

        /// Load from the presentation API for this project
        #[arg(long)]
        project_id: Option<String>,
    },

    /// Inspect the file-backed resume store
    Resume {
        /// Remove the persisted mode and step
        #[arg(long)]
        clear: bool,
    },
}
