//! Error types for script loading and playback.

use thiserror::Error;
use tourguide_protocols::{PageError, StoreError};

/// Script could not be loaded.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Script not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Script request to {url} failed with status {status}")]
    Status { url: String, status: u16 },

    #[error("Script is not valid JSON: {0}")]
    Parse(String),

    #[error("Script document must be a JSON object")]
    NotAnObject,

    #[error("Script document has no steps array")]
    MissingSteps,
}

impl From<reqwest::Error> for ScriptError {
    fn from(e: reqwest::Error) -> Self {
        ScriptError::Http(e.to_string())
    }
}

impl From<serde_json::Error> for ScriptError {
    fn from(e: serde_json::Error) -> Self {
        ScriptError::Parse(e.to_string())
    }
}

/// Playback could not proceed.
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("Script error: {0}")]
    Script(#[from] ScriptError),

    #[error("Page error: {0}")]
    Page(#[from] PageError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}
