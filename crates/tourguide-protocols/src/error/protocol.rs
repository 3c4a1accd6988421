//! Protocol-level errors.

use thiserror::Error;

/// Errors raised when external input fails boundary validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Unknown playback mode: {0}")]
    UnknownMode(String),

    #[error("Unknown UI command: {0}")]
    UnknownCommand(String),
}
