//! Page environment errors.

use thiserror::Error;

/// Errors raised by an effect implementation while touching the page.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Element is detached from the document")]
    Detached,

    #[error("Speech synthesis unavailable")]
    SpeechUnavailable,

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("Script evaluation failed: {0}")]
    Script(String),

    #[error("Page connection lost: {0}")]
    Disconnected(String),
}
