//! CDP error types.

use thiserror::Error;
use tourguide_protocols::{PageError, StoreError};

/// CDP client errors.
#[derive(Debug, Error)]
pub enum CdpError {
    /// Failed to connect to Chrome.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Chrome not found or not running with remote debugging.
    #[error("Chrome not available at {0}. Start Chrome with: chrome --remote-debugging-port=9222")]
    ChromeNotAvailable(String),

    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Error object returned by the browser for a command.
    #[error("CDP error: {message} (code: {code})")]
    Protocol { code: i64, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP error (for endpoint discovery).
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Page not found: {0}")]
    PageNotFound(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    /// Exception thrown by evaluated page script.
    #[error("JavaScript error: {0}")]
    JavaScript(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Session closed")]
    SessionClosed,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<tokio_tungstenite::tungstenite::Error> for CdpError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        CdpError::WebSocket(e.to_string())
    }
}

impl From<reqwest::Error> for CdpError {
    fn from(e: reqwest::Error) -> Self {
        CdpError::Http(e.to_string())
    }
}

impl From<url::ParseError> for CdpError {
    fn from(e: url::ParseError) -> Self {
        CdpError::ConnectionFailed(format!("Invalid URL: {}", e))
    }
}

impl From<CdpError> for PageError {
    fn from(e: CdpError) -> Self {
        match e {
            CdpError::JavaScript(msg) => PageError::Script(msg),
            CdpError::NavigationFailed(msg) => PageError::NavigationFailed(msg),
            // DOM commands report stale node ids this way.
            CdpError::Protocol { message, .. } if message.contains("node") => PageError::Detached,
            CdpError::Protocol { message, .. } => PageError::Script(message),
            CdpError::Serialization(e) => PageError::Script(e.to_string()),
            CdpError::InvalidResponse(msg) => PageError::Script(msg),
            other => PageError::Disconnected(other.to_string()),
        }
    }
}

impl From<CdpError> for StoreError {
    fn from(e: CdpError) -> Self {
        match e {
            CdpError::Serialization(e) => StoreError::Serialization(e.to_string()),
            other => StoreError::Unavailable(other.to_string()),
        }
    }
}
