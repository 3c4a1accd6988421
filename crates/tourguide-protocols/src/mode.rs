//! Playback mode definitions.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

/// Playback mode chosen from the launcher.
///
/// Mode strings coming from the page (launcher menu, persisted state) are
/// parsed into this closed set at the boundary, so an unrecognized value is
/// rejected before it can reach the sequencer.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackMode {
    /// Walk the whole multi-page tour from the script's entry location.
    #[default]
    Full,

    /// Only the steps tagged for the current page, always from the first one.
    Page,
}

impl PlaybackMode {
    /// Wire representation used by persisted state and the launcher.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaybackMode::Full => "full",
            PlaybackMode::Page => "page",
        }
    }

    /// Whether a persisted step index may be resumed in this mode.
    pub fn resumes_index(&self) -> bool {
        matches!(self, PlaybackMode::Full)
    }
}

impl std::fmt::Display for PlaybackMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlaybackMode {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "full" => Ok(PlaybackMode::Full),
            "page" => Ok(PlaybackMode::Page),
            other => Err(ProtocolError::UnknownMode(other.to_string())),
        }
    }
}
