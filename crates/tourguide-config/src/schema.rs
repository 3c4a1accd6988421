//! Configuration schema definitions.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub playback: PlaybackConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub narration: NarrationConfig,

    #[serde(default)]
    pub driver: DriverConfig,
}

/// Step timing and highlight geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Auto-advance delay for steps without a usable duration.
    #[serde(default = "default_step_ms")]
    pub default_step_ms: u64,

    /// Wait before measuring element geometry on a freshly rendered step.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Padding around the highlighted element, in CSS pixels.
    #[serde(default = "default_overlay_padding_px")]
    pub overlay_padding_px: f64,

    #[serde(default = "default_recommended_min_step_ms")]
    pub recommended_min_step_ms: u64,

    #[serde(default = "default_recommended_max_step_ms")]
    pub recommended_max_step_ms: u64,
}

impl PlaybackConfig {
    pub fn default_step(&self) -> Duration {
        Duration::from_millis(self.default_step_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            default_step_ms: default_step_ms(),
            settle_delay_ms: default_settle_delay_ms(),
            overlay_padding_px: default_overlay_padding_px(),
            recommended_min_step_ms: default_recommended_min_step_ms(),
            recommended_max_step_ms: default_recommended_max_step_ms(),
        }
    }
}

fn default_step_ms() -> u64 {
    5000
}

fn default_settle_delay_ms() -> u64 {
    100
}

fn default_overlay_padding_px() -> f64 {
    4.0
}

fn default_recommended_min_step_ms() -> u64 {
    6000
}

fn default_recommended_max_step_ms() -> u64 {
    15000
}

/// Where resume state is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// The page's own `localStorage`.
    Page,
    /// A JSON file on disk.
    File,
    /// Process memory; lost on exit.
    Memory,
}

impl StorageBackend {
    pub const NAMES: [&'static str; 3] = ["page", "file", "memory"];
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "page" => Ok(StorageBackend::Page),
            "file" => Ok(StorageBackend::File),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(ConfigError::InvalidValue {
                field: "storage.backend".to_string(),
                message: format!("unknown backend '{}'", other),
            }),
        }
    }
}

/// Resume state storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_mode_key")]
    pub mode_key: String,

    #[serde(default = "default_step_key")]
    pub step_key: String,

    #[serde(default = "default_backend")]
    pub backend: String,

    /// File for the `file` backend.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl StorageConfig {
    /// Parsed backend kind.
    pub fn backend_kind(&self) -> Result<StorageBackend, ConfigError> {
        self.backend.parse()
    }

    /// File store location, falling back to `~/.tourguide/resume.json`.
    pub fn resolved_path(&self) -> PathBuf {
        match &self.path {
            Some(path) => PathBuf::from(crate::ConfigLoader::expand_path(
                &path.to_string_lossy(),
            )),
            None => PathBuf::from(crate::ConfigLoader::expand_path("~/.tourguide/resume.json")),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            mode_key: default_mode_key(),
            step_key: default_step_key(),
            backend: default_backend(),
            path: None,
        }
    }
}

fn default_mode_key() -> String {
    "tourguide-mode".to_string()
}

fn default_step_key() -> String {
    "tourguide-step".to_string()
}

fn default_backend() -> String {
    "page".to_string()
}

/// Where the script document comes from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Static document, resolved relative to the page when not absolute.
    #[serde(default = "default_script_path")]
    pub script_path: String,

    /// Storage backend base URL; the project id is appended.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// When set, the script is fetched from `api_base` instead of `script_path`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,

    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            script_path: default_script_path(),
            api_base: default_api_base(),
            project_id: None,
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

fn default_script_path() -> String {
    "presentation.json".to_string()
}

fn default_api_base() -> String {
    "https://project-pa.onrender.com/api/presentations".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

/// Text-to-speech preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrationConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Language prefix voices are matched against.
    #[serde(default = "default_language")]
    pub language: String,

    /// Substring of the preferred voice name.
    #[serde(default = "default_preferred_voice")]
    pub preferred_voice: String,

    #[serde(default = "default_speech_rate")]
    pub rate: f32,

    #[serde(default = "default_speech_pitch")]
    pub pitch: f32,
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            language: default_language(),
            preferred_voice: default_preferred_voice(),
            rate: default_speech_rate(),
            pitch: default_speech_pitch(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_language() -> String {
    "en".to_string()
}

fn default_preferred_voice() -> String {
    "Google".to_string()
}

fn default_speech_rate() -> f32 {
    1.0
}

fn default_speech_pitch() -> f32 {
    1.0
}

/// Browser connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverConfig {
    #[serde(default = "default_cdp_endpoint")]
    pub cdp_endpoint: String,

    #[serde(default = "default_page_load_timeout")]
    pub page_load_timeout_seconds: u64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            cdp_endpoint: default_cdp_endpoint(),
            page_load_timeout_seconds: default_page_load_timeout(),
        }
    }
}

fn default_cdp_endpoint() -> String {
    "http://localhost:9222".to_string()
}

fn default_page_load_timeout() -> u64 {
    30
}
