//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::{Config, StorageBackend};

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> Result<ValidationResult, ConfigError> {
        let mut result = ValidationResult::default();

        Self::validate_playback(config, &mut result);
        Self::validate_storage(config, &mut result);
        Self::validate_source(config, &mut result);
        Self::validate_narration(config, &mut result);
        Self::validate_driver(config, &mut result);

        Ok(result)
    }

    fn validate_playback(config: &Config, result: &mut ValidationResult) {
        let playback = &config.playback;

        if playback.default_step_ms == 0 {
            result.add_error(ValidationError::new(
                "playback.default_step_ms",
                "default_step_ms must be greater than 0",
            ));
        }

        if playback.overlay_padding_px < 0.0 {
            result.add_error(ValidationError::new(
                "playback.overlay_padding_px",
                "overlay_padding_px cannot be negative",
            ));
        }

        if playback.recommended_min_step_ms > playback.recommended_max_step_ms {
            result.add_error(ValidationError::new(
                "playback.recommended_min_step_ms",
                "recommended_min_step_ms is larger than recommended_max_step_ms",
            ));
        }

        if playback.settle_delay_ms > 2000 {
            result.add_warning(ValidationWarning::new(
                "playback.settle_delay_ms",
                "settle_delay_ms is very high (>2000), steps will feel sluggish",
            ));
        }
    }

    fn validate_storage(config: &Config, result: &mut ValidationResult) {
        let storage = &config.storage;

        if storage.mode_key.is_empty() || storage.step_key.is_empty() {
            result.add_error(ValidationError::new(
                "storage",
                "mode_key and step_key cannot be empty",
            ));
        } else if storage.mode_key == storage.step_key {
            result.add_error(ValidationError::new(
                "storage.step_key",
                "mode_key and step_key must differ",
            ));
        }

        match storage.backend_kind() {
            Ok(StorageBackend::File) if storage.path.is_none() => {
                result.add_warning(ValidationWarning::new(
                    "storage.path",
                    "File backend path not set, will use ~/.tourguide/resume.json",
                ));
            }
            Ok(_) => {}
            Err(_) => {
                result.add_error(ValidationError::new(
                    "storage.backend",
                    format!(
                        "Unknown storage backend '{}', valid values: {:?}",
                        storage.backend,
                        StorageBackend::NAMES
                    ),
                ));
            }
        }
    }

    fn validate_source(config: &Config, result: &mut ValidationResult) {
        let source = &config.source;

        if source.timeout_seconds == 0 {
            result.add_error(ValidationError::new(
                "source.timeout_seconds",
                "timeout_seconds must be greater than 0",
            ));
        }

        if let Some(id) = &source.project_id {
            if id.trim().is_empty() {
                result.add_error(ValidationError::new(
                    "source.project_id",
                    "project_id cannot be blank",
                ));
            }
            if !is_http_url(&source.api_base) {
                result.add_error(ValidationError::new(
                    "source.api_base",
                    "api_base must start with http:// or https://",
                ));
            }
        } else if source.script_path.is_empty() {
            result.add_error(ValidationError::new(
                "source.script_path",
                "script_path cannot be empty when no project_id is set",
            ));
        }
    }

    fn validate_narration(config: &Config, result: &mut ValidationResult) {
        let narration = &config.narration;

        if !(0.1..=10.0).contains(&narration.rate) {
            result.add_error(ValidationError::new(
                "narration.rate",
                "rate must be between 0.1 and 10",
            ));
        }

        if !(0.0..=2.0).contains(&narration.pitch) {
            result.add_error(ValidationError::new(
                "narration.pitch",
                "pitch must be between 0 and 2",
            ));
        }

        if narration.enabled && narration.language.is_empty() {
            result.add_warning(ValidationWarning::new(
                "narration.language",
                "language is empty, any installed voice will be used",
            ));
        }
    }

    fn validate_driver(config: &Config, result: &mut ValidationResult) {
        if !is_http_url(&config.driver.cdp_endpoint) {
            result.add_error(ValidationError::new(
                "driver.cdp_endpoint",
                "cdp_endpoint must start with http:// or https://",
            ));
        }

        if config.driver.page_load_timeout_seconds == 0 {
            result.add_error(ValidationError::new(
                "driver.page_load_timeout_seconds",
                "page_load_timeout_seconds must be greater than 0",
            ));
        }
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
