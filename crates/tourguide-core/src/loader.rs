//! Script sources and loading.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Client;
use tourguide_config::SourceConfig;
use tourguide_protocols::Script;
use tracing::{debug, info};
use url::Url;

use crate::error::ScriptError;
use crate::repair::{RepairNote, repair_document};

/// Where a script document is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptSource {
    /// A local JSON file.
    File(PathBuf),
    /// A static document or storage-backend endpoint reachable over HTTP.
    Url(String),
}

impl ScriptSource {
    /// Resolve the configured source.
    ///
    /// A project id selects `<api_base>/<project_id>`. Otherwise the script
    /// path is used: absolute URLs as-is, an existing local file next, and
    /// finally the path resolved against `page_url` the way a browser would
    /// resolve a relative fetch.
    pub fn resolve(config: &SourceConfig, page_url: Option<&str>) -> Self {
        if let Some(project_id) = config.project_id.as_deref().map(str::trim) {
            if !project_id.is_empty() {
                return Self::Url(format!(
                    "{}/{}",
                    config.api_base.trim_end_matches('/'),
                    project_id
                ));
            }
        }

        let script_path = config.script_path.as_str();
        if script_path.starts_with("http://") || script_path.starts_with("https://") {
            return Self::Url(script_path.to_string());
        }

        let local = Path::new(script_path);
        if local.exists() {
            return Self::File(local.to_path_buf());
        }

        if let Some(joined) = page_url
            .and_then(|base| Url::parse(base).ok())
            .and_then(|base| base.join(script_path).ok())
        {
            return Self::Url(joined.to_string());
        }

        Self::File(local.to_path_buf())
    }

    fn describe(&self) -> String {
        match self {
            ScriptSource::File(path) => path.display().to_string(),
            ScriptSource::Url(url) => url.clone(),
        }
    }
}

/// A loaded script plus the repairs applied to it.
#[derive(Debug, Clone)]
pub struct LoadedScript {
    pub script: Script,
    pub repairs: Vec<RepairNote>,
}

/// Fetches, parses and repairs script documents.
pub struct ScriptLoader {
    client: Client,
}

impl ScriptLoader {
    /// Create a loader whose HTTP requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, ScriptError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("tourguide/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    /// Create a loader from the `[source]` section.
    pub fn from_config(config: &SourceConfig) -> Result<Self, ScriptError> {
        Self::new(Duration::from_secs(config.timeout_seconds))
    }

    /// Fetch, parse and repair a script.
    pub async fn load(&self, source: &ScriptSource) -> Result<LoadedScript, ScriptError> {
        let body = match source {
            ScriptSource::File(path) => self.read_file(path).await?,
            ScriptSource::Url(url) => self.fetch(url).await?,
        };

        let value: serde_json::Value = serde_json::from_str(&body)?;
        let (script, repairs) = repair_document(value)?;

        info!(
            "Loaded script '{}' from {} ({} steps, {} repairs)",
            script.meta.project,
            source.describe(),
            script.steps.len(),
            repairs.len()
        );

        Ok(LoadedScript { script, repairs })
    }

    async fn read_file(&self, path: &Path) -> Result<String, ScriptError> {
        if !path.exists() {
            return Err(ScriptError::NotFound(path.display().to_string()));
        }
        Ok(tokio::fs::read_to_string(path).await?)
    }

    async fn fetch(&self, url: &str) -> Result<String, ScriptError> {
        debug!("Fetching script from {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ScriptError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            return Err(ScriptError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
