//! Script data contract.
//!
//! A [`Script`] is the declarative tour document: metadata plus an ordered
//! list of [`Step`]s. Step order is playback order. The script is immutable
//! once handed to a sequencer.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::mode::PlaybackMode;
use crate::page::{Location, PageId};

/// Sentinel target meaning "the whole document" (nothing to highlight).
pub const WHOLE_DOCUMENT: &str = "body";

/// Root tour document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    /// Project metadata.
    pub meta: ScriptMeta,
    /// Ordered steps.
    pub steps: Vec<Step>,
}

/// Project metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptMeta {
    /// Project name.
    #[serde(default)]
    pub project: String,

    /// Author name.
    #[serde(default)]
    pub author: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tech_stack: Option<Vec<String>>,

    /// Canonical home location a full tour starts from.
    #[serde(default = "default_entry_url")]
    pub entry_url: String,
}

fn default_entry_url() -> String {
    "/".to_string()
}

impl Default for ScriptMeta {
    fn default() -> Self {
        Self {
            project: String::new(),
            author: String::new(),
            description: None,
            tech_stack: None,
            entry_url: default_entry_url(),
        }
    }
}

/// Step type. Determines required fields and side effects.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepType {
    Popup,
    Highlight,
    Click,
    Navigate,
}

impl StepType {
    /// Parse a wire name. Returns `None` for anything outside the closed set.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "popup" => Some(StepType::Popup),
            "highlight" => Some(StepType::Highlight),
            "click" => Some(StepType::Click),
            "navigate" => Some(StepType::Navigate),
            _ => None,
        }
    }

    /// Whether steps of this type must carry a real target.
    pub fn requires_target(&self) -> bool {
        matches!(self, StepType::Highlight | StepType::Click)
    }
}

impl std::fmt::Display for StepType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StepType::Popup => "popup",
            StepType::Highlight => "highlight",
            StepType::Click => "click",
            StepType::Navigate => "navigate",
        };
        f.write_str(name)
    }
}

/// Verb of a simulated action.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionVerb {
    Click,
    /// Any verb this engine does not know how to perform.
    #[serde(other)]
    Unsupported,
}

/// A side effect simulated after the popup is shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepAction {
    #[serde(rename = "do")]
    pub verb: ActionVerb,
    pub selector: String,
}

impl StepAction {
    /// Create a click action.
    pub fn click(selector: impl Into<String>) -> Self {
        Self {
            verb: ActionVerb::Click,
            selector: selector.into(),
        }
    }
}

/// One beat of the tour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Identifier, for logging only.
    pub id: String,

    #[serde(rename = "type")]
    pub step_type: StepType,

    /// Logical page this step belongs to. Absent means "applies everywhere".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,

    /// Element selector to highlight.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    /// Container selector scoping the target lookup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    /// Narration and popup text.
    #[serde(default)]
    pub content: String,

    /// Milliseconds before auto-advancing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<StepAction>,
}

impl Step {
    /// Create a popup step.
    pub fn popup(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            step_type: StepType::Popup,
            page: None,
            target: Some(WHOLE_DOCUMENT.to_string()),
            parent: None,
            content: content.into(),
            duration: None,
            actions: Vec::new(),
        }
    }

    /// Create a highlight step.
    pub fn highlight(
        id: impl Into<String>,
        target: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            step_type: StepType::Highlight,
            target: Some(target.into()),
            ..Self::popup(id, content)
        }
    }

    /// Set the page.
    pub fn on_page(mut self, page: impl Into<String>) -> Self {
        self.page = Some(page.into());
        self
    }

    /// Set the parent container selector.
    pub fn within(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Set the duration in milliseconds.
    pub fn with_duration(mut self, ms: u64) -> Self {
        self.duration = Some(ms);
        self
    }

    /// Append an action.
    pub fn with_action(mut self, action: StepAction) -> Self {
        self.actions.push(action);
        self
    }

    /// How long the step stays up, falling back to `default` when the
    /// declared duration is absent or zero.
    pub fn display_duration(&self, default: Duration) -> Duration {
        match self.duration {
            Some(ms) if ms > 0 => Duration::from_millis(ms),
            _ => default,
        }
    }

    /// Selector to highlight, or `None` when there is nothing to frame.
    pub fn highlight_target(&self) -> Option<&str> {
        if self.step_type == StepType::Popup {
            return None;
        }
        self.target
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty() && *t != WHOLE_DOCUMENT)
    }

    /// Page this step belongs to for page-mode filtering. Absent is home.
    pub fn page_id(&self) -> PageId {
        PageId::normalize(self.page.as_deref().unwrap_or_default())
    }

    /// Page the visitor must be on before this step renders in full mode.
    ///
    /// Only a non-empty declared page pins a step; absent or empty pages
    /// render wherever the visitor is.
    pub fn required_page(&self) -> Option<PageId> {
        self.page
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .map(PageId::normalize)
    }
}

impl Script {
    /// Create a script.
    pub fn new(meta: ScriptMeta, steps: Vec<Step>) -> Self {
        Self { meta, steps }
    }

    /// Page the entry URL points at. Absolute URLs resolve by path.
    pub fn entry_page(&self) -> PageId {
        Location::parse(&self.meta.entry_url).page_id()
    }

    /// Ordered sub-sequence of steps relevant to `mode` on `current`.
    ///
    /// Full mode keeps every step. Page mode keeps steps whose normalized
    /// page equals `current` exactly.
    pub fn filter_steps(&self, mode: PlaybackMode, current: &PageId) -> Vec<Step> {
        match mode {
            PlaybackMode::Full => self.steps.clone(),
            PlaybackMode::Page => self
                .steps
                .iter()
                .filter(|step| step.page_id() == *current)
                .cloned()
                .collect(),
        }
    }
}

#[cfg(test)]
#[path = "script_tests.rs"]
mod tests;
