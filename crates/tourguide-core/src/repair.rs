//! Self-repair pass over raw script documents.
//!
//! Generated scripts are not always well formed. Instead of rejecting a
//! document over one bad step, the loader normalizes what it can and records
//! each fix as a [`RepairNote`]. Only a document without a `steps` array is
//! rejected outright.

use std::fmt;
use std::time::Duration;

use serde_json::{Map, Value};
use tourguide_protocols::{
    ActionVerb, Script, ScriptMeta, Step, StepAction, StepType, WHOLE_DOCUMENT,
};
use tracing::warn;

use crate::error::ScriptError;

/// What was wrong with a document or step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepairKind {
    /// `meta` absent or malformed; replaced with defaults.
    MissingMeta,
    /// Step was not a JSON object and was dropped.
    DroppedStep,
    /// `id` absent; a positional id was assigned.
    MissingId,
    /// `type` outside the known set; converted to a popup.
    UnknownType(String),
    /// Highlight or click step without a target; converted to a popup.
    MissingTarget,
    /// `content` absent or not text.
    MissingContent,
    /// `duration` not a positive number; the default will apply.
    InvalidDuration(String),
    /// An action entry without a verb or selector was dropped.
    MalformedAction,
}

/// One fix applied while loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairNote {
    /// Position in the raw `steps` array, when the fix concerns a step.
    pub step: Option<usize>,
    pub kind: RepairKind,
}

impl fmt::Display for RepairNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(step) = self.step {
            write!(f, "step {}: ", step + 1)?;
        }
        match &self.kind {
            RepairKind::MissingMeta => f.write_str("meta missing, using defaults"),
            RepairKind::DroppedStep => f.write_str("not an object, dropped"),
            RepairKind::MissingId => f.write_str("id missing, assigned one"),
            RepairKind::UnknownType(t) => write!(f, "unknown type '{}', using popup", t),
            RepairKind::MissingTarget => f.write_str("target missing, converted to popup"),
            RepairKind::MissingContent => f.write_str("content missing, using empty text"),
            RepairKind::InvalidDuration(d) => {
                write!(f, "invalid duration {}, using default", d)
            }
            RepairKind::MalformedAction => f.write_str("malformed action dropped"),
        }
    }
}

/// Turn a raw JSON document into a [`Script`], repairing what can be repaired.
///
/// A `{ "data": <script> }` envelope, as returned by the storage backend, is
/// unwrapped first.
pub fn repair_document(value: Value) -> Result<(Script, Vec<RepairNote>), ScriptError> {
    let Value::Object(mut root) = value else {
        return Err(ScriptError::NotAnObject);
    };

    if !root.contains_key("steps") {
        if let Some(Value::Object(inner)) = root.remove("data") {
            root = inner;
        }
    }

    let mut notes = Vec::new();

    let meta = match root.remove("meta") {
        Some(raw @ Value::Object(_)) => serde_json::from_value::<ScriptMeta>(raw)
            .unwrap_or_else(|e| {
                warn!("Script meta is malformed ({}), using defaults", e);
                notes.push(RepairNote {
                    step: None,
                    kind: RepairKind::MissingMeta,
                });
                ScriptMeta::default()
            }),
        _ => {
            notes.push(RepairNote {
                step: None,
                kind: RepairKind::MissingMeta,
            });
            ScriptMeta::default()
        }
    };

    let Some(Value::Array(raw_steps)) = root.remove("steps") else {
        return Err(ScriptError::MissingSteps);
    };

    let mut steps = Vec::with_capacity(raw_steps.len());
    for (position, raw) in raw_steps.into_iter().enumerate() {
        match raw {
            Value::Object(fields) => steps.push(repair_step(position, fields, &mut notes)),
            _ => notes.push(RepairNote {
                step: Some(position),
                kind: RepairKind::DroppedStep,
            }),
        }
    }

    for note in &notes {
        warn!("Script repaired: {}", note);
    }

    Ok((Script::new(meta, steps), notes))
}

fn repair_step(position: usize, fields: Map<String, Value>, notes: &mut Vec<RepairNote>) -> Step {
    let mut note = |kind| {
        notes.push(RepairNote {
            step: Some(position),
            kind,
        })
    };

    let id = match non_empty_str(fields.get("id")) {
        Some(id) => id.to_string(),
        None => {
            note(RepairKind::MissingId);
            format!("step-{}", position + 1)
        }
    };

    let raw_type = fields.get("type").and_then(Value::as_str).unwrap_or_default();
    let mut step_type = StepType::from_name(raw_type).unwrap_or_else(|| {
        note(RepairKind::UnknownType(raw_type.to_string()));
        StepType::Popup
    });

    let mut target = non_empty_str(fields.get("target")).map(str::to_string);
    if target.is_none() {
        if step_type.requires_target() {
            note(RepairKind::MissingTarget);
            step_type = StepType::Popup;
        }
        if step_type == StepType::Popup {
            target = Some(WHOLE_DOCUMENT.to_string());
        }
    }

    let content = match fields.get("content") {
        Some(Value::String(text)) => text.clone(),
        _ => {
            note(RepairKind::MissingContent);
            String::new()
        }
    };

    let duration = match fields.get("duration") {
        None | Some(Value::Null) => None,
        Some(raw) => match positive_millis(raw) {
            Some(ms) => Some(ms),
            None => {
                note(RepairKind::InvalidDuration(raw.to_string()));
                None
            }
        },
    };

    let mut actions = Vec::new();
    if let Some(Value::Array(raw_actions)) = fields.get("actions") {
        for raw in raw_actions {
            match parse_action(raw) {
                Some(action) => actions.push(action),
                None => note(RepairKind::MalformedAction),
            }
        }
    }

    Step {
        id,
        step_type,
        page: fields.get("page").and_then(Value::as_str).map(str::to_string),
        target,
        parent: non_empty_str(fields.get("parent")).map(str::to_string),
        content,
        duration,
        actions,
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn positive_millis(value: &Value) -> Option<u64> {
    let ms = value.as_f64()?;
    (ms.is_finite() && ms >= 1.0).then(|| ms.round() as u64)
}

fn parse_action(value: &Value) -> Option<StepAction> {
    let verb = value.get("do")?.as_str()?;
    let selector = non_empty_str(value.get("selector"))?;
    let verb = match verb {
        "click" => ActionVerb::Click,
        _ => ActionVerb::Unsupported,
    };
    Some(StepAction {
        verb,
        selector: selector.to_string(),
    })
}

/// Recommended on-screen time for a step, derived from its narration length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationPolicy {
    pub min_ms: u64,
    pub max_ms: u64,
}

/// Milliseconds of reading time per word.
const MS_PER_WORD: u64 = 400;
/// Fixed lead-in added to every step.
const BASE_MS: u64 = 2000;

impl Default for DurationPolicy {
    fn default() -> Self {
        Self {
            min_ms: 6000,
            max_ms: 15000,
        }
    }
}

impl DurationPolicy {
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    /// `words * 400 + 2000` ms, clamped to the policy range.
    pub fn recommend(&self, content: &str) -> Duration {
        let words = content.split_whitespace().count() as u64;
        let ms = (words * MS_PER_WORD + BASE_MS).clamp(self.min_ms, self.max_ms);
        Duration::from_millis(ms)
    }

    /// Steps whose declared duration falls outside the policy range.
    pub fn check(&self, script: &Script) -> Vec<DurationWarning> {
        script
            .steps
            .iter()
            .enumerate()
            .filter_map(|(index, step)| {
                let declared = step.duration?;
                if (self.min_ms..=self.max_ms).contains(&declared) {
                    return None;
                }
                Some(DurationWarning {
                    index,
                    step_id: step.id.clone(),
                    declared_ms: declared,
                    recommended: self.recommend(&step.content),
                })
            })
            .collect()
    }
}

/// A declared step duration outside the recommended range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DurationWarning {
    pub index: usize,
    pub step_id: String,
    pub declared_ms: u64,
    pub recommended: Duration,
}

impl fmt::Display for DurationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "step {} ({}): duration {}ms outside recommended range, suggest {}ms",
            self.index + 1,
            self.step_id,
            self.declared_ms,
            self.recommended.as_millis()
        )
    }
}

#[cfg(test)]
#[path = "repair_tests.rs"]
mod tests;
