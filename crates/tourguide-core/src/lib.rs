//! # Tourguide Core
//!
//! The playback engine: loads a script, then walks the visitor through it
//! one step at a time.
//!
//! ## Modules
//!
//! - [`loader`] / [`repair`] - fetch, parse and self-repair script documents
//! - [`locator`] - resolve targets and frame them with the overlay
//! - [`narration`] - speech with voice selection and mute
//! - [`presentation`] - popup and launcher models
//! - [`sequencer`] - the playback state machine
//! - [`timer`] - cancellable per-step auto-advance
//! - [`player`] - single-consumer loop that owns one sequencer per page load

pub mod error;
pub mod loader;
pub mod locator;
pub mod narration;
pub mod player;
pub mod presentation;
pub mod repair;
pub mod sequencer;
pub mod timer;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{PlaybackError, ScriptError};
pub use loader::{LoadedScript, ScriptLoader, ScriptSource};
pub use locator::ElementLocator;
pub use narration::{NarrationPrefs, Narrator};
pub use player::Player;
pub use presentation::{LauncherMenu, PopupPresenter};
pub use repair::{DurationPolicy, DurationWarning, RepairKind, RepairNote};
pub use sequencer::{Sequencer, SequencerSettings, StartOutcome};
pub use timer::{AutoAdvance, AutoAdvanceTimer};
