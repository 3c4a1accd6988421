//! # Tourguide Protocols
//!
//! Core protocol definitions for the tourguide playback engine.
//! Contains the script data contract and the effect seams the
//! sequencer drives - no browser-specific implementations.
//!
//! ## Core Types
//!
//! - [`Script`] / [`Step`] - the declarative tour document
//! - [`PlaybackMode`] - full tour vs. current page only
//! - [`PageId`] / [`Location`] - logical page identity and matching
//! - [`UiCommand`] - closed set of commands the presentation surface emits
//!
//! ## Effect Traits
//!
//! - [`Document`] - element lookup, geometry, scrolling, clicking
//! - [`HighlightOverlay`] - the persistent highlight frame
//! - [`SpeechEngine`] - text-to-speech backend
//! - [`PopupView`] / [`LauncherView`] - visual chrome
//! - [`Navigator`] - location access and full navigation
//! - [`KeyValueStore`] - durable storage surviving page reloads

pub mod command;
pub mod environment;
pub mod error;
pub mod mode;
pub mod page;
pub mod script;

pub use command::{PageEvent, UiCommand};
pub use environment::{
    Document, ElementRef, HighlightOverlay, KeyValueStore, LauncherModel, LauncherView,
    Navigator, PageEnvironment, PopupModel, PopupView, Rect, SpeechEngine, Utterance, Voice,
    mute_glyph,
};
pub use error::{PageError, ProtocolError, StoreError};
pub use mode::PlaybackMode;
pub use page::{Location, PageId};
pub use script::{ActionVerb, Script, ScriptMeta, Step, StepAction, StepType, WHOLE_DOCUMENT};
