//! Effect seams between the sequencer and the host page.
//!
//! The sequencer's decision logic never touches a browser directly. Every
//! side effect (element lookup, the highlight frame, speech, the popup,
//! navigation, durable storage) goes through one of these traits so the
//! state machine can run against a real page or a recording fake.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{PageError, StoreError};
use crate::mode::PlaybackMode;
use crate::page::Location;

/// Opaque handle to an element in the current document.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub struct ElementRef(pub i64);

/// Axis-aligned rectangle in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Move the rectangle by an offset.
    pub fn translate(self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..self
        }
    }

    /// Grow the rectangle by `padding` on every side.
    pub fn inflate(self, padding: f64) -> Self {
        Self {
            x: self.x - padding,
            y: self.y - padding,
            width: self.width + padding * 2.0,
            height: self.height + padding * 2.0,
        }
    }
}

/// Element lookup and interaction in the live document.
#[async_trait]
pub trait Document: Send + Sync {
    /// Resolve `selector`, optionally scoped under `within`.
    async fn query(
        &self,
        selector: &str,
        within: Option<ElementRef>,
    ) -> Result<Option<ElementRef>, PageError>;

    /// Smoothly scroll the element to the viewport center.
    async fn scroll_into_view(&self, element: ElementRef) -> Result<(), PageError>;

    /// Live bounding rectangle, relative to the viewport.
    async fn bounding_rect(&self, element: ElementRef) -> Result<Rect, PageError>;

    /// Current window scroll offsets `(x, y)`.
    async fn scroll_offset(&self) -> Result<(f64, f64), PageError>;

    /// Dispatch a click on the element.
    async fn click(&self, element: ElementRef) -> Result<(), PageError>;
}

/// The single persistent highlight frame.
#[async_trait]
pub trait HighlightOverlay: Send + Sync {
    /// Position the frame at a document-relative rectangle and show it.
    async fn frame(&self, rect: Rect) -> Result<(), PageError>;

    /// Hide the frame.
    async fn hide(&self) -> Result<(), PageError>;
}

/// An installed text-to-speech voice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    pub name: String,
    pub lang: String,
}

impl Voice {
    pub fn new(name: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lang: lang.into(),
        }
    }
}

/// A single utterance request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utterance {
    pub text: String,
    pub voice: Option<Voice>,
    pub rate: f32,
    pub pitch: f32,
}

/// Text-to-speech backend.
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    /// Whether the environment has any speech capability at all.
    async fn is_available(&self) -> bool;

    /// Installed voices. May be empty until the backend finishes loading.
    async fn voices(&self) -> Result<Vec<Voice>, PageError>;

    /// Queue an utterance.
    async fn speak(&self, utterance: &Utterance) -> Result<(), PageError>;

    /// Cancel anything queued or playing.
    async fn cancel(&self) -> Result<(), PageError>;
}

/// Everything the popup card displays for one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopupModel {
    pub content: String,
    /// Position indicator, e.g. `2 / 5`.
    pub counter: String,
    pub prev_enabled: bool,
    pub next_label: String,
}

/// Mute control label for the given state.
pub fn mute_glyph(muted: bool) -> &'static str {
    if muted { "\u{1F507}" } else { "\u{1F50A}" }
}

/// The popup card.
#[async_trait]
pub trait PopupView: Send + Sync {
    async fn show(&self, model: &PopupModel) -> Result<(), PageError>;

    async fn hide(&self) -> Result<(), PageError>;

    /// Reflect the narration mute state on the mute control.
    async fn set_muted(&self, muted: bool) -> Result<(), PageError>;

    /// Show a one-off message to the visitor.
    async fn alert(&self, message: &str) -> Result<(), PageError>;
}

/// The launcher control and its mode menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LauncherModel {
    pub title: String,
    pub options: Vec<(PlaybackMode, String)>,
}

/// The fixed-position launcher control.
#[async_trait]
pub trait LauncherView: Send + Sync {
    /// Install the launcher if it is not already present.
    async fn mount(&self, model: &LauncherModel) -> Result<(), PageError>;

    async fn set_menu_open(&self, open: bool) -> Result<(), PageError>;
}

/// Location access and full-page navigation.
#[async_trait]
pub trait Navigator: Send + Sync {
    async fn location(&self) -> Result<Location, PageError>;

    /// Start a full navigation. The current page context is torn down.
    async fn navigate(&self, href: &str) -> Result<(), PageError>;
}

/// Durable string key/value storage surviving full page reloads.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// The set of effect implementations bound to one page load.
#[derive(Clone)]
pub struct PageEnvironment {
    pub document: Arc<dyn Document>,
    pub overlay: Arc<dyn HighlightOverlay>,
    pub speech: Arc<dyn SpeechEngine>,
    pub popup: Arc<dyn PopupView>,
    pub launcher: Arc<dyn LauncherView>,
    pub navigator: Arc<dyn Navigator>,
    pub storage: Arc<dyn KeyValueStore>,
}

impl PageEnvironment {
    /// Build an environment where a single page object provides every seam
    /// except storage.
    pub fn from_page<P>(page: Arc<P>, storage: Arc<dyn KeyValueStore>) -> Self
    where
        P: Document
            + HighlightOverlay
            + SpeechEngine
            + PopupView
            + LauncherView
            + Navigator
            + 'static,
    {
        Self {
            document: page.clone(),
            overlay: page.clone(),
            speech: page.clone(),
            popup: page.clone(),
            launcher: page.clone(),
            navigator: page,
            storage,
        }
    }
}
