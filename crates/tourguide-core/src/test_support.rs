//! Recording in-memory page for exercising the engine without a browser.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tourguide_protocols::{
    Document, ElementRef, HighlightOverlay, KeyValueStore, LauncherModel, LauncherView, Location,
    Navigator, PageEnvironment, PageError, PopupModel, PopupView, Rect, SpeechEngine, Utterance,
    Voice,
};
use tourguide_resume::MemoryKeyValueStore;

/// Observable side effects, in call order. Pure reads are not recorded.
#[derive(Debug, Clone, PartialEq)]
pub enum PageCall {
    ScrollIntoView(ElementRef),
    Frame(Rect),
    HideOverlay,
    Click(ElementRef),
    Speak(String),
    CancelSpeech,
    ShowPopup(PopupModel),
    HidePopup,
    SetMuted(bool),
    Alert(String),
    MountLauncher,
    SetMenuOpen(bool),
    Navigate(String),
}

#[derive(Default)]
struct Dom {
    next_id: i64,
    elements: HashMap<String, ElementRef>,
    scoped: HashMap<(ElementRef, String), ElementRef>,
    rects: HashMap<ElementRef, Rect>,
}

pub struct FakePage {
    location: Mutex<Location>,
    dom: Mutex<Dom>,
    scroll: Mutex<(f64, f64)>,
    speech_available: Mutex<bool>,
    voices: Mutex<Vec<Voice>>,
    navigation_fails: Mutex<bool>,
    calls: Mutex<Vec<PageCall>>,
}

impl FakePage {
    /// A page currently showing `href`.
    pub fn at(href: &str) -> Arc<Self> {
        Arc::new(Self {
            location: Mutex::new(Location::parse(href)),
            dom: Mutex::new(Dom::default()),
            scroll: Mutex::new((0.0, 0.0)),
            speech_available: Mutex::new(true),
            voices: Mutex::new(Vec::new()),
            navigation_fails: Mutex::new(false),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// An environment over this page and `storage`.
    pub fn environment(self: &Arc<Self>, storage: Arc<MemoryKeyValueStore>) -> PageEnvironment {
        PageEnvironment::from_page(self.clone(), storage as Arc<dyn KeyValueStore>)
    }

    pub fn add_element(&self, selector: &str, rect: Rect) -> ElementRef {
        let mut dom = self.dom.lock();
        dom.next_id += 1;
        let element = ElementRef(dom.next_id);
        dom.elements.insert(selector.to_string(), element);
        dom.rects.insert(element, rect);
        element
    }

    pub fn add_scoped_element(&self, parent: ElementRef, selector: &str, rect: Rect) -> ElementRef {
        let mut dom = self.dom.lock();
        dom.next_id += 1;
        let element = ElementRef(dom.next_id);
        dom.scoped.insert((parent, selector.to_string()), element);
        dom.rects.insert(element, rect);
        element
    }

    /// Simulate the document being replaced by a navigation.
    pub fn clear_dom(&self) {
        *self.dom.lock() = Dom::default();
    }

    pub fn set_scroll(&self, x: f64, y: f64) {
        *self.scroll.lock() = (x, y);
    }

    pub fn set_speech_available(&self, available: bool) {
        *self.speech_available.lock() = available;
    }

    pub fn set_voices(&self, voices: Vec<Voice>) {
        *self.voices.lock() = voices;
    }

    /// Make every later `navigate` fail and leave the location unchanged.
    pub fn set_navigation_fails(&self, fails: bool) {
        *self.navigation_fails.lock() = fails;
    }

    pub fn location(&self) -> Location {
        self.location.lock().clone()
    }

    pub fn calls(&self) -> Vec<PageCall> {
        self.calls.lock().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    pub fn popups(&self) -> Vec<PopupModel> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                PageCall::ShowPopup(model) => Some(model),
                _ => None,
            })
            .collect()
    }

    pub fn counters(&self) -> Vec<String> {
        self.popups().into_iter().map(|m| m.counter).collect()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                PageCall::Navigate(href) => Some(href),
                _ => None,
            })
            .collect()
    }

    pub fn spoken(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                PageCall::Speak(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                PageCall::Alert(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: PageCall) {
        self.calls.lock().push(call);
    }
}

#[async_trait]
impl Document for FakePage {
    async fn query(
        &self,
        selector: &str,
        within: Option<ElementRef>,
    ) -> Result<Option<ElementRef>, PageError> {
        if selector.contains("##") {
            return Err(PageError::InvalidSelector(selector.to_string()));
        }
        let dom = self.dom.lock();
        Ok(match within {
            Some(parent) => dom.scoped.get(&(parent, selector.to_string())).copied(),
            None => dom.elements.get(selector).copied(),
        })
    }

    async fn scroll_into_view(&self, element: ElementRef) -> Result<(), PageError> {
        self.record(PageCall::ScrollIntoView(element));
        Ok(())
    }

    async fn bounding_rect(&self, element: ElementRef) -> Result<Rect, PageError> {
        self.dom
            .lock()
            .rects
            .get(&element)
            .copied()
            .ok_or(PageError::Detached)
    }

    async fn scroll_offset(&self) -> Result<(f64, f64), PageError> {
        Ok(*self.scroll.lock())
    }

    async fn click(&self, element: ElementRef) -> Result<(), PageError> {
        self.record(PageCall::Click(element));
        Ok(())
    }
}

#[async_trait]
impl HighlightOverlay for FakePage {
    async fn frame(&self, rect: Rect) -> Result<(), PageError> {
        self.record(PageCall::Frame(rect));
        Ok(())
    }

    async fn hide(&self) -> Result<(), PageError> {
        self.record(PageCall::HideOverlay);
        Ok(())
    }
}

#[async_trait]
impl SpeechEngine for FakePage {
    async fn is_available(&self) -> bool {
        *self.speech_available.lock()
    }

    async fn voices(&self) -> Result<Vec<Voice>, PageError> {
        Ok(self.voices.lock().clone())
    }

    async fn speak(&self, utterance: &Utterance) -> Result<(), PageError> {
        self.record(PageCall::Speak(utterance.text.clone()));
        Ok(())
    }

    async fn cancel(&self) -> Result<(), PageError> {
        self.record(PageCall::CancelSpeech);
        Ok(())
    }
}

#[async_trait]
impl PopupView for FakePage {
    async fn show(&self, model: &PopupModel) -> Result<(), PageError> {
        self.record(PageCall::ShowPopup(model.clone()));
        Ok(())
    }

    async fn hide(&self) -> Result<(), PageError> {
        self.record(PageCall::HidePopup);
        Ok(())
    }

    async fn set_muted(&self, muted: bool) -> Result<(), PageError> {
        self.record(PageCall::SetMuted(muted));
        Ok(())
    }

    async fn alert(&self, message: &str) -> Result<(), PageError> {
        self.record(PageCall::Alert(message.to_string()));
        Ok(())
    }
}

#[async_trait]
impl LauncherView for FakePage {
    async fn mount(&self, _model: &LauncherModel) -> Result<(), PageError> {
        self.record(PageCall::MountLauncher);
        Ok(())
    }

    async fn set_menu_open(&self, open: bool) -> Result<(), PageError> {
        self.record(PageCall::SetMenuOpen(open));
        Ok(())
    }
}

#[async_trait]
impl Navigator for FakePage {
    async fn location(&self) -> Result<Location, PageError> {
        Ok(self.location.lock().clone())
    }

    async fn navigate(&self, href: &str) -> Result<(), PageError> {
        if *self.navigation_fails.lock() {
            return Err(PageError::NavigationFailed(href.to_string()));
        }
        self.record(PageCall::Navigate(href.to_string()));
        let mut location = self.location.lock();
        *location = match href.strip_prefix('#') {
            Some(hash) => Location::new(location.path.clone(), Some(hash.to_string())),
            None => Location::parse(href),
        };
        Ok(())
    }
}
