//! A live browser tab exposed through the playback effect seams.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};
use tourguide_protocols::{
    Document, ElementRef, HighlightOverlay, LauncherModel, LauncherView, Location, Navigator,
    PageError, PageEvent, PopupModel, PopupView, Rect, SpeechEngine, UiCommand, Utterance, Voice,
    mute_glyph,
};

use crate::cdp::{BindingCall, CdpError, CdpResponse, PageSession, SameDocumentNavigation};
use crate::scripts::{self, BINDING};

/// Browser tab driving one playback.
///
/// Overlay, popup and launcher nodes are created on first use in each
/// document and reused for every later step.
pub struct CdpPage {
    session: Arc<PageSession>,
    pump: Mutex<Option<JoinHandle<()>>>,
}

impl CdpPage {
    /// Install the command binding and start forwarding page events.
    pub async fn attach(
        session: Arc<PageSession>,
        events: mpsc::Sender<PageEvent>,
    ) -> Result<Arc<Self>, CdpError> {
        session.add_binding(BINDING).await?;
        let main_frame = session.main_frame_id().await?;

        let page = Arc::new(Self {
            session: session.clone(),
            pump: Mutex::new(None),
        });

        if let Some(raw) = session.take_events() {
            let handle = tokio::spawn(pump_events(raw, main_frame, events));
            *page.pump.lock() = Some(handle);
        } else {
            warn!("Event stream for session {} already taken", session.session_id());
        }

        Ok(page)
    }

    pub fn session(&self) -> &Arc<PageSession> {
        &self.session
    }

    async fn eval(&self, expression: &str) -> Result<Value, PageError> {
        Ok(self.session.evaluate(expression).await?)
    }

    async fn call_on(&self, element: ElementRef, function: &str) -> Result<Value, PageError> {
        let object_id = self.session.node_object_id(element.0).await?;
        Ok(self
            .session
            .call_function_on(&object_id, function, Vec::new())
            .await?)
    }
}

impl Drop for CdpPage {
    fn drop(&mut self) {
        if let Some(handle) = self.pump.lock().take() {
            handle.abort();
        }
    }
}

/// Forward CDP events as page events until either side goes away.
async fn pump_events(
    mut raw: mpsc::UnboundedReceiver<CdpResponse>,
    main_frame: String,
    events: mpsc::Sender<PageEvent>,
) {
    while let Some(resp) = raw.recv().await {
        let Some(event) = translate_event(&resp, &main_frame) else {
            continue;
        };
        trace!("Page event: {:?}", event);
        if events.send(event).await.is_err() {
            break;
        }
    }
    debug!("Page event stream ended");
}

/// Map one CDP event to a playback event.
///
/// A completed document load and a same-document navigation of the top
/// frame (hash routing) both count as a new page.
pub(crate) fn translate_event(resp: &CdpResponse, main_frame: &str) -> Option<PageEvent> {
    if resp.is_event("Page.loadEventFired") {
        return Some(PageEvent::Loaded);
    }

    if resp.is_event("Page.navigatedWithinDocument") {
        let nav: SameDocumentNavigation = serde_json::from_value(resp.params.clone()?).ok()?;
        return (nav.frame_id == main_frame).then_some(PageEvent::Loaded);
    }

    if resp.is_event("Runtime.bindingCalled") {
        let call: BindingCall = serde_json::from_value(resp.params.clone()?).ok()?;
        if call.name != BINDING {
            return None;
        }
        return match UiCommand::from_str(&call.payload) {
            Ok(command) => Some(PageEvent::Command(command)),
            Err(e) => {
                warn!("Ignoring page command: {}", e);
                None
            }
        };
    }

    None
}

#[async_trait]
impl Document for CdpPage {
    async fn query(
        &self,
        selector: &str,
        within: Option<ElementRef>,
    ) -> Result<Option<ElementRef>, PageError> {
        match self
            .session
            .query_selector(selector, within.map(|e| e.0))
            .await
        {
            Ok(node) => Ok(node.map(ElementRef)),
            Err(CdpError::Protocol { message, .. }) if message.contains("querying") => {
                Err(PageError::InvalidSelector(selector.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn scroll_into_view(&self, element: ElementRef) -> Result<(), PageError> {
        self.call_on(element, scripts::SCROLL_INTO_VIEW).await?;
        Ok(())
    }

    async fn bounding_rect(&self, element: ElementRef) -> Result<Rect, PageError> {
        let value = self.call_on(element, scripts::BOUNDING_RECT).await?;
        serde_json::from_value(value).map_err(|e| PageError::Script(e.to_string()))
    }

    async fn scroll_offset(&self) -> Result<(f64, f64), PageError> {
        let value = self.eval(scripts::SCROLL_OFFSET).await?;
        let x = value[0].as_f64().unwrap_or(0.0);
        let y = value[1].as_f64().unwrap_or(0.0);
        Ok((x, y))
    }

    async fn click(&self, element: ElementRef) -> Result<(), PageError> {
        self.call_on(element, scripts::CLICK).await?;
        Ok(())
    }
}

#[async_trait]
impl HighlightOverlay for CdpPage {
    async fn frame(&self, rect: Rect) -> Result<(), PageError> {
        self.eval(&scripts::frame_overlay(rect)).await?;
        Ok(())
    }

    async fn hide(&self) -> Result<(), PageError> {
        self.eval(&scripts::hide_overlay()).await?;
        Ok(())
    }
}

#[async_trait]
impl SpeechEngine for CdpPage {
    async fn is_available(&self) -> bool {
        match self.eval(scripts::SPEECH_AVAILABLE).await {
            Ok(value) => value.as_bool().unwrap_or(false),
            Err(e) => {
                debug!("Speech probe failed: {}", e);
                false
            }
        }
    }

    async fn voices(&self) -> Result<Vec<Voice>, PageError> {
        let value = self.eval(scripts::LIST_VOICES).await?;
        serde_json::from_value(value).map_err(|e| PageError::Script(e.to_string()))
    }

    async fn speak(&self, utterance: &Utterance) -> Result<(), PageError> {
        let spoken = self.eval(&scripts::speak(utterance)).await?;
        if spoken.as_bool() == Some(false) {
            return Err(PageError::SpeechUnavailable);
        }
        Ok(())
    }

    async fn cancel(&self) -> Result<(), PageError> {
        self.eval(scripts::CANCEL_SPEECH).await?;
        Ok(())
    }
}

#[async_trait]
impl PopupView for CdpPage {
    async fn show(&self, model: &PopupModel) -> Result<(), PageError> {
        self.eval(&scripts::show_popup(model)).await?;
        Ok(())
    }

    async fn hide(&self) -> Result<(), PageError> {
        self.eval(&scripts::hide_popup()).await?;
        Ok(())
    }

    async fn set_muted(&self, muted: bool) -> Result<(), PageError> {
        self.eval(&scripts::set_mute_glyph(mute_glyph(muted))).await?;
        Ok(())
    }

    async fn alert(&self, message: &str) -> Result<(), PageError> {
        self.eval(&scripts::alert(message)).await?;
        Ok(())
    }
}

#[async_trait]
impl LauncherView for CdpPage {
    async fn mount(&self, model: &LauncherModel) -> Result<(), PageError> {
        let created = self.eval(&scripts::mount_launcher(model)).await?;
        debug!("Launcher mounted (new: {})", created.as_bool().unwrap_or(false));
        Ok(())
    }

    async fn set_menu_open(&self, open: bool) -> Result<(), PageError> {
        self.eval(&scripts::set_menu_open(open)).await?;
        Ok(())
    }
}

#[async_trait]
impl Navigator for CdpPage {
    async fn location(&self) -> Result<Location, PageError> {
        let href = self.session.get_url().await?;
        Ok(Location::parse(&href))
    }

    async fn navigate(&self, href: &str) -> Result<(), PageError> {
        self.eval(&scripts::navigate(href))
            .await
            .map_err(|e| PageError::NavigationFailed(format!("{}: {}", href, e)))?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "page_tests.rs"]
mod tests;
