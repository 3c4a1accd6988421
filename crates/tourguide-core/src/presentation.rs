//! Popup and launcher chrome.
//!
//! Both are thin: the popup model is derived from the step position alone,
//! and the launcher's only state is whether its menu is open.

use std::sync::Arc;

use tourguide_protocols::{LauncherModel, LauncherView, PlaybackMode, PopupModel, PopupView};
use tracing::debug;

pub const LAUNCHER_TITLE: &str = "Start Project Tour";
pub const FULL_TOUR_LABEL: &str = "Start full tour";
pub const PAGE_TOUR_LABEL: &str = "Explain this page";
pub const NO_STEPS_MESSAGE: &str = "No tour steps found for this page.";

/// Build the popup model for step `index` of `total`.
pub fn popup_model(content: &str, index: usize, total: usize) -> PopupModel {
    let is_last = index + 1 >= total;
    PopupModel {
        content: content.to_string(),
        counter: format!("{} / {}", index + 1, total),
        prev_enabled: index > 0,
        next_label: if is_last { "Finish" } else { "Next" }.to_string(),
    }
}

/// The launcher's fixed menu.
pub fn launcher_model() -> LauncherModel {
    LauncherModel {
        title: LAUNCHER_TITLE.to_string(),
        options: vec![
            (PlaybackMode::Full, FULL_TOUR_LABEL.to_string()),
            (PlaybackMode::Page, PAGE_TOUR_LABEL.to_string()),
        ],
    }
}

/// Drives the popup view. Failures are logged, never raised.
#[derive(Clone)]
pub struct PopupPresenter {
    view: Arc<dyn PopupView>,
}

impl PopupPresenter {
    pub fn new(view: Arc<dyn PopupView>) -> Self {
        Self { view }
    }

    pub async fn show(&self, content: &str, index: usize, total: usize) {
        let model = popup_model(content, index, total);
        if let Err(e) = self.view.show(&model).await {
            debug!("Failed to show popup: {}", e);
        }
    }

    pub async fn hide(&self) {
        if let Err(e) = self.view.hide().await {
            debug!("Failed to hide popup: {}", e);
        }
    }

    pub async fn set_muted(&self, muted: bool) {
        if let Err(e) = self.view.set_muted(muted).await {
            debug!("Failed to update mute control: {}", e);
        }
    }

    pub async fn alert(&self, message: &str) {
        if let Err(e) = self.view.alert(message).await {
            debug!("Failed to show alert '{}': {}", message, e);
        }
    }
}

/// Launcher control and its open/closed mode menu.
pub struct LauncherMenu {
    view: Arc<dyn LauncherView>,
    open: bool,
}

impl LauncherMenu {
    pub fn new(view: Arc<dyn LauncherView>) -> Self {
        Self { view, open: false }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Install the launcher on a freshly loaded page. The menu starts closed.
    pub async fn mount(&mut self) {
        self.open = false;
        if let Err(e) = self.view.mount(&launcher_model()).await {
            debug!("Failed to mount launcher: {}", e);
        }
    }

    /// Launcher button pressed.
    pub async fn toggle(&mut self) {
        self.set_open(!self.open).await;
    }

    /// Outside click. Closes an open menu.
    pub async fn dismiss(&mut self) {
        if self.open {
            self.set_open(false).await;
        }
    }

    /// A mode was picked: close the menu and hand the mode back.
    pub async fn select(&mut self, mode: PlaybackMode) -> PlaybackMode {
        self.dismiss().await;
        mode
    }

    async fn set_open(&mut self, open: bool) {
        self.open = open;
        if let Err(e) = self.view.set_menu_open(open).await {
            debug!("Failed to toggle launcher menu: {}", e);
        }
    }
}
