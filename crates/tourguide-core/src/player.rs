//! Bootstrap and event loop.
//!
//! The player is the single consumer of everything that can drive playback:
//! page events (UI commands, document loads) and auto-advance tickets. It
//! processes them one at a time, so two sequencer operations never overlap.
//!
//! Each document load gets a brand new [`Sequencer`]; whatever the previous
//! one held in memory is gone, exactly as in a browser reload.

use std::sync::Arc;

use tokio::sync::mpsc;
use tourguide_protocols::{PageEnvironment, PageEvent, Script, UiCommand};
use tracing::{debug, info, warn};

use crate::presentation::LauncherMenu;
use crate::sequencer::{Sequencer, SequencerSettings};
use crate::timer::AutoAdvance;

pub struct Player {
    script: Arc<Script>,
    env: PageEnvironment,
    settings: SequencerSettings,
    launcher: LauncherMenu,
    sequencer: Sequencer,
    timer_tx: mpsc::UnboundedSender<AutoAdvance>,
    timer_rx: mpsc::UnboundedReceiver<AutoAdvance>,
}

impl Player {
    pub fn new(script: Arc<Script>, env: PageEnvironment, settings: SequencerSettings) -> Self {
        let (timer_tx, timer_rx) = mpsc::unbounded_channel();
        let sequencer = Sequencer::new(
            script.clone(),
            env.clone(),
            settings.clone(),
            timer_tx.clone(),
        );
        let launcher = LauncherMenu::new(env.launcher.clone());

        Self {
            script,
            env,
            settings,
            launcher,
            sequencer,
            timer_tx,
            timer_rx,
        }
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    /// Run until the event channel closes.
    ///
    /// The current document counts as freshly loaded, so the launcher is
    /// mounted and any persisted session resumes before the first event.
    pub async fn run(mut self, mut events: mpsc::Receiver<PageEvent>) {
        self.bootstrap().await;

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.handle_event(event).await,
                    None => break,
                },
                Some(tick) = self.timer_rx.recv() => {
                    self.sequencer.on_auto_advance(tick).await;
                }
            }
        }

        info!("Page event stream closed, player exiting");
    }

    /// Handle a single page event.
    pub async fn handle_event(&mut self, event: PageEvent) {
        match event {
            PageEvent::Loaded => self.on_page_loaded().await,
            PageEvent::Command(command) => self.handle_command(command).await,
        }
    }

    async fn on_page_loaded(&mut self) {
        debug!("Document loaded, rebuilding sequencer");
        self.sequencer = Sequencer::new(
            self.script.clone(),
            self.env.clone(),
            self.settings.clone(),
            self.timer_tx.clone(),
        );
        self.bootstrap().await;
        // Same-document routing keeps the popup node, and its mute glyph.
        self.sequencer.sync_mute_control().await;
    }

    /// Mount the launcher and resume a persisted session, if any.
    pub async fn bootstrap(&mut self) {
        self.launcher.mount().await;

        let resume = self.sequencer.resume_store();
        let state = match resume.is_resumable().await {
            Ok(true) => resume.read().await,
            Ok(false) => return,
            Err(e) => Err(e),
        };

        match state {
            Ok(Some(state)) => {
                info!("Resuming {} tour after page load", state.mode);
                let _ = self.sequencer.start(state.mode).await;
            }
            Ok(None) => {
                warn!("Discarding unusable persisted tour state");
                if let Err(e) = self.sequencer.resume_store().clear().await {
                    warn!("Failed to clear persisted tour state: {}", e);
                }
            }
            Err(e) => warn!("Could not read persisted tour state: {}", e),
        }
    }

    async fn handle_command(&mut self, command: UiCommand) {
        debug!("UI command: {:?}", command);
        match command {
            UiCommand::Start(mode) => {
                let mode = self.launcher.select(mode).await;
                let _ = self.sequencer.start(mode).await;
            }
            UiCommand::Next => self.sequencer.next().await,
            UiCommand::Prev => self.sequencer.prev().await,
            UiCommand::Close => self.sequencer.stop().await,
            UiCommand::ToggleMute => {
                self.sequencer.toggle_mute().await;
            }
            UiCommand::ToggleMenu => self.launcher.toggle().await,
            UiCommand::DismissMenu => self.launcher.dismiss().await,
            UiCommand::VoicesChanged => self.sequencer.narrator().refresh_voices().await,
        }
    }
}

#[cfg(test)]
#[path = "player_tests.rs"]
mod tests;
