//! The playback state machine.
//!
//! A [`Sequencer`] lives for exactly one page load. It is `Idle` until
//! `start`, `Active` while a step is on screen, and back to `Idle` after
//! `stop` or a cross-page redirect. A redirect tears the page down, so the
//! only thing that survives it is the persisted `{mode, stepIndex}` pair; the
//! next page load builds a fresh sequencer which picks the pair back up.
//!
//! Every public transition cancels the pending auto-advance before doing
//! anything else, so a timer from a superseded step can never fire.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tourguide_config::Config;
use tourguide_protocols::{
    ActionVerb, Location, PageEnvironment, PageError, PlaybackMode, Script, Step,
};
use tourguide_resume::{ResumeKeys, ResumeState, ResumeStore};
use tracing::{debug, error, info, warn};

use crate::error::PlaybackError;
use crate::locator::ElementLocator;
use crate::narration::{NarrationPrefs, Narrator};
use crate::presentation::{NO_STEPS_MESSAGE, PopupPresenter};
use crate::timer::{AutoAdvance, AutoAdvanceTimer};

/// Tunables for one sequencer.
#[derive(Debug, Clone)]
pub struct SequencerSettings {
    /// Display time for steps without a usable duration.
    pub default_step: Duration,
    /// Wait before measuring a step's target.
    pub settle_delay: Duration,
    pub overlay_padding: f64,
    pub narration: NarrationPrefs,
    pub keys: ResumeKeys,
}

impl Default for SequencerSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for SequencerSettings {
    fn from(config: &Config) -> Self {
        Self {
            default_step: config.playback.default_step(),
            settle_delay: config.playback.settle_delay(),
            overlay_padding: config.playback.overlay_padding_px,
            narration: NarrationPrefs::from(&config.narration),
            keys: ResumeKeys::from(&config.storage),
        }
    }
}

/// Result of `start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// Playback is active and step `index` was rendered.
    Started { index: usize },
    /// Playback continues on another page after this navigation.
    Redirected { href: String },
    /// The filtered step list was empty.
    NoSteps,
}

#[derive(Debug, Clone)]
enum State {
    Idle,
    Active(Session),
}

#[derive(Debug, Clone)]
struct Session {
    mode: PlaybackMode,
    steps: Vec<Step>,
    index: usize,
}

/// Owns mode, cursor and auto-advance for one page load.
pub struct Sequencer {
    script: Arc<Script>,
    env: PageEnvironment,
    settings: SequencerSettings,
    resume: ResumeStore,
    locator: ElementLocator,
    narrator: Narrator,
    popup: PopupPresenter,
    timer: AutoAdvanceTimer,
    state: State,
}

impl Sequencer {
    pub fn new(
        script: Arc<Script>,
        env: PageEnvironment,
        settings: SequencerSettings,
        timer_tx: mpsc::UnboundedSender<AutoAdvance>,
    ) -> Self {
        let resume = ResumeStore::new(env.storage.clone(), settings.keys.clone());
        let locator = ElementLocator::new(
            env.document.clone(),
            env.overlay.clone(),
            settings.overlay_padding,
        );
        let narrator = Narrator::new(env.speech.clone(), settings.narration.clone());
        let popup = PopupPresenter::new(env.popup.clone());

        Self {
            script,
            env,
            settings,
            resume,
            locator,
            narrator,
            popup,
            timer: AutoAdvanceTimer::new(timer_tx),
            state: State::Idle,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, State::Active(_))
    }

    pub fn mode(&self) -> Option<PlaybackMode> {
        match &self.state {
            State::Active(session) => Some(session.mode),
            State::Idle => None,
        }
    }

    /// Current step index while active.
    pub fn current_index(&self) -> Option<usize> {
        match &self.state {
            State::Active(session) => Some(session.index),
            State::Idle => None,
        }
    }

    pub fn narrator(&self) -> &Narrator {
        &self.narrator
    }

    pub fn resume_store(&self) -> &ResumeStore {
        &self.resume
    }

    /// Begin playback in `mode`.
    ///
    /// Failures that prevent starting are shown to the visitor and leave the
    /// sequencer idle. Whenever a start ends idle, chrome left over from a
    /// previous session is torn down.
    pub async fn start(&mut self, mode: PlaybackMode) -> Result<StartOutcome, PlaybackError> {
        self.timer.cancel();
        self.state = State::Idle;

        let result = self.try_start(mode).await;
        if !self.is_active() {
            self.clear_chrome().await;
        }

        if let Err(e) = &result {
            error!("Failed to start {} tour: {}", mode, e);
            self.popup
                .alert(&format!("Unable to start the tour: {}", e))
                .await;
        }
        result
    }

    async fn try_start(&mut self, mode: PlaybackMode) -> Result<StartOutcome, PlaybackError> {
        let location = self.env.navigator.location().await?;
        let current = location.page_id();

        let steps = self.script.filter_steps(mode, &current);
        if steps.is_empty() {
            info!("No {} tour steps for page {}", mode, current);
            self.popup.alert(NO_STEPS_MESSAGE).await;
            // A stale resume pair would otherwise re-trigger this on every load.
            self.forget_progress().await;
            return Ok(StartOutcome::NoSteps);
        }

        let persisted = match self.resume.read().await {
            Ok(state) => state,
            Err(e) => {
                warn!("Resume state unreadable, starting fresh: {}", e);
                None
            }
        };
        let full_resume = persisted.filter(|s| s.mode == PlaybackMode::Full);

        if mode == PlaybackMode::Full {
            let entry = self.script.entry_page();
            if current != entry && full_resume.is_none() {
                let href = self.script.meta.entry_url.clone();
                info!("Full tour starts at {}, redirecting from {}", entry, current);
                self.resume
                    .write(ResumeState::new(PlaybackMode::Full, 0))
                    .await?;
                if let Err(e) = self.env.navigator.navigate(&href).await {
                    // The visitor stays here; nothing may resume on the next load.
                    self.forget_progress().await;
                    return Err(e.into());
                }
                return Ok(StartOutcome::Redirected { href });
            }
        }

        let index = match full_resume {
            Some(state) if mode.resumes_index() => {
                if state.step_index < steps.len() {
                    state.step_index
                } else {
                    debug!(
                        "Persisted index {} out of range for {} steps, using 0",
                        state.step_index,
                        steps.len()
                    );
                    0
                }
            }
            _ => 0,
        };

        info!(
            "Starting {} tour at step {} of {}",
            mode,
            index + 1,
            steps.len()
        );
        self.state = State::Active(Session { mode, steps, index });
        self.persist_position().await;

        match self.render(Some(location)).await {
            Some(href) => Ok(StartOutcome::Redirected { href }),
            None => Ok(StartOutcome::Started { index }),
        }
    }

    /// Advance, or finish on the last step.
    pub async fn next(&mut self) {
        self.timer.cancel();
        let State::Active(session) = &mut self.state else {
            return;
        };

        if session.index + 1 < session.steps.len() {
            session.index += 1;
            debug!("Advancing to step {}", session.index + 1);
            self.persist_position().await;
            self.render(None).await;
        } else {
            info!("Tour finished");
            self.stop().await;
        }
    }

    /// Go back one step. No-op on the first step.
    pub async fn prev(&mut self) {
        self.timer.cancel();
        let State::Active(session) = &mut self.state else {
            return;
        };

        if session.index == 0 {
            return;
        }

        session.index -= 1;
        debug!("Retreating to step {}", session.index + 1);
        self.persist_position().await;
        self.render(None).await;
    }

    /// Tear down all chrome and forget persisted progress. Idempotent.
    pub async fn stop(&mut self) {
        self.timer.cancel();
        if self.is_active() {
            info!("Stopping tour");
        }
        self.state = State::Idle;

        self.clear_chrome().await;
        self.forget_progress().await;
    }

    /// Handle an elapsed auto-advance. Stale tickets are ignored.
    pub async fn on_auto_advance(&mut self, tick: AutoAdvance) {
        if !self.timer.claim(tick.ticket) {
            debug!("Ignoring stale auto-advance ticket {}", tick.ticket);
            return;
        }
        self.next().await;
    }

    /// Flip narration mute and reflect it on the popup.
    pub async fn toggle_mute(&mut self) -> bool {
        let muted = self.narrator.toggle_mute().await;
        self.popup.set_muted(muted).await;
        muted
    }

    /// Show the narrator's current mute state on the popup control.
    pub async fn sync_mute_control(&self) {
        self.popup.set_muted(self.narrator.is_muted()).await;
    }

    async fn persist_position(&self) {
        let State::Active(session) = &self.state else {
            return;
        };
        let state = ResumeState::new(session.mode, session.index);
        if let Err(e) = self.resume.write(state).await {
            warn!("Failed to persist tour position: {}", e);
        }
    }

    async fn clear_chrome(&self) {
        self.popup.hide().await;
        self.locator.hide().await;
        self.narrator.stop().await;
    }

    async fn forget_progress(&self) {
        if let Err(e) = self.resume.clear().await {
            warn!("Failed to clear tour position: {}", e);
        }
    }

    /// Render the current step: navigation check, settle, highlight, popup,
    /// narration, actions, timer.
    ///
    /// Returns the href when the step lives on another page and a navigation
    /// was started instead.
    async fn render(&mut self, known_location: Option<Location>) -> Option<String> {
        let State::Active(session) = &self.state else {
            return None;
        };
        let mode = session.mode;
        let index = session.index;
        let total = session.steps.len();
        let step = session.steps[index].clone();

        if mode == PlaybackMode::Full {
            if let Some(page) = step.required_page() {
                match self.location_or(known_location).await {
                    Ok(location) if location.page_id() != page => {
                        let href = location.href_for(&page);
                        info!("Step '{}' lives on {}, navigating to {}", step.id, page, href);
                        match self.env.navigator.navigate(&href).await {
                            Ok(()) => {
                                // Position was persisted before render; the next
                                // load resumes at this index.
                                self.state = State::Idle;
                                return Some(href);
                            }
                            Err(e) => {
                                warn!("Navigation to {} failed, rendering in place: {}", href, e)
                            }
                        }
                    }
                    Ok(_) => {}
                    Err(e) => warn!("Could not read location: {}", e),
                }
            }
        }

        debug!("Rendering step {} '{}' ({})", index + 1, step.id, step.step_type);

        tokio::time::sleep(self.settings.settle_delay).await;

        match step.highlight_target() {
            Some(target) => {
                self.locator.highlight(target, step.parent.as_deref()).await;
            }
            None => self.locator.hide().await,
        }

        self.popup.show(&step.content, index, total).await;
        self.narrator.speak(&step.content).await;
        self.run_actions(&step).await;

        self.timer
            .arm(step.display_duration(self.settings.default_step));
        None
    }

    async fn location_or(&self, known: Option<Location>) -> Result<Location, PageError> {
        match known {
            Some(location) => Ok(location),
            None => self.env.navigator.location().await,
        }
    }

    async fn run_actions(&self, step: &Step) {
        for action in &step.actions {
            match action.verb {
                ActionVerb::Click => match self.locator.locate(&action.selector, None).await {
                    Ok(Some(element)) => {
                        if let Err(e) = self.env.document.click(element).await {
                            warn!("Click on '{}' failed: {}", action.selector, e);
                        }
                    }
                    Ok(None) => {
                        warn!("Action target '{}' not found, skipping", action.selector)
                    }
                    Err(e) => warn!("Action target '{}' unusable: {}", action.selector, e),
                },
                ActionVerb::Unsupported => warn!(
                    "Unsupported action on '{}' in step '{}', skipping",
                    action.selector, step.id
                ),
            }
        }
    }
}

#[cfg(test)]
#[path = "sequencer_tests.rs"]
mod tests;
