//! Narration channel.
//!
//! At most one utterance is audible at a time: every `speak` cancels what is
//! playing first. When the environment has no speech capability, or
//! narration is disabled, every call is a silent no-op.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tourguide_config::NarrationConfig;
use tourguide_protocols::{SpeechEngine, Utterance, Voice};
use tracing::debug;

/// Voice and delivery preferences.
#[derive(Debug, Clone, PartialEq)]
pub struct NarrationPrefs {
    pub enabled: bool,
    pub language: String,
    pub preferred_voice: String,
    pub rate: f32,
    pub pitch: f32,
}

impl Default for NarrationPrefs {
    fn default() -> Self {
        Self::from(&NarrationConfig::default())
    }
}

impl From<&NarrationConfig> for NarrationPrefs {
    fn from(config: &NarrationConfig) -> Self {
        Self {
            enabled: config.enabled,
            language: config.language.clone(),
            preferred_voice: config.preferred_voice.clone(),
            rate: config.rate,
            pitch: config.pitch,
        }
    }
}

/// Pick a voice: preferred name in the language, then any voice in the
/// language, then whatever is installed first.
pub fn select_voice(voices: &[Voice], prefs: &NarrationPrefs) -> Option<Voice> {
    let in_language = |v: &&Voice| v.lang.starts_with(&prefs.language);

    voices
        .iter()
        .filter(in_language)
        .find(|v| !prefs.preferred_voice.is_empty() && v.name.contains(&prefs.preferred_voice))
        .or_else(|| voices.iter().find(in_language))
        .or_else(|| voices.first())
        .cloned()
}

/// Speaks step content through a [`SpeechEngine`].
pub struct Narrator {
    engine: Arc<dyn SpeechEngine>,
    prefs: NarrationPrefs,
    muted: AtomicBool,
    voice: Mutex<Option<Voice>>,
}

impl Narrator {
    pub fn new(engine: Arc<dyn SpeechEngine>, prefs: NarrationPrefs) -> Self {
        Self {
            engine,
            prefs,
            muted: AtomicBool::new(false),
            voice: Mutex::new(None),
        }
    }

    pub fn is_muted(&self) -> bool {
        self.muted.load(Ordering::SeqCst)
    }

    pub fn voice(&self) -> Option<Voice> {
        self.voice.lock().clone()
    }

    async fn usable(&self) -> bool {
        self.prefs.enabled && self.engine.is_available().await
    }

    /// Re-run voice selection against the engine's current voice list.
    pub async fn refresh_voices(&self) {
        if !self.usable().await {
            return;
        }
        match self.engine.voices().await {
            Ok(voices) => {
                let selected = select_voice(&voices, &self.prefs);
                debug!("Narration voice: {:?}", selected.as_ref().map(|v| &v.name));
                *self.voice.lock() = selected;
            }
            Err(e) => debug!("Voice list unavailable: {}", e),
        }
    }

    /// Speak `text`, cancelling anything already playing.
    pub async fn speak(&self, text: &str) {
        if self.is_muted() || text.trim().is_empty() || !self.usable().await {
            return;
        }

        if let Err(e) = self.engine.cancel().await {
            debug!("Speech cancel failed: {}", e);
        }

        // Voices can load after the first step renders.
        if self.voice().is_none() {
            self.refresh_voices().await;
        }

        let utterance = Utterance {
            text: text.to_string(),
            voice: self.voice(),
            rate: self.prefs.rate,
            pitch: self.prefs.pitch,
        };
        if let Err(e) = self.engine.speak(&utterance).await {
            debug!("Speech failed: {}", e);
        }
    }

    /// Stop any current speech.
    pub async fn stop(&self) {
        if !self.usable().await {
            return;
        }
        if let Err(e) = self.engine.cancel().await {
            debug!("Speech cancel failed: {}", e);
        }
    }

    /// Flip the mute state and return whether narration is now muted.
    pub async fn toggle_mute(&self) -> bool {
        let muted = !self.muted.fetch_xor(true, Ordering::SeqCst);
        if muted {
            self.stop().await;
        }
        debug!("Narration muted: {}", muted);
        muted
    }
}
