//! Commands emitted by the presentation surface.

use std::str::FromStr;

use crate::error::ProtocolError;
use crate::mode::PlaybackMode;

/// A command raised by the page's chrome (popup buttons, launcher menu,
/// speech backend). Parsed from a plain string at the page boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCommand {
    /// Launcher menu pick: `start:full` / `start:page`.
    Start(PlaybackMode),
    Next,
    Prev,
    Close,
    ToggleMute,
    /// Launcher button pressed: toggle the mode menu.
    ToggleMenu,
    /// Click landed outside the open launcher menu.
    DismissMenu,
    /// The speech backend's voice list changed.
    VoicesChanged,
}

/// Something that happened on the page the player needs to react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEvent {
    /// The visitor interacted with the tour chrome.
    Command(UiCommand),
    /// A document finished loading; all page-side state was torn down.
    Loaded,
}

impl FromStr for UiCommand {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(mode) = s.strip_prefix("start:") {
            return mode
                .parse::<PlaybackMode>()
                .map(UiCommand::Start)
                .map_err(|_| ProtocolError::UnknownCommand(s.to_string()));
        }

        match s {
            "next" => Ok(UiCommand::Next),
            "prev" => Ok(UiCommand::Prev),
            "close" => Ok(UiCommand::Close),
            "mute" => Ok(UiCommand::ToggleMute),
            "menu" => Ok(UiCommand::ToggleMenu),
            "dismiss" => Ok(UiCommand::DismissMenu),
            "voices-changed" => Ok(UiCommand::VoicesChanged),
            other => Err(ProtocolError::UnknownCommand(other.to_string())),
        }
    }
}
