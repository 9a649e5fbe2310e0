//! Keyboard command mapping for the replay viewer
//!
//! The conventional binding: space/`k` toggle play, left/right arrows seek
//! backward/forward, up/down arrows step the volume, `f` toggles
//! fullscreen, `m` toggles mute, escape exits fullscreen or requests close.
//!
//! The keymap is a plain table the engine installs at `open()` and removes
//! at `close()`; dispatch outside an open session answers
//! [`KeyOutcome::Unbound`]. Nothing here listens for keys itself - the host
//! feeds key presses in and acts on the outcome.

use std::collections::HashMap;

use crate::error::{ReplayError, Result};

/// A key press fed to the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// A printable character key
    Char(char),
    /// The space bar
    Space,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Escape,
}

impl Key {
    /// Parse a key name as used in config keymap sections
    pub fn parse(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "space" => Ok(Key::Space),
            "left" => Ok(Key::ArrowLeft),
            "right" => Ok(Key::ArrowRight),
            "up" => Ok(Key::ArrowUp),
            "down" => Ok(Key::ArrowDown),
            "escape" | "esc" => Ok(Key::Escape),
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Key::Char(c)),
                    _ => Err(ReplayError::Config(format!("unknown key name {:?}", name))),
                }
            }
        }
    }
}

/// Command a key press resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayCommand {
    /// Toggle between playing and paused
    TogglePlay,
    /// Skip backward by the configured seek step
    SeekBackward,
    /// Skip forward by the configured seek step
    SeekForward,
    /// Raise the volume by the configured step
    VolumeUp,
    /// Lower the volume by the configured step
    VolumeDown,
    /// Toggle the fullscreen flag
    ToggleFullscreen,
    /// Toggle mute
    ToggleMute,
    /// Exit fullscreen when set, otherwise request close
    CloseOrExitFullscreen,
}

impl ReplayCommand {
    /// Parse a command name as used in config keymap sections
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "toggle-play" => Ok(ReplayCommand::TogglePlay),
            "seek-backward" => Ok(ReplayCommand::SeekBackward),
            "seek-forward" => Ok(ReplayCommand::SeekForward),
            "volume-up" => Ok(ReplayCommand::VolumeUp),
            "volume-down" => Ok(ReplayCommand::VolumeDown),
            "toggle-fullscreen" => Ok(ReplayCommand::ToggleFullscreen),
            "toggle-mute" => Ok(ReplayCommand::ToggleMute),
            "close" => Ok(ReplayCommand::CloseOrExitFullscreen),
            other => Err(ReplayError::Config(format!(
                "unknown command name {:?}",
                other
            ))),
        }
    }
}

/// Result of dispatching a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The engine handled the command
    Consumed,
    /// The host should close the replay
    CloseRequested,
    /// No dispatcher installed, or the key has no binding
    Unbound,
}

/// Key-to-command table
#[derive(Debug, Clone)]
pub struct Keymap {
    bindings: HashMap<Key, ReplayCommand>,
}

impl Default for Keymap {
    fn default() -> Self {
        let mut bindings = HashMap::new();
        bindings.insert(Key::Space, ReplayCommand::TogglePlay);
        bindings.insert(Key::Char('k'), ReplayCommand::TogglePlay);
        bindings.insert(Key::ArrowLeft, ReplayCommand::SeekBackward);
        bindings.insert(Key::ArrowRight, ReplayCommand::SeekForward);
        bindings.insert(Key::ArrowUp, ReplayCommand::VolumeUp);
        bindings.insert(Key::ArrowDown, ReplayCommand::VolumeDown);
        bindings.insert(Key::Char('f'), ReplayCommand::ToggleFullscreen);
        bindings.insert(Key::Char('m'), ReplayCommand::ToggleMute);
        bindings.insert(Key::Escape, ReplayCommand::CloseOrExitFullscreen);
        Self { bindings }
    }
}

impl Keymap {
    /// The command bound to a key, if any
    pub fn command_for(&self, key: Key) -> Option<ReplayCommand> {
        self.bindings.get(&key).copied()
    }

    /// Apply config overrides of the form `key name -> command name`
    ///
    /// Overrides are additive over the defaults; binding a key already in
    /// the table replaces its command.
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, String>) -> Result<()> {
        for (key_name, command_name) in overrides {
            let key = Key::parse(key_name)?;
            let command = ReplayCommand::parse(command_name)?;
            self.bindings.insert(key, command);
        }
        Ok(())
    }

    /// Number of bindings
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Check if the keymap has no bindings
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
