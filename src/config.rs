//! Configuration for the replay engine
//!
//! A [`ReplayConfig`] collects the tunables of the viewer: the overlay
//! window around score moments, transport steps (seek, volume, rate cycle),
//! the position delivery resolution and keymap overrides. Configs
//! round-trip through TOML; the demo binary looks for `replay.toml` in the
//! platform data directory.
//!
//! Defaults reproduce the documented contract (0.5 s overlay lead, 3 s
//! tail, 5 s seek step, 0.1 volume step, 100 ms position resolution), so a
//! missing config file changes nothing.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ReplayError, Result, ResultExt};
use crate::types::{
    OVERLAY_LEAD_SECONDS, OVERLAY_TAIL_SECONDS, PLAYBACK_RATES, POSITION_RESOLUTION_MS,
    SEEK_STEP_SECONDS, VOLUME_STEP,
};

/// Application identifier for data directories
pub const APP_ID: &str = "dev.hxyulin.replaysync-rs";

/// Config filename inside the app data directory
pub const CONFIG_FILE: &str = "replay.toml";

/// Get the application data directory path
pub fn app_data_dir() -> Option<PathBuf> {
    dirs_next::data_dir().map(|p| p.join(APP_ID))
}

/// Get the default config file path
pub fn default_config_path() -> Option<PathBuf> {
    app_data_dir().map(|p| p.join(CONFIG_FILE))
}

/// Overlay window settings around each score moment
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlaySettings {
    /// Seconds the overlay shows before its moment
    pub lead_seconds: f64,
    /// Seconds the overlay stays after its moment
    pub tail_seconds: f64,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            lead_seconds: OVERLAY_LEAD_SECONDS,
            tail_seconds: OVERLAY_TAIL_SECONDS,
        }
    }
}

/// Transport and delivery settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Seconds skipped by the seek commands
    pub seek_step_seconds: f64,
    /// Volume change per volume command
    pub volume_step: f64,
    /// Rates cycled through by the rate command, in order
    pub rates: Vec<f64>,
    /// Coarsest resolution worth delivering position updates at, in
    /// milliseconds
    pub position_resolution_ms: u64,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            seek_step_seconds: SEEK_STEP_SECONDS,
            volume_step: VOLUME_STEP,
            rates: PLAYBACK_RATES.to_vec(),
            position_resolution_ms: POSITION_RESOLUTION_MS,
        }
    }
}

/// Complete replay configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    /// Overlay window settings
    pub overlay: OverlaySettings,
    /// Transport and delivery settings
    pub playback: PlaybackSettings,
    /// Keymap overrides, `key name -> command name`
    pub keymap: HashMap<String, String>,
}

impl ReplayConfig {
    /// Load a config from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ReplayError::Config(format!("failed to read config {:?}: {}", path, e))
        })?;
        toml::from_str(&raw)
            .map_err(|e| ReplayError::Config(format!("failed to parse config {:?}: {}", path, e)))
    }

    /// Load the config at `path`, falling back to defaults when the file
    /// does not exist
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("ignoring broken config {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Save the config as TOML
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = toml::to_string_pretty(self)
            .map_err(|e| ReplayError::Config(format!("failed to serialize config: {}", e)))?;
        std::fs::write(path, raw)
            .map_err(ReplayError::from)
            .with_context(|| format!("failed to write config {:?}", path))?;
        Ok(())
    }
}
