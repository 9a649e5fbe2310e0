//! Hand-rolled test doubles for the engine's collaborators
//!
//! The stores support injectable delays (to hold a fetch in flight while a
//! test closes the engine) and switchable failures; the media store counts
//! handle releases so exactly-once release is observable. The mock player
//! records every transport command it receives.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use replaysync_rs::error::{ReplayError, Result};
use replaysync_rs::player::MediaPlayer;
use replaysync_rs::session::SessionLog;
use replaysync_rs::store::{EventLogStore, MediaAsset, MediaHandle, MediaStore};

/// Event log store serving one prepared log
pub struct MockEventLogStore {
    log: SessionLog,
    delay: Option<Duration>,
    fail: Arc<AtomicBool>,
}

impl MockEventLogStore {
    pub fn new(log: SessionLog) -> Self {
        Self {
            log,
            delay: None,
            fail: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Hold each fetch in flight for `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// A flag the test can flip to make fetches fail or recover
    pub fn failure_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.fail)
    }
}

#[async_trait]
impl EventLogStore for MockEventLogStore {
    async fn get_session(&self, session_id: &str) -> Result<SessionLog> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(ReplayError::Load(format!(
                "event log for {:?} not found",
                session_id
            )));
        }
        Ok(self.log.clone())
    }
}

/// Media store serving a synthetic asset
pub struct MockMediaStore {
    declared_duration: f64,
    delay: Option<Duration>,
    fail: Arc<AtomicBool>,
    releases: Arc<AtomicUsize>,
}

impl MockMediaStore {
    pub fn new(declared_duration: f64) -> Self {
        Self {
            declared_duration,
            delay: None,
            fail: Arc::new(AtomicBool::new(false)),
            releases: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Hold each fetch in flight for `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// A flag the test can flip to make fetches fail or recover
    pub fn failure_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.fail)
    }

    /// How many handles served by this store have been released
    pub fn release_count(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.releases)
    }
}

#[async_trait]
impl MediaStore for MockMediaStore {
    async fn get_recording(&self, session_id: &str) -> Result<MediaHandle> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(ReplayError::Load(format!(
                "recording for {:?} not found",
                session_id
            )));
        }

        let asset = MediaAsset {
            mime_type: "video/webm".to_string(),
            declared_duration_seconds: self.declared_duration,
            size_bytes: 16,
        };
        let releases = Arc::clone(&self.releases);
        Ok(
            MediaHandle::new(asset, vec![0u8; 16]).with_release_hook(Box::new(move || {
                releases.fetch_add(1, Ordering::SeqCst);
            })),
        )
    }
}

/// Transport command recorded by the mock player
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerCall {
    Play,
    Pause,
    Seek(f64),
    SetVolume(f64),
    SetRate(f64),
}

/// Media player that records every command it receives
pub struct MockPlayer {
    calls: Arc<Mutex<Vec<PlayerCall>>>,
    native_duration: f64,
}

impl MockPlayer {
    /// Player reporting no usable native duration (NaN)
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            native_duration: f64::NAN,
        }
    }

    /// Player reporting a finite native duration
    pub fn with_native_duration(mut self, duration: f64) -> Self {
        self.native_duration = duration;
        self
    }

    /// Shared view of the recorded commands
    pub fn calls(&self) -> Arc<Mutex<Vec<PlayerCall>>> {
        Arc::clone(&self.calls)
    }

    fn record(&self, call: PlayerCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Default for MockPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaPlayer for MockPlayer {
    fn play(&mut self) -> Result<()> {
        self.record(PlayerCall::Play);
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        self.record(PlayerCall::Pause);
        Ok(())
    }

    fn seek(&mut self, position: f64) -> Result<()> {
        self.record(PlayerCall::Seek(position));
        Ok(())
    }

    fn set_volume(&mut self, volume: f64) -> Result<()> {
        self.record(PlayerCall::SetVolume(volume));
        Ok(())
    }

    fn set_rate(&mut self, rate: f64) -> Result<()> {
        self.record(PlayerCall::SetRate(rate));
        Ok(())
    }

    fn native_duration(&self) -> f64 {
        self.native_duration
    }
}
