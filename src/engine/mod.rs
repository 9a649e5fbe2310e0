//! Synchronization engine
//!
//! The façade the surrounding application talks to. The engine owns the
//! loaded session, mirrors the playback position reported by the external
//! media player, derives the active transcript index and visible score
//! overlay from it, and translates selections and key presses back into
//! player commands.
//!
//! # Lifecycle
//!
//! `Idle -> Loading -> Ready -> {Playing <-> Paused} -> Closed`, with
//! `Error` reachable from `Loading` (fetch failure) and from open states
//! (playback failure). `Closed` is terminal. After a load failure `open()`
//! may be invoked again on the same engine; after `Closed` it may not.
//!
//! # Cancellation
//!
//! `open()` captures a generation token before awaiting its two concurrent
//! fetches and commits the result only if the token still matches and the
//! engine has not closed in the meantime. A late-arriving media handle is
//! simply dropped, which runs its release hook - no half-open state can
//! leak out of a cancelled load.

pub mod commands;

pub use commands::{Key, KeyOutcome, Keymap, ReplayCommand};

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::config::{PlaybackSettings, ReplayConfig};
use crate::error::{ReplayError, Result};
use crate::player::MediaPlayer;
use crate::session::navigator::ActiveChange;
use crate::session::timeline::parse_timestamp;
use crate::session::{EventTimeline, Navigator, ReplaySession};
use crate::store::{EventLogStore, MediaHandle, MediaStore};
use crate::types::{EngineState, PerformanceMetrics, ScoreMoment, SessionEvent};

/// Volume restored by unmute when the remembered volume is zero
const UNMUTE_FALLBACK_VOLUME: f64 = 0.5;

/// Signal emitted by the engine
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Lifecycle state changed
    StateChanged(EngineState),
    /// The active transcript index changed
    ActiveEventChanged(ActiveChange),
    /// The external player reported a decode/playback failure
    PlaybackError(String),
}

/// Coalesces a high-frequency position stream down to a delivery resolution
///
/// Pure decision function over explicit instants: whether a tick is
/// delivered depends only on the time since the last delivered tick, never
/// on hidden counters, so the state derived for a delivered position is
/// independent of throttling history.
#[derive(Debug, Clone)]
pub struct PositionThrottle {
    resolution: Duration,
    last_delivery: Option<Instant>,
}

impl PositionThrottle {
    /// Create a throttle with the given delivery resolution
    pub fn new(resolution: Duration) -> Self {
        Self {
            resolution,
            last_delivery: None,
        }
    }

    /// Create a throttle from playback settings
    pub fn from_settings(settings: &PlaybackSettings) -> Self {
        Self::new(Duration::from_millis(settings.position_resolution_ms))
    }

    /// Decide whether a tick at `now` should be delivered
    pub fn accept(&mut self, now: Instant) -> bool {
        match self.last_delivery {
            Some(last) if now.duration_since(last) < self.resolution => false,
            _ => {
                self.last_delivery = Some(now);
                true
            }
        }
    }
}

/// Interior engine state behind the mutex
struct EngineInner {
    state: EngineState,
    /// Bumped on close and on every open; an open() commit requires its
    /// captured value to still match
    generation: u64,
    session: Option<ReplaySession>,
    media: Option<MediaHandle>,
    player: Box<dyn MediaPlayer>,
    navigator: Option<Navigator>,
    metrics: PerformanceMetrics,
    /// Installed at open, removed at close
    keymap: Option<Keymap>,
    position: f64,
    active_index: Option<usize>,
    volume: f64,
    muted: bool,
    rate: f64,
    fullscreen: bool,
}

/// The synchronization engine façade
///
/// One engine drives one replay. Methods are cheap and non-blocking except
/// `open()`, which awaits the two store fetches.
pub struct SyncEngine {
    inner: Arc<Mutex<EngineInner>>,
    log_store: Arc<dyn EventLogStore>,
    media_store: Arc<dyn MediaStore>,
    config: ReplayConfig,
    /// Keymap template validated at construction, installed on open
    keymap_template: Keymap,
    events_tx: Sender<EngineEvent>,
    events_rx: Receiver<EngineEvent>,
}

impl SyncEngine {
    /// Create an engine over its collaborators
    ///
    /// Fails with a config error when the keymap overrides in `config` do
    /// not parse.
    pub fn new(
        log_store: Arc<dyn EventLogStore>,
        media_store: Arc<dyn MediaStore>,
        player: Box<dyn MediaPlayer>,
        config: ReplayConfig,
    ) -> Result<Self> {
        let mut keymap_template = Keymap::default();
        keymap_template.apply_overrides(&config.keymap)?;

        let (events_tx, events_rx) = unbounded();
        Ok(Self {
            inner: Arc::new(Mutex::new(EngineInner {
                state: EngineState::Idle,
                generation: 0,
                session: None,
                media: None,
                player,
                navigator: None,
                metrics: PerformanceMetrics::default(),
                keymap: None,
                position: 0.0,
                active_index: None,
                volume: 1.0,
                muted: false,
                rate: 1.0,
                fullscreen: false,
            })),
            log_store,
            media_store,
            config,
            keymap_template,
            events_tx,
            events_rx,
        })
    }

    /// A receiver for the engine's signal stream
    pub fn subscribe(&self) -> Receiver<EngineEvent> {
        self.events_rx.clone()
    }

    fn lock(&self) -> MutexGuard<'_, EngineInner> {
        self.inner.lock().expect("engine lock poisoned")
    }

    fn set_state(&self, inner: &mut EngineInner, state: EngineState) {
        if inner.state != state {
            tracing::debug!(from = %inner.state, to = %state, "engine state change");
            inner.state = state;
            let _ = self.events_tx.send(EngineEvent::StateChanged(state));
        }
    }

    /// Open a session: fetch the event log and the media asset
    /// concurrently, then assemble the timeline
    ///
    /// All-or-nothing: a media asset without its transcript (or vice versa)
    /// fails the load. Fetch failures leave the engine in `Error`; `open()`
    /// may be invoked again afterwards. A `close()` racing this call wins:
    /// the late result is discarded and its media handle released.
    pub async fn open(&self, session_id: &str) -> Result<()> {
        let generation = {
            let mut inner = self.lock();
            match inner.state {
                EngineState::Idle | EngineState::Error => {}
                EngineState::Closed => return Err(ReplayError::Closed),
                state => {
                    return Err(ReplayError::Load(format!(
                        "open() while engine is {}",
                        state
                    )))
                }
            }
            inner.session = None;
            inner.generation += 1;
            self.set_state(&mut inner, EngineState::Loading);
            inner.generation
        };

        tracing::info!(session_id, "opening session");

        // Both fetches run concurrently; the lock is not held across the await
        let fetched = tokio::try_join!(
            self.log_store.get_session(session_id),
            self.media_store.get_recording(session_id),
        );

        let mut inner = self.lock();
        if inner.generation != generation || inner.state != EngineState::Loading {
            // Closed (or superseded) while the fetches were in flight; the
            // fetched media handle is dropped here, running its release hook
            tracing::debug!(session_id, "discarding late open() result");
            return Err(ReplayError::Closed);
        }

        let (log, media) = match fetched {
            Ok(parts) => parts,
            Err(e) => {
                self.set_state(&mut inner, EngineState::Error);
                return Err(e);
            }
        };

        let assembled = (|| {
            let started_at = parse_timestamp(&log.started_at)?;
            let timeline = EventTimeline::load(started_at, &log.messages)?.with_overlay_window(
                self.config.overlay.lead_seconds,
                self.config.overlay.tail_seconds,
            );
            Ok::<_, ReplayError>((started_at, timeline))
        })();
        let (started_at, timeline) = match assembled {
            Ok(parts) => parts,
            Err(e) => {
                self.set_state(&mut inner, EngineState::Error);
                return Err(e);
            }
        };

        // A native duration of NaN/infinity falls back to the declared one
        let native = inner.player.native_duration();
        let declared = media.asset().declared_duration_seconds;
        let duration = if native.is_finite() && native > 0.0 {
            native
        } else {
            tracing::debug!(declared, "native duration unusable, using declared");
            declared
        };

        inner.metrics = PerformanceMetrics::from_moments(timeline.moments());
        inner.navigator = Some(Navigator::new(duration));
        inner.session = Some(ReplaySession {
            session_id: session_id.to_string(),
            started_at,
            timeline,
            media_duration_seconds: duration,
        });
        inner.media = Some(media);
        inner.keymap = Some(self.keymap_template.clone());
        inner.position = 0.0;
        inner.active_index = None;
        self.set_state(&mut inner, EngineState::Ready);

        tracing::info!(session_id, duration, "session ready");
        Ok(())
    }

    /// Mirror a position reported by the external player and rederive the
    /// active index, signaling a transition if one happened
    ///
    /// Safe to call at any rate; callers wanting to coalesce ticks use
    /// [`PositionThrottle`].
    pub fn on_position_update(&self, position: f64) {
        let mut inner = self.lock();
        if !inner.state.is_open() {
            return;
        }
        let duration = inner
            .session
            .as_ref()
            .map(|s| s.media_duration_seconds)
            .unwrap_or(0.0);
        inner.position = position.clamp(0.0, duration);
        self.rederive_active(&mut inner);
    }

    fn rederive_active(&self, inner: &mut EngineInner) {
        let (new_active, change) = match (&inner.session, &inner.navigator) {
            (Some(session), Some(navigator)) => {
                let new_active = session.timeline.active_index_at(inner.position);
                (new_active, navigator.active_change(inner.active_index, new_active))
            }
            _ => return,
        };
        inner.active_index = new_active;
        if let Some(change) = change {
            let _ = self.events_tx.send(EngineEvent::ActiveEventChanged(change));
        }
    }

    /// Clamp a seek target and forward it to the player, fire-and-forget
    ///
    /// The mirrored position updates immediately; play state is unchanged.
    pub fn request_seek(&self, target: f64) {
        let mut inner = self.lock();
        if !inner.state.is_open() {
            return;
        }
        let Some(duration) = inner.navigator.as_ref().map(Navigator::duration) else {
            return;
        };
        let clamped = target.clamp(0.0, duration);
        if let Err(e) = inner.player.seek(clamped) {
            tracing::warn!("player seek failed: {}", e);
        }
        inner.position = clamped;
        self.rederive_active(&mut inner);
    }

    /// Seek to an event selection; fails on an invalid index
    pub fn seek_to_event(&self, index: usize) -> Result<f64> {
        let target = {
            let inner = self.lock();
            if !inner.state.is_open() {
                return Err(ReplayError::Closed);
            }
            let navigator = inner.navigator.as_ref().ok_or(ReplayError::Closed)?;
            let session = inner.session.as_ref().ok_or(ReplayError::Closed)?;
            navigator.seek_to_event(session.events(), index)?
        };
        self.request_seek(target);
        Ok(target)
    }

    /// Seek to a score-moment selection
    pub fn seek_to_moment(&self, moment: &ScoreMoment) -> Result<f64> {
        let target = {
            let inner = self.lock();
            if !inner.state.is_open() {
                return Err(ReplayError::Closed);
            }
            let navigator = inner.navigator.as_ref().ok_or(ReplayError::Closed)?;
            navigator.seek_to_moment(moment)
        };
        self.request_seek(target);
        Ok(target)
    }

    /// Skip by a signed number of seconds
    pub fn seek_by(&self, delta_seconds: f64) {
        let target = {
            let inner = self.lock();
            if !inner.state.is_open() {
                return;
            }
            inner.position + delta_seconds
        };
        self.request_seek(target);
    }

    /// Toggle between playing and paused
    pub fn toggle_play(&self) {
        let mut inner = self.lock();
        match inner.state {
            EngineState::Playing => {
                if let Err(e) = inner.player.pause() {
                    tracing::warn!("player pause failed: {}", e);
                }
                self.set_state(&mut inner, EngineState::Paused);
            }
            EngineState::Ready | EngineState::Paused => {
                if let Err(e) = inner.player.play() {
                    tracing::warn!("player play failed: {}", e);
                }
                self.set_state(&mut inner, EngineState::Playing);
            }
            _ => {}
        }
    }

    /// Set the volume, clamped to `[0, 1]`; zero mutes
    pub fn set_volume(&self, volume: f64) {
        let mut inner = self.lock();
        if !inner.state.is_open() {
            return;
        }
        let volume = volume.clamp(0.0, 1.0);
        if let Err(e) = inner.player.set_volume(volume) {
            tracing::warn!("player volume change failed: {}", e);
        }
        inner.volume = volume;
        inner.muted = volume == 0.0;
    }

    /// Step the volume by a signed amount
    ///
    /// Stepping up from muted starts at zero and unmutes.
    pub fn volume_by(&self, delta: f64) {
        let base = {
            let inner = self.lock();
            if !inner.state.is_open() {
                return;
            }
            if inner.muted {
                0.0
            } else {
                inner.volume
            }
        };
        self.set_volume(base + delta);
    }

    /// Toggle mute, restoring the remembered volume on unmute
    pub fn toggle_mute(&self) {
        let mut inner = self.lock();
        if !inner.state.is_open() {
            return;
        }
        if inner.muted {
            let restored = if inner.volume > 0.0 {
                inner.volume
            } else {
                UNMUTE_FALLBACK_VOLUME
            };
            if let Err(e) = inner.player.set_volume(restored) {
                tracing::warn!("player volume change failed: {}", e);
            }
            inner.volume = restored;
            inner.muted = false;
        } else {
            if let Err(e) = inner.player.set_volume(0.0) {
                tracing::warn!("player volume change failed: {}", e);
            }
            // The remembered volume survives for unmute
            inner.muted = true;
        }
    }

    /// Advance to the next playback rate in the configured cycle
    ///
    /// Returns the new rate. An unrecognized current rate restarts the
    /// cycle.
    pub fn cycle_rate(&self) -> f64 {
        let mut inner = self.lock();
        if !inner.state.is_open() {
            return inner.rate;
        }
        let rates = &self.config.playback.rates;
        if rates.is_empty() {
            return inner.rate;
        }
        let current = rates.iter().position(|&r| (r - inner.rate).abs() < 1e-9);
        let next = match current {
            Some(idx) => rates[(idx + 1) % rates.len()],
            None => rates[0],
        };
        if let Err(e) = inner.player.set_rate(next) {
            tracing::warn!("player rate change failed: {}", e);
        }
        inner.rate = next;
        next
    }

    /// Toggle the mirrored fullscreen flag
    pub fn toggle_fullscreen(&self) -> bool {
        let mut inner = self.lock();
        inner.fullscreen = !inner.fullscreen;
        inner.fullscreen
    }

    /// Dispatch a key press through the installed keymap
    ///
    /// Answers [`KeyOutcome::Unbound`] when no session is open (the
    /// dispatcher is only installed between `open()` and `close()`) or the
    /// key has no binding.
    pub fn handle_key(&self, key: Key) -> KeyOutcome {
        let (command, fullscreen) = {
            let inner = self.lock();
            let Some(keymap) = inner.keymap.as_ref() else {
                return KeyOutcome::Unbound;
            };
            match keymap.command_for(key) {
                Some(command) => (command, inner.fullscreen),
                None => return KeyOutcome::Unbound,
            }
        };

        let step = self.config.playback.seek_step_seconds;
        let volume_step = self.config.playback.volume_step;
        match command {
            ReplayCommand::TogglePlay => self.toggle_play(),
            ReplayCommand::SeekBackward => self.seek_by(-step),
            ReplayCommand::SeekForward => self.seek_by(step),
            ReplayCommand::VolumeUp => self.volume_by(volume_step),
            ReplayCommand::VolumeDown => self.volume_by(-volume_step),
            ReplayCommand::ToggleFullscreen => {
                self.toggle_fullscreen();
            }
            ReplayCommand::ToggleMute => self.toggle_mute(),
            ReplayCommand::CloseOrExitFullscreen => {
                if fullscreen {
                    self.lock().fullscreen = false;
                } else {
                    return KeyOutcome::CloseRequested;
                }
            }
        }
        KeyOutcome::Consumed
    }

    /// Surface a playback failure reported by the external player
    ///
    /// The engine enters `Error` and releases the media handle; transcript
    /// and statistics queries stay usable since they do not depend on the
    /// decoder.
    pub fn on_player_error(&self, message: impl Into<String>) {
        let message = message.into();
        let mut inner = self.lock();
        if inner.state.is_terminal() {
            return;
        }
        tracing::error!("playback error: {}", message);
        let _ = self.events_tx.send(EngineEvent::PlaybackError(message));
        if let Some(handle) = inner.media.take() {
            drop(handle);
        }
        self.set_state(&mut inner, EngineState::Error);
    }

    /// Close the engine
    ///
    /// Idempotent. Cancels an in-flight `open()` (its late result is
    /// discarded), uninstalls the key dispatcher, releases the media handle
    /// and transitions to the terminal `Closed` state.
    pub fn close(&self) {
        let mut inner = self.lock();
        if inner.state == EngineState::Closed {
            return;
        }
        inner.generation += 1;
        if inner.state.is_open() {
            if let Err(e) = inner.player.pause() {
                tracing::warn!("player pause on close failed: {}", e);
            }
        }
        inner.keymap = None;
        inner.session = None;
        inner.navigator = None;
        inner.active_index = None;
        if let Some(handle) = inner.media.take() {
            // Exactly-once release: the handle's hook runs on this drop
            drop(handle);
        }
        self.set_state(&mut inner, EngineState::Closed);
        tracing::info!("engine closed");
    }

    // ---- Queries ----

    /// Current lifecycle state
    pub fn state(&self) -> EngineState {
        self.lock().state
    }

    /// Mirrored playback position in seconds
    pub fn position(&self) -> f64 {
        self.lock().position
    }

    /// Resolved media duration in seconds, zero before open
    pub fn duration(&self) -> f64 {
        self.lock()
            .session
            .as_ref()
            .map(|s| s.media_duration_seconds)
            .unwrap_or(0.0)
    }

    /// Index of the most recent event at or before the mirrored position
    pub fn active_index(&self) -> Option<usize> {
        self.lock().active_index
    }

    /// The event at the active index, if any
    pub fn active_event(&self) -> Option<SessionEvent> {
        let inner = self.lock();
        let index = inner.active_index?;
        inner
            .session
            .as_ref()
            .and_then(|s| s.events().get(index))
            .cloned()
    }

    /// The score overlay visible at the mirrored position, if any
    pub fn overlay(&self) -> Option<ScoreMoment> {
        let inner = self.lock();
        inner
            .session
            .as_ref()
            .and_then(|s| s.timeline.overlay_at(inner.position))
            .cloned()
    }

    /// Aggregate performance metrics for the loaded session
    pub fn metrics(&self) -> PerformanceMetrics {
        self.lock().metrics
    }

    /// The loaded session, if one is open (kept on `Error` so the
    /// transcript stays readable)
    pub fn session(&self) -> Option<ReplaySession> {
        self.lock().session.clone()
    }

    /// Mirrored volume in `[0, 1]`
    pub fn volume(&self) -> f64 {
        self.lock().volume
    }

    /// Whether the player is muted
    pub fn is_muted(&self) -> bool {
        self.lock().muted
    }

    /// Mirrored playback rate
    pub fn rate(&self) -> f64 {
        self.lock().rate
    }

    /// Mirrored fullscreen flag
    pub fn is_fullscreen(&self) -> bool {
        self.lock().fullscreen
    }
}
