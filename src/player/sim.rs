//! Simulated media player
//!
//! A clock-driven [`MediaPlayer`] for the demo binary and for testing the
//! engine without real media decoding. Position advances in real time
//! scaled by the playback rate; a background ticker thread pushes
//! [`PlayerEvent`]s over a crossbeam channel the way a native player fires
//! time updates.
//!
//! # Features
//!
//! - Play/pause/seek/rate with pause-resume offset accounting
//! - Configurable tick interval
//! - Optional scripted decode failure at a given position
//! - NaN native duration by default, to exercise the engine's
//!   declared-duration fallback (opt into a finite report with
//!   [`SimulatedPlayerConfig::report_native_duration`])

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::error::Result;

use super::{MediaPlayer, PlayerEvent};

/// Configuration for a simulated player
#[derive(Debug, Clone)]
pub struct SimulatedPlayerConfig {
    /// Media length in seconds
    pub duration_seconds: f64,
    /// Interval between position ticks
    pub tick_interval: Duration,
    /// Report the finite duration from `native_duration` instead of NaN
    pub report_native_duration: bool,
    /// Emit a decode failure once playback crosses this position
    pub fail_at_seconds: Option<f64>,
}

impl Default for SimulatedPlayerConfig {
    fn default() -> Self {
        Self {
            duration_seconds: 0.0,
            tick_interval: Duration::from_millis(50),
            report_native_duration: false,
            fail_at_seconds: None,
        }
    }
}

/// Mutable playback state shared with the ticker thread
#[derive(Debug)]
struct SimState {
    duration: f64,
    /// Position accumulated up to the last play/pause/seek/rate change
    position_offset: f64,
    /// Wall-clock start of the current playing stretch, if playing
    started: Option<Instant>,
    rate: f64,
    volume: f64,
    fail_at: Option<f64>,
    failed: bool,
    ended: bool,
}

impl SimState {
    /// Current position: offset plus scaled elapsed time, capped at the end
    fn position(&self) -> f64 {
        let elapsed = self
            .started
            .map(|s| s.elapsed().as_secs_f64() * self.rate)
            .unwrap_or(0.0);
        (self.position_offset + elapsed).min(self.duration)
    }

    /// Fold the running stretch into the offset
    fn freeze(&mut self) {
        self.position_offset = self.position();
        if self.started.is_some() {
            self.started = Some(Instant::now());
        }
    }
}

/// Clock-driven media player simulation
pub struct SimulatedPlayer {
    state: Arc<Mutex<SimState>>,
    events_tx: Sender<PlayerEvent>,
    events_rx: Receiver<PlayerEvent>,
    running: Arc<AtomicBool>,
    ticker: Option<JoinHandle<()>>,
    report_native_duration: bool,
    tick_interval: Duration,
}

impl SimulatedPlayer {
    /// Create a simulated player for media of the configured length
    pub fn new(config: SimulatedPlayerConfig) -> Self {
        let (events_tx, events_rx) = unbounded();
        Self {
            state: Arc::new(Mutex::new(SimState {
                duration: config.duration_seconds.max(0.0),
                position_offset: 0.0,
                started: None,
                rate: 1.0,
                volume: 1.0,
                fail_at: config.fail_at_seconds,
                failed: false,
                ended: false,
            })),
            events_tx,
            events_rx,
            running: Arc::new(AtomicBool::new(false)),
            ticker: None,
            report_native_duration: config.report_native_duration,
            tick_interval: config.tick_interval,
        }
    }

    /// A receiver for this player's event stream
    pub fn events(&self) -> Receiver<PlayerEvent> {
        self.events_rx.clone()
    }

    /// Current position in seconds
    pub fn position(&self) -> f64 {
        self.state.lock().expect("sim player lock poisoned").position()
    }

    /// Current volume in `[0, 1]`
    pub fn volume(&self) -> f64 {
        self.state.lock().expect("sim player lock poisoned").volume
    }

    /// Current playback rate
    pub fn rate(&self) -> f64 {
        self.state.lock().expect("sim player lock poisoned").rate
    }

    /// Start the background ticker pushing position events
    ///
    /// Idempotent; the ticker stops when the player is dropped.
    pub fn start_ticker(&mut self) {
        if self.ticker.is_some() {
            return;
        }
        self.running.store(true, Ordering::SeqCst);

        let state = Arc::clone(&self.state);
        let running = Arc::clone(&self.running);
        let tx = self.events_tx.clone();
        let interval = self.tick_interval;

        self.ticker = Some(std::thread::spawn(move || {
            while running.load(Ordering::SeqCst) {
                {
                    let mut state = state.lock().expect("sim player lock poisoned");
                    let position = state.position();

                    if let Some(fail_at) = state.fail_at {
                        if !state.failed && position >= fail_at {
                            state.failed = true;
                            state.started = None;
                            state.position_offset = position;
                            let _ = tx.send(PlayerEvent::Error(format!(
                                "simulated decode failure at {:.2}s",
                                position
                            )));
                        }
                    }

                    if !state.failed {
                        let _ = tx.send(PlayerEvent::Position(position));

                        if position >= state.duration && state.started.is_some() {
                            state.started = None;
                            state.position_offset = state.duration;
                            if !state.ended {
                                state.ended = true;
                                let _ = tx.send(PlayerEvent::Ended);
                            }
                        }
                    }
                }
                std::thread::sleep(interval);
            }
        }));
    }
}

impl MediaPlayer for SimulatedPlayer {
    fn play(&mut self) -> Result<()> {
        let mut state = self.state.lock().expect("sim player lock poisoned");
        if state.started.is_none() && !state.failed {
            state.started = Some(Instant::now());
            state.ended = false;
        }
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        let mut state = self.state.lock().expect("sim player lock poisoned");
        if state.started.is_some() {
            state.position_offset = state.position();
            state.started = None;
        }
        Ok(())
    }

    fn seek(&mut self, position: f64) -> Result<()> {
        let mut state = self.state.lock().expect("sim player lock poisoned");
        state.position_offset = position.clamp(0.0, state.duration);
        state.ended = false;
        if state.started.is_some() {
            state.started = Some(Instant::now());
        }
        Ok(())
    }

    fn set_volume(&mut self, volume: f64) -> Result<()> {
        let mut state = self.state.lock().expect("sim player lock poisoned");
        state.volume = volume.clamp(0.0, 1.0);
        Ok(())
    }

    fn set_rate(&mut self, rate: f64) -> Result<()> {
        let mut state = self.state.lock().expect("sim player lock poisoned");
        // Fold elapsed time at the old rate before switching
        state.freeze();
        state.rate = rate.clamp(0.1, 10.0);
        Ok(())
    }

    fn native_duration(&self) -> f64 {
        if self.report_native_duration {
            self.state.lock().expect("sim player lock poisoned").duration
        } else {
            f64::NAN
        }
    }
}

impl Drop for SimulatedPlayer {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.ticker.take() {
            let _ = handle.join();
        }
    }
}
