//! Media player interface
//!
//! The engine does not decode media. It issues transport commands to an
//! external player through the [`MediaPlayer`] trait and consumes the
//! player's position stream; the concrete player (a native video element in
//! a host application, or the [`SimulatedPlayer`] here) owns the actual
//! playback state.
//!
//! Position reporting is push-based: players emit [`PlayerEvent`]s over a
//! crossbeam channel at whatever rate they like, and the consumer decides
//! how often to forward them to the engine (see
//! [`PositionThrottle`](crate::engine::PositionThrottle)).

pub mod sim;

pub use sim::{SimulatedPlayer, SimulatedPlayerConfig};

use crate::error::Result;

/// Event pushed by a media player
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// Current playback position in seconds
    Position(f64),
    /// Playback reached the end of the media
    Ended,
    /// Decode or playback failure
    Error(String),
}

/// Transport-command interface to an external media player
///
/// Implementations must be `Send`: the engine may live on a different
/// thread than the loop pumping player events.
pub trait MediaPlayer: Send {
    /// Start or resume playback
    fn play(&mut self) -> Result<()>;

    /// Pause playback
    fn pause(&mut self) -> Result<()>;

    /// Jump to a position in seconds
    ///
    /// Callers clamp; implementations may clamp again defensively.
    fn seek(&mut self, position: f64) -> Result<()>;

    /// Set the volume in `[0, 1]`
    fn set_volume(&mut self, volume: f64) -> Result<()>;

    /// Set the playback rate multiplier
    fn set_rate(&mut self, rate: f64) -> Result<()>;

    /// Duration as reported by the decoder, in seconds
    ///
    /// May be NaN or infinite for streams without duration metadata; the
    /// engine falls back to the media store's declared duration then.
    fn native_duration(&self) -> f64;
}
