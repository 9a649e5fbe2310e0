//! # ReplaySync-RS: Session-Replay Synchronization Engine
//!
//! A headless engine that binds a continuously playing media stream to a
//! discrete, timestamped log of conversation turns and evaluation scores.
//! From any playback position it derives the active transcript line and the
//! visible score overlay, and it maps selections (a transcript line, a
//! scored moment, a progress fraction) back into clamped seek targets.
//!
//! ## Architecture
//!
//! - **Session**: the pure core - immutable event timeline, aggregate
//!   statistics, selection-to-seek navigation
//! - **Engine**: the façade - owns the loaded session, mirrors the player's
//!   position, emits change signals over crossbeam channels, dispatches
//!   keyboard commands
//! - **Stores**: async seams for the event log and the media asset; both
//!   are fetched concurrently and a session only opens when both succeed
//! - **Player**: transport-command trait over the external media player,
//!   plus a clock-driven simulation for tests and the demo binary
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use replaysync_rs::{
//!     config::ReplayConfig,
//!     engine::SyncEngine,
//!     player::{SimulatedPlayer, SimulatedPlayerConfig},
//!     store::{FsEventLogStore, FsMediaStore},
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let root = "sessions/";
//!     let engine = SyncEngine::new(
//!         Arc::new(FsEventLogStore::new(root)),
//!         Arc::new(FsMediaStore::new(root)),
//!         Box::new(SimulatedPlayer::new(SimulatedPlayerConfig::default())),
//!         ReplayConfig::default(),
//!     )?;
//!
//!     engine.open("session-001").await?;
//!     engine.toggle_play();
//!     // ... pump player positions into engine.on_position_update(..)
//!     engine.close();
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod player;
pub mod session;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use config::ReplayConfig;
pub use engine::{EngineEvent, Key, KeyOutcome, Keymap, PositionThrottle, SyncEngine};
pub use error::{ReplayError, Result};
pub use player::{MediaPlayer, PlayerEvent, SimulatedPlayer, SimulatedPlayerConfig};
pub use session::{EventTimeline, Navigator, ReplaySession};
pub use store::{EventLogStore, MediaHandle, MediaStore};
pub use types::{
    EngineState, EventRole, PerformanceMetrics, ScoreBand, ScoreMoment, SessionEvent, Trend,
};
