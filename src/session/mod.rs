//! Session model: timeline, statistics and navigation
//!
//! This module holds the pure core of the replay engine. Everything here is
//! a function of the immutable event log and a playback position; nothing
//! touches the media player or the stores.
//!
//! # Features
//!
//! - Normalize an absolute-timestamped event log to session-relative time
//! - Answer active-index and overlay queries for any playback position
//! - Aggregate score moments into performance metrics with a trend
//! - Map selections (event, moment, progress fraction) to seek targets

pub mod navigator;
pub mod stats;
pub mod timeline;
pub mod types;

pub use navigator::{ActiveChange, Navigator};
pub use stats::{best_moment, worst_moment};
pub use timeline::EventTimeline;
pub use types::{RawMessage, ReplaySession, SessionLog};
