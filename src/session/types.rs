//! Session data types
//!
//! The wire shape returned by the event log store ([`SessionLog`]) and the
//! loaded, read-only session held by the engine ([`ReplaySession`]).
//!
//! Wire timestamps stay raw strings: parsing happens in
//! [`EventTimeline::load`](super::timeline::EventTimeline::load) so an
//! unparsable timestamp is a session data error, not a deserialization
//! failure of the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{EventRole, SessionEvent};

use super::timeline::EventTimeline;

/// One raw message as stored in the event log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMessage {
    /// Who produced the turn
    pub role: EventRole,
    /// Turn text
    pub text: String,
    /// Absolute timestamp of the turn (RFC3339)
    pub timestamp: String,
    /// Evaluation score in 0..=100, if the turn carries one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
}

/// The event log store's answer for one session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionLog {
    /// When the session started (RFC3339)
    pub started_at: String,
    /// Conversation turns in recorded order
    pub messages: Vec<RawMessage>,
}

/// A loaded replay session
///
/// Created once when a replay opens, read-only for its lifetime, discarded
/// on close.
#[derive(Debug, Clone)]
pub struct ReplaySession {
    /// Identifier the session was opened under
    pub session_id: String,
    /// Absolute session start
    pub started_at: DateTime<Utc>,
    /// Normalized event timeline
    pub timeline: EventTimeline,
    /// Resolved media duration in seconds
    pub media_duration_seconds: f64,
}

impl ReplaySession {
    /// All events, ascending by time
    pub fn events(&self) -> &[SessionEvent] {
        self.timeline.events()
    }

    /// Number of events in the session
    pub fn event_count(&self) -> usize {
        self.timeline.len()
    }

    /// Check if the session has no events
    pub fn is_empty(&self) -> bool {
        self.timeline.is_empty()
    }
}
