//! Builders for session test data

use chrono::{DateTime, TimeZone, Utc};
use replaysync_rs::session::{RawMessage, SessionLog};
use replaysync_rs::types::EventRole;

/// Session start used by all built logs
pub fn session_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 14, 0, 0).unwrap()
}

/// Builder for a [`SessionLog`] with offset-based timestamps
pub struct SessionLogBuilder {
    start: DateTime<Utc>,
    messages: Vec<RawMessage>,
}

impl SessionLogBuilder {
    /// Start a log at the shared test session start
    pub fn new() -> Self {
        Self {
            start: session_start(),
            messages: Vec::new(),
        }
    }

    /// Add an unscored counterpart turn at an offset in seconds
    pub fn counterpart(mut self, offset_secs: f64, text: &str) -> Self {
        let message = self.message(offset_secs, EventRole::Counterpart, text, None);
        self.messages.push(message);
        self
    }

    /// Add an unscored subject turn at an offset in seconds
    pub fn subject(mut self, offset_secs: f64, text: &str) -> Self {
        let message = self.message(offset_secs, EventRole::Subject, text, None);
        self.messages.push(message);
        self
    }

    /// Add a scored subject turn at an offset in seconds
    pub fn scored(mut self, offset_secs: f64, score: u8, text: &str) -> Self {
        let message = self.message(offset_secs, EventRole::Subject, text, Some(score));
        self.messages.push(message);
        self
    }

    /// Add a turn with a raw (possibly invalid) timestamp string
    pub fn raw_timestamp(mut self, timestamp: &str, text: &str) -> Self {
        self.messages.push(RawMessage {
            role: EventRole::Subject,
            text: text.to_string(),
            timestamp: timestamp.to_string(),
            score: None,
        });
        self
    }

    /// Finish the log
    pub fn build(self) -> SessionLog {
        SessionLog {
            started_at: self.start.to_rfc3339(),
            messages: self.messages,
        }
    }

    fn message(
        &self,
        offset_secs: f64,
        role: EventRole,
        text: &str,
        score: Option<u8>,
    ) -> RawMessage {
        let ts = self.start + chrono::Duration::milliseconds((offset_secs * 1000.0) as i64);
        RawMessage {
            role,
            text: text.to_string(),
            timestamp: ts.to_rfc3339(),
            score,
        }
    }
}

impl Default for SessionLogBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Worked example used across tests: turns at 0 s, 5 s (score 82) and
/// 12 s (score 45), meant for a 20 s recording
pub fn example_log() -> SessionLog {
    SessionLogBuilder::new()
        .counterpart(0.0, "Hi, thanks for taking my call")
        .scored(5.0, 82, "Great opener, confident tone")
        .scored(12.0, 45, "You talked over the customer there")
        .build()
}
