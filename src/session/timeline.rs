//! Immutable event timeline with time-indexed queries
//!
//! The timeline holds a session's event log normalized to seconds from the
//! session start and answers the two queries playback needs continuously:
//! which event is active at a position, and which score overlay (if any) is
//! visible there. Score moments are derived once at load time since the log
//! never changes afterwards.
//!
//! # Normalization
//!
//! Raw messages carry absolute RFC3339 timestamps. `load` converts each to
//! `seconds from session start` and refuses a log whose normalized times
//! decrease: a timeline whose order cannot be trusted would silently
//! desynchronize overlays from playback, which is worse than a visible
//! failure. Equal timestamps are legal, as are negative times for turns
//! logged before the nominal start.

use chrono::{DateTime, Utc};

use crate::error::{ReplayError, Result};
use crate::types::{
    ScoreMoment, SessionEvent, OVERLAY_LEAD_SECONDS, OVERLAY_TAIL_SECONDS,
};

use super::types::RawMessage;

/// Parse an absolute RFC3339 timestamp from the event log
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ReplayError::Data(format!("unparsable timestamp {:?}: {}", raw, e)))
}

/// Immutable ordered event log with time-indexed query operations
#[derive(Debug, Clone)]
pub struct EventTimeline {
    /// Normalized events, ascending by time
    events: Vec<SessionEvent>,
    /// Scored subject turns, ascending by time (cached at load)
    moments: Vec<ScoreMoment>,
    /// Seconds an overlay shows before its moment
    overlay_lead: f64,
    /// Seconds an overlay stays after its moment
    overlay_tail: f64,
}

impl EventTimeline {
    /// Build a timeline from raw messages, normalizing timestamps against
    /// the session start
    ///
    /// Fails with a data error if any timestamp is unparsable or if the
    /// normalized times decrease.
    pub fn load(session_start: DateTime<Utc>, messages: &[RawMessage]) -> Result<Self> {
        let mut events = Vec::with_capacity(messages.len());
        let mut previous_time = f64::NEG_INFINITY;

        for (index, message) in messages.iter().enumerate() {
            let timestamp = parse_timestamp(&message.timestamp)?;
            let time = (timestamp - session_start).num_milliseconds() as f64 / 1000.0;

            if time < previous_time {
                return Err(ReplayError::Data(format!(
                    "event {} at {:.3}s precedes event {} at {:.3}s after normalization",
                    index,
                    time,
                    index - 1,
                    previous_time
                )));
            }
            previous_time = time;

            events.push(SessionEvent {
                index,
                time,
                role: message.role,
                text: message.text.clone(),
                score: message.score,
            });
        }

        let moments = events
            .iter()
            .filter(|e| e.is_score_moment())
            .map(|e| ScoreMoment {
                time: e.time,
                score: e.score.expect("score moment without score"),
                text: e.text.clone(),
                index: e.index,
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            events = events.len(),
            score_moments = moments.len(),
            "timeline loaded"
        );

        Ok(Self {
            events,
            moments,
            overlay_lead: OVERLAY_LEAD_SECONDS,
            overlay_tail: OVERLAY_TAIL_SECONDS,
        })
    }

    /// Override the overlay window around each score moment
    pub fn with_overlay_window(mut self, lead_seconds: f64, tail_seconds: f64) -> Self {
        self.overlay_lead = lead_seconds;
        self.overlay_tail = tail_seconds;
        self
    }

    /// All events, ascending by time
    pub fn events(&self) -> &[SessionEvent] {
        &self.events
    }

    /// Number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if the timeline has no events
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Index of the most recent event at or before `position`
    ///
    /// Returns `None` when the position precedes the first event. Monotonic
    /// non-decreasing as the position increases; on equal timestamps the
    /// later index wins.
    pub fn active_index_at(&self, position: f64) -> Option<usize> {
        let idx = self.events.partition_point(|e| e.time <= position);
        if idx == 0 {
            None
        } else {
            Some(idx - 1)
        }
    }

    /// Scored subject turns in ascending time order
    ///
    /// Restartable: each call yields a fresh iterator over the cached
    /// sequence.
    pub fn score_moments(&self) -> impl Iterator<Item = &ScoreMoment> + '_ {
        self.moments.iter()
    }

    /// The cached score moments as a slice
    pub fn moments(&self) -> &[ScoreMoment] {
        &self.moments
    }

    /// The score moment whose overlay window contains `position`, if any
    ///
    /// Windows span `[time - lead, time + tail]`. When windows overlap the
    /// earliest-time moment wins.
    pub fn overlay_at(&self, position: f64) -> Option<&ScoreMoment> {
        for moment in &self.moments {
            let show_start = moment.time - self.overlay_lead;
            let show_end = moment.time + self.overlay_tail;
            if position < show_start {
                // Moments are time-ascending, no later window can start earlier
                return None;
            }
            if position <= show_end {
                return Some(moment);
            }
        }
        None
    }

    /// Fraction of the media duration at which a moment sits, for timeline
    /// marker placement
    ///
    /// Zero when the duration is not positive.
    pub fn marker_fraction(&self, moment: &ScoreMoment, duration: f64) -> f64 {
        if duration > 0.0 {
            (moment.time / duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}
