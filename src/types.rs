//! Core data types for the replay engine
//!
//! This module contains the fundamental data structures used throughout
//! the crate for representing session events, score moments and derived
//! playback state.
//!
//! # Main Types
//!
//! - [`EventRole`] - Who produced a conversation turn (subject vs counterpart)
//! - [`SessionEvent`] - One timestamped turn in the session log
//! - [`ScoreMoment`] - A scored subject turn, used for overlays and statistics
//! - [`ScoreBand`] - Coarse classification of a score for display consumers
//! - [`PerformanceMetrics`] - Aggregate score statistics with a trend
//! - [`EngineState`] - Lifecycle state of the synchronization engine
//!
//! # Timing
//!
//! All event times are seconds from the session start, normalized at load
//! time from absolute timestamps. Playback positions use the same scale, so
//! active-index and overlay queries are direct comparisons.

use serde::{Deserialize, Serialize};

/// Seconds a score overlay becomes visible before its moment
pub const OVERLAY_LEAD_SECONDS: f64 = 0.5;

/// Seconds a score overlay stays visible after its moment
pub const OVERLAY_TAIL_SECONDS: f64 = 3.0;

/// Default seek step for skip commands, in seconds
pub const SEEK_STEP_SECONDS: f64 = 5.0;

/// Default volume step for volume commands
pub const VOLUME_STEP: f64 = 0.1;

/// Playback rates cycled through by the rate command, in order
pub const PLAYBACK_RATES: [f64; 4] = [0.5, 1.0, 1.5, 2.0];

/// Coarsest resolution at which position updates are worth delivering,
/// in milliseconds
pub const POSITION_RESOLUTION_MS: u64 = 100;

/// Who produced a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventRole {
    /// The evaluated party; scored feedback attaches to these turns
    Subject,
    /// The other side of the conversation
    Counterpart,
}

impl std::fmt::Display for EventRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventRole::Subject => write!(f, "subject"),
            EventRole::Counterpart => write!(f, "counterpart"),
        }
    }
}

/// One timestamped turn in the session's conversation/evaluation log
///
/// `time` is seconds from session start; `index` is the position in the
/// time-ascending order. Events are immutable once the timeline is loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionEvent {
    /// Position in the time-ascending event order
    pub index: usize,
    /// Seconds from session start
    pub time: f64,
    /// Who produced the turn
    pub role: EventRole,
    /// Turn text
    pub text: String,
    /// Evaluation score in 0..=100, if this turn carries one
    pub score: Option<u8>,
}

impl SessionEvent {
    /// Whether this event drives a score overlay (scored subject turn)
    pub fn is_score_moment(&self) -> bool {
        self.score.is_some() && self.role == EventRole::Subject
    }
}

/// A scored subject turn, the unit driving overlays and statistics
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreMoment {
    /// Seconds from session start
    pub time: f64,
    /// Evaluation score in 0..=100
    pub score: u8,
    /// Feedback text attached to the score
    pub text: String,
    /// Index of the originating event in the timeline
    pub index: usize,
}

impl ScoreMoment {
    /// Coarse score classification
    pub fn band(&self) -> ScoreBand {
        ScoreBand::of(self.score)
    }

    /// Feedback text truncated for compact display, with an ellipsis when cut
    pub fn preview_text(&self, max_chars: usize) -> String {
        if self.text.chars().count() <= max_chars {
            self.text.clone()
        } else {
            let truncated: String = self.text.chars().take(max_chars).collect();
            format!("{}...", truncated)
        }
    }
}

/// Coarse classification of a score for display consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    /// 80 and above
    High,
    /// 60 to 79
    Mid,
    /// Below 60
    Low,
}

impl ScoreBand {
    /// Classify a score
    pub fn of(score: u8) -> Self {
        if score >= 80 {
            ScoreBand::High
        } else if score >= 60 {
            ScoreBand::Mid
        } else {
            ScoreBand::Low
        }
    }

    /// Short label for this band
    pub fn label(&self) -> &'static str {
        match self {
            ScoreBand::High => "Great!",
            ScoreBand::Mid => "Good",
            ScoreBand::Low => "Keep Trying",
        }
    }
}

/// Qualitative direction of score change between the first and second half
/// of a score sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    /// Second half averages more than 5 points above the first
    Up,
    /// Second half averages more than 5 points below the first
    Down,
    /// No significant change, or fewer than 4 moments
    #[default]
    Neutral,
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trend::Up => write!(f, "Improving"),
            Trend::Down => write!(f, "Declining"),
            Trend::Neutral => write!(f, "Steady"),
        }
    }
}

/// Aggregate score statistics over a session's score moments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PerformanceMetrics {
    /// Arithmetic mean of scores, rounded to the nearest integer
    pub average: u32,
    /// Highest score seen
    pub highest: u32,
    /// Lowest score seen
    pub lowest: u32,
    /// Number of score moments
    pub feedback_count: usize,
    /// First-half vs second-half direction
    pub trend: Trend,
}

/// Lifecycle state of the synchronization engine
///
/// `Closed` and `Error` are terminal; recovery from `Error` requires a
/// fresh engine and `open()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineState {
    /// Created, not yet opened
    #[default]
    Idle,
    /// `open()` in flight: both fetches pending
    Loading,
    /// Session loaded, playback not started
    Ready,
    /// Media playing
    Playing,
    /// Media paused
    Paused,
    /// Engine closed, media handle released
    Closed,
    /// Load or playback failure
    Error,
}

impl EngineState {
    /// Check if media is currently playing
    pub fn is_playing(&self) -> bool {
        matches!(self, EngineState::Playing)
    }

    /// Check if a session is loaded and queries are meaningful
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            EngineState::Ready | EngineState::Playing | EngineState::Paused
        )
    }

    /// Check if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, EngineState::Closed | EngineState::Error)
    }

    /// Display name for the state
    pub fn display_name(&self) -> &'static str {
        match self {
            EngineState::Idle => "Idle",
            EngineState::Loading => "Loading",
            EngineState::Ready => "Ready",
            EngineState::Playing => "Playing",
            EngineState::Paused => "Paused",
            EngineState::Closed => "Closed",
            EngineState::Error => "Error",
        }
    }
}

impl std::fmt::Display for EngineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Format a position as MM:SS for display
pub fn format_time(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let mins = total / 60;
    let secs = total % 60;
    format!("{}:{:02}", mins, secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_band_boundaries() {
        assert_eq!(ScoreBand::of(100), ScoreBand::High);
        assert_eq!(ScoreBand::of(80), ScoreBand::High);
        assert_eq!(ScoreBand::of(79), ScoreBand::Mid);
        assert_eq!(ScoreBand::of(60), ScoreBand::Mid);
        assert_eq!(ScoreBand::of(59), ScoreBand::Low);
        assert_eq!(ScoreBand::of(0), ScoreBand::Low);
    }

    #[test]
    fn test_engine_state_predicates() {
        assert!(EngineState::Playing.is_playing());
        assert!(!EngineState::Paused.is_playing());
        assert!(EngineState::Ready.is_open());
        assert!(EngineState::Paused.is_open());
        assert!(!EngineState::Loading.is_open());
        assert!(EngineState::Closed.is_terminal());
        assert!(EngineState::Error.is_terminal());
        assert!(!EngineState::Ready.is_terminal());
    }

    #[test]
    fn test_score_moment_helpers() {
        let moment = ScoreMoment {
            time: 12.0,
            score: 45,
            text: "Slow down and let the customer finish their thought".to_string(),
            index: 3,
        };
        assert_eq!(moment.band(), ScoreBand::Low);
        assert_eq!(moment.preview_text(9), "Slow down...");
        assert_eq!(moment.preview_text(200), moment.text);
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(65.4), "1:05");
        assert_eq!(format_time(600.0), "10:00");
        assert_eq!(format_time(-3.0), "0:00");
    }

    #[test]
    fn test_event_score_moment_filter() {
        let scored_subject = SessionEvent {
            index: 0,
            time: 1.0,
            role: EventRole::Subject,
            text: String::new(),
            score: Some(70),
        };
        let scored_counterpart = SessionEvent {
            score: Some(70),
            role: EventRole::Counterpart,
            ..scored_subject.clone()
        };
        let unscored = SessionEvent {
            score: None,
            ..scored_subject.clone()
        };
        assert!(scored_subject.is_score_moment());
        assert!(!scored_counterpart.is_score_moment());
        assert!(!unscored.is_score_moment());
    }
}
