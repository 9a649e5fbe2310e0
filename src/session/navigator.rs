//! Bidirectional mapping between discrete selections and playback position
//!
//! The navigator turns a selection (an event, a score moment, a progress-bar
//! fraction) into a clamped seek target, and condenses the continuous
//! position stream into discrete active-selection transitions so consumers
//! (auto-scroll and the like) fire once per change instead of once per tick.

use crate::error::{ReplayError, Result};
use crate::types::{ScoreMoment, SessionEvent};

/// Active-selection transition emitted when the active index changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveChange {
    /// Index active before the transition, if any
    pub previous: Option<usize>,
    /// Index active after the transition, if any
    pub current: Option<usize>,
}

/// Translates selections into seek targets and signals active changes
#[derive(Debug, Clone)]
pub struct Navigator {
    /// Media duration the targets are clamped against
    duration: f64,
}

impl Navigator {
    /// Create a navigator for a session of the given duration
    pub fn new(duration_seconds: f64) -> Self {
        Self {
            duration: duration_seconds.max(0.0),
        }
    }

    /// The duration seek targets are clamped against
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Seek target for an event selection
    ///
    /// Fails with an out-of-range error when `index` is not a valid event
    /// index; that is a programming-contract violation, not a user-facing
    /// condition.
    pub fn seek_to_event(&self, events: &[SessionEvent], index: usize) -> Result<f64> {
        let event = events.get(index).ok_or(ReplayError::OutOfRange {
            index,
            len: events.len(),
        })?;
        Ok(self.clamp(event.time))
    }

    /// Seek target for a score-moment selection
    pub fn seek_to_moment(&self, moment: &ScoreMoment) -> f64 {
        self.clamp(moment.time)
    }

    /// Seek target for a progress fraction in `[0, 1]`
    pub fn seek_by_fraction(&self, fraction: f64) -> f64 {
        self.clamp(fraction.clamp(0.0, 1.0) * self.duration)
    }

    /// Signal an active-selection transition, or nothing on a mere tick
    pub fn active_change(
        &self,
        previous: Option<usize>,
        current: Option<usize>,
    ) -> Option<ActiveChange> {
        if previous == current {
            None
        } else {
            Some(ActiveChange { previous, current })
        }
    }

    fn clamp(&self, target: f64) -> f64 {
        target.clamp(0.0, self.duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EventRole;

    fn events(times: &[f64]) -> Vec<SessionEvent> {
        times
            .iter()
            .enumerate()
            .map(|(index, &time)| SessionEvent {
                index,
                time,
                role: EventRole::Subject,
                text: String::new(),
                score: None,
            })
            .collect()
    }

    #[test]
    fn test_seek_to_event() {
        let navigator = Navigator::new(20.0);
        let events = events(&[0.0, 5.0, 12.0]);

        assert_eq!(navigator.seek_to_event(&events, 1).unwrap(), 5.0);
        assert_eq!(navigator.seek_to_event(&events, 2).unwrap(), 12.0);
    }

    #[test]
    fn test_seek_to_event_out_of_range() {
        let navigator = Navigator::new(20.0);
        let events = events(&[0.0, 5.0]);

        let err = navigator.seek_to_event(&events, 2).unwrap_err();
        assert!(matches!(err, ReplayError::OutOfRange { index: 2, len: 2 }));
    }

    #[test]
    fn test_targets_are_clamped() {
        let navigator = Navigator::new(10.0);
        let events = events(&[-2.0, 15.0]);

        // A turn logged before the nominal start pins to the beginning,
        // one past the media end pins to the end
        assert_eq!(navigator.seek_to_event(&events, 0).unwrap(), 0.0);
        assert_eq!(navigator.seek_to_event(&events, 1).unwrap(), 10.0);

        let moment = ScoreMoment {
            time: 99.0,
            score: 50,
            text: String::new(),
            index: 1,
        };
        assert_eq!(navigator.seek_to_moment(&moment), 10.0);
    }

    #[test]
    fn test_seek_by_fraction() {
        let navigator = Navigator::new(20.0);
        assert_eq!(navigator.seek_by_fraction(0.5), 10.0);
        assert_eq!(navigator.seek_by_fraction(-0.5), 0.0);
        assert_eq!(navigator.seek_by_fraction(1.5), 20.0);
    }

    #[test]
    fn test_active_change_fires_only_on_transitions() {
        let navigator = Navigator::new(20.0);

        assert!(navigator.active_change(Some(3), Some(3)).is_none());
        assert!(navigator.active_change(None, None).is_none());

        let change = navigator.active_change(Some(3), Some(4)).unwrap();
        assert_eq!(change.previous, Some(3));
        assert_eq!(change.current, Some(4));

        // Entering the first event and seeking back before it both count
        assert!(navigator.active_change(None, Some(0)).is_some());
        assert!(navigator.active_change(Some(0), None).is_some());
    }
}
