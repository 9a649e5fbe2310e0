//! Aggregate performance statistics over a session's score moments
//!
//! Pure derivation: metrics are a function of the score-moment sequence
//! alone, so they can be computed once at load time and never change for
//! the session's lifetime.

use crate::types::{PerformanceMetrics, ScoreMoment, Trend};

/// Minimum number of score moments before a trend is computed
///
/// Below this the trend is always neutral regardless of values; a two-point
/// "trend" says nothing a viewer should act on.
const TREND_MIN_MOMENTS: usize = 4;

/// Points the second-half average must move beyond the first-half average
/// before the trend leaves neutral
const TREND_THRESHOLD: f64 = 5.0;

impl PerformanceMetrics {
    /// Compute metrics from a score-moment sequence
    ///
    /// All-zero metrics (neutral trend) for an empty sequence. The average
    /// is rounded to the nearest integer; the trend compares unrounded
    /// half averages.
    pub fn from_moments(moments: &[ScoreMoment]) -> Self {
        if moments.is_empty() {
            return Self::default();
        }

        let scores: Vec<u32> = moments.iter().map(|m| m.score as u32).collect();
        let sum: u32 = scores.iter().sum();
        let average = (sum as f64 / scores.len() as f64).round() as u32;
        let highest = *scores.iter().max().expect("non-empty scores");
        let lowest = *scores.iter().min().expect("non-empty scores");

        Self {
            average,
            highest,
            lowest,
            feedback_count: moments.len(),
            trend: trend_of(&scores),
        }
    }
}

/// First-half vs second-half direction of a score sequence
fn trend_of(scores: &[u32]) -> Trend {
    if scores.len() < TREND_MIN_MOMENTS {
        return Trend::Neutral;
    }

    let half = scores.len() / 2;
    let first: f64 = scores[..half].iter().sum::<u32>() as f64 / half as f64;
    let second: f64 =
        scores[half..].iter().sum::<u32>() as f64 / (scores.len() - half) as f64;

    if second > first + TREND_THRESHOLD {
        Trend::Up
    } else if second < first - TREND_THRESHOLD {
        Trend::Down
    } else {
        Trend::Neutral
    }
}

/// The first moment carrying the highest score, as a seek target
pub fn best_moment(moments: &[ScoreMoment]) -> Option<&ScoreMoment> {
    let highest = moments.iter().map(|m| m.score).max()?;
    moments.iter().find(|m| m.score == highest)
}

/// The first moment carrying the lowest score, as a seek target
pub fn worst_moment(moments: &[ScoreMoment]) -> Option<&ScoreMoment> {
    let lowest = moments.iter().map(|m| m.score).min()?;
    moments.iter().find(|m| m.score == lowest)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moments_from_scores(scores: &[u8]) -> Vec<ScoreMoment> {
        scores
            .iter()
            .enumerate()
            .map(|(i, &score)| ScoreMoment {
                time: i as f64 * 10.0,
                score,
                text: String::new(),
                index: i,
            })
            .collect()
    }

    #[test]
    fn test_empty_sequence_is_all_zero() {
        let metrics = PerformanceMetrics::from_moments(&[]);
        assert_eq!(metrics.average, 0);
        assert_eq!(metrics.highest, 0);
        assert_eq!(metrics.lowest, 0);
        assert_eq!(metrics.feedback_count, 0);
        assert_eq!(metrics.trend, Trend::Neutral);
    }

    #[test]
    fn test_metrics_example() {
        // Scores [60, 90, 40, 95]: average 71 (71.25 rounded), halves
        // average 75 and 67.5, difference -7.5 -> down
        let moments = moments_from_scores(&[60, 90, 40, 95]);
        let metrics = PerformanceMetrics::from_moments(&moments);

        assert_eq!(metrics.average, 71);
        assert_eq!(metrics.highest, 95);
        assert_eq!(metrics.lowest, 40);
        assert_eq!(metrics.feedback_count, 4);
        assert_eq!(metrics.trend, Trend::Down);
    }

    #[test]
    fn test_trend_up() {
        let moments = moments_from_scores(&[50, 55, 70, 75]);
        assert_eq!(PerformanceMetrics::from_moments(&moments).trend, Trend::Up);
    }

    #[test]
    fn test_trend_neutral_within_threshold() {
        // Halves average 60 and 65: exactly +5, not beyond it
        let moments = moments_from_scores(&[60, 60, 65, 65]);
        assert_eq!(
            PerformanceMetrics::from_moments(&moments).trend,
            Trend::Neutral
        );
    }

    #[test]
    fn test_trend_neutral_below_four_moments() {
        // Values that would trend hard with a lower gate
        for scores in [&[10u8, 90][..], &[90, 10, 95][..], &[100][..]] {
            let moments = moments_from_scores(scores);
            assert_eq!(
                PerformanceMetrics::from_moments(&moments).trend,
                Trend::Neutral,
                "scores {:?} must stay neutral",
                scores
            );
        }
    }

    #[test]
    fn test_trend_odd_length_split() {
        // 5 moments split 2/3: first avg 50, second avg 80 -> up
        let moments = moments_from_scores(&[50, 50, 80, 80, 80]);
        assert_eq!(PerformanceMetrics::from_moments(&moments).trend, Trend::Up);
    }

    #[test]
    fn test_best_and_worst_moments() {
        let moments = moments_from_scores(&[60, 95, 40, 95, 40]);
        assert_eq!(best_moment(&moments).unwrap().index, 1);
        assert_eq!(worst_moment(&moments).unwrap().index, 2);
        assert!(best_moment(&[]).is_none());
        assert!(worst_moment(&[]).is_none());
    }
}
