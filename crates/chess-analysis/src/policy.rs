//! Scoring policies: classification thresholds and per-move accuracy.

use crate::Classification;
use serde::{Deserialize, Serialize};

/// Turns a move's centipawn loss into a class and an accuracy value.
///
/// `eval_diff` is the absolute centipawn loss of the move; `pre_eval` is the
/// evaluation of the position before the move from the mover's point of view.
pub trait ScoringPolicy {
    /// Classification threshold for a position evaluated at `pre_eval`.
    fn base_threshold(&self, pre_eval: i64) -> i64;

    /// Classifies a move. Must be monotonic in `eval_diff` for a fixed
    /// threshold.
    fn classify(&self, eval_diff: i64, pre_eval: i64) -> Classification;

    /// Smoothed per-move accuracy in `[0, 100]`.
    fn accuracy(&self, eval_diff: i64, pre_eval: i64) -> f64;
}

/// Threshold-multiple classification with a square-root accuracy curve.
///
/// Every constant can be overridden from the `[scoring]` config section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdPolicy {
    /// Threshold used while `|pre_eval| < decided_above`.
    pub quiet_threshold: i64,
    /// Threshold used once the position is already decided.
    pub decided_threshold: i64,
    /// `|pre_eval|` at which a position counts as decided.
    pub decided_above: i64,
    /// Upper bounds for Best, Good, Inaccuracy and Mistake as multiples of
    /// the threshold; anything beyond the last is a Blunder.
    pub multipliers: [i64; 4],
    /// Nominal loss at which accuracy reaches zero.
    pub max_loss: f64,
    /// `|pre_eval|` above which `max_loss` is scaled by `lenient_scale`.
    pub lenient_above: i64,
    pub lenient_scale: f64,
    /// `|pre_eval|` below which `max_loss` is scaled by `strict_scale`.
    pub strict_below: i64,
    pub strict_scale: f64,
    /// Losses above `catastrophic_factor * max_loss` have their accuracy
    /// multiplied by `catastrophic_penalty`.
    pub catastrophic_factor: f64,
    pub catastrophic_penalty: f64,
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self {
            quiet_threshold: 25,
            decided_threshold: 40,
            decided_above: 200,
            multipliers: [1, 2, 4, 8],
            max_loss: 300.0,
            lenient_above: 200,
            lenient_scale: 1.5,
            strict_below: 50,
            strict_scale: 0.8,
            catastrophic_factor: 2.0,
            catastrophic_penalty: 0.5,
        }
    }
}

impl ThresholdPolicy {
    /// Loss at which accuracy bottoms out for a position at `pre_eval`.
    #[must_use]
    pub fn max_loss(&self, pre_eval: i64) -> f64 {
        let magnitude = pre_eval.abs();
        if magnitude > self.lenient_above {
            self.max_loss * self.lenient_scale
        } else if magnitude < self.strict_below {
            self.max_loss * self.strict_scale
        } else {
            self.max_loss
        }
    }
}

impl ScoringPolicy for ThresholdPolicy {
    fn base_threshold(&self, pre_eval: i64) -> i64 {
        if pre_eval.abs() < self.decided_above {
            self.quiet_threshold
        } else {
            self.decided_threshold
        }
    }

    fn classify(&self, eval_diff: i64, pre_eval: i64) -> Classification {
        let threshold = self.base_threshold(pre_eval);
        let [best, good, inaccuracy, mistake] = self.multipliers;
        if eval_diff < best * threshold {
            Classification::Best
        } else if eval_diff < good * threshold {
            Classification::Good
        } else if eval_diff < inaccuracy * threshold {
            Classification::Inaccuracy
        } else if eval_diff < mistake * threshold {
            Classification::Mistake
        } else {
            Classification::Blunder
        }
    }

    fn accuracy(&self, eval_diff: i64, pre_eval: i64) -> f64 {
        let max_loss = self.max_loss(pre_eval);
        if max_loss <= 0.0 {
            return if eval_diff <= 0 { 100.0 } else { 0.0 };
        }
        let loss = eval_diff.max(0) as f64;
        let mut accuracy = (100.0 * (1.0 - (loss / max_loss).sqrt())).clamp(0.0, 100.0);
        if loss > self.catastrophic_factor * max_loss {
            accuracy *= self.catastrophic_penalty;
        }
        accuracy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_base_threshold_switches_at_200() {
        let policy = ThresholdPolicy::default();
        assert_eq!(policy.base_threshold(0), 25);
        assert_eq!(policy.base_threshold(-199), 25);
        assert_eq!(policy.base_threshold(200), 40);
        assert_eq!(policy.base_threshold(-350), 40);
    }

    #[test]
    fn test_quiet_buckets() {
        let policy = ThresholdPolicy::default();
        assert_eq!(policy.classify(0, 0), Classification::Best);
        assert_eq!(policy.classify(24, 0), Classification::Best);
        assert_eq!(policy.classify(25, 0), Classification::Good);
        assert_eq!(policy.classify(50, 0), Classification::Inaccuracy);
        assert_eq!(policy.classify(100, 0), Classification::Mistake);
        assert_eq!(policy.classify(199, 0), Classification::Mistake);
        assert_eq!(policy.classify(200, 0), Classification::Blunder);
    }

    #[test]
    fn test_decided_buckets_are_wider() {
        let policy = ThresholdPolicy::default();
        assert_eq!(policy.classify(30, 500), Classification::Best);
        assert_eq!(policy.classify(30, 0), Classification::Good);
        assert_eq!(policy.classify(300, 500), Classification::Mistake);
        assert_eq!(policy.classify(320, 500), Classification::Blunder);
    }

    #[test]
    fn test_accuracy_curve() {
        let policy = ThresholdPolicy::default();
        // Balanced position: max_loss 240.
        assert_eq!(policy.accuracy(0, 0), 100.0);
        assert!((policy.accuracy(60, 0) - 50.0).abs() < 1e-9);
        assert_eq!(policy.accuracy(240, 0), 0.0);
        // Nominal position: max_loss 300.
        assert!((policy.accuracy(75, 100) - 50.0).abs() < 1e-9);
        // Decided position: max_loss 450.
        assert!(policy.accuracy(100, 400) > policy.accuracy(100, 100));
    }

    #[test]
    fn test_catastrophic_loss_is_halved() {
        let policy = ThresholdPolicy {
            max_loss: 1000.0,
            catastrophic_factor: 0.25,
            ..ThresholdPolicy::default()
        };
        // max_loss(100) = 1000, loss 360 > 250 so the raw 40.0 is halved.
        assert!((policy.accuracy(360, 100) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_policy_deserializes_partial_config() {
        let policy: ThresholdPolicy =
            serde_json::from_str(r#"{"quiet_threshold": 30, "multipliers": [1, 3, 6, 9]}"#).unwrap();
        assert_eq!(policy.quiet_threshold, 30);
        assert_eq!(policy.multipliers, [1, 3, 6, 9]);
        assert_eq!(policy.decided_threshold, 40);
    }

    proptest! {
        #[test]
        fn classification_is_monotonic(d1 in 0i64..5000, d2 in 0i64..5000, pre in -3000i64..3000) {
            let policy = ThresholdPolicy::default();
            let (lo, hi) = if d1 <= d2 { (d1, d2) } else { (d2, d1) };
            prop_assert!(policy.classify(lo, pre) <= policy.classify(hi, pre));
        }

        #[test]
        fn accuracy_stays_in_range(d in 0i64..40_000, pre in -20_000i64..20_000) {
            let policy = ThresholdPolicy::default();
            let accuracy = policy.accuracy(d, pre);
            prop_assert!((0.0..=100.0).contains(&accuracy));
        }
    }
}
