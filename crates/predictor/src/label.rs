//! Outcome labeling from historical deltas.
//!
//! Series run newest first, so the sample "preceding" index `i` is index
//! `i - 1`: the next observation in time. A label therefore describes how the
//! indicators moved after the sample was taken.
//!
//! For each key of a horizon the sample value `v` is compared with the
//! baseline value `b`:
//!
//! | condition              | outcome |
//! |------------------------|---------|
//! | `v + 1.00·|v| < b`     | +3      |
//! | `v + 0.10·|v| < b`     | +2      |
//! | `v + 0.01·|v| < b`     | +1      |
//! | `v - 1.00·|v| > b`     | -3      |
//! | `v - 0.10·|v| > b`     | -2      |
//! | `v - 0.01·|v| > b`     | -1      |
//! | otherwise              | 0       |
//!
//! Keys are evaluated in registry order and every non-neutral outcome
//! overwrites the horizon label, so the last moving key decides.

use tracing::debug;
use types::{FeatureKey, FeatureVector, Horizon, Label, Outcome, PerHorizon};

use crate::entropy::OutcomeCounts;

/// Outcome counts per horizon.
pub type LabelDistribution = PerHorizon<OutcomeCounts>;

/// Relative thresholds, largest first, with their outcome magnitude.
const THRESHOLDS: [(f64, i8); 3] = [(1.0, 3), (0.1, 2), (0.01, 1)];

/// Classify the move from `value` to `baseline`.
pub fn outcome_for(value: f64, baseline: f64) -> Outcome {
    let magnitude = value.abs();

    for (ratio, level) in THRESHOLDS {
        if value + magnitude * ratio < baseline {
            return Outcome::saturating_from(level as i64);
        }
    }
    for (ratio, level) in THRESHOLDS {
        if value - magnitude * ratio > baseline {
            return Outcome::saturating_from(-(level as i64));
        }
    }
    Outcome::Neutral
}

/// Index of the baseline sample for `vectors[index]` at `horizon`.
///
/// Daily uses the previous index. Weekly and monthly use the nearest previous
/// index whose record stamp for that horizon differs; the newest sample
/// (index 0) is never a weekly or monthly baseline.
pub fn baseline_index(vectors: &[FeatureVector], index: usize, horizon: Horizon) -> Option<usize> {
    if index == 0 || index >= vectors.len() {
        return None;
    }
    match horizon {
        Horizon::Daily => Some(index - 1),
        Horizon::Weekly | Horizon::Monthly => {
            let stamp = vectors[index].stamps.get(horizon);
            (1..index)
                .rev()
                .find(|&j| vectors[j].stamps.get(horizon) != stamp)
        }
    }
}

fn horizon_outcome(vectors: &[FeatureVector], index: usize, horizon: Horizon) -> Outcome {
    let Some(base) = baseline_index(vectors, index, horizon) else {
        return Outcome::Neutral;
    };

    let mut outcome = Outcome::Neutral;
    for key in FeatureKey::for_horizon(horizon) {
        let (Some(value), Some(baseline)) = (vectors[index].get(&key), vectors[base].get(&key))
        else {
            continue;
        };
        let moved = outcome_for(value, baseline);
        if moved != Outcome::Neutral {
            outcome = moved;
        }
    }
    outcome
}

/// Label every vector except the first, which has no baseline.
///
/// `labels[k]` belongs to `vectors[k + 1]`.
pub fn label_series(vectors: &[FeatureVector]) -> Vec<Label> {
    let labels: Vec<Label> = (1..vectors.len())
        .map(|i| PerHorizon::from_fn(|h| horizon_outcome(vectors, i, h)))
        .collect();

    let distribution = label_distribution(&labels);
    for (horizon, counts) in distribution.iter() {
        debug!(
            %horizon,
            samples = counts.total(),
            counts = ?counts.iter().collect::<Vec<_>>(),
            "Label distribution"
        );
    }
    labels
}

/// Count outcomes per horizon.
pub fn label_distribution(labels: &[Label]) -> LabelDistribution {
    let mut distribution = LabelDistribution::default();
    for label in labels {
        for horizon in Horizon::ALL {
            distribution.get_mut(horizon).add(*label.get(horizon));
        }
    }
    distribution
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::tests::record;
    use types::Indicator;

    fn vector(day: &str, week: &str, month: &str, value: f64) -> FeatureVector {
        FeatureVector::from_records(
            &record(day, value),
            &record(week, value),
            &record(month, value),
        )
    }

    #[test]
    fn test_outcome_thresholds() {
        assert_eq!(outcome_for(100.0, 100.5), Outcome::Neutral);
        assert_eq!(outcome_for(100.0, 101.5), Outcome::Positive);
        assert_eq!(outcome_for(100.0, 111.0), Outcome::VeryPositive);
        assert_eq!(outcome_for(100.0, 250.0), Outcome::MostPositive);
        assert_eq!(outcome_for(100.0, 98.5), Outcome::Negative);
        assert_eq!(outcome_for(100.0, 85.0), Outcome::VeryNegative);
        assert_eq!(outcome_for(100.0, -5.0), Outcome::MostNegative);
    }

    #[test]
    fn test_outcome_negative_values_use_magnitude() {
        // -10 -> -8 is a 20% rise relative to |v|.
        assert_eq!(outcome_for(-10.0, -8.0), Outcome::VeryPositive);
        assert_eq!(outcome_for(-10.0, -12.0), Outcome::VeryNegative);
        assert_eq!(outcome_for(0.0, 0.0), Outcome::Neutral);
        assert_eq!(outcome_for(0.0, 0.1), Outcome::MostPositive);
    }

    #[test]
    fn test_first_sample_dropped() {
        let vectors = vec![
            vector("2024-03-06", "2024-03-08", "2024-03-01", 12.0),
            vector("2024-03-05", "2024-03-08", "2024-03-01", 10.0),
            vector("2024-03-04", "2024-03-08", "2024-03-01", 10.0),
        ];
        let labels = label_series(&vectors);
        assert_eq!(labels.len(), 2);
        // 10 -> 12 is +20%.
        assert_eq!(labels[0].daily, Outcome::VeryPositive);
        assert_eq!(labels[1].daily, Outcome::Neutral);
    }

    #[test]
    fn test_weekly_baseline_skips_same_week() {
        let vectors = vec![
            vector("2024-03-12", "2024-03-15", "2024-03-01", 40.0),
            vector("2024-03-11", "2024-03-15", "2024-03-01", 25.0),
            vector("2024-03-08", "2024-03-08", "2024-03-01", 10.0),
            vector("2024-03-07", "2024-03-08", "2024-03-01", 10.0),
        ];
        assert_eq!(baseline_index(&vectors, 3, Horizon::Weekly), Some(1));
        assert_eq!(baseline_index(&vectors, 3, Horizon::Daily), Some(2));
        assert_eq!(baseline_index(&vectors, 3, Horizon::Monthly), None);

        let labels = label_series(&vectors);
        assert_eq!(labels[2].weekly, Outcome::MostPositive);
        assert_eq!(labels[2].monthly, Outcome::Neutral);
    }

    #[test]
    fn test_newest_sample_is_never_a_period_baseline() {
        let vectors = vec![
            vector("2024-03-11", "2024-03-15", "2024-04-01", 25.0),
            vector("2024-03-08", "2024-03-08", "2024-03-01", 10.0),
            vector("2024-03-07", "2024-03-08", "2024-03-01", 10.0),
        ];
        assert_eq!(baseline_index(&vectors, 2, Horizon::Weekly), None);
        assert_eq!(baseline_index(&vectors, 2, Horizon::Monthly), None);
        assert_eq!(baseline_index(&vectors, 1, Horizon::Weekly), None);
        assert_eq!(baseline_index(&vectors, 1, Horizon::Daily), Some(0));

        let labels = label_series(&vectors);
        assert_eq!(labels[1].weekly, Outcome::Neutral);
        assert_eq!(labels[1].monthly, Outcome::Neutral);
        // Daily still compares against the newest sample.
        assert_eq!(labels[0].daily, Outcome::MostPositive);
    }

    #[test]
    fn test_last_moving_key_decides() {
        let older = vector("2024-03-05", "2024-03-08", "2024-03-01", 10.0);
        let mut newer = vector("2024-03-06", "2024-03-08", "2024-03-01", 10.0);

        // Early key rises, a later key falls: the later one wins.
        let adjusted = FeatureKey::new(Horizon::Daily, Indicator::by_name("adjusted").unwrap());
        let aroon = FeatureKey::new(Horizon::Daily, Indicator::by_name("aroon_down").unwrap());
        newer.values.insert(adjusted, 15.0);
        newer.values.insert(aroon, 5.0);

        let labels = label_series(&[newer, older]);
        assert_eq!(labels[0].daily, Outcome::VeryNegative);
    }

    #[test]
    fn test_label_distribution_counts() {
        let labels = vec![
            Label::new(Outcome::Positive, Outcome::Neutral, Outcome::Neutral),
            Label::new(Outcome::Positive, Outcome::Negative, Outcome::Neutral),
        ];
        let distribution = label_distribution(&labels);
        assert_eq!(distribution.daily.get(Outcome::Positive), 2);
        assert_eq!(distribution.weekly.get(Outcome::Negative), 1);
        assert_eq!(distribution.monthly.total(), 2);
    }
}
