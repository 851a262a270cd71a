//! Outcome counting, entropy and information gain.
//!
//! Entropy is measured with the label catalog length as the logarithm base,
//! so a perfectly uniform distribution over the catalog has entropy 1.
//! All functions are total: empty inputs yield zero.

use std::collections::BTreeMap;

use types::{FeatureKey, Horizon, Outcome};

use crate::bucket::Bucket;
use crate::model::Sample;

/// Occurrence count per outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeCounts {
    counts: [usize; 7],
}

impl OutcomeCounts {
    #[inline]
    fn slot(outcome: Outcome) -> usize {
        (outcome.value() + 3) as usize
    }

    pub fn from_outcomes<I: IntoIterator<Item = Outcome>>(outcomes: I) -> Self {
        let mut counts = Self::default();
        for outcome in outcomes {
            counts.add(outcome);
        }
        counts
    }

    #[inline]
    pub fn add(&mut self, outcome: Outcome) {
        self.counts[Self::slot(outcome)] += 1;
    }

    #[inline]
    pub fn get(&self, outcome: Outcome) -> usize {
        self.counts[Self::slot(outcome)]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// `(outcome, count)` in catalog order, most positive first.
    pub fn iter(&self) -> impl Iterator<Item = (Outcome, usize)> + '_ {
        Outcome::ALL.into_iter().map(|o| (o, self.get(o)))
    }

    /// `-Σ p·log_base(p)` over the nonzero proportions.
    pub fn entropy(&self, base: f64) -> f64 {
        let total = self.total();
        if total == 0 || base <= 1.0 {
            return 0.0;
        }

        let mut h = 0.0;
        for &count in &self.counts {
            if count > 0 {
                let p = count as f64 / total as f64;
                h -= p * p.log(base);
            }
        }
        h.max(0.0)
    }
}

/// Outcome counts of `samples` at `horizon`.
pub fn class_occurrence(samples: &[&Sample], horizon: Horizon) -> OutcomeCounts {
    OutcomeCounts::from_outcomes(samples.iter().map(|s| *s.label.get(horizon)))
}

/// Outcome counts per bucket of `key`.
pub fn feature_occurrence(
    samples: &[&Sample],
    key: &FeatureKey,
    horizon: Horizon,
) -> BTreeMap<Bucket, OutcomeCounts> {
    let mut groups: BTreeMap<Bucket, OutcomeCounts> = BTreeMap::new();
    for sample in samples {
        if let Some(bucket) = sample.vector.get(key) {
            groups.entry(bucket).or_default().add(*sample.label.get(horizon));
        }
    }
    groups
}

/// Count-weighted mean entropy of a partition.
pub fn weighted_entropy<'a, I>(groups: I, base: f64) -> f64
where
    I: IntoIterator<Item = &'a OutcomeCounts>,
{
    let groups: Vec<&OutcomeCounts> = groups.into_iter().collect();
    let total: usize = groups.iter().map(|g| g.total()).sum();
    if total == 0 {
        return 0.0;
    }
    groups
        .iter()
        .map(|g| (g.total() as f64 / total as f64) * g.entropy(base))
        .sum()
}

/// Entropy reduction from splitting `samples` on `key`.
pub fn information_gain(
    samples: &[&Sample],
    key: &FeatureKey,
    horizon: Horizon,
    parent_entropy: f64,
    base: f64,
) -> f64 {
    let groups = feature_occurrence(samples, key, horizon);
    parent_entropy - weighted_entropy(groups.values(), base)
}
