//! Feature discretization.
//!
//! For each feature key the observed range `[floor(min), ceil(max)]` is cut
//! into `G` integer-bounded buckets. Bucket `k` (zero-based) is
//!
//! ```text
//! [floor(max - (G - k)/G * range), floor(min + (k + 1)/G * range)]
//! ```
//!
//! with the fractions evaluated as written, `(i / G) * range`. Neighbouring
//! buckets usually share their boundary integer, but float rounding can leave
//! a gap of one integer between them; values inside a gap belong to no bucket.
//! The first bucket containing a value wins. Small ranges produce repeated
//! buckets; they are kept so every key always has exactly `G` entries.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use types::{FeatureKey, FeatureVector, PerHorizon};

use crate::error::{PredictorError, Result};

// =============================================================================
// Bucket
// =============================================================================

/// Closed integer interval `[low, high]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Bucket {
    pub low: i64,
    pub high: i64,
}

impl Bucket {
    pub fn new(low: i64, high: i64) -> Self {
        Self { low, high }
    }

    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.low as f64 && value <= self.high as f64
    }

    /// A value guaranteed to lie inside the bucket.
    #[inline]
    pub fn representative(&self) -> f64 {
        self.low as f64
    }

    /// Distance from `value` to the nearest edge; zero when contained.
    pub fn distance(&self, value: f64) -> f64 {
        if value < self.low as f64 {
            self.low as f64 - value
        } else if value > self.high as f64 {
            value - self.high as f64
        } else {
            0.0
        }
    }
}

// =============================================================================
// BucketSet
// =============================================================================

/// Ordered buckets per feature key.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BucketSet {
    pub buckets: BTreeMap<FeatureKey, Vec<Bucket>>,
}

/// Feature vector mapped to buckets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketedVector {
    pub buckets: BTreeMap<FeatureKey, Bucket>,
    pub stamps: PerHorizon<NaiveDate>,
}

impl BucketedVector {
    #[inline]
    pub fn get(&self, key: &FeatureKey) -> Option<Bucket> {
        self.buckets.get(key).copied()
    }
}

impl BucketSet {
    /// Compute `granularity` buckets per key from the observed ranges.
    ///
    /// Keys are the union of all vector keys, which in practice is the registry.
    pub fn build(vectors: &[FeatureVector], granularity: usize) -> Self {
        let granularity = granularity.max(1);
        let mut ranges: BTreeMap<FeatureKey, (f64, f64)> = BTreeMap::new();

        for vector in vectors {
            for (key, &value) in &vector.values {
                ranges
                    .entry(*key)
                    .and_modify(|(min, max)| {
                        *min = min.min(value);
                        *max = max.max(value);
                    })
                    .or_insert((value, value));
            }
        }

        let buckets = ranges
            .into_iter()
            .map(|(key, (min, max))| (key, partition(min, max, granularity)))
            .collect();

        let set = Self { buckets };
        debug!(keys = set.len(), granularity, "Built bucket set");
        set
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &FeatureKey> {
        self.buckets.keys()
    }

    pub fn get(&self, key: &FeatureKey) -> Option<&[Bucket]> {
        self.buckets.get(key).map(Vec::as_slice)
    }

    /// First bucket of `key` containing `value`.
    pub fn locate(&self, key: &FeatureKey, value: f64) -> Result<Bucket> {
        self.get(key)
            .and_then(|list| list.iter().find(|b| b.contains(value)).copied())
            .ok_or(PredictorError::BucketMiss { key: *key, value })
    }

    /// Map every key of the set to its bucket. Any miss is an error.
    pub fn bucketize(&self, vector: &FeatureVector) -> Result<BucketedVector> {
        let buckets: BTreeMap<FeatureKey, Bucket> = self
            .buckets
            .keys()
            .map(|key| {
                let value = feature_value(vector, key)?;
                Ok((*key, self.locate(key, value)?))
            })
            .collect::<Result<_>>()?;

        Ok(BucketedVector {
            buckets,
            stamps: vector.stamps,
        })
    }

    /// Like [`bucketize`](Self::bucketize), but out-of-range values snap to
    /// the nearest bucket. Each snap is logged.
    pub fn bucketize_clamped(&self, vector: &FeatureVector) -> Result<BucketedVector> {
        let mut buckets = BTreeMap::new();

        for (key, list) in &self.buckets {
            let value = feature_value(vector, key)?;
            let bucket = match self.locate(key, value) {
                Ok(bucket) => bucket,
                Err(miss) => {
                    let nearest = nearest(list, value).ok_or(miss)?;
                    warn!(
                        key = %key,
                        value,
                        low = nearest.low,
                        high = nearest.high,
                        "Value outside every bucket, clamping"
                    );
                    nearest
                }
            };
            buckets.insert(*key, bucket);
        }

        Ok(BucketedVector {
            buckets,
            stamps: vector.stamps,
        })
    }
}

fn feature_value(vector: &FeatureVector, key: &FeatureKey) -> Result<f64> {
    vector
        .get(key)
        .ok_or_else(|| PredictorError::MalformedSeries(format!("feature vector has no {}", key)))
}

/// Nearest bucket to `value`; earliest wins on ties.
fn nearest(list: &[Bucket], value: f64) -> Option<Bucket> {
    list.iter().copied().fold(None, |best: Option<Bucket>, b| match best {
        Some(best) if best.distance(value) <= b.distance(value) => Some(best),
        _ => Some(b),
    })
}

fn partition(min: f64, max: f64, granularity: usize) -> Vec<Bucket> {
    let min = min.floor();
    let max = max.ceil();
    let range = max - min;
    let g = granularity as f64;

    (1..=granularity)
        .rev()
        .zip(1..=granularity)
        .map(|(i, j)| {
            let low = (max - (i as f64 / g) * range).floor();
            let high = (min + (j as f64 / g) * range).floor();
            Bucket::new(low as i64, high as i64)
        })
        .collect()
}
