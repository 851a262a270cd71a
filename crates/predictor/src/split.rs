//! Training / validation / test partitioning.
//!
//! `floor(n * fraction)` samples are moved out as the test set. The same
//! number is then drawn from the remaining samples as the validation set;
//! validation samples stay in training.

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::error::{PredictorError, Result};
use crate::model::Sample;

#[derive(Debug, Clone)]
pub struct Partition {
    pub training: Vec<Sample>,
    pub validation: Vec<Sample>,
    pub test: Vec<Sample>,
}

/// Partition labeled samples.
///
/// Fails with `InsufficientData` when either training or test ends up empty.
pub fn split_samples<R: Rng + ?Sized>(
    mut samples: Vec<Sample>,
    holdout_fraction: f64,
    rng: &mut R,
) -> Result<Partition> {
    let fraction = holdout_fraction.clamp(0.0, 1.0);
    let test_size = (samples.len() as f64 * fraction).floor() as usize;

    let mut test = Vec::with_capacity(test_size);
    for _ in 0..test_size {
        let idx = rng.gen_range(0..samples.len());
        test.push(samples.remove(idx));
    }

    if samples.is_empty() || test.is_empty() {
        return Err(PredictorError::InsufficientData {
            training: samples.len(),
            test: test.len(),
        });
    }

    let validation: Vec<Sample> = samples.choose_multiple(rng, test_size).cloned().collect();

    debug!(
        training = samples.len(),
        validation = validation.len(),
        test = test.len(),
        "Split samples"
    );

    Ok(Partition {
        training: samples,
        validation,
        test,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucket::BucketedVector;
    use chrono::{Days, NaiveDate};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use types::{Label, Outcome, PerHorizon};

    fn samples(n: usize) -> Vec<Sample> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (0..n)
            .map(|i| {
                let stamp = start.checked_add_days(Days::new(i as u64)).unwrap();
                Sample {
                    vector: BucketedVector {
                        buckets: Default::default(),
                        stamps: PerHorizon::new(stamp, stamp, stamp),
                    },
                    label: Label::new(Outcome::Neutral, Outcome::Neutral, Outcome::Neutral),
                }
            })
            .collect()
    }

    #[test]
    fn test_split_sizes() {
        let mut rng = StdRng::seed_from_u64(7);
        let part = split_samples(samples(59), 0.1, &mut rng).unwrap();

        assert_eq!(part.test.len(), 5);
        assert_eq!(part.training.len(), 54);
        assert_eq!(part.validation.len(), 5);
    }

    #[test]
    fn test_test_disjoint_validation_within_training() {
        let mut rng = StdRng::seed_from_u64(11);
        let part = split_samples(samples(40), 0.25, &mut rng).unwrap();

        let training: Vec<NaiveDate> = part.training.iter().map(|s| s.vector.stamps.daily).collect();
        for sample in &part.test {
            assert!(!training.contains(&sample.vector.stamps.daily));
        }
        for sample in &part.validation {
            assert!(training.contains(&sample.vector.stamps.daily));
        }
    }

    #[test]
    fn test_training_keeps_order() {
        let mut rng = StdRng::seed_from_u64(3);
        let part = split_samples(samples(30), 0.1, &mut rng).unwrap();
        assert!(part
            .training
            .windows(2)
            .all(|w| w[0].vector.stamps.daily < w[1].vector.stamps.daily));
    }

    #[test]
    fn test_insufficient_data() {
        let mut rng = StdRng::seed_from_u64(1);
        // floor(9 * 0.1) = 0 test samples.
        let err = split_samples(samples(9), 0.1, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            PredictorError::InsufficientData { training: 9, test: 0 }
        ));

        let err = split_samples(samples(4), 1.0, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            PredictorError::InsufficientData { training: 0, test: 4 }
        ));
    }

    #[test]
    fn test_seeded_split_is_deterministic() {
        let a = split_samples(samples(50), 0.1, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = split_samples(samples(50), 0.1, &mut StdRng::seed_from_u64(42)).unwrap();
        let stamps = |p: &Partition| -> Vec<NaiveDate> {
            p.test.iter().map(|s| s.vector.stamps.daily).collect()
        };
        assert_eq!(stamps(&a), stamps(&b));
    }
}
