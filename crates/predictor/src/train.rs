//! Training entry points.

use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::info;
use types::{FeatureVector, PerHorizon, StockHistory};

use crate::bucket::BucketSet;
use crate::error::Result;
use crate::extract::extract_features;
use crate::label::label_series;
use crate::model::{Model, Sample, label_catalog};
use crate::split::split_samples;
use crate::tree::TreeBuilder;

/// Training parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainConfig {
    /// Buckets per feature key.
    pub granularity: usize,
    /// Share of labeled samples held out for testing.
    pub holdout_fraction: f64,
    /// Seed for the split. `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            granularity: 20,
            holdout_fraction: 0.1,
            seed: None,
        }
    }
}

/// Train a model from a symbol's full history.
pub fn train(history: &StockHistory, config: &TrainConfig) -> Result<Model> {
    let vectors = extract_features(history);
    train_vectors(&vectors, config)
}

/// Train a model from feature vectors ordered newest first.
///
/// Values falling between two buckets snap to the nearest one, as they do at
/// prediction time.
pub fn train_vectors(vectors: &[FeatureVector], config: &TrainConfig) -> Result<Model> {
    let buckets = BucketSet::build(vectors, config.granularity);
    let labels = label_series(vectors);

    let samples = vectors
        .iter()
        .skip(1)
        .zip(labels)
        .map(|(vector, label)| {
            Ok(Sample {
                vector: buckets.bucketize_clamped(vector)?,
                label,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let partition = split_samples(samples, config.holdout_fraction, &mut rng)?;

    let catalog = label_catalog();
    let trees = PerHorizon::from_fn(|horizon| {
        TreeBuilder::new(horizon, buckets.keys().copied(), catalog.len())
            .build(&partition.training)
    });

    let mut model = Model {
        buckets,
        catalog,
        trees,
        tests: partition.test,
        validation: partition.validation,
        validity: Default::default(),
        confidence: Default::default(),
        built_at: Utc::now(),
    };
    model.validity = model.validate();
    model.confidence = model.test();

    info!(
        training = partition.training.len(),
        validation = model.validation.len(),
        test = model.tests.len(),
        validity = %model.validity,
        confidence = %model.confidence,
        "Trained model"
    );
    Ok(model)
}
