//! Error types for training and inference.

use thiserror::Error;
use types::FeatureKey;

/// Result type for predictor operations.
pub type Result<T> = std::result::Result<T, PredictorError>;

#[derive(Debug, Error)]
pub enum PredictorError {
    /// Splitting left no training or no test sample.
    #[error("insufficient data: {training} training and {test} test samples")]
    InsufficientData { training: usize, test: usize },

    /// A feature value lies outside every bucket of its key.
    #[error("value {value} for {key} falls outside every bucket")]
    BucketMiss { key: FeatureKey, value: f64 },

    /// Upstream rows could not be turned into a usable history.
    #[error("malformed series: {0}")]
    MalformedSeries(String),
}
