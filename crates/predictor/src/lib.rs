//! Bucketed decision-tree engine for multi-horizon outcome forecasting.
//!
//! # Pipeline
//!
//! ```text
//! training:   StockHistory -> extract -> bucket -> label -> split -> tree (x3) -> Model
//! prediction: (day, week, month) -> FeatureVector -> bucketize -> infer (x3) -> Forecast
//! ```
//!
//! Everything the two paths share (the bucket set, the label catalog and the
//! trees) lives in the immutable [`Model`]. Retraining produces a new value.
//!
//! # Usage
//!
//! ```ignore
//! use predictor::{TrainConfig, train};
//!
//! let model = train(&history, &TrainConfig::default())?;
//! let forecast = model.forecast(&day, &week, &month)?;
//! println!("{} -> {}", forecast.label.daily, forecast.suggestion);
//! ```

pub mod bucket;
pub mod entropy;
pub mod error;
pub mod extract;
pub mod inference;
pub mod label;
pub mod model;
pub mod score;
pub mod split;
pub mod train;
pub mod tree;

pub use bucket::{Bucket, BucketSet, BucketedVector};
pub use entropy::OutcomeCounts;
pub use error::{PredictorError, Result};
pub use extract::{assemble_history, assemble_series, extract_features};
pub use inference::infer;
pub use label::{LabelDistribution, label_distribution, label_series};
pub use model::{Forecast, Model, Sample, label_catalog};
pub use score::{SuggestionWeights, partial_credit, score_samples, suggest};
pub use split::{Partition, split_samples};
pub use train::{TrainConfig, train, train_vectors};
pub use tree::{Branch, Node, TreeBuilder};
