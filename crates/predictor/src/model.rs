//! Trained model and prediction surface.
//!
//! A [`Model`] is immutable once trained. It carries everything prediction
//! needs (bucket set, label catalog, one tree per horizon) plus the held-out
//! samples and their accuracies, and it serializes to a single JSON document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use types::{Accuracy, FeatureVector, Label, Outcome, PerHorizon, PeriodRecord, Suggestion};

use crate::bucket::{BucketSet, BucketedVector};
use crate::error::Result;
use crate::inference::infer;
use crate::score::{SuggestionWeights, score_samples, suggest};
use crate::tree::Node;

/// Bucketed feature vector with its label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    pub vector: BucketedVector,
    pub label: Label,
}

/// Predicted label with the derived suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Forecast {
    pub label: Label,
    pub suggestion: Suggestion,
}

/// The seven uniform labels, most positive first.
pub fn label_catalog() -> Vec<Label> {
    Outcome::ALL
        .into_iter()
        .map(|o| Label::new(o, o, o))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub buckets: BucketSet,
    /// Label catalog; its length is the entropy logarithm base.
    pub catalog: Vec<Label>,
    pub trees: PerHorizon<Node>,
    pub tests: Vec<Sample>,
    pub validation: Vec<Sample>,
    /// Accuracy on `validation`.
    pub validity: Accuracy,
    /// Accuracy on `tests`.
    pub confidence: Accuracy,
    pub built_at: DateTime<Utc>,
}

impl Model {
    /// Bucketize a vector for prediction, clamping out-of-range values.
    pub fn bucketize(&self, vector: &FeatureVector) -> Result<BucketedVector> {
        self.buckets.bucketize_clamped(vector)
    }

    /// Run all three trees.
    pub fn predict(&self, sample: &BucketedVector) -> Label {
        PerHorizon::from_fn(|h| infer(self.trees.get(h), sample))
    }

    /// Predict from raw vector values.
    pub fn predict_vector(&self, vector: &FeatureVector) -> Result<Label> {
        Ok(self.predict(&self.bucketize(vector)?))
    }

    /// Forecast from one day, its week and its month.
    pub fn forecast(
        &self,
        day: &PeriodRecord,
        week: &PeriodRecord,
        month: &PeriodRecord,
    ) -> Result<Forecast> {
        self.forecast_with(day, week, month, &SuggestionWeights::default())
    }

    pub fn forecast_with(
        &self,
        day: &PeriodRecord,
        week: &PeriodRecord,
        month: &PeriodRecord,
        weights: &SuggestionWeights,
    ) -> Result<Forecast> {
        let vector = FeatureVector::from_records(day, week, month);
        let label = self.predict_vector(&vector)?;
        Ok(Forecast {
            label,
            suggestion: suggest(&label, weights),
        })
    }

    /// Accuracy of the trees on arbitrary samples.
    pub fn score(&self, samples: &[Sample]) -> Accuracy {
        score_samples(
            samples
                .iter()
                .map(|s| (self.predict(&s.vector), s.label)),
        )
    }

    /// Re-score the stored validation samples.
    pub fn validate(&self) -> Accuracy {
        self.score(&self.validation)
    }

    /// Re-score the stored test samples.
    pub fn test(&self) -> Accuracy {
        self.score(&self.tests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucket::Bucket;
    use crate::extract::tests::record;
    use crate::tree::Branch;
    use types::{FeatureKey, Horizon, Indicator};

    fn close_key() -> FeatureKey {
        FeatureKey::new(Horizon::Daily, Indicator::by_name("close").unwrap())
    }

    /// Model with daily tree splitting on close at 10 and constant other trees.
    fn model() -> Model {
        let low = record("2024-03-04", 0.0);
        let high = record("2024-03-04", 20.0);
        let vectors = vec![
            FeatureVector::from_records(&low, &low, &low),
            FeatureVector::from_records(&high, &high, &high),
        ];
        let buckets = BucketSet::build(&vectors, 2);

        let daily = Node::Split {
            key: close_key(),
            branches: vec![
                Branch {
                    bucket: Bucket::new(0, 10),
                    node: Node::Leaf(Outcome::VeryPositive),
                },
                Branch {
                    bucket: Bucket::new(10, 20),
                    node: Node::Leaf(Outcome::Negative),
                },
            ],
        };

        let tests = vec![Sample {
            vector: buckets.bucketize(&vectors[0]).unwrap(),
            label: Label::new(Outcome::VeryPositive, Outcome::Positive, Outcome::VeryPositive),
        }];

        Model {
            buckets,
            catalog: label_catalog(),
            trees: PerHorizon::new(
                daily,
                Node::Leaf(Outcome::Positive),
                Node::Leaf(Outcome::VeryPositive),
            ),
            validation: tests.clone(),
            tests,
            validity: Accuracy::default(),
            confidence: Accuracy::default(),
            built_at: Utc::now(),
        }
    }

    #[test]
    fn test_catalog_order() {
        let catalog = label_catalog();
        assert_eq!(catalog.len(), 7);
        assert_eq!(catalog[0].daily, Outcome::MostPositive);
        assert_eq!(catalog[6].monthly, Outcome::MostNegative);
    }

    #[test]
    fn test_forecast_from_records() {
        let model = model();
        let day = record("2024-03-05", 3.0);
        let forecast = model.forecast(&day, &day, &day).unwrap();

        assert_eq!(
            forecast.label,
            Label::new(Outcome::VeryPositive, Outcome::Positive, Outcome::VeryPositive)
        );
        // 2 + 1.3 + 3.8 = 7.1
        assert_eq!(forecast.suggestion, Suggestion::Buy);
    }

    #[test]
    fn test_forecast_clamps_out_of_range() {
        let model = model();
        let day = record("2024-03-05", 95.0);
        let forecast = model.forecast(&day, &day, &day).unwrap();
        assert_eq!(forecast.label.daily, Outcome::Negative);
    }

    #[test]
    fn test_validate_and_test_rescore() {
        let model = model();
        let acc = model.test();
        assert!((acc.daily - 1.0).abs() < 1e-10);
        assert!((acc.suggestion - 1.0).abs() < 1e-10);
        assert_eq!(model.validate(), acc);
        assert_eq!(model.catalog.len(), 7);
    }

    #[test]
    fn test_model_json_roundtrip_predicts_same() {
        let model = model();
        let json = serde_json::to_string(&model).unwrap();
        let back: Model = serde_json::from_str(&json).unwrap();

        assert_eq!(back, model);
        let sample = &model.tests[0].vector;
        assert_eq!(back.predict(sample), model.predict(sample));
    }
}
