//! Trade suggestions and partial-credit accuracy.

use serde::{Deserialize, Serialize};
use types::{Accuracy, Horizon, Label, Outcome, Suggestion};

/// Horizon weights for the combined suggestion score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SuggestionWeights {
    pub daily: f64,
    pub weekly: f64,
    pub monthly: f64,
}

impl Default for SuggestionWeights {
    fn default() -> Self {
        Self {
            daily: 1.0,
            weekly: 1.3,
            monthly: 1.9,
        }
    }
}

impl SuggestionWeights {
    /// Weighted sum of the three outcomes.
    pub fn score(&self, label: &Label) -> f64 {
        label.daily.value() as f64 * self.daily
            + label.weekly.value() as f64 * self.weekly
            + label.monthly.value() as f64 * self.monthly
    }

    /// Score of a label holding `outcome` at every horizon.
    fn uniform(&self, outcome: Outcome) -> f64 {
        self.score(&Label::new(outcome, outcome, outcome))
    }
}

/// Map a label to a five-level suggestion.
///
/// Thresholds are the scores of the uniform `VeryPositive`, `Positive`,
/// `Negative` and `VeryNegative` labels. Reaching a positive threshold
/// promotes; a negative threshold must be passed to stay above it.
pub fn suggest(label: &Label, weights: &SuggestionWeights) -> Suggestion {
    let score = weights.score(label);

    if score >= weights.uniform(Outcome::VeryPositive) {
        Suggestion::StrongBuy
    } else if score >= weights.uniform(Outcome::Positive) {
        Suggestion::Buy
    } else if score > weights.uniform(Outcome::Negative) {
        Suggestion::Hold
    } else if score > weights.uniform(Outcome::VeryNegative) {
        Suggestion::Sell
    } else {
        Suggestion::StrongSell
    }
}

/// Credit for one prediction: 1 exact, 0.75 off by one, 0.25 off by two.
pub fn partial_credit(predicted: Outcome, actual: Outcome) -> f64 {
    match predicted.distance(actual) {
        0 => 1.0,
        1 => 0.75,
        2 => 0.25,
        _ => 0.0,
    }
}

/// Mean partial credit per horizon, plus the mean of each pair's
/// three-horizon average as the suggestion accuracy.
///
/// Pairs are `(predicted, actual)`. No pairs score zero.
pub fn score_samples<I>(pairs: I) -> Accuracy
where
    I: IntoIterator<Item = (Label, Label)>,
{
    let mut totals = [0.0f64; 3];
    let mut combined = 0.0;
    let mut n = 0usize;

    for (predicted, actual) in pairs {
        let mut sample_total = 0.0;
        for (slot, horizon) in Horizon::ALL.into_iter().enumerate() {
            let credit = partial_credit(*predicted.get(horizon), *actual.get(horizon));
            totals[slot] += credit;
            sample_total += credit;
        }
        combined += sample_total / 3.0;
        n += 1;
    }

    if n == 0 {
        return Accuracy::default();
    }
    let n = n as f64;
    Accuracy {
        daily: totals[0] / n,
        weekly: totals[1] / n,
        monthly: totals[2] / n,
        suggestion: combined / n,
    }
}
