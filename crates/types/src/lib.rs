//! Core types for the market oracle.
//!
//! This crate provides the data shared by the predictor engine, the storage
//! layer and the CLI: horizons, outcomes, labels, trade suggestions, the
//! feature registry and the upstream market records.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod features;
pub mod market_data;

pub use features::{FeatureKey, FeatureVector, INDICATORS, Indicator, IndicatorSpec};
pub use market_data::{
    Analysis, AnalysisRow, Aroon, Macd, PeriodRecord, PriceSeries, RawSeries, Stats, StatsRow,
    StockHistory,
};

// =============================================================================
// Symbol Type
// =============================================================================

/// Stock ticker symbol (e.g., "AAPL", "IBM").
pub type Symbol = String;

// =============================================================================
// Horizon
// =============================================================================

/// Time granularity of a record, a feature or a predicted outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Horizon {
    Daily,
    Weekly,
    Monthly,
}

impl Horizon {
    /// All horizons in canonical order.
    pub const ALL: [Horizon; 3] = [Horizon::Daily, Horizon::Weekly, Horizon::Monthly];

    pub fn as_str(self) -> &'static str {
        match self {
            Horizon::Daily => "daily",
            Horizon::Weekly => "weekly",
            Horizon::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Horizon {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Horizon::Daily),
            "weekly" => Ok(Horizon::Weekly),
            "monthly" => Ok(Horizon::Monthly),
            other => Err(format!("unknown horizon: {}", other)),
        }
    }
}

/// One value per horizon.
///
/// Used for labels (`PerHorizon<Outcome>`), record timestamps and the three
/// decision trees of a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PerHorizon<T> {
    pub daily: T,
    pub weekly: T,
    pub monthly: T,
}

impl<T> PerHorizon<T> {
    pub fn new(daily: T, weekly: T, monthly: T) -> Self {
        Self {
            daily,
            weekly,
            monthly,
        }
    }

    /// Build by evaluating `f` once per horizon, in canonical order.
    pub fn from_fn<F: FnMut(Horizon) -> T>(mut f: F) -> Self {
        let daily = f(Horizon::Daily);
        let weekly = f(Horizon::Weekly);
        let monthly = f(Horizon::Monthly);
        Self::new(daily, weekly, monthly)
    }

    pub fn get(&self, horizon: Horizon) -> &T {
        match horizon {
            Horizon::Daily => &self.daily,
            Horizon::Weekly => &self.weekly,
            Horizon::Monthly => &self.monthly,
        }
    }

    pub fn get_mut(&mut self, horizon: Horizon) -> &mut T {
        match horizon {
            Horizon::Daily => &mut self.daily,
            Horizon::Weekly => &mut self.weekly,
            Horizon::Monthly => &mut self.monthly,
        }
    }

    pub fn map<U, F: FnMut(&T) -> U>(&self, mut f: F) -> PerHorizon<U> {
        PerHorizon::new(f(&self.daily), f(&self.weekly), f(&self.monthly))
    }

    /// Iterate `(horizon, value)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Horizon, &T)> {
        Horizon::ALL.into_iter().map(move |h| (h, self.get(h)))
    }
}

// =============================================================================
// Outcome
// =============================================================================

/// Signed 7-level relative movement classification.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "i8", into = "i8")]
pub enum Outcome {
    MostNegative = -3,
    VeryNegative = -2,
    Negative = -1,
    #[default]
    Neutral = 0,
    Positive = 1,
    VeryPositive = 2,
    MostPositive = 3,
}

impl Outcome {
    /// Catalog order, from most positive to most negative.
    pub const ALL: [Outcome; 7] = [
        Outcome::MostPositive,
        Outcome::VeryPositive,
        Outcome::Positive,
        Outcome::Neutral,
        Outcome::Negative,
        Outcome::VeryNegative,
        Outcome::MostNegative,
    ];

    #[inline]
    pub fn value(self) -> i8 {
        self as i8
    }

    /// Clamp any integer into the outcome range.
    pub fn saturating_from(value: i64) -> Outcome {
        let clamped = value.clamp(-3, 3) as i8;
        // Range was clamped above.
        Outcome::try_from(clamped).unwrap_or_default()
    }

    /// Absolute ordinal distance between two outcomes.
    #[inline]
    pub fn distance(self, other: Outcome) -> u8 {
        (self.value() - other.value()).unsigned_abs()
    }
}

impl TryFrom<i8> for Outcome {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            -3 => Ok(Outcome::MostNegative),
            -2 => Ok(Outcome::VeryNegative),
            -1 => Ok(Outcome::Negative),
            0 => Ok(Outcome::Neutral),
            1 => Ok(Outcome::Positive),
            2 => Ok(Outcome::VeryPositive),
            3 => Ok(Outcome::MostPositive),
            other => Err(format!("outcome out of range: {}", other)),
        }
    }
}

impl From<Outcome> for i8 {
    fn from(outcome: Outcome) -> Self {
        outcome.value()
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:+})", self, self.value())
    }
}

/// Outcome triple for one sample: daily, weekly, monthly.
pub type Label = PerHorizon<Outcome>;

// =============================================================================
// Suggestion
// =============================================================================

/// Five-level trade suggestion derived from a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum Suggestion {
    StrongSell = -2,
    Sell = -1,
    Hold = 0,
    Buy = 1,
    StrongBuy = 2,
}

impl TryFrom<i8> for Suggestion {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            -2 => Ok(Suggestion::StrongSell),
            -1 => Ok(Suggestion::Sell),
            0 => Ok(Suggestion::Hold),
            1 => Ok(Suggestion::Buy),
            2 => Ok(Suggestion::StrongBuy),
            other => Err(format!("suggestion out of range: {}", other)),
        }
    }
}

impl From<Suggestion> for i8 {
    fn from(suggestion: Suggestion) -> Self {
        suggestion as i8
    }
}

impl fmt::Display for Suggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Suggestion::StrongSell => "strong sell",
            Suggestion::Sell => "sell",
            Suggestion::Hold => "hold",
            Suggestion::Buy => "buy",
            Suggestion::StrongBuy => "strong buy",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Accuracy
// =============================================================================

/// Partial-credit accuracy per horizon plus the combined suggestion accuracy.
///
/// All values are in `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Accuracy {
    pub daily: f64,
    pub weekly: f64,
    pub monthly: f64,
    pub suggestion: f64,
}

impl Accuracy {
    pub fn horizon(&self, horizon: Horizon) -> f64 {
        match horizon {
            Horizon::Daily => self.daily,
            Horizon::Weekly => self.weekly,
            Horizon::Monthly => self.monthly,
        }
    }
}

impl fmt::Display for Accuracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "daily {:.3}, weekly {:.3}, monthly {:.3}, suggestion {:.3}",
            self.daily, self.weekly, self.monthly, self.suggestion
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_roundtrip_i8() {
        for outcome in Outcome::ALL {
            assert_eq!(Outcome::try_from(outcome.value()).unwrap(), outcome);
        }
        assert!(Outcome::try_from(4).is_err());
        assert!(Outcome::try_from(-4).is_err());
    }

    #[test]
    fn test_outcome_saturating() {
        assert_eq!(Outcome::saturating_from(7), Outcome::MostPositive);
        assert_eq!(Outcome::saturating_from(-9), Outcome::MostNegative);
        assert_eq!(Outcome::saturating_from(-1), Outcome::Negative);
    }

    #[test]
    fn test_outcome_distance() {
        assert_eq!(Outcome::MostPositive.distance(Outcome::MostNegative), 6);
        assert_eq!(Outcome::Negative.distance(Outcome::Positive), 2);
        assert_eq!(Outcome::Neutral.distance(Outcome::Neutral), 0);
    }

    #[test]
    fn test_outcome_serializes_as_integer() {
        let json = serde_json::to_string(&Outcome::VeryNegative).unwrap();
        assert_eq!(json, "-2");
        let back: Outcome = serde_json::from_str("3").unwrap();
        assert_eq!(back, Outcome::MostPositive);
        assert!(serde_json::from_str::<Outcome>("5").is_err());
    }

    #[test]
    fn test_label_json_shape() {
        let label = Label::new(Outcome::Positive, Outcome::Neutral, Outcome::MostNegative);
        let json = serde_json::to_string(&label).unwrap();
        assert_eq!(json, r#"{"daily":1,"weekly":0,"monthly":-3}"#);
    }

    #[test]
    fn test_per_horizon_from_fn_order() {
        let mut seen = Vec::new();
        let per = PerHorizon::from_fn(|h| {
            seen.push(h);
            h.as_str().len()
        });
        assert_eq!(seen, Horizon::ALL.to_vec());
        assert_eq!(per.daily, 5);
        assert_eq!(*per.get(Horizon::Monthly), 7);
    }

    #[test]
    fn test_horizon_parse() {
        assert_eq!("weekly".parse::<Horizon>().unwrap(), Horizon::Weekly);
        assert!("hourly".parse::<Horizon>().is_err());
    }

    #[test]
    fn test_suggestion_display() {
        assert_eq!(Suggestion::StrongBuy.to_string(), "strong buy");
        assert_eq!(i8::from(Suggestion::Sell), -1);
    }
}
