//! Feature registry shared by training and inference.
//!
//! Every indicator the predictor can learn from is declared once in
//! [`INDICATORS`]. A [`FeatureKey`] pairs a [`Horizon`] with an [`Indicator`],
//! so each registry entry yields three features (daily, weekly, monthly).
//! Adding an indicator is a one-line change here; nothing in the bucketizer,
//! labeler or tree builder names individual indicators.
//!
//! # Key order
//!
//! `FeatureKey` orders by horizon first, then by registry position. All
//! algorithms iterate keys in this order, which makes tie-breaks stable:
//!
//! ```text
//! daily.adjusted < daily.dividend < ... < daily.aroon_down < weekly.adjusted < ...
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::market_data::PeriodRecord;
use crate::{Horizon, PerHorizon};

// =============================================================================
// Registry
// =============================================================================

/// One registry entry: a stable name and how to read it from a record.
#[derive(Clone, Copy)]
pub struct IndicatorSpec {
    pub name: &'static str,
    pub extract: fn(&PeriodRecord) -> f64,
}

impl fmt::Debug for IndicatorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndicatorSpec")
            .field("name", &self.name)
            .finish()
    }
}

/// All indicators, in feature order.
pub const INDICATORS: &[IndicatorSpec] = &[
    // Price and volume stats (7)
    IndicatorSpec { name: "adjusted", extract: |r| r.stats.adjusted },
    IndicatorSpec { name: "dividend", extract: |r| r.stats.dividend },
    IndicatorSpec { name: "open", extract: |r| r.stats.open },
    IndicatorSpec { name: "high", extract: |r| r.stats.high },
    IndicatorSpec { name: "low", extract: |r| r.stats.low },
    IndicatorSpec { name: "close", extract: |r| r.stats.close },
    IndicatorSpec { name: "volume", extract: |r| r.stats.volume },
    // Volume and trend strength (3)
    IndicatorSpec { name: "obv", extract: |r| r.analysis.obv },
    IndicatorSpec { name: "ad", extract: |r| r.analysis.ad },
    IndicatorSpec { name: "adx", extract: |r| r.analysis.adx },
    // MACD over each price series (12)
    IndicatorSpec { name: "macd_open_value", extract: |r| r.analysis.macd.open.value },
    IndicatorSpec { name: "macd_high_value", extract: |r| r.analysis.macd.high.value },
    IndicatorSpec { name: "macd_low_value", extract: |r| r.analysis.macd.low.value },
    IndicatorSpec { name: "macd_close_value", extract: |r| r.analysis.macd.close.value },
    IndicatorSpec { name: "macd_open_history", extract: |r| r.analysis.macd.open.history },
    IndicatorSpec { name: "macd_high_history", extract: |r| r.analysis.macd.high.history },
    IndicatorSpec { name: "macd_low_history", extract: |r| r.analysis.macd.low.history },
    IndicatorSpec { name: "macd_close_history", extract: |r| r.analysis.macd.close.history },
    IndicatorSpec { name: "macd_open_signal", extract: |r| r.analysis.macd.open.signal },
    IndicatorSpec { name: "macd_high_signal", extract: |r| r.analysis.macd.high.signal },
    IndicatorSpec { name: "macd_low_signal", extract: |r| r.analysis.macd.low.signal },
    IndicatorSpec { name: "macd_close_signal", extract: |r| r.analysis.macd.close.signal },
    // Moving averages and RSI over each price series (12)
    IndicatorSpec { name: "sma_open", extract: |r| r.analysis.sma.open },
    IndicatorSpec { name: "sma_high", extract: |r| r.analysis.sma.high },
    IndicatorSpec { name: "sma_low", extract: |r| r.analysis.sma.low },
    IndicatorSpec { name: "sma_close", extract: |r| r.analysis.sma.close },
    IndicatorSpec { name: "ema_open", extract: |r| r.analysis.ema.open },
    IndicatorSpec { name: "ema_high", extract: |r| r.analysis.ema.high },
    IndicatorSpec { name: "ema_low", extract: |r| r.analysis.ema.low },
    IndicatorSpec { name: "ema_close", extract: |r| r.analysis.ema.close },
    IndicatorSpec { name: "rsi_open", extract: |r| r.analysis.rsi.open },
    IndicatorSpec { name: "rsi_high", extract: |r| r.analysis.rsi.high },
    IndicatorSpec { name: "rsi_low", extract: |r| r.analysis.rsi.low },
    IndicatorSpec { name: "rsi_close", extract: |r| r.analysis.rsi.close },
    // Aroon (2)
    IndicatorSpec { name: "aroon_up", extract: |r| r.analysis.aroon.up },
    IndicatorSpec { name: "aroon_down", extract: |r| r.analysis.aroon.down },
];

/// Number of registered indicators.
pub const N_INDICATORS: usize = 36;

/// Number of features per vector (one per indicator per horizon).
pub const N_FEATURES: usize = N_INDICATORS * 3;

const _: () = {
    assert!(INDICATORS.len() == N_INDICATORS);
    assert!(N_INDICATORS <= u16::MAX as usize);
};

// =============================================================================
// Indicator
// =============================================================================

/// Handle to a registry entry.
///
/// Serialized by name, so persisted models survive registry additions.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Indicator(u16);

impl Indicator {
    /// Look up a registry entry by name.
    pub fn by_name(name: &str) -> Option<Indicator> {
        INDICATORS
            .iter()
            .position(|spec| spec.name == name)
            .map(|idx| Indicator(idx as u16))
    }

    /// All registered indicators, in registry order.
    pub fn all() -> impl Iterator<Item = Indicator> {
        (0..INDICATORS.len()).map(|idx| Indicator(idx as u16))
    }

    #[inline]
    pub fn spec(self) -> &'static IndicatorSpec {
        &INDICATORS[self.0 as usize]
    }

    #[inline]
    pub fn name(self) -> &'static str {
        self.spec().name
    }

    /// Read this indicator's value from a record.
    #[inline]
    pub fn extract(self, record: &PeriodRecord) -> f64 {
        (self.spec().extract)(record)
    }
}

impl fmt::Debug for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Indicator({})", self.name())
    }
}

// =============================================================================
// FeatureKey
// =============================================================================

/// Horizon-prefixed indicator, e.g. `daily.close` or `monthly.rsi_low`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FeatureKey {
    pub horizon: Horizon,
    pub indicator: Indicator,
}

impl FeatureKey {
    pub fn new(horizon: Horizon, indicator: Indicator) -> Self {
        Self { horizon, indicator }
    }

    /// Every registered key, in key order.
    pub fn all() -> impl Iterator<Item = FeatureKey> {
        Horizon::ALL
            .into_iter()
            .flat_map(|h| Indicator::all().map(move |i| FeatureKey::new(h, i)))
    }

    /// Keys belonging to one horizon, in registry order.
    pub fn for_horizon(horizon: Horizon) -> impl Iterator<Item = FeatureKey> {
        Indicator::all().map(move |i| FeatureKey::new(horizon, i))
    }
}

impl fmt::Display for FeatureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.horizon, self.indicator.name())
    }
}

impl fmt::Debug for FeatureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for FeatureKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (horizon, name) = s
            .split_once('.')
            .ok_or_else(|| format!("feature key '{}' is missing a horizon prefix", s))?;
        let horizon: Horizon = horizon.parse()?;
        let indicator =
            Indicator::by_name(name).ok_or_else(|| format!("unknown indicator '{}'", name))?;
        Ok(FeatureKey::new(horizon, indicator))
    }
}

impl TryFrom<String> for FeatureKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FeatureKey> for String {
    fn from(key: FeatureKey) -> Self {
        key.to_string()
    }
}

// =============================================================================
// FeatureVector
// =============================================================================

/// Flat feature values for one historical instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub values: BTreeMap<FeatureKey, f64>,
    /// Timestamp of the daily, weekly and monthly record merged into this vector.
    pub stamps: PerHorizon<NaiveDate>,
}

impl FeatureVector {
    /// Merge one record per horizon into a single vector.
    pub fn from_records(day: &PeriodRecord, week: &PeriodRecord, month: &PeriodRecord) -> Self {
        let records = PerHorizon::new(day, week, month);
        let values = FeatureKey::all()
            .map(|key| (key, key.indicator.extract(records.get(key.horizon))))
            .collect();

        Self {
            values,
            stamps: records.map(|r| r.timestamp),
        }
    }

    #[inline]
    pub fn get(&self, key: &FeatureKey) -> Option<f64> {
        self.values.get(key).copied()
    }

    pub fn keys(&self) -> impl Iterator<Item = &FeatureKey> {
        self.values.keys()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
