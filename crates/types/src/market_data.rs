//! Market records as delivered by the upstream market-data service.
//!
//! The upstream provider returns price stats and technical analysis as two
//! separate row lists per horizon ([`RawSeries`]). Joined, they form
//! [`PeriodRecord`]s, the shape the feature extractor consumes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Price and volume stats for one period.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Stats {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub adjusted: f64,
    pub dividend: f64,
}

/// MACD triple.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Macd {
    pub value: f64,
    pub signal: f64,
    pub history: f64,
}

/// An indicator computed over each of the four price series.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PriceSeries<T> {
    pub open: T,
    pub high: T,
    pub low: T,
    pub close: T,
}

impl<T: Copy> PriceSeries<T> {
    /// Same value for all four series.
    pub fn splat(value: T) -> Self {
        Self {
            open: value,
            high: value,
            low: value,
            close: value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Aroon {
    pub up: f64,
    pub down: f64,
}

/// Precomputed technical analysis for one period.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Analysis {
    pub obv: f64,
    pub ad: f64,
    pub adx: f64,
    pub macd: PriceSeries<Macd>,
    pub sma: PriceSeries<f64>,
    pub ema: PriceSeries<f64>,
    pub rsi: PriceSeries<f64>,
    pub aroon: Aroon,
}

/// One daily, weekly or monthly record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodRecord {
    pub timestamp: NaiveDate,
    pub stats: Stats,
    pub analysis: Analysis,
}

/// Full history for one symbol.
///
/// Sequences are ordered as the upstream provider returns them: newest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockHistory {
    pub days: Vec<PeriodRecord>,
    pub weeks: Vec<PeriodRecord>,
    pub months: Vec<PeriodRecord>,
}

// =============================================================================
// Upstream rows
// =============================================================================

/// Upstream stats row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatsRow {
    pub timestamp: NaiveDate,
    #[serde(flatten)]
    pub stats: Stats,
}

/// Upstream analysis row. Any indicator may be absent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalysisRow {
    #[serde(default)]
    pub obv: Option<f64>,
    #[serde(default)]
    pub ad: Option<f64>,
    #[serde(default)]
    pub adx: Option<f64>,
    #[serde(default)]
    pub macd: Option<PriceSeries<Macd>>,
    #[serde(default)]
    pub sma: Option<PriceSeries<f64>>,
    #[serde(default)]
    pub ema: Option<PriceSeries<f64>>,
    #[serde(default)]
    pub rsi: Option<PriceSeries<f64>>,
    #[serde(default)]
    pub aroon: Option<Aroon>,
}

impl AnalysisRow {
    /// Complete analysis, or `None` if any indicator is missing.
    pub fn complete(&self) -> Option<Analysis> {
        Some(Analysis {
            obv: self.obv?,
            ad: self.ad?,
            adx: self.adx?,
            macd: self.macd?,
            sma: self.sma?,
            ema: self.ema?,
            rsi: self.rsi?,
            aroon: self.aroon?,
        })
    }
}

impl From<Analysis> for AnalysisRow {
    fn from(a: Analysis) -> Self {
        Self {
            obv: Some(a.obv),
            ad: Some(a.ad),
            adx: Some(a.adx),
            macd: Some(a.macd),
            sma: Some(a.sma),
            ema: Some(a.ema),
            rsi: Some(a.rsi),
            aroon: Some(a.aroon),
        }
    }
}

/// Stats and analysis rows for one horizon, aligned by position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSeries {
    pub stats: Vec<StatsRow>,
    pub analysis: Vec<AnalysisRow>,
}

impl RawSeries {
    /// Split complete records back into upstream rows.
    pub fn from_records(records: &[PeriodRecord]) -> Self {
        Self {
            stats: records
                .iter()
                .map(|r| StatsRow {
                    timestamp: r.timestamp,
                    stats: r.stats,
                })
                .collect(),
            analysis: records.iter().map(|r| r.analysis.into()).collect(),
        }
    }
}
