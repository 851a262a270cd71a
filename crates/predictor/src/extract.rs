//! Feature extraction: upstream rows to records, records to feature vectors.
//!
//! Every daily record is merged with the weekly record whose window
//! `[week - 4 days, week]` contains it and with the monthly record of the same
//! calendar month. Days without both are dropped.

use chrono::{Datelike, Days, NaiveDate};
use tracing::{debug, info, warn};
use types::{FeatureVector, Horizon, PeriodRecord, RawSeries, StockHistory};

use crate::error::{PredictorError, Result};

/// Days before a weekly timestamp still covered by that week.
const WEEK_WINDOW_DAYS: u64 = 4;

// =============================================================================
// Series assembly
// =============================================================================

/// Join stats and analysis rows by position.
///
/// Mismatched lengths are truncated to the shortest. Rows with missing
/// indicators are dropped. Both cases are logged.
pub fn assemble_series(horizon: Horizon, raw: &RawSeries) -> Vec<PeriodRecord> {
    if raw.stats.len() != raw.analysis.len() {
        warn!(
            %horizon,
            stats = raw.stats.len(),
            analysis = raw.analysis.len(),
            "Stats and analysis rows disagree, truncating to shortest"
        );
    }

    let mut incomplete = 0usize;
    let records: Vec<PeriodRecord> = raw
        .stats
        .iter()
        .zip(&raw.analysis)
        .filter_map(|(stats, analysis)| match analysis.complete() {
            Some(analysis) => Some(PeriodRecord {
                timestamp: stats.timestamp,
                stats: stats.stats,
                analysis,
            }),
            None => {
                incomplete += 1;
                None
            }
        })
        .collect();

    if incomplete > 0 {
        warn!(%horizon, dropped = incomplete, "Dropped rows with missing indicators");
    }
    records
}

/// Assemble all three horizons into a history ordered newest first.
pub fn assemble_history(
    days: &RawSeries,
    weeks: &RawSeries,
    months: &RawSeries,
) -> Result<StockHistory> {
    let history = StockHistory {
        days: assemble_series(Horizon::Daily, days),
        weeks: assemble_series(Horizon::Weekly, weeks),
        months: assemble_series(Horizon::Monthly, months),
    };

    for (horizon, records) in [
        (Horizon::Daily, &history.days),
        (Horizon::Weekly, &history.weeks),
        (Horizon::Monthly, &history.months),
    ] {
        if records.is_empty() {
            return Err(PredictorError::MalformedSeries(format!(
                "no complete {} records",
                horizon
            )));
        }
        if let Some(pair) = records
            .windows(2)
            .find(|pair| pair[0].timestamp <= pair[1].timestamp)
        {
            return Err(PredictorError::MalformedSeries(format!(
                "{} series is not ordered newest first ({} before {})",
                horizon, pair[0].timestamp, pair[1].timestamp
            )));
        }
    }

    Ok(history)
}

// =============================================================================
// Feature extraction
// =============================================================================

/// First weekly record whose window contains `day`.
pub fn covering_week(weeks: &[PeriodRecord], day: NaiveDate) -> Option<&PeriodRecord> {
    weeks.iter().find(|week| {
        week.timestamp
            .checked_sub_days(Days::new(WEEK_WINDOW_DAYS))
            .is_some_and(|start| start <= day && day <= week.timestamp)
    })
}

/// First monthly record in the same calendar month as `day`.
pub fn covering_month(months: &[PeriodRecord], day: NaiveDate) -> Option<&PeriodRecord> {
    months
        .iter()
        .find(|month| month.timestamp.year() == day.year() && month.timestamp.month() == day.month())
}

/// One feature vector per daily record that has a covering week and month.
///
/// Output keeps the daily order of the history.
pub fn extract_features(history: &StockHistory) -> Vec<FeatureVector> {
    let mut dropped = 0usize;

    let vectors: Vec<FeatureVector> = history
        .days
        .iter()
        .filter_map(|day| {
            let week = covering_week(&history.weeks, day.timestamp);
            let month = covering_month(&history.months, day.timestamp);
            match (week, month) {
                (Some(week), Some(month)) => Some(FeatureVector::from_records(day, week, month)),
                _ => {
                    debug!(
                        day = %day.timestamp,
                        week = week.is_some(),
                        month = month.is_some(),
                        "No covering record, dropping day"
                    );
                    dropped += 1;
                    None
                }
            }
        })
        .collect();

    info!(
        days = history.days.len(),
        vectors = vectors.len(),
        dropped,
        "Extracted feature vectors"
    );
    vectors
}
