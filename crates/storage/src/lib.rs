//! Storage layer for the market oracle.
//!
//! Two boundaries, each a trait with a durable and an in-memory backend:
//!
//! - [`ModelStore`]: one serialized [`Model`](predictor::Model) per symbol,
//!   replaced wholesale on retrain (SQLite or memory).
//! - [`MarketSource`]: a symbol's daily/weekly/monthly history (JSON files as
//!   delivered by the upstream provider, or memory).
//!
//! This crate only persists and loads; it never trains or predicts.

mod error;
mod market;
mod model_store;
mod schema;

pub use error::{Result, StoreError};
pub use market::{JsonMarketSource, MarketSource, MemoryMarketSource, RawHistory};
pub use model_store::{MemoryModelStore, ModelStore, SqliteModelStore};
pub use schema::{StoreConfig, init_schema};

/// Canonical form of a ticker symbol: trimmed and upper-cased.
///
/// Only ASCII letters, digits, `.` and `-` are accepted, so a symbol is
/// always safe as a file name.
pub fn normalize_symbol(symbol: &str) -> Result<String> {
    let trimmed = symbol.trim();
    let valid = !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
        && !trimmed.starts_with('.');
    if !valid {
        return Err(StoreError::InvalidSymbol(symbol.to_string()));
    }
    Ok(trimmed.to_ascii_uppercase())
}
