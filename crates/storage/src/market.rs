//! Market-data sources.
//!
//! [`JsonMarketSource`] reads `<dir>/<SYMBOL>.json`, one [`RawHistory`] per
//! symbol, and assembles it with the predictor's series policy (rows joined
//! by position, truncated to the shortest, incomplete rows dropped).

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use predictor::assemble_history;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use types::{RawSeries, StockHistory};

use crate::error::{Result, StoreError};
use crate::normalize_symbol;

/// Source of a symbol's full history, newest first.
pub trait MarketSource: Send + Sync {
    fn history(&self, symbol: &str) -> Result<StockHistory>;
}

/// Upstream rows for the three horizons.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawHistory {
    pub days: RawSeries,
    pub weeks: RawSeries,
    pub months: RawSeries,
}

impl RawHistory {
    pub fn from_history(history: &StockHistory) -> Self {
        Self {
            days: RawSeries::from_records(&history.days),
            weeks: RawSeries::from_records(&history.weeks),
            months: RawSeries::from_records(&history.months),
        }
    }
}

// =============================================================================
// JSON files
// =============================================================================

/// One JSON file per symbol under a directory.
#[derive(Debug, Clone)]
pub struct JsonMarketSource {
    dir: PathBuf,
}

impl JsonMarketSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, symbol: &str) -> Result<PathBuf> {
        Ok(self.dir.join(format!("{}.json", normalize_symbol(symbol)?)))
    }

    /// Write upstream rows for `symbol`, creating the directory if needed.
    pub fn save(&self, symbol: &str, raw: &RawHistory) -> Result<PathBuf> {
        let path = self.path_for(symbol)?;
        fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let json = serde_json::to_string(raw)?;
        fs::write(&path, json).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), "Saved market data");
        Ok(path)
    }
}

impl MarketSource for JsonMarketSource {
    fn history(&self, symbol: &str) -> Result<StockHistory> {
        let path = self.path_for(symbol)?;
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(StoreError::SymbolNotFound(symbol.to_string()));
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        let raw: RawHistory = serde_json::from_str(&json)?;
        let history = assemble_history(&raw.days, &raw.weeks, &raw.months)?;
        debug!(
            path = %path.display(),
            days = history.days.len(),
            weeks = history.weeks.len(),
            months = history.months.len(),
            "Loaded market data"
        );
        Ok(history)
    }
}

// =============================================================================
// Memory
// =============================================================================

/// In-process market data.
#[derive(Default)]
pub struct MemoryMarketSource {
    histories: RwLock<HashMap<String, StockHistory>>,
}

impl MemoryMarketSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, symbol: &str, history: StockHistory) -> Result<()> {
        let symbol = normalize_symbol(symbol)?;
        self.histories.write().insert(symbol, history);
        Ok(())
    }
}

impl MarketSource for MemoryMarketSource {
    fn history(&self, symbol: &str) -> Result<StockHistory> {
        let key = normalize_symbol(symbol)?;
        self.histories
            .read()
            .get(&key)
            .cloned()
            .ok_or_else(|| StoreError::SymbolNotFound(symbol.to_string()))
    }
}
