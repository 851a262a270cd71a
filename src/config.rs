//! Central configuration for the market oracle.
//!
//! Defaults live here; the CLI overrides individual fields from flags or
//! `ORACLE_*` environment variables.

use predictor::{SuggestionWeights, TrainConfig};
use storage::StoreConfig;

/// Master configuration.
#[derive(Debug, Clone)]
pub struct OracleConfig {
    // ─────────────────────────────────────────────────────────────────────────
    // Storage
    // ─────────────────────────────────────────────────────────────────────────
    /// SQLite database holding one model per symbol.
    pub db_path: String,
    /// Directory of `<SYMBOL>.json` market-data files.
    pub data_dir: String,

    // ─────────────────────────────────────────────────────────────────────────
    // Training
    // ─────────────────────────────────────────────────────────────────────────
    /// Bucket granularity, hold-out share and split seed.
    pub train: TrainConfig,

    // ─────────────────────────────────────────────────────────────────────────
    // Suggestions
    // ─────────────────────────────────────────────────────────────────────────
    /// Horizon weights for the combined suggestion score.
    pub weights: SuggestionWeights,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            db_path: "data/models.sqlite".to_string(),
            data_dir: "data/series".to_string(),
            train: TrainConfig::default(),
            weights: SuggestionWeights::default(),
        }
    }
}

impl OracleConfig {
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::from_path(&self.db_path)
    }
}
