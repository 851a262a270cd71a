//! Storage errors.

use std::path::PathBuf;

use predictor::PredictorError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no market data for symbol {0}")]
    SymbolNotFound(String),

    #[error("invalid symbol: {0:?}")]
    InvalidSymbol(String),

    #[error("unusable market data: {0}")]
    Series(#[from] PredictorError),
}
