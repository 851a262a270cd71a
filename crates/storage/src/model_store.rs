//! Model persistence keyed by symbol.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use predictor::Model;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

use crate::error::Result;
use crate::normalize_symbol;
use crate::schema::{StoreConfig, init_schema};

/// Symbol-keyed model storage.
///
/// `get` hands out shared, immutable models. `put` replaces the stored model
/// for the symbol; readers holding the previous `Arc` are unaffected.
pub trait ModelStore: Send + Sync {
    fn get(&self, symbol: &str) -> Result<Option<Arc<Model>>>;

    fn put(&self, symbol: &str, model: &Model) -> Result<()>;

    /// Symbols with a stored model, sorted.
    fn symbols(&self) -> Result<Vec<String>>;
}

// =============================================================================
// SQLite
// =============================================================================

/// Models as JSON documents in a SQLite table.
///
/// Uses interior mutability (Mutex) because `ModelStore` takes `&self`.
pub struct SqliteModelStore {
    conn: Mutex<Connection>,
}

impl SqliteModelStore {
    pub fn new(config: StoreConfig) -> Result<Self> {
        let conn = if config.is_memory() {
            Connection::open_in_memory()?
        } else {
            Connection::open(&config.path)?
        };

        init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn from_path(path: impl AsRef<std::path::Path>) -> Result<Self> {
        Self::new(StoreConfig::from_path(path))
    }

    pub fn in_memory() -> Result<Self> {
        Self::new(StoreConfig::default())
    }
}

impl ModelStore for SqliteModelStore {
    fn get(&self, symbol: &str) -> Result<Option<Arc<Model>>> {
        let symbol = normalize_symbol(symbol)?;
        let document: Option<String> = {
            let conn = self.conn.lock();
            conn.query_row(
                "SELECT document FROM models WHERE symbol = ?1",
                params![symbol],
                |row| row.get(0),
            )
            .optional()?
        };

        let Some(document) = document else {
            debug!(%symbol, "No stored model");
            return Ok(None);
        };
        let model: Model = serde_json::from_str(&document)?;
        debug!(%symbol, bytes = document.len(), "Loaded model");
        Ok(Some(Arc::new(model)))
    }

    fn put(&self, symbol: &str, model: &Model) -> Result<()> {
        let symbol = normalize_symbol(symbol)?;
        let document = serde_json::to_string(model)?;

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO models (symbol, built_at, document)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(symbol) DO UPDATE SET
                built_at = excluded.built_at,
                document = excluded.document,
                updated_at = strftime('%s', 'now')",
            params![symbol, model.built_at.to_rfc3339(), document],
        )?;
        debug!(%symbol, bytes = document.len(), "Stored model");
        Ok(())
    }

    fn symbols(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached("SELECT symbol FROM models ORDER BY symbol")?;
        let symbols = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(symbols)
    }
}

// =============================================================================
// Memory
// =============================================================================

/// In-process model store.
#[derive(Default)]
pub struct MemoryModelStore {
    models: RwLock<HashMap<String, Arc<Model>>>,
}

impl MemoryModelStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ModelStore for MemoryModelStore {
    fn get(&self, symbol: &str) -> Result<Option<Arc<Model>>> {
        let symbol = normalize_symbol(symbol)?;
        Ok(self.models.read().get(&symbol).cloned())
    }

    fn put(&self, symbol: &str, model: &Model) -> Result<()> {
        let symbol = normalize_symbol(symbol)?;
        debug!(%symbol, "Stored model in memory");
        self.models.write().insert(symbol, Arc::new(model.clone()));
        Ok(())
    }

    fn symbols(&self) -> Result<Vec<String>> {
        let mut symbols: Vec<String> = self.models.read().keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}
