//! Database schema and configuration.

use rusqlite::Connection;
use std::path::Path;

/// Model store configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path to SQLite database (`:memory:` for in-memory)
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: ":memory:".to_string(),
        }
    }
}

impl StoreConfig {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_string_lossy().to_string(),
        }
    }

    pub fn is_memory(&self) -> bool {
        self.path == ":memory:"
    }
}

/// Initialize database with schema
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    // One model document per symbol, replaced on retrain
    conn.execute(
        "CREATE TABLE IF NOT EXISTS models (
            symbol TEXT PRIMARY KEY,
            built_at TEXT NOT NULL,
            document TEXT NOT NULL,
            updated_at INTEGER DEFAULT (strftime('%s', 'now'))
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_models_built_at ON models(built_at)",
        [],
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'models'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_config_from_path() {
        let config = StoreConfig::from_path("data/models.sqlite");
        assert_eq!(config.path, "data/models.sqlite");
        assert!(!config.is_memory());
        assert!(StoreConfig::default().is_memory());
    }
}
