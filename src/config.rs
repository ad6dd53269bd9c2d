//! Database location resolution
//!
//! Precedence: explicit `--db` path, then `CLASSIFICATION_DB`, then
//! `<data_dir>/classification/classification.db`. The first two are merged
//! by clap before they reach `resolve_db_path`.

use std::path::PathBuf;

/// Environment variable naming the database file
pub const DB_ENV_VAR: &str = "CLASSIFICATION_DB";

/// Environment variable holding the log filter directive
pub const LOG_ENV_VAR: &str = "CLASSIFICATION_LOG";

/// Get the default database path (~/.local/share/classification/classification.db)
pub fn default_db_path() -> PathBuf {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_default().join(".local/share"));
    data_dir.join("classification").join("classification.db")
}

/// Pick the database path given an optional override
pub fn resolve_db_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit.unwrap_or_else(default_db_path)
}
