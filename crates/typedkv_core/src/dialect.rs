//! Backend-specific upsert syntax.
//!
//! # Responsibility
//! - Isolate the only SQL fragment that differs between engines.
//! - Resolve a dialect from a driver name at initialization time.
//!
//! # Invariants
//! - Every dialect gives "last write for a key wins, one row per key".

use crate::error::{StoreError, StoreResult};
use std::fmt::Debug;

/// Upsert rendering strategy for one SQL engine.
pub trait Dialect: Debug + Send + Sync {
    /// Stable driver-style name, used in diagnostics.
    fn name(&self) -> &'static str;

    /// Returns the clause appended to a multi-row `INSERT` so that a
    /// conflicting key overwrites the stored value.
    fn upsert_suffix(&self, key_column: &str, value_column: &str) -> String;
}

/// SQLite `ON CONFLICT ... DO UPDATE` (SQLite 3.24+).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SqliteDialect;

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite3"
    }

    fn upsert_suffix(&self, key_column: &str, value_column: &str) -> String {
        format!(
            "ON CONFLICT(`{key_column}`) DO UPDATE SET `{value_column}` = excluded.`{value_column}`"
        )
    }
}

/// MySQL/MariaDB `ON DUPLICATE KEY UPDATE`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MysqlDialect;

impl Dialect for MysqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn upsert_suffix(&self, _key_column: &str, value_column: &str) -> String {
        format!("ON DUPLICATE KEY UPDATE `{value_column}` = VALUES(`{value_column}`)")
    }
}

/// Resolves the dialect for a driver name.
///
/// Accepts `sqlite3`, `sqlite` and `mysql` (case-insensitive, trimmed).
pub fn dialect_for_driver(driver_name: &str) -> StoreResult<Box<dyn Dialect>> {
    match driver_name.trim().to_ascii_lowercase().as_str() {
        "sqlite3" | "sqlite" => Ok(Box::new(SqliteDialect)),
        "mysql" => Ok(Box::new(MysqlDialect)),
        _ => Err(StoreError::UnsupportedDialect(driver_name.to_string())),
    }
}
