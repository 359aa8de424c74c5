//! SQL text for the key-value table.
//!
//! All builders are pure so statement shape can be checked per dialect
//! without a live engine. Values always travel as bound parameters; only the
//! sanitized table name is interpolated, quoted like the column names so
//! names starting with a digit or matching a keyword stay valid.

use crate::dialect::Dialect;

pub const KEY_COLUMN: &str = "kv_key";
pub const VALUE_COLUMN: &str = "kv_value";

/// Keeps ASCII letters, digits and `_`; drops everything else.
pub fn sanitize_table_name(name: &str) -> String {
    name.chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || *ch == '_')
        .collect()
}

pub(crate) fn create_table_sql(table: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS `{table}` (
            `{KEY_COLUMN}` varchar(128) not null,
            `{VALUE_COLUMN}` text not null,
            primary key (`{KEY_COLUMN}`)
        )"
    )
}

pub(crate) fn upsert_sql(table: &str, rows: usize, dialect: &dyn Dialect) -> String {
    format!(
        "INSERT INTO `{table}` (`{KEY_COLUMN}`, `{VALUE_COLUMN}`) VALUES {} {}",
        vec!["(?, ?)"; rows].join(", "),
        dialect.upsert_suffix(KEY_COLUMN, VALUE_COLUMN)
    )
}

pub(crate) fn select_sql(table: &str, keys: usize) -> String {
    format!(
        "SELECT `{KEY_COLUMN}`, `{VALUE_COLUMN}` FROM `{table}` WHERE `{KEY_COLUMN}` IN ({})",
        placeholders(keys)
    )
}

pub(crate) fn delete_sql(table: &str, keys: usize) -> String {
    format!(
        "DELETE FROM `{table}` WHERE `{KEY_COLUMN}` IN ({})",
        placeholders(keys)
    )
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}
