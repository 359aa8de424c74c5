//! Statement execution seam between the store and a SQL engine.
//!
//! # Responsibility
//! - Run the three statement shapes the store issues.
//! - Report which upsert dialect the engine speaks.
//!
//! # Invariants
//! - A connection's dialect is fixed; the store never chooses one that the
//!   engine cannot parse.
//! - Every bound parameter is text.

use super::DbResult;
use crate::dialect::{Dialect, SqliteDialect};

/// An open connection the store can issue statements against.
///
/// The store borrows the connection and never closes it. Implement this for
/// a driver handle to run the store on another engine.
pub trait KvConnection {
    /// Upsert dialect understood by this engine.
    fn dialect(&self) -> &dyn Dialect;

    /// Runs a statement without parameters or results.
    fn run_batch(&self, sql: &str) -> DbResult<()>;

    /// Runs a parameterized statement, returning the number of rows changed.
    fn run(&self, sql: &str, params: &[&str]) -> DbResult<usize>;

    /// Runs a parameterized query returning `(key, value)` text rows.
    fn fetch_pairs(&self, sql: &str, params: &[&str]) -> DbResult<Vec<(String, String)>>;
}

impl KvConnection for rusqlite::Connection {
    fn dialect(&self) -> &dyn Dialect {
        &SqliteDialect
    }

    fn run_batch(&self, sql: &str) -> DbResult<()> {
        self.execute_batch(sql)?;
        Ok(())
    }

    fn run(&self, sql: &str, params: &[&str]) -> DbResult<usize> {
        let mut stmt = self.prepare(sql)?;
        Ok(stmt.execute(rusqlite::params_from_iter(params))?)
    }

    fn fetch_pairs(&self, sql: &str, params: &[&str]) -> DbResult<Vec<(String, String)>> {
        let mut stmt = self.prepare(sql)?;
        let mut rows = stmt.query(rusqlite::params_from_iter(params))?;

        let mut pairs = Vec::new();
        while let Some(row) = rows.next()? {
            pairs.push((row.get::<_, String>(0)?, row.get::<_, String>(1)?));
        }
        Ok(pairs)
    }
}
