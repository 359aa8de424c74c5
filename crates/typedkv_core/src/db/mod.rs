//! SQLite connection helpers for store callers.
//!
//! # Responsibility
//! - Open file or in-memory connections with the pragmas the store expects.
//! - Define the [`KvConnection`] seam the store executes statements through.
//! - Wrap driver errors in one transport error type.
//!
//! # Invariants
//! - The store itself never opens or closes connections; these helpers are
//!   for callers and tests.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod connection;
mod open;

pub use connection::KvConnection;
pub use open::{open_db, open_db_in_memory, BUSY_TIMEOUT};

pub type DbResult<T> = Result<T, DbError>;

/// Transport-level failure from the backing engine.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// Failure reported by a non-SQLite [`KvConnection`] implementation.
    Driver(Box<dyn Error + Send + Sync + 'static>),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Driver(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Driver(err) => Some(err.as_ref()),
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
