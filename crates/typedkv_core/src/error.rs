//! Store-level error taxonomy.
//!
//! # Responsibility
//! - Separate precondition/configuration failures from transport and
//!   serialization failures.
//! - Keep the failing key attached to serialization errors.
//!
//! # Invariants
//! - "No rows" is never an error; operations report a zero count instead.
//! - Errors are returned verbatim to the caller, never retried or logged here.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Error returned by every [`crate::Store`] operation.
#[derive(Debug)]
pub enum StoreError {
    /// Connection, statement preparation or execution failure.
    Db(DbError),
    /// A value could not be serialized before writing.
    Encode {
        key: String,
        source: serde_json::Error,
    },
    /// A persisted payload does not decode into the target type.
    Decode {
        key: String,
        source: serde_json::Error,
    },
    /// A derived or explicit key cannot be stored.
    InvalidKey { key: String, reason: &'static str },
    /// The table name has no usable characters after sanitization.
    InvalidTableName(String),
    /// The driver name has no known upsert dialect.
    UnsupportedDialect(String),
    /// The requested dialect is not the one the connection speaks.
    DialectMismatch {
        requested: &'static str,
        connection: &'static str,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Encode { key, source } => {
                write!(f, "failed to encode value for key `{key}`: {source}")
            }
            Self::Decode { key, source } => {
                write!(f, "failed to decode stored value for key `{key}`: {source}")
            }
            Self::InvalidKey { key, reason } => write!(f, "invalid key `{key}`: {reason}"),
            Self::InvalidTableName(raw) => {
                write!(f, "table name `{raw}` has no valid characters")
            }
            Self::UnsupportedDialect(driver) => write!(f, "driver {driver} not supported"),
            Self::DialectMismatch {
                requested,
                connection,
            } => write!(
                f,
                "dialect `{requested}` does not match connection dialect `{connection}`"
            ),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Encode { source, .. } | Self::Decode { source, .. } => Some(source),
            Self::InvalidKey { .. }
            | Self::InvalidTableName(_)
            | Self::UnsupportedDialect(_)
            | Self::DialectMismatch { .. } => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
