//! Typed key-value persistence over a single SQL table.
//!
//! Values of any serde-serializable type are stored as JSON text under a key
//! derived from their type name, or from a named override. One table, one
//! row per key, one statement per call.
//!
//! ```
//! use serde::{Deserialize, Serialize};
//! use typedkv_core::{db::open_db_in_memory, storable, Store};
//!
//! #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
//! struct User {
//!     id: i64,
//!     name: String,
//! }
//! storable!(User);
//!
//! let conn = open_db_in_memory().unwrap();
//! let store = Store::initialize(&conn, "kv").unwrap();
//!
//! store.set_one(&User { id: 1, name: "test_user1".into() }).unwrap();
//!
//! let mut user = User::default();
//! assert!(store.get_one(&mut user).unwrap());
//! assert_eq!(user.name, "test_user1");
//! ```

pub mod batch;
pub mod db;
pub mod dialect;
pub mod error;
pub mod key;
pub mod logging;
pub mod store;

pub use batch::{KeyBatch, ReadBatch, WriteBatch};
pub use db::{DbError, KvConnection};
pub use dialect::{dialect_for_driver, Dialect, MysqlDialect, SqliteDialect};
pub use error::{StoreError, StoreResult};
pub use key::{type_key, validate_key, Storable, MAX_KEY_BYTES};
pub use logging::{default_log_level, init_logging, logging_status};
pub use store::{sanitize_table_name, Store};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
