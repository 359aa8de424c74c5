//! Typed key-value store over one SQL table.
//!
//! # Responsibility
//! - Ensure the two-column `(kv_key, kv_value)` table exists.
//! - Run batched upsert/fetch/delete calls, one statement per call.
//! - Marshal JSON payloads between rows and caller-owned values.
//!
//! # Invariants
//! - The store holds no mutable state; every call is self-contained.
//! - Upsert syntax always comes from the bound connection's dialect.
//! - Keys are validated and values encoded before any statement is prepared.
//! - `get` changes no target unless every matched payload decodes.
//! - `get` resets every unmatched target to its default value.
//! - The connection belongs to the caller and is never closed here.

mod statements;

pub use statements::{sanitize_table_name, KEY_COLUMN, VALUE_COLUMN};

use crate::batch::{KeyBatch, ReadBatch, WriteBatch};
use crate::db::KvConnection;
use crate::dialect::{dialect_for_driver, Dialect};
use crate::error::{StoreError, StoreResult};
use crate::key::{validate_key, Storable};
use log::debug;
use statements::{create_table_sql, delete_sql, select_sql, upsert_sql};
use std::collections::HashMap;
use std::time::Instant;

/// Stateless facade binding a connection and a table.
#[derive(Debug)]
pub struct Store<'conn, C: KvConnection = rusqlite::Connection> {
    conn: &'conn C,
    table_name: String,
}

impl<'conn, C: KvConnection> Store<'conn, C> {
    /// Binds a connection and creates the table if absent.
    ///
    /// The table name is reduced to `[A-Za-z0-9_]`; a name with nothing left
    /// is rejected.
    pub fn initialize(conn: &'conn C, table_name: &str) -> StoreResult<Self> {
        let sanitized = sanitize_table_name(table_name);
        if sanitized.is_empty() {
            return Err(StoreError::InvalidTableName(table_name.to_string()));
        }

        conn.run_batch(&create_table_sql(&sanitized))?;
        debug!(
            "event=store_init module=store status=ok dialect={} table={}",
            conn.dialect().name(),
            sanitized
        );

        Ok(Self {
            conn,
            table_name: sanitized,
        })
    }

    /// Initializes after checking that `driver_name` names the dialect the
    /// connection speaks.
    ///
    /// Unknown drivers fail with [`StoreError::UnsupportedDialect`] and a
    /// driver that does not match the connection fails with
    /// [`StoreError::DialectMismatch`], both before any statement runs.
    pub fn initialize_for_driver(
        conn: &'conn C,
        driver_name: &str,
        table_name: &str,
    ) -> StoreResult<Self> {
        let requested = dialect_for_driver(driver_name)?;
        let connection = conn.dialect().name();
        if requested.name() != connection {
            return Err(StoreError::DialectMismatch {
                requested: requested.name(),
                connection,
            });
        }
        Self::initialize(conn, table_name)
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn dialect(&self) -> &dyn Dialect {
        self.conn.dialect()
    }

    /// Upserts every value in `batch` with one multi-row statement.
    ///
    /// The last value given for a repeated key wins. The statement applies
    /// fully or not at all.
    pub fn set(&self, batch: WriteBatch<'_>) -> StoreResult<()> {
        let started_at = Instant::now();
        let entries = batch.into_entries();
        if entries.is_empty() {
            return Ok(());
        }

        let mut rows: Vec<(String, String)> = Vec::with_capacity(entries.len());
        let mut positions: HashMap<String, usize> = HashMap::with_capacity(entries.len());
        for entry in entries {
            validate_key(&entry.key)?;
            let payload = entry.value.encode().map_err(|source| StoreError::Encode {
                key: entry.key.clone(),
                source,
            })?;
            match positions.get(&entry.key) {
                Some(&index) => rows[index].1 = payload,
                None => {
                    positions.insert(entry.key.clone(), rows.len());
                    rows.push((entry.key, payload));
                }
            }
        }

        let sql = upsert_sql(&self.table_name, rows.len(), self.conn.dialect());
        let params: Vec<&str> = rows
            .iter()
            .flat_map(|(key, payload)| [key.as_str(), payload.as_str()])
            .collect();
        self.conn.run(&sql, &params)?;

        debug!(
            "event=store_set module=store status=ok table={} rows={} duration_ms={}",
            self.table_name,
            rows.len(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    /// Fetches every target in `batch` with one query and returns how many
    /// were populated.
    ///
    /// Each row fills the first still-unmatched target with the same key, in
    /// batch order; that target is then out of consideration, so a repeated
    /// key fills only its first target. Rows matching no target are skipped.
    /// Targets left unmatched are reset to `Default`.
    ///
    /// Every matched payload is decoded once as a check before any target is
    /// written, so a decode failure leaves all targets untouched.
    pub fn get(&self, batch: ReadBatch<'_>) -> StoreResult<usize> {
        let started_at = Instant::now();
        let entries = batch.into_entries();
        let requested = entries.len();
        if requested == 0 {
            return Ok(0);
        }
        for entry in &entries {
            validate_key(&entry.key)?;
        }

        let keys: Vec<&str> = entries.iter().map(|entry| entry.key.as_str()).collect();
        let fetched = self
            .conn
            .fetch_pairs(&select_sql(&self.table_name, keys.len()), &keys)?;

        let mut claimed: Vec<Option<String>> = vec![None; requested];
        for (key, payload) in fetched {
            let Some(index) = entries
                .iter()
                .zip(&claimed)
                .position(|(entry, slot)| slot.is_none() && entry.key == key)
            else {
                continue;
            };
            entries[index]
                .target
                .check(&payload)
                .map_err(|source| StoreError::Decode { key, source })?;
            claimed[index] = Some(payload);
        }

        let mut matched = 0;
        for (entry, payload) in entries.into_iter().zip(claimed) {
            match payload {
                Some(payload) => {
                    entry
                        .target
                        .decode_from(&payload)
                        .map_err(|source| StoreError::Decode {
                            key: entry.key.clone(),
                            source,
                        })?;
                    matched += 1;
                }
                None => entry.target.reset(),
            }
        }

        debug!(
            "event=store_get module=store status=ok table={} requested={} matched={} duration_ms={}",
            self.table_name,
            requested,
            matched,
            started_at.elapsed().as_millis()
        );
        Ok(matched)
    }

    /// Deletes every key in `batch` and returns the number of rows removed.
    pub fn delete(&self, batch: KeyBatch) -> StoreResult<usize> {
        let started_at = Instant::now();
        let keys = batch.into_keys();
        if keys.is_empty() {
            return Ok(0);
        }
        for key in &keys {
            validate_key(key)?;
        }

        let params: Vec<&str> = keys.iter().map(String::as_str).collect();
        let deleted = self
            .conn
            .run(&delete_sql(&self.table_name, params.len()), &params)?;

        debug!(
            "event=store_delete module=store status=ok table={} requested={} deleted={} duration_ms={}",
            self.table_name,
            keys.len(),
            deleted,
            started_at.elapsed().as_millis()
        );
        Ok(deleted)
    }

    /// Upserts one value under its derived key.
    pub fn set_one<T: Storable>(&self, value: &T) -> StoreResult<()> {
        self.set(WriteBatch::new().add(value))
    }

    /// Fetches one value, returning whether a row was found.
    pub fn get_one<T: Storable>(&self, target: &mut T) -> StoreResult<bool> {
        Ok(self.get(ReadBatch::new().add(target))? == 1)
    }

    /// Deletes the slot `value` derives, returning whether a row was removed.
    pub fn delete_one<T: Storable>(&self, value: &T) -> StoreResult<bool> {
        Ok(self.delete(KeyBatch::new().add(value))? > 0)
    }
}
