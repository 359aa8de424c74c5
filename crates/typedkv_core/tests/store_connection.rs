use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use typedkv_core::db::DbResult;
use typedkv_core::{
    storable, DbError, Dialect, KvConnection, MysqlDialect, ReadBatch, Store, StoreError,
    WriteBatch,
};

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
struct Item(i64);

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
struct Label(String);

storable!(Item, Label);

/// Connection speaking the MySQL dialect that records every statement and
/// answers queries from a fixed row set.
#[derive(Debug, Default)]
struct RecordingMysql {
    statements: RefCell<Vec<(String, Vec<String>)>>,
    rows: Vec<(String, String)>,
}

impl RecordingMysql {
    fn with_rows(rows: &[(&str, &str)]) -> Self {
        Self {
            statements: RefCell::default(),
            rows: rows
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
        }
    }

    fn record(&self, sql: &str, params: &[&str]) {
        self.statements.borrow_mut().push((
            sql.to_string(),
            params.iter().map(|param| param.to_string()).collect(),
        ));
    }

    fn last_statement(&self) -> (String, Vec<String>) {
        self.statements.borrow().last().cloned().unwrap()
    }
}

impl KvConnection for RecordingMysql {
    fn dialect(&self) -> &dyn Dialect {
        &MysqlDialect
    }

    fn run_batch(&self, sql: &str) -> DbResult<()> {
        self.record(sql, &[]);
        Ok(())
    }

    fn run(&self, sql: &str, params: &[&str]) -> DbResult<usize> {
        self.record(sql, params);
        Ok(params.len())
    }

    fn fetch_pairs(&self, sql: &str, params: &[&str]) -> DbResult<Vec<(String, String)>> {
        self.record(sql, params);
        Ok(self
            .rows
            .iter()
            .filter(|(key, _)| params.contains(&key.as_str()))
            .cloned()
            .collect())
    }
}

/// Connection whose engine is unreachable.
#[derive(Debug)]
struct Unreachable;

impl KvConnection for Unreachable {
    fn dialect(&self) -> &dyn Dialect {
        &MysqlDialect
    }

    fn run_batch(&self, _sql: &str) -> DbResult<()> {
        Err(DbError::Driver(Box::new(std::io::Error::other(
            "connection refused",
        ))))
    }

    fn run(&self, sql: &str, _params: &[&str]) -> DbResult<usize> {
        self.run_batch(sql).map(|()| 0)
    }

    fn fetch_pairs(&self, sql: &str, _params: &[&str]) -> DbResult<Vec<(String, String)>> {
        self.run_batch(sql).map(|()| Vec::new())
    }
}

#[test]
fn store_takes_upsert_syntax_from_connection() {
    let conn = RecordingMysql::default();
    let store = Store::initialize(&conn, "kv").unwrap();
    assert_eq!(store.dialect().name(), "mysql");

    let item = Item(1);
    let label = Label("first".to_string());
    store.set(WriteBatch::new().add(&item).add(&label)).unwrap();

    let (sql, params) = conn.last_statement();
    assert_eq!(
        sql,
        "INSERT INTO `kv` (`kv_key`, `kv_value`) VALUES (?, ?), (?, ?) \
         ON DUPLICATE KEY UPDATE `kv_value` = VALUES(`kv_value`)"
    );
    assert_eq!(params, vec!["Item", "1", "Label", "\"first\""]);
}

#[test]
fn initialize_for_driver_accepts_matching_driver_only() {
    let conn = RecordingMysql::default();

    let store = Store::initialize_for_driver(&conn, "MySQL", "kv").unwrap();
    assert_eq!(store.table_name(), "kv");

    let err = Store::initialize_for_driver(&conn, "sqlite3", "kv").unwrap_err();
    assert!(matches!(
        err,
        StoreError::DialectMismatch {
            requested: "sqlite3",
            connection: "mysql",
        }
    ));
}

#[test]
fn get_and_delete_issue_one_statement_each() {
    let conn = RecordingMysql::with_rows(&[("Item", "7"), ("Other", "\"ignored\"")]);
    let store = Store::initialize(&conn, "kv").unwrap();

    let mut item = Item::default();
    let mut label = Label("stale".to_string());
    let count = store
        .get(ReadBatch::new().add(&mut item).add(&mut label))
        .unwrap();

    assert_eq!(count, 1);
    assert_eq!(item, Item(7));
    assert_eq!(label, Label::default());
    let (sql, params) = conn.last_statement();
    assert_eq!(
        sql,
        "SELECT `kv_key`, `kv_value` FROM `kv` WHERE `kv_key` IN (?, ?)"
    );
    assert_eq!(params, vec!["Item", "Label"]);

    let statements_before = conn.statements.borrow().len();
    store.delete_one(&Item::default()).unwrap();
    assert_eq!(conn.statements.borrow().len(), statements_before + 1);
    assert_eq!(
        conn.last_statement().0,
        "DELETE FROM `kv` WHERE `kv_key` IN (?)"
    );
}

#[test]
fn driver_errors_are_returned_unchanged() {
    let err = Store::initialize(&Unreachable, "kv").unwrap_err();

    match err {
        StoreError::Db(DbError::Driver(inner)) => {
            assert_eq!(inner.to_string(), "connection refused")
        }
        other => panic!("unexpected error: {other}"),
    }
}
