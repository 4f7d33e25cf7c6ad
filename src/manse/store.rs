//! SQLite-backed manse store

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use serde_json::{Number, Value};

use crate::error::StoreError;
use crate::manse::{Row, RowSource};

/// Table queried by `query_manse`
pub const MANSE_TABLE: &str = "manse";

/// Read-only manse database
///
/// A connection is opened per query on the blocking pool, so a slow database
/// never stalls the async workers serving other tools.
#[derive(Debug, Clone)]
pub struct SqliteManseStore {
    path: PathBuf,
}

impl SqliteManseStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<Connection, StoreError> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        Connection::open_with_flags(&self.path, flags).map_err(|e| StoreError::Unavailable {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })
    }

    fn query(&self, limit: usize) -> Result<Vec<Row>, StoreError> {
        let conn = self.open()?;
        let sql = format!("SELECT * FROM {} ORDER BY rowid LIMIT ?1", MANSE_TABLE);
        let mut stmt = conn.prepare(&sql)?;

        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let rows = stmt.query_map([limit], |row| {
            let mut out = Row::new();
            for (i, name) in columns.iter().enumerate() {
                out.insert(name.clone(), to_json(row.get_ref(i)?));
            }
            Ok(out)
        })?;

        let rows = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

#[async_trait]
impl RowSource for SqliteManseStore {
    async fn fetch_rows(&self, limit: usize) -> Result<Vec<Row>, StoreError> {
        let store = self.clone();
        let rows = tokio::task::spawn_blocking(move || store.query(limit)).await??;
        tracing::debug!("Fetched {} manse rows from {}", rows.len(), self.path.display());
        Ok(rows)
    }
}

fn to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Number(i.into()),
        ValueRef::Real(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::Array(bytes.iter().map(|b| Value::from(*b)).collect()),
    }
}
