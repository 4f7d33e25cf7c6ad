//! Manse data access
//!
//! The `query_manse` tool reads rows through the [`RowSource`] trait. The
//! production source is a read-only SQLite database.

pub mod store;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::StoreError;

pub use store::SqliteManseStore;

/// A single result row keyed by column name
pub type Row = Map<String, Value>;

/// Source of manse rows
#[async_trait]
pub trait RowSource: Send + Sync {
    /// Fetch at most `limit` rows in table order
    async fn fetch_rows(&self, limit: usize) -> Result<Vec<Row>, StoreError>;
}
