use std::fmt::Debug;

use async_trait::async_trait;
use bson::Document;
use thiserror::Error;

use crate::query::{Filter, Query};

pub mod memory;
pub mod mongodb;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Query Error: {0}")]
    MongoDB(#[from] ::mongodb::error::Error),

    #[error("Decode Error: {0}")]
    Decode(#[from] bson::de::Error),

    #[error("Encode Error: {0}")]
    Encode(#[from] bson::ser::Error),

    /// A merge refused to produce a new record.
    #[error("Rejected: {0}")]
    Rejected(String),

    #[error(transparent)]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Turns the stored version of a record into its replacement. Runs inside
/// the store's transaction, so it must not block.
pub type Merge<'a> = dyn Fn(Document) -> Result<Document, StoreError> + Send + Sync + 'a;

/// Outcome of a successful [`RecordStore::modify`].
#[derive(Debug, Clone, PartialEq)]
pub struct Modified {
    pub record: Document,
    pub rows_affected: u64,
}

/// The capabilities the data-access layer needs from a backing store.
///
/// Records cross this boundary as BSON documents addressed by collection
/// name; keys are documents matching exactly one record.
#[async_trait]
pub trait RecordStore: Debug + Send + Sync + 'static {
    async fn ping(&self) -> Result<(), StoreError>;

    /// Matching records, ordered and windowed as the query asks.
    async fn find(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError>;

    /// Number of records matching `filter`, ignoring any window.
    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError>;

    async fn fetch(&self, collection: &str, key: &Document) -> Result<Option<Document>, StoreError>;

    /// Insert or replace the record stored under `key`.
    async fn save(&self, collection: &str, key: &Document, record: Document) -> Result<u64, StoreError>;

    /// Fetch the record under `key`, pass it through `merge` and write the
    /// result back, all in one transaction. `None` when no record exists.
    async fn modify(
        &self,
        collection: &str,
        key: &Document,
        merge: &Merge<'_>,
    ) -> Result<Option<Modified>, StoreError>;

    /// Fetch and delete the record under `key` in one transaction. `None`
    /// when no record exists, in which case nothing is deleted.
    async fn remove(&self, collection: &str, key: &Document) -> Result<Option<u64>, StoreError>;
}
