//! One CRUD contract for every record type in the store.
//!
//! A [`Repository`] is instantiated per [`Entity`] over a shared
//! [`RecordStore`] handle. Store failures never escape raw: each operation
//! maps them onto one [`DataError`] kind and keeps the cause as its source.

use std::{fmt::Debug, marker::PhantomData, sync::Arc};

use bson::Document;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, instrument, warn};

use crate::{
    error::{DataError, PatchError},
    query::{Filter, Order, Pagination, Query},
    storage::{RecordStore, StoreError},
};


/// A record type stored in its own collection.
pub trait Entity: Serialize + DeserializeOwned + Clone + Debug + Send + Sync + 'static {
    /// Collection (table) holding these records.
    const COLLECTION: &'static str;

    /// Columns callers may order listings by.
    const SORT_COLUMNS: &'static [&'static str];

    type Key: Debug + Send + Sync;
    type Patch: Patch<Self> + Debug + Send + Sync;

    fn key(&self) -> Self::Key;

    /// Query document matching exactly the record stored under `key`.
    fn key_filter(key: &Self::Key) -> Document;
}

/// A partial update. Implementations enumerate the fields they set, so an
/// omitted field and a field set to its zero value are never confused.
pub trait Patch<E> {
    fn apply_to(&self, record: &mut E) -> Result<(), PatchError>;
}

/// A page of decoded records.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,

    /// Matches for the filter across all pages.
    pub total: u64,

    /// Rows on this page that could not be decoded and were dropped.
    pub skipped: u64,
}

pub struct Repository<E> {
    store: Arc<dyn RecordStore>,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for Repository<E> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E> Debug for Repository<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("entity", &std::any::type_name::<E>())
            .field("store", &self.store)
            .finish()
    }
}

impl<E: Entity> Repository<E> {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    /// Parse a caller-supplied order expression against this entity's
    /// sortable columns, falling back to `default` when none is given.
    pub fn order(&self, text: Option<&str>, default: Order) -> Result<Order, DataError> {
        match text {
            Some(text) => Order::parse(text, E::SORT_COLUMNS),
            None => Ok(default),
        }
    }

    /// Filtered, ordered page of records plus the unwindowed match count.
    ///
    /// No matches is an empty page, not an error.
    #[instrument(skip(self, filter, order), fields(collection = E::COLLECTION, order = %order))]
    pub async fn get_all(
        &self,
        filter: Filter,
        pagination: Pagination,
        order: Order,
    ) -> Result<Page<E>, DataError> {
        self.list_rows(&Query::new(filter, order, pagination.window()))
            .await
    }

    /// Like [`Repository::get_all`], decoding each row as `R`. Used with a
    /// column projection to read a subset of the record.
    ///
    /// Rows that fail to decode are dropped and counted in
    /// [`Page::skipped`]; `total` is the store's count regardless.
    pub async fn list_rows<R: DeserializeOwned>(&self, query: &Query) -> Result<Page<R>, DataError> {
        let total = self
            .store
            .count(E::COLLECTION, &query.filter)
            .await
            .map_err(DataError::Lookup)?;

        let rows = self
            .store
            .find(E::COLLECTION, query)
            .await
            .map_err(DataError::Lookup)?;

        let mut items = Vec::with_capacity(rows.len());
        let mut skipped = 0;
        for row in rows {
            match bson::from_document::<R>(row) {
                Ok(item) => items.push(item),
                Err(e) => {
                    warn!(collection = E::COLLECTION, error = %e, "Skipping undecodable row");
                    skipped += 1;
                }
            }
        }

        debug!(total, returned = items.len(), skipped, "Listed records");
        Ok(Page { items, total, skipped })
    }

    #[instrument(skip(self), fields(collection = E::COLLECTION))]
    pub async fn get_one(&self, key: &E::Key) -> Result<E, DataError> {
        let row = self
            .store
            .fetch(E::COLLECTION, &E::key_filter(key))
            .await
            .map_err(DataError::Lookup)?
            .ok_or(DataError::NotFound)?;

        bson::from_document(row).map_err(|e| DataError::Lookup(e.into()))
    }

    /// Insert `record`, replacing any record stored under the same key.
    #[instrument(skip(self, record), fields(collection = E::COLLECTION, key = ?record.key()))]
    pub async fn add(&self, record: E) -> Result<(E, u64), DataError> {
        let document = bson::to_document(&record).map_err(|e| DataError::InsertFailed(e.into()))?;

        let rows_affected = self
            .store
            .save(E::COLLECTION, &E::key_filter(&record.key()), document)
            .await
            .map_err(DataError::InsertFailed)?;

        debug!(rows_affected, "Saved record");
        Ok((record, rows_affected))
    }

    /// Apply `patch` to the record under `key` and persist the result. The
    /// read, merge and write happen in one store transaction.
    #[instrument(skip(self), fields(collection = E::COLLECTION))]
    pub async fn update(&self, key: &E::Key, patch: &E::Patch) -> Result<(E, u64), DataError> {
        let merge = |existing: Document| -> Result<Document, StoreError> {
            let mut record: E = bson::from_document(existing)?;
            patch
                .apply_to(&mut record)
                .map_err(|e| StoreError::Rejected(e.to_string()))?;
            Ok(bson::to_document(&record)?)
        };

        let modified = self
            .store
            .modify(E::COLLECTION, &E::key_filter(key), &merge)
            .await
            .map_err(DataError::UpdateFailed)?
            .ok_or(DataError::NotFound)?;

        let record = bson::from_document(modified.record).map_err(|e| DataError::UpdateFailed(e.into()))?;

        debug!(rows_affected = modified.rows_affected, "Updated record");
        Ok((record, modified.rows_affected))
    }

    /// Delete the record under `key`. A missing record is
    /// [`DataError::NotFound`] and nothing is deleted.
    #[instrument(skip(self), fields(collection = E::COLLECTION))]
    pub async fn delete(&self, key: &E::Key) -> Result<u64, DataError> {
        let rows_affected = self
            .store
            .remove(E::COLLECTION, &E::key_filter(key))
            .await
            .map_err(DataError::DeleteFailed)?
            .ok_or(DataError::NotFound)?;

        debug!(rows_affected, "Deleted record");
        Ok(rows_affected)
    }
}
