use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;
use bson::Document;

use crate::{
    query::{Filter, Query},
    storage::{Merge, Modified, RecordStore, StoreError},
};

type Collections = HashMap<String, Vec<Document>>;

/// [`RecordStore`] that keeps every collection in process memory.
///
/// Each operation holds the lock for its whole duration, so `modify` and
/// `remove` are atomic with respect to every other call. Records keep
/// insertion order until a query sorts them.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    collections: Mutex<Collections>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Collections>, StoreError> {
        self.collections
            .lock()
            .map_err(|_| StoreError::Internal("memory store lock poisoned".into()))
    }
}

/// A key document matches a record when every key field is equal.
fn key_matches(key: &Document, record: &Document) -> bool {
    key.iter().all(|(field, value)| record.get(field) == Some(value))
}

fn project(record: &Document, columns: &[&str]) -> Document {
    record
        .iter()
        .filter(|(field, _)| columns.contains(&field.as_str()))
        .map(|(field, value)| (field.clone(), value.clone()))
        .collect()
}

#[async_trait]
impl RecordStore for MemoryStorage {
    async fn ping(&self) -> Result<(), StoreError> {
        self.lock().map(|_| ())
    }

    async fn find(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError> {
        let collections = self.lock()?;
        let Some(records) = collections.get(collection) else {
            return Ok(vec![]);
        };

        let mut matched: Vec<&Document> = records.iter().filter(|r| query.filter.matches(r)).collect();
        if !query.order.is_empty() {
            matched.sort_by(|a, b| query.order.compare(a, b));
        }

        let (skip, take) = match query.window {
            Some(window) => (
                usize::try_from(window.offset).unwrap_or(usize::MAX),
                usize::try_from(window.limit).unwrap_or(usize::MAX),
            ),
            None => (0, usize::MAX),
        };

        Ok(matched
            .into_iter()
            .skip(skip)
            .take(take)
            .map(|record| match query.projection {
                Some(columns) => project(record, columns),
                None => record.clone(),
            })
            .collect())
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let collections = self.lock()?;
        let total = collections
            .get(collection)
            .map_or(0, |records| records.iter().filter(|r| filter.matches(r)).count());
        Ok(total as u64)
    }

    async fn fetch(&self, collection: &str, key: &Document) -> Result<Option<Document>, StoreError> {
        let collections = self.lock()?;
        Ok(collections
            .get(collection)
            .and_then(|records| records.iter().find(|r| key_matches(key, r)))
            .cloned())
    }

    async fn save(&self, collection: &str, key: &Document, record: Document) -> Result<u64, StoreError> {
        let mut collections = self.lock()?;
        let records = collections.entry(collection.to_string()).or_default();

        match records.iter_mut().find(|r| key_matches(key, r)) {
            Some(existing) => *existing = record,
            None => records.push(record),
        }
        Ok(1)
    }

    async fn modify(
        &self,
        collection: &str,
        key: &Document,
        merge: &Merge<'_>,
    ) -> Result<Option<Modified>, StoreError> {
        let mut collections = self.lock()?;
        let Some(existing) = collections
            .get_mut(collection)
            .and_then(|records| records.iter_mut().find(|r| key_matches(key, r)))
        else {
            return Ok(None);
        };

        let merged = merge(existing.clone())?;
        *existing = merged.clone();

        Ok(Some(Modified {
            record: merged,
            rows_affected: 1,
        }))
    }

    async fn remove(&self, collection: &str, key: &Document) -> Result<Option<u64>, StoreError> {
        let mut collections = self.lock()?;
        let Some(records) = collections.get_mut(collection) else {
            return Ok(None);
        };

        match records.iter().position(|r| key_matches(key, r)) {
            Some(index) => {
                records.remove(index);
                Ok(Some(1))
            }
            None => Ok(None),
        }
    }
}
