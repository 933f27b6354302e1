use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{Client, ClientSession, Collection, Database, bson::doc, options::FindOptions};
use tracing::{debug, instrument};

use crate::{
    query::{Filter, Query},
    storage::{Merge, Modified, RecordStore, StoreError},
};

/// [`RecordStore`] backed by MongoDB.
///
/// `modify` and `remove` run in a multi-document transaction, which needs a
/// replica set deployment (a single-node replica set is enough).
#[derive(Debug)]
pub struct MongoDBStorage(Client);

impl MongoDBStorage {
    pub async fn new(uri: &str) -> Result<Self, mongodb::error::Error> {
        let client = Client::with_uri_str(uri).await?;
        Ok(Self(client))
    }

    fn get_db(&self) -> Database {
        self.0
            .default_database()
            .unwrap_or_else(|| self.0.database("zaca"))
    }

    fn collection(&self, name: &str) -> Collection<bson::Document> {
        self.get_db().collection(name)
    }

    async fn begin(&self) -> Result<ClientSession, StoreError> {
        let mut session = self.0.start_session().await?;
        session.start_transaction().await?;
        Ok(session)
    }
}

#[async_trait]
impl RecordStore for MongoDBStorage {
    async fn ping(&self) -> Result<(), StoreError> {
        self.get_db().run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    #[instrument(skip(self, query), fields(filter = ?query.filter, order = %query.order))]
    async fn find(&self, collection: &str, query: &Query) -> Result<Vec<bson::Document>, StoreError> {
        let mut options = FindOptions::default();
        if !query.order.is_empty() {
            options.sort = Some(query.order.to_document());
        }
        if let Some(window) = query.window {
            options.skip = Some(window.offset);
            options.limit = Some(i64::try_from(window.limit).unwrap_or(i64::MAX));
        }
        options.projection = query.projection_document();

        let rows: Vec<bson::Document> = self
            .collection(collection)
            .find(query.filter.to_document())
            .with_options(options)
            .await?
            .try_collect()
            .await?;

        debug!(rows = rows.len(), "find returned");
        Ok(rows)
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let total = self
            .collection(collection)
            .count_documents(filter.to_document())
            .await?;
        Ok(total)
    }

    async fn fetch(&self, collection: &str, key: &bson::Document) -> Result<Option<bson::Document>, StoreError> {
        let record = self.collection(collection).find_one(key.clone()).await?;
        Ok(record)
    }

    async fn save(&self, collection: &str, key: &bson::Document, record: bson::Document) -> Result<u64, StoreError> {
        let result = self
            .collection(collection)
            .replace_one(key.clone(), record)
            .upsert(true)
            .await?;

        Ok(if result.upserted_id.is_some() {
            1
        } else {
            result.matched_count
        })
    }

    #[instrument(skip(self, merge))]
    async fn modify(
        &self,
        collection: &str,
        key: &bson::Document,
        merge: &Merge<'_>,
    ) -> Result<Option<Modified>, StoreError> {
        let coll = self.collection(collection);

        // Any early return drops the session, which aborts the transaction.
        let mut session = self.begin().await?;

        let Some(existing) = coll.find_one(key.clone()).session(&mut session).await? else {
            session.abort_transaction().await?;
            return Ok(None);
        };

        let merged = merge(existing)?;
        let result = coll
            .replace_one(key.clone(), merged.clone())
            .session(&mut session)
            .await?;

        session.commit_transaction().await?;

        Ok(Some(Modified {
            record: merged,
            rows_affected: result.matched_count,
        }))
    }

    #[instrument(skip(self))]
    async fn remove(&self, collection: &str, key: &bson::Document) -> Result<Option<u64>, StoreError> {
        let coll = self.collection(collection);
        let mut session = self.begin().await?;

        if coll.find_one(key.clone()).session(&mut session).await?.is_none() {
            session.abort_transaction().await?;
            return Ok(None);
        }

        let result = coll.delete_one(key.clone()).session(&mut session).await?;
        session.commit_transaction().await?;

        Ok(Some(result.deleted_count))
    }
}
