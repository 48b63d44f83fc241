use super::{
    matches_all, new_document_id, Collection, Document, EventStore, Predicate, ID_FIELD,
};
use crate::error::{not_found_error, SchedulerResult};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

/// In-memory implementation of the store (for tests and local runs).
/// Documents are kept in id order, so query results are deterministic.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    collections: RwLock<HashMap<Collection, BTreeMap<String, Document>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently held in `collection`
    pub async fn count(&self, collection: Collection) -> usize {
        let collections = self.collections.read().await;
        collections.get(&collection).map_or(0, BTreeMap::len)
    }
}

#[async_trait]
impl EventStore for InMemoryStore {
    async fn get_by_id(
        &self,
        collection: Collection,
        id: &str,
    ) -> SchedulerResult<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .and_then(|documents| documents.get(id))
            .cloned())
    }

    async fn query(
        &self,
        collection: Collection,
        predicates: &[Predicate],
    ) -> SchedulerResult<Vec<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .map(|documents| {
                documents
                    .values()
                    .filter(|document| matches_all(document, predicates))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn insert(
        &self,
        collection: Collection,
        id: Option<&str>,
        mut fields: Document,
    ) -> SchedulerResult<String> {
        let id = id.map(str::to_string).unwrap_or_else(new_document_id);
        fields.insert(ID_FIELD.to_string(), Value::String(id.clone()));

        let mut collections = self.collections.write().await;
        collections
            .entry(collection)
            .or_default()
            .insert(id.clone(), fields);
        Ok(id)
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        fields: Document,
    ) -> SchedulerResult<()> {
        let mut collections = self.collections.write().await;
        let document = collections
            .get_mut(&collection)
            .and_then(|documents| documents.get_mut(id))
            .ok_or_else(|| not_found_error(collection.as_str(), id))?;

        for (key, value) in fields {
            document.insert(key, value);
        }
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> SchedulerResult<()> {
        let mut collections = self.collections.write().await;
        if let Some(documents) = collections.get_mut(&collection) {
            documents.remove(id);
        }
        Ok(())
    }

    async fn batch_delete(&self, collection: Collection, ids: &[String]) -> SchedulerResult<()> {
        let mut collections = self.collections.write().await;
        if let Some(documents) = collections.get_mut(&collection) {
            for id in ids {
                documents.remove(id);
            }
        }
        Ok(())
    }
}
