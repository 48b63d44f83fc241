use super::{
    matches_all, new_document_id, Collection, Document, EventStore, Predicate, ID_FIELD,
};
use crate::error::{not_found_error, store_error, SchedulerResult};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client as RedisClient};
use serde_json::Value;
use tracing::{debug, info};

/// Redis key layout
mod keys {
    /// Set of every id stored in a collection
    pub const IDS_SUFFIX: &str = "ids";
    /// Prefix of per-document keys, holding the document as JSON
    pub const DOC_SEGMENT: &str = "doc";
}

/// Redis-backed document store.
///
/// Each document is a JSON string under `{prefix}:{collection}:doc:{id}` and
/// every collection keeps the set of its ids under `{prefix}:{collection}:ids`.
/// Redis has no secondary indexes here, so predicate queries scan the
/// collection and filter in process.
#[derive(Clone)]
pub struct RedisStore {
    connection: ConnectionManager,
    prefix: String,
}

impl RedisStore {
    /// Connect to Redis and return a store writing under `prefix`
    pub async fn connect(redis_url: &str, prefix: &str) -> SchedulerResult<Self> {
        info!("Connecting to Redis at {}", redis_url);

        let client = RedisClient::open(redis_url)
            .map_err(|e| store_error(&format!("Failed to create Redis client: {}", e)))?;
        let connection = ConnectionManager::new(client)
            .await
            .map_err(|e| store_error(&format!("Failed to connect to Redis: {}", e)))?;

        Ok(Self {
            connection,
            prefix: prefix.to_string(),
        })
    }

    fn ids_key(&self, collection: Collection) -> String {
        collection_key(&self.prefix, collection, keys::IDS_SUFFIX)
    }

    fn doc_key(&self, collection: Collection, id: &str) -> String {
        document_key(&self.prefix, collection, id)
    }

    async fn write_document(
        &self,
        collection: Collection,
        id: &str,
        document: &Document,
    ) -> SchedulerResult<()> {
        let pipe = write_pipeline(&self.prefix, collection, id, document)?;
        let mut conn = self.connection.clone();

        pipe.query_async::<()>(&mut conn)
            .await
            .map_err(|e| store_error(&format!("Redis write of {} '{}' failed: {}", collection, id, e)))
    }
}

fn collection_key(prefix: &str, collection: Collection, suffix: &str) -> String {
    format!("{}:{}:{}", prefix, collection, suffix)
}

fn document_key(prefix: &str, collection: Collection, id: &str) -> String {
    format!("{}:{}:{}:{}", prefix, collection, keys::DOC_SEGMENT, id)
}

fn parse_document(json: &str) -> SchedulerResult<Document> {
    Ok(serde_json::from_str(json)?)
}

/// SET of the document JSON plus SADD of its id, applied atomically
fn write_pipeline(
    prefix: &str,
    collection: Collection,
    id: &str,
    document: &Document,
) -> SchedulerResult<redis::Pipeline> {
    let json = serde_json::to_string(document)?;
    let mut pipe = redis::pipe();
    pipe.atomic()
        .set(document_key(prefix, collection, id), json)
        .ignore()
        .sadd(collection_key(prefix, collection, keys::IDS_SUFFIX), id)
        .ignore();
    Ok(pipe)
}

/// DEL of every document key plus SREM of the ids, applied atomically
fn delete_pipeline(prefix: &str, collection: Collection, ids: &[String]) -> redis::Pipeline {
    let doc_keys: Vec<String> = ids
        .iter()
        .map(|id| document_key(prefix, collection, id))
        .collect();
    let mut pipe = redis::pipe();
    pipe.atomic()
        .del(doc_keys)
        .ignore()
        .srem(collection_key(prefix, collection, keys::IDS_SUFFIX), ids.to_vec())
        .ignore();
    pipe
}

/// Overlay `fields` on the stored document; keys not in `fields` survive
fn merge_fields(mut document: Document, fields: Document) -> Document {
    for (key, value) in fields {
        document.insert(key, value);
    }
    document
}

#[async_trait]
impl EventStore for RedisStore {
    async fn get_by_id(
        &self,
        collection: Collection,
        id: &str,
    ) -> SchedulerResult<Option<Document>> {
        let mut conn = self.connection.clone();

        let data: Option<String> = conn
            .get(self.doc_key(collection, id))
            .await
            .map_err(|e| store_error(&format!("Redis GET error: {}", e)))?;

        data.as_deref().map(parse_document).transpose()
    }

    async fn query(
        &self,
        collection: Collection,
        predicates: &[Predicate],
    ) -> SchedulerResult<Vec<Document>> {
        let mut conn = self.connection.clone();

        let mut ids: Vec<String> = conn
            .smembers(self.ids_key(collection))
            .await
            .map_err(|e| store_error(&format!("Redis SMEMBERS error: {}", e)))?;

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        // Set members come back unordered; keep results in id order
        ids.sort();
        let doc_keys: Vec<String> = ids.iter().map(|id| self.doc_key(collection, id)).collect();

        let payloads: Vec<Option<String>> = conn
            .mget(&doc_keys)
            .await
            .map_err(|e| store_error(&format!("Redis MGET error: {}", e)))?;

        let mut documents = Vec::new();
        for payload in payloads.iter().flatten() {
            let document = parse_document(payload)?;
            if matches_all(&document, predicates) {
                documents.push(document);
            }
        }

        debug!(
            "Scanned {} {} documents, {} matched",
            ids.len(),
            collection,
            documents.len()
        );
        Ok(documents)
    }

    async fn insert(
        &self,
        collection: Collection,
        id: Option<&str>,
        mut fields: Document,
    ) -> SchedulerResult<String> {
        let id = id.map(str::to_string).unwrap_or_else(new_document_id);
        fields.insert(ID_FIELD.to_string(), Value::String(id.clone()));

        self.write_document(collection, &id, &fields).await?;
        Ok(id)
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        fields: Document,
    ) -> SchedulerResult<()> {
        let stored = self
            .get_by_id(collection, id)
            .await?
            .ok_or_else(|| not_found_error(collection.as_str(), id))?;

        self.write_document(collection, id, &merge_fields(stored, fields))
            .await
    }

    async fn delete(&self, collection: Collection, id: &str) -> SchedulerResult<()> {
        self.batch_delete(collection, &[id.to_string()]).await
    }

    async fn batch_delete(&self, collection: Collection, ids: &[String]) -> SchedulerResult<()> {
        if ids.is_empty() {
            return Ok(());
        }

        let pipe = delete_pipeline(&self.prefix, collection, ids);
        let mut conn = self.connection.clone();

        pipe.query_async::<()>(&mut conn)
            .await
            .map_err(|e| store_error(&format!("Redis DEL error: {}", e)))?;

        debug!("Deleted {} {} documents", ids.len(), collection);
        Ok(())
    }
}
