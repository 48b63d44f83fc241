#![allow(dead_code)]

use async_trait::async_trait;
use scheduler_service::error::{store_error, SchedulerResult};
use scheduler_service::store::{
    document_id, Collection, Document, EventStore, InMemoryStore, Predicate,
};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Store operations a `MockStore` can be told to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    GetById,
    Query,
    Insert,
    Update,
    Delete,
    BatchDelete,
}

/// In-memory store that counts deletes and can fail one kind of operation
#[derive(Debug, Default)]
pub struct MockStore {
    inner: InMemoryStore,
    fail_on: Option<Operation>,
    delete_calls: AtomicUsize,
    batch_delete_calls: AtomicUsize,
    deleted_documents: AtomicUsize,
    updates: AtomicUsize,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(operation: Operation) -> Self {
        Self {
            fail_on: Some(operation),
            ..Self::default()
        }
    }

    fn check(&self, operation: Operation) -> SchedulerResult<()> {
        if self.fail_on == Some(operation) {
            Err(store_error(&format!("simulated {:?} failure", operation)))
        } else {
            Ok(())
        }
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    pub fn batch_delete_calls(&self) -> usize {
        self.batch_delete_calls.load(Ordering::SeqCst)
    }

    /// Documents named by delete or batch delete calls
    pub fn deleted_documents(&self) -> usize {
        self.deleted_documents.load(Ordering::SeqCst)
    }

    pub fn updates(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    /// Read straight from the backing store, bypassing failure injection
    pub async fn peek(&self, collection: Collection, id: &str) -> Option<Document> {
        self.inner.get_by_id(collection, id).await.unwrap()
    }

    /// Sorted ids of every document in `collection`
    pub async fn ids(&self, collection: Collection) -> Vec<String> {
        let mut ids: Vec<String> = self
            .inner
            .query(collection, &[])
            .await
            .unwrap()
            .iter()
            .filter_map(document_id)
            .collect();
        ids.sort();
        ids
    }
}

#[async_trait]
impl EventStore for MockStore {
    async fn get_by_id(
        &self,
        collection: Collection,
        id: &str,
    ) -> SchedulerResult<Option<Document>> {
        self.check(Operation::GetById)?;
        self.inner.get_by_id(collection, id).await
    }

    async fn query(
        &self,
        collection: Collection,
        predicates: &[Predicate],
    ) -> SchedulerResult<Vec<Document>> {
        self.check(Operation::Query)?;
        self.inner.query(collection, predicates).await
    }

    async fn insert(
        &self,
        collection: Collection,
        id: Option<&str>,
        fields: Document,
    ) -> SchedulerResult<String> {
        self.check(Operation::Insert)?;
        self.inner.insert(collection, id, fields).await
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        fields: Document,
    ) -> SchedulerResult<()> {
        self.check(Operation::Update)?;
        self.updates.fetch_add(1, Ordering::SeqCst);
        self.inner.update(collection, id, fields).await
    }

    async fn delete(&self, collection: Collection, id: &str) -> SchedulerResult<()> {
        self.check(Operation::Delete)?;
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.deleted_documents.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(collection, id).await
    }

    async fn batch_delete(&self, collection: Collection, ids: &[String]) -> SchedulerResult<()> {
        self.check(Operation::BatchDelete)?;
        self.batch_delete_calls.fetch_add(1, Ordering::SeqCst);
        self.deleted_documents.fetch_add(ids.len(), Ordering::SeqCst);
        self.inner.batch_delete(collection, ids).await
    }
}

pub fn doc(value: Value) -> Document {
    value
        .as_object()
        .cloned()
        .expect("test documents are JSON objects")
}

/// Insert documents under their own `id` into `collection`, bypassing
/// failure injection
pub async fn put(store: &MockStore, collection: Collection, documents: Vec<Value>) {
    for value in documents {
        let document = doc(value);
        let id = document_id(&document).expect("test documents carry an id");
        store
            .inner
            .insert(collection, Some(&id), document)
            .await
            .unwrap();
    }
}
