//! Document store abstraction the calendar core runs against.
//!
//! Collections hold flat JSON documents keyed by id. Filtering is limited to
//! field/operator/value predicates combined with AND, which is all the range
//! resolver and the series cascades need.

use crate::error::SchedulerResult;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::fmt;
use tracing::debug;

pub mod memory;
pub mod redis_backend;

pub use self::memory::InMemoryStore;
pub use self::redis_backend::RedisStore;

/// A stored document: a flat JSON object
pub type Document = Map<String, Value>;

/// Field every stored document carries its own id under
pub const ID_FIELD: &str = "id";

/// The collections known to the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Events,
    Calendars,
    Units,
    Sections,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Events,
        Collection::Calendars,
        Collection::Units,
        Collection::Sections,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Events => "events",
            Collection::Calendars => "calendars",
            Collection::Units => "units",
            Collection::Sections => "sections",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comparison operator of a query predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Lt,
    Le,
    Eq,
    Ge,
    Ne,
}

impl FilterOp {
    /// `ordering` is how the stored value compares to the predicate value,
    /// `None` when the two are not comparable (different JSON types)
    fn accepts(&self, ordering: Option<Ordering>) -> bool {
        match self {
            FilterOp::Lt => ordering == Some(Ordering::Less),
            FilterOp::Le => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
            FilterOp::Eq => ordering == Some(Ordering::Equal),
            FilterOp::Ge => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
            FilterOp::Ne => ordering != Some(Ordering::Equal),
        }
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            FilterOp::Lt => "<",
            FilterOp::Le => "<=",
            FilterOp::Eq => "==",
            FilterOp::Ge => ">=",
            FilterOp::Ne => "!=",
        };
        f.write_str(symbol)
    }
}

/// A single `field op value` filter
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

impl Predicate {
    pub fn new(field: &str, op: FilterOp, value: impl Into<Value>) -> Self {
        Self {
            field: field.to_string(),
            op,
            value: value.into(),
        }
    }

    pub fn less_than(field: &str, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOp::Lt, value)
    }

    pub fn at_most(field: &str, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOp::Le, value)
    }

    pub fn equals(field: &str, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOp::Eq, value)
    }

    pub fn at_least(field: &str, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOp::Ge, value)
    }

    pub fn not_equals(field: &str, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOp::Ne, value)
    }

    /// A document lacking the field never matches, whatever the operator
    pub fn matches(&self, document: &Document) -> bool {
        match document.get(&self.field) {
            Some(actual) => self.op.accepts(compare_values(actual, &self.value)),
            None => false,
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.op, self.value)
    }
}

/// Same-type comparison only; strings compare lexicographically, which is
/// what keeps ISO-8601 instants in chronological order
fn compare_values(stored: &Value, wanted: &Value) -> Option<Ordering> {
    match (stored, wanted) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        _ if stored == wanted => Some(Ordering::Equal),
        _ => None,
    }
}

/// True when every predicate matches
pub fn matches_all(document: &Document, predicates: &[Predicate]) -> bool {
    predicates.iter().all(|p| p.matches(document))
}

/// Id of a stored document, if it carries one
pub fn document_id(document: &Document) -> Option<String> {
    match document.get(ID_FIELD)? {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// Fresh id for a document created without one
pub fn new_document_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Abstract document collection store
#[async_trait]
pub trait EventStore: Send + Sync + 'static {
    /// Fetch one document; `None` when it does not exist
    async fn get_by_id(&self, collection: Collection, id: &str)
        -> SchedulerResult<Option<Document>>;

    /// All documents matching every predicate; an empty slice lists the collection
    async fn query(
        &self,
        collection: Collection,
        predicates: &[Predicate],
    ) -> SchedulerResult<Vec<Document>>;

    /// Store a document under `id`, or a freshly generated id, and return it.
    /// The id is embedded in the stored document.
    async fn insert(
        &self,
        collection: Collection,
        id: Option<&str>,
        fields: Document,
    ) -> SchedulerResult<String>;

    /// Merge `fields` into an existing document; missing id is `NotFound`
    async fn update(&self, collection: Collection, id: &str, fields: Document)
        -> SchedulerResult<()>;

    /// Remove a document; removing a missing id succeeds
    async fn delete(&self, collection: Collection, id: &str) -> SchedulerResult<()>;

    /// Remove several documents in one call
    async fn batch_delete(&self, collection: Collection, ids: &[String]) -> SchedulerResult<()>;
}

/// Delete every document matching `predicates` with a single batched delete.
/// Returns how many documents were removed; no delete is issued for zero.
pub async fn cascade_delete(
    store: &dyn EventStore,
    collection: Collection,
    predicates: &[Predicate],
) -> SchedulerResult<usize> {
    let ids: Vec<String> = store
        .query(collection, predicates)
        .await?
        .iter()
        .filter_map(document_id)
        .collect();

    if ids.is_empty() {
        return Ok(0);
    }

    debug!(
        "Cascading delete of {} {} documents matching [{}]",
        ids.len(),
        collection,
        predicates
            .iter()
            .map(Predicate::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );

    store.batch_delete(collection, &ids).await?;
    Ok(ids.len())
}
