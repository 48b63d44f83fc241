use super::models::fields;
use crate::error::SchedulerResult;
use crate::store::{cascade_delete, Collection, Document, EventStore, Predicate, ID_FIELD};
use std::sync::Arc;
use tracing::info;

/// Calendars, units and sections: plain documents without series semantics,
/// except that a calendar owns the events filed under it
#[derive(Clone)]
pub struct ReferenceData {
    store: Arc<dyn EventStore>,
}

impl ReferenceData {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    pub async fn list_calendars(&self) -> SchedulerResult<Vec<Document>> {
        self.store.query(Collection::Calendars, &[]).await
    }

    pub async fn create_calendar(&self, input: Document) -> SchedulerResult<String> {
        let id = self.store.insert(Collection::Calendars, None, input).await?;
        info!("Created calendar {}", id);
        Ok(id)
    }

    /// Merge `input` into calendar `id`; the stored id itself is kept
    pub async fn update_calendar(&self, id: &str, mut input: Document) -> SchedulerResult<()> {
        input.remove(ID_FIELD);
        self.store.update(Collection::Calendars, id, input).await
    }

    /// Delete calendar `id`, then every event filed under it
    pub async fn delete_calendar(&self, id: &str) -> SchedulerResult<()> {
        self.store.delete(Collection::Calendars, id).await?;

        let removed = cascade_delete(
            self.store.as_ref(),
            Collection::Events,
            &[Predicate::equals(fields::CALENDAR, id)],
        )
        .await?;

        info!("Deleted calendar {} and {} events", id, removed);
        Ok(())
    }

    pub async fn list_units(&self) -> SchedulerResult<Vec<Document>> {
        self.store.query(Collection::Units, &[]).await
    }

    pub async fn list_sections(&self) -> SchedulerResult<Vec<Document>> {
        self.store.query(Collection::Sections, &[]).await
    }
}
