use super::models::{fields, Event};
use crate::error::SchedulerResult;
use crate::store::{Collection, Document, EventStore, Predicate};
use crate::utils::time::{non_blank, require_instant};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Resolves which events are relevant to a `[from, to)` window
#[derive(Clone)]
pub struct RangeQueryResolver {
    store: Arc<dyn EventStore>,
}

impl RangeQueryResolver {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    /// Events for the window, or every event ordered by `start_date` when
    /// either bound is missing
    pub async fn resolve(&self, from: Option<&str>, to: Option<&str>) -> SchedulerResult<Vec<Event>> {
        match (non_blank(from), non_blank(to)) {
            (Some(from), Some(to)) => self.resolve_window(from, to).await,
            _ => self.list_ordered().await,
        }
    }

    async fn list_ordered(&self) -> SchedulerResult<Vec<Event>> {
        let mut events = to_events(self.store.query(Collection::Events, &[]).await?)?;
        // Stable, so equal start dates keep store order
        events.sort_by(|a, b| a.start_date.cmp(&b.start_date));
        Ok(events)
    }

    async fn resolve_window(&self, from: &str, to: &str) -> SchedulerResult<Vec<Event>> {
        require_instant("from", from)?;
        require_instant("to", to)?;

        let starts_before = [Predicate::less_than(fields::START_DATE, to)];
        let ends_after = [Predicate::at_least(fields::END_DATE, from)];
        let series_ends_after = [Predicate::at_least(fields::SERIES_END_DATE, from)];
        let open_ended = [
            Predicate::not_equals(fields::RECURRING, ""),
            Predicate::equals(fields::SERIES_END_DATE, ""),
        ];

        let (q1, q2, q3, q4) = futures::try_join!(
            self.store.query(Collection::Events, &starts_before),
            self.store.query(Collection::Events, &ends_after),
            self.store.query(Collection::Events, &series_ends_after),
            self.store.query(Collection::Events, &open_ended),
        )?;

        debug!(
            "Range [{}, {}): {} start before, {} end after, {} series end after, {} open-ended",
            from,
            to,
            q1.len(),
            q2.len(),
            q3.len(),
            q4.len()
        );

        // All-or-nothing gate on the candidate sets, not a per-event filter
        if q1.is_empty() || (q2.is_empty() && q3.is_empty() && q4.is_empty()) {
            return Ok(Vec::new());
        }

        let mut seen = HashSet::new();
        let mut events = Vec::new();
        for event in to_events(q1.into_iter().chain(q2).chain(q3).chain(q4).collect())? {
            if seen.insert(event.id.clone()) {
                events.push(event);
            }
        }
        Ok(events)
    }
}

fn to_events(documents: Vec<Document>) -> SchedulerResult<Vec<Event>> {
    documents.into_iter().map(Event::from_document).collect()
}
