use super::models::{fields, filter_event_fields, Event, RECURRING_UPDATE_DATE};
use crate::error::{not_found_error, validation_error, SchedulerResult};
use crate::store::{cascade_delete, Collection, Document, EventStore, Predicate};
use crate::utils::time::{non_blank, require_instant};
use std::sync::Arc;
use tracing::{debug, info};

/// Breadth of the cascade following an event update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationScope {
    /// Drop every occurrence of the edited master
    All,
    /// Drop the series' occurrences starting at or after the scope date
    Next,
    /// Only the edited event changes
    Single,
}

impl MutationScope {
    /// Map the wire `recurring_update_mode`; unknown modes mean no cascade
    pub fn from_mode(mode: Option<&str>) -> Self {
        match mode {
            Some("all") => MutationScope::All,
            Some("next") => MutationScope::Next,
            _ => MutationScope::Single,
        }
    }
}

/// Applies event writes and cascades them across recurring series.
///
/// Every operation is a plain sequence of store calls. A failure part way
/// leaves the earlier steps applied and returns the failing step's error.
#[derive(Clone)]
pub struct SeriesMutationCoordinator {
    store: Arc<dyn EventStore>,
}

impl SeriesMutationCoordinator {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    /// Create a standalone event or a new master and return its id.
    /// `origin_id` is never taken from the input.
    pub async fn create(&self, input: Document) -> SchedulerResult<String> {
        let (mut event, stripped) = filter_event_fields(input);
        if !stripped.is_empty() {
            debug!("Ignoring fields on event create: {:?}", stripped);
        }
        event.remove(fields::ORIGIN_ID);

        let id = self.store.insert(Collection::Events, None, event).await?;
        info!("Created event {}", id);
        Ok(id)
    }

    /// Write the allow-listed `input` fields to event `id`, then cascade
    /// according to `scope`
    pub async fn update(
        &self,
        id: &str,
        input: Document,
        scope: MutationScope,
        scope_date: Option<&str>,
    ) -> SchedulerResult<()> {
        // Checked before anything is written
        let scope_date = match scope {
            MutationScope::Next => {
                let date = non_blank(scope_date)
                    .ok_or_else(|| validation_error("date must be provided"))?;
                require_instant(RECURRING_UPDATE_DATE, date)?;
                Some(date)
            }
            _ => None,
        };

        let mut target = self
            .store
            .get_by_id(Collection::Events, id)
            .await?
            .ok_or_else(|| not_found_error(Collection::Events.as_str(), id))?;

        let (changes, stripped) = filter_event_fields(input);
        if !stripped.is_empty() {
            debug!("Ignoring fields on update of event {}: {:?}", id, stripped);
        }
        if !changes.is_empty() {
            self.store
                .update(Collection::Events, id, changes.clone())
                .await?;
            target.extend(changes);
        }
        // Series membership as it stands after the write
        let target = Event::from_document(target)?;

        let removed = match (scope, scope_date) {
            (MutationScope::All, _) => self.delete_occurrences(id, None).await?,
            (MutationScope::Next, Some(date)) => {
                self.delete_occurrences(target.master_id(), Some(date)).await?
            }
            _ => 0,
        };

        info!(
            "Updated event {} ({:?} scope, {} occurrences removed)",
            id, scope, removed
        );
        Ok(())
    }

    /// Delete event `id` and every occurrence whose master it is
    pub async fn delete(&self, id: &str) -> SchedulerResult<()> {
        self.store.delete(Collection::Events, id).await?;
        let removed = self.delete_occurrences(id, None).await?;

        info!("Deleted event {} and {} occurrences", id, removed);
        Ok(())
    }

    /// Remove occurrences of `master_id`, optionally only those starting at
    /// or after `from`
    async fn delete_occurrences(&self, master_id: &str, from: Option<&str>) -> SchedulerResult<usize> {
        let mut predicates = vec![Predicate::equals(fields::ORIGIN_ID, master_id)];
        if let Some(from) = from {
            predicates.push(Predicate::at_least(fields::START_DATE, from));
        }

        cascade_delete(self.store.as_ref(), Collection::Events, &predicates).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_from_mode() {
        assert_eq!(MutationScope::from_mode(Some("all")), MutationScope::All);
        assert_eq!(MutationScope::from_mode(Some("next")), MutationScope::Next);
        assert_eq!(MutationScope::from_mode(Some("ALL")), MutationScope::Single);
        assert_eq!(MutationScope::from_mode(Some("")), MutationScope::Single);
        assert_eq!(MutationScope::from_mode(None), MutationScope::Single);
    }
}
