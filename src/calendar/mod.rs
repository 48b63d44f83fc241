//! Calendar domain: event range resolution, recurring-series cascades and
//! the reference collections events point at.

pub mod models;
pub mod range;
pub mod reference;
pub mod seed;
pub mod series;

pub use models::{filter_event_fields, Event, ALLOWED_EVENT_FIELDS};
pub use range::RangeQueryResolver;
pub use reference::ReferenceData;
pub use seed::seed_defaults;
pub use series::{MutationScope, SeriesMutationCoordinator};
