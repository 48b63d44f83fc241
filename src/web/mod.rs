//! HTTP surface of the scheduler.

pub mod handlers;
pub mod payload;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, warn};

use crate::calendar::{RangeQueryResolver, ReferenceData, SeriesMutationCoordinator};
use crate::error::Error;
use crate::store::EventStore;
use handlers::{
    create_calendar, create_event, delete_calendar, delete_event, health_handler,
    list_calendars, list_events, list_sections, list_units, update_calendar, update_event,
};

#[derive(Clone)]
pub struct AppState {
    /// Read side: range resolution
    pub ranges: RangeQueryResolver,
    /// Event writes and series cascades
    pub series: SeriesMutationCoordinator,
    /// Calendars, units and sections
    pub reference: ReferenceData,
}

impl AppState {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self {
            ranges: RangeQueryResolver::new(Arc::clone(&store)),
            series: SeriesMutationCoordinator::new(Arc::clone(&store)),
            reference: ReferenceData::new(store),
        }
    }
}

/// Build the router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/events", get(list_events).post(create_event))
        .route("/events/{id}", put(update_event).delete(delete_event))
        .route("/calendars", get(list_calendars).post(create_calendar))
        .route("/calendars/{id}", put(update_calendar).delete(delete_calendar))
        .route("/units", get(list_units))
        .route("/sections", get(list_sections))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Request rejected: {}", self);
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
