use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::payload::Payload;
use super::AppState;
use crate::calendar::models::{RECURRING_UPDATE_DATE, RECURRING_UPDATE_MODE};
use crate::calendar::{Event, MutationScope};
use crate::error::Error;
use crate::store::Document;

/// Optional `[from, to)` window on the event listing
#[derive(Debug, Default, Deserialize)]
pub struct RangeParams {
    pub from: Option<String>,
    pub to: Option<String>,
}

/// Body returned by create operations
#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: String,
}

fn empty_response() -> Json<Value> {
    Json(json!({}))
}

/// Remove a wire-only control key from the body, keeping it as a string
fn take_control(body: &mut Document, key: &str) -> Option<String> {
    match body.remove(key)? {
        Value::String(s) => Some(s),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

pub async fn list_events(
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> Result<Json<Vec<Event>>, Error> {
    let events = state
        .ranges
        .resolve(params.from.as_deref(), params.to.as_deref())
        .await?;
    Ok(Json(events))
}

pub async fn create_event(
    State(state): State<AppState>,
    Payload(body): Payload,
) -> Result<Json<CreatedResponse>, Error> {
    let id = state.series.create(body).await?;
    Ok(Json(CreatedResponse { id }))
}

pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Payload(mut body): Payload,
) -> Result<Json<Value>, Error> {
    let mode = take_control(&mut body, RECURRING_UPDATE_MODE);
    let date = take_control(&mut body, RECURRING_UPDATE_DATE);

    state
        .series
        .update(
            &id,
            body,
            MutationScope::from_mode(mode.as_deref()),
            date.as_deref(),
        )
        .await?;
    Ok(empty_response())
}

pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, Error> {
    state.series.delete(&id).await?;
    Ok(empty_response())
}

pub async fn list_calendars(State(state): State<AppState>) -> Result<Json<Vec<Document>>, Error> {
    Ok(Json(state.reference.list_calendars().await?))
}

pub async fn create_calendar(
    State(state): State<AppState>,
    Payload(body): Payload,
) -> Result<Json<CreatedResponse>, Error> {
    let id = state.reference.create_calendar(body).await?;
    Ok(Json(CreatedResponse { id }))
}

pub async fn update_calendar(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Payload(body): Payload,
) -> Result<Json<Value>, Error> {
    state.reference.update_calendar(&id, body).await?;
    Ok(empty_response())
}

pub async fn delete_calendar(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, Error> {
    state.reference.delete_calendar(&id).await?;
    Ok(empty_response())
}

pub async fn list_units(State(state): State<AppState>) -> Result<Json<Vec<Document>>, Error> {
    Ok(Json(state.reference.list_units().await?))
}

pub async fn list_sections(State(state): State<AppState>) -> Result<Json<Vec<Document>>, Error> {
    Ok(Json(state.reference.list_sections().await?))
}

// Handler for API health check
pub async fn health_handler() -> &'static str {
    "OK"
}
