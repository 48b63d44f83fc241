use axum::{
    extract::{FromRequest, Request},
    http::header,
    response::{IntoResponse, Response},
    Form, Json,
};
use serde_json::Value;
use std::collections::HashMap;

use crate::store::Document;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Write body accepted either as JSON or as a url-encoded form.
///
/// Form fields arrive as strings and are stored as such; the loose event
/// deserializers read `"true"` flags and comma-joined unit lists back.
#[derive(Debug)]
pub struct Payload(pub Document);

fn is_form(request: &Request) -> bool {
    request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|content_type| {
            content_type
                .trim_start()
                .to_ascii_lowercase()
                .starts_with(FORM_CONTENT_TYPE)
        })
}

impl<S> FromRequest<S> for Payload
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_form(&request) {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(request, state)
                .await
                .map_err(IntoResponse::into_response)?;
            let document = fields
                .into_iter()
                .map(|(key, value)| (key, Value::String(value)))
                .collect();
            return Ok(Payload(document));
        }

        let Json(document) = Json::<Document>::from_request(request, state)
            .await
            .map_err(IntoResponse::into_response)?;
        Ok(Payload(document))
    }
}
