//! Categories, roles, tonalities, event types and artists
//!
//! The five resources share handlers; the router for each kind captures
//! the kind and mounts it under `/api/<path>`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;

use super::envelope;
use crate::http::error::ApiError;
use crate::http::extractors::JsonBody;
use crate::models::{NamedKind, NamedPayload, NamedRecord};
use crate::state::AppState;

type Written = Result<(StatusCode, Json<Value>), ApiError>;

/// GET /api/<kind>
async fn list(state: AppState, kind: NamedKind) -> Result<Json<Vec<NamedRecord>>, ApiError> {
    Ok(Json(state.services().named(kind).list().await?))
}

/// GET /api/<kind>/{id}
async fn get_one(state: AppState, kind: NamedKind, id: String) -> Result<Json<NamedRecord>, ApiError> {
    Ok(Json(state.services().named(kind).get(&id).await?))
}

/// POST /api/<kind>
async fn create(state: AppState, kind: NamedKind, payload: NamedPayload) -> Written {
    let record = state.services().named(kind).create(payload).await?;
    envelope(StatusCode::CREATED, kind.messages().created, kind.json_key(), record)
}

/// PUT /api/<kind>/{id}
async fn update(state: AppState, kind: NamedKind, id: String, payload: NamedPayload) -> Written {
    let record = state.services().named(kind).update(&id, payload).await?;
    envelope(StatusCode::OK, kind.messages().updated, kind.json_key(), record)
}

/// DELETE /api/<kind>/{id}
async fn delete(state: AppState, kind: NamedKind, id: String) -> Written {
    let record = state.services().named(kind).delete(&id).await?;
    envelope(StatusCode::OK, kind.messages().deleted, kind.json_key(), record)
}

/// Routes for one named-entity kind
pub fn router(kind: NamedKind) -> Router<AppState> {
    let collection = format!("/api/{}", kind.path());
    let item = format!("/api/{}/{{id}}", kind.path());

    Router::new()
        .route(
            &collection,
            get(move |State(state): State<AppState>| list(state, kind)).post(
                move |State(state): State<AppState>, JsonBody(payload): JsonBody<NamedPayload>| {
                    create(state, kind, payload)
                },
            ),
        )
        .route(
            &item,
            get(move |State(state): State<AppState>, Path(id): Path<String>| {
                get_one(state, kind, id)
            })
            .put(
                move |State(state): State<AppState>,
                      Path(id): Path<String>,
                      JsonBody(payload): JsonBody<NamedPayload>| {
                    update(state, kind, id, payload)
                },
            )
            .delete(move |State(state): State<AppState>, Path(id): Path<String>| {
                delete(state, kind, id)
            }),
        )
}
