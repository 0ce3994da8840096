//! Event endpoints

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;

use super::envelope;
use crate::http::error::ApiError;
use crate::http::extractors::JsonBody;
use crate::models::{EventPayload, EventRecord};
use crate::services::events::{CREATED, DELETED, UPDATED};
use crate::state::AppState;

const KEY: &str = "evento";

/// GET /api/eventos - most recent first
async fn list_events(State(state): State<AppState>) -> Result<Json<Vec<EventRecord>>, ApiError> {
    Ok(Json(state.services().events.list().await?))
}

/// GET /api/eventos/{id}
async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EventRecord>, ApiError> {
    Ok(Json(state.services().events.get(&id).await?))
}

/// POST /api/eventos
async fn create_event(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<EventPayload>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let event = state.services().events.create(payload).await?;
    envelope(StatusCode::CREATED, CREATED, KEY, event)
}

/// PUT /api/eventos/{id}
async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<EventPayload>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let event = state.services().events.update(&id, payload).await?;
    envelope(StatusCode::OK, UPDATED, KEY, event)
}

/// DELETE /api/eventos/{id}
async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let event = state.services().events.delete(&id).await?;
    envelope(StatusCode::OK, DELETED, KEY, event)
}

/// Event routes (song and member associations live in `links`)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/eventos", get(list_events).post(create_event))
        .route(
            "/api/eventos/{id}",
            get(get_event).put(update_event).delete(delete_event),
        )
}
