//! Member endpoints

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;

use super::envelope;
use crate::http::error::ApiError;
use crate::http::extractors::JsonBody;
use crate::models::{MemberPayload, MemberRecord};
use crate::services::members::{CREATED, DELETED, UPDATED};
use crate::state::AppState;

const KEY: &str = "integrante";

/// GET /api/integrantes
async fn list_members(State(state): State<AppState>) -> Result<Json<Vec<MemberRecord>>, ApiError> {
    Ok(Json(state.services().members.list().await?))
}

/// GET /api/integrantes/{id}
async fn get_member(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MemberRecord>, ApiError> {
    Ok(Json(state.services().members.get(&id).await?))
}

/// POST /api/integrantes
async fn create_member(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<MemberPayload>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let member = state.services().members.create(payload).await?;
    envelope(StatusCode::CREATED, CREATED, KEY, member)
}

/// PUT /api/integrantes/{id}
async fn update_member(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<MemberPayload>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let member = state.services().members.update(&id, payload).await?;
    envelope(StatusCode::OK, UPDATED, KEY, member)
}

/// DELETE /api/integrantes/{id}
async fn delete_member(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let member = state.services().members.delete(&id).await?;
    envelope(StatusCode::OK, DELETED, KEY, member)
}

/// Member routes (role associations live in `links`)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/integrantes", get(list_members).post(create_member))
        .route(
            "/api/integrantes/{id}",
            get(get_member).put(update_member).delete(delete_member),
        )
}
