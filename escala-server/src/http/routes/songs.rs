//! Song endpoints, including the versions nested under each song

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;

use super::envelope;
use crate::http::error::ApiError;
use crate::http::extractors::JsonBody;
use crate::models::{SongPayload, SongRecord, VersionPayload, VersionRecord};
use crate::services::{songs, versions};
use crate::state::AppState;

type Written = Result<(StatusCode, Json<Value>), ApiError>;

/// GET /api/musicas
async fn list_songs(State(state): State<AppState>) -> Result<Json<Vec<SongRecord>>, ApiError> {
    Ok(Json(state.services().songs.list().await?))
}

/// GET /api/musicas/{id}
async fn get_song(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SongRecord>, ApiError> {
    Ok(Json(state.services().songs.get(&id).await?))
}

/// POST /api/musicas
async fn create_song(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<SongPayload>,
) -> Written {
    let song = state.services().songs.create(payload).await?;
    envelope(StatusCode::CREATED, songs::CREATED, "musica", song)
}

/// PUT /api/musicas/{id}
async fn update_song(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<SongPayload>,
) -> Written {
    let song = state.services().songs.update(&id, payload).await?;
    envelope(StatusCode::OK, songs::UPDATED, "musica", song)
}

/// DELETE /api/musicas/{id} - versions and associations go with it
async fn delete_song(State(state): State<AppState>, Path(id): Path<String>) -> Written {
    let song = state.services().songs.delete(&id).await?;
    envelope(StatusCode::OK, songs::DELETED, "musica", song)
}

/// GET /api/musicas/{id}/versoes
async fn list_versions(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<VersionRecord>>, ApiError> {
    Ok(Json(state.services().versions.list(&id).await?))
}

/// GET /api/musicas/{id}/versoes/{versao_id}
async fn get_version(
    State(state): State<AppState>,
    Path((id, version)): Path<(String, String)>,
) -> Result<Json<VersionRecord>, ApiError> {
    Ok(Json(state.services().versions.get(&id, &version).await?))
}

/// POST /api/musicas/{id}/versoes
async fn create_version(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<VersionPayload>,
) -> Written {
    let version = state.services().versions.create(&id, payload).await?;
    envelope(StatusCode::CREATED, versions::CREATED, "versao", version)
}

/// PUT /api/musicas/{id}/versoes/{versao_id}
async fn update_version(
    State(state): State<AppState>,
    Path((id, version)): Path<(String, String)>,
    JsonBody(payload): JsonBody<VersionPayload>,
) -> Written {
    let version = state
        .services()
        .versions
        .update(&id, &version, payload)
        .await?;
    envelope(StatusCode::OK, versions::UPDATED, "versao", version)
}

/// DELETE /api/musicas/{id}/versoes/{versao_id}
async fn delete_version(
    State(state): State<AppState>,
    Path((id, version)): Path<(String, String)>,
) -> Written {
    let version = state.services().versions.delete(&id, &version).await?;
    envelope(StatusCode::OK, versions::DELETED, "versao", version)
}

/// Song and version routes (category and role associations live in `links`)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/musicas", get(list_songs).post(create_song))
        .route(
            "/api/musicas/{id}",
            get(get_song).put(update_song).delete(delete_song),
        )
        .route(
            "/api/musicas/{id}/versoes",
            get(list_versions).post(create_version),
        )
        .route(
            "/api/musicas/{id}/versoes/{versao_id}",
            get(get_version).put(update_version).delete(delete_version),
        )
}
