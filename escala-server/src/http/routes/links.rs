//! Association routes: `/api/<owner>/{id}/<target>`

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde_json::Value;

use super::message;
use crate::http::error::ApiError;
use crate::http::extractors::JsonBody;
use crate::models::{Entity, Link, LinkPayload, LinkedItems};
use crate::state::AppState;

fn owner_path(link: Link) -> &'static str {
    match link.owner() {
        Entity::Member => "integrantes",
        Entity::Song => "musicas",
        Entity::Event => "eventos",
        Entity::Named(kind) => kind.path(),
    }
}

/// GET /api/<owner>/{id}/<target>
async fn list(state: AppState, link: Link, owner: String) -> Result<Json<LinkedItems>, ApiError> {
    Ok(Json(state.services().links.list(link, &owner).await?))
}

/// POST /api/<owner>/{id}/<target>
async fn add(
    state: AppState,
    link: Link,
    owner: String,
    payload: LinkPayload,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    state.services().links.add(link, &owner, &payload).await?;
    Ok((StatusCode::CREATED, message(link.messages().added)))
}

/// DELETE /api/<owner>/{id}/<target>/{target_id}
async fn remove(
    state: AppState,
    link: Link,
    owner: String,
    target: String,
) -> Result<Json<Value>, ApiError> {
    state.services().links.remove(link, &owner, &target).await?;
    Ok(message(link.messages().removed))
}

/// Routes for one association
pub fn router(link: Link) -> Router<AppState> {
    let collection = format!("/api/{}/{{id}}/{}", owner_path(link), link.path());
    let item = format!("/api/{}/{{id}}/{}/{{target}}", owner_path(link), link.path());

    Router::new()
        .route(
            &collection,
            get(move |State(state): State<AppState>, Path(id): Path<String>| {
                list(state, link, id)
            })
            .post(
                move |State(state): State<AppState>,
                      Path(id): Path<String>,
                      JsonBody(payload): JsonBody<LinkPayload>| {
                    add(state, link, id, payload)
                },
            ),
        )
        .route(
            &item,
            delete(
                move |State(state): State<AppState>, Path((id, target)): Path<(String, String)>| {
                    remove(state, link, id, target)
                },
            ),
        )
}
