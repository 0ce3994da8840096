//! Route handlers organized by resource

pub mod events;
pub mod health;
pub mod links;
pub mod members;
pub mod named;
pub mod reports;
pub mod songs;

use axum::http::StatusCode;
use axum::Json;
use axum::Router;
use serde::Serialize;
use serde_json::{Map, Value};

use super::error::ApiError;
use crate::error::AppError;
use crate::models::{Link, NamedKind};
use crate::state::AppState;

/// Every route of the API
pub fn router() -> Router<AppState> {
    let mut router = Router::new()
        .merge(health::router())
        .merge(members::router())
        .merge(songs::router())
        .merge(events::router())
        .merge(reports::router());
    for kind in NamedKind::ALL {
        router = router.merge(named::router(kind));
    }
    for link in Link::ALL {
        router = router.merge(links::router(link));
    }
    router.fallback(not_found)
}

async fn not_found() -> ApiError {
    ApiError(AppError::not_found("Rota não encontrada"))
}

/// `{msg}` body for writes without a payload to echo
pub(crate) fn message(msg: &str) -> Json<Value> {
    let mut body = Map::new();
    body.insert("msg".into(), Value::from(msg));
    Json(Value::Object(body))
}

/// `{msg, <key>: value}` body returned by create, update and delete
pub(crate) fn envelope(
    status: StatusCode,
    msg: &str,
    key: &str,
    value: impl Serialize,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let value = serde_json::to_value(value)
        .map_err(|e| AppError::unexpected(format!("response serialization failed: {e}")))?;
    let Json(mut body) = message(msg);
    if let Value::Object(map) = &mut body {
        map.insert(key.to_owned(), value);
    }
    Ok((status, Json(body)))
}
