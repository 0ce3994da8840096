//! Report endpoints

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::http::error::ApiError;
use crate::models::ReportSummary;
use crate::state::AppState;

/// GET /api/relatorios/resumo
async fn summary(State(state): State<AppState>) -> Result<Json<ReportSummary>, ApiError> {
    Ok(Json(state.services().reports.summary().await?))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/relatorios/resumo", get(summary))
}
