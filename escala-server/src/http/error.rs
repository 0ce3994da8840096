//! API error type with IntoResponse
//!
//! Every failure is rendered as `{"erro", "codigo", "detalhes"?}` with the
//! matching status code.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::error::{AppError, ErrorKind, UNEXPECTED_MESSAGE};

/// Wrapper that lets handlers return service errors directly
#[derive(Debug)]
pub struct ApiError(pub AppError);

#[derive(Serialize)]
struct ErrorBody<'a> {
    erro: &'a str,
    codigo: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    detalhes: Option<&'a [String]>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status =
            StatusCode::from_u16(err.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = if err.kind() == ErrorKind::Unexpected {
            // Log the actual error, return generic message
            tracing::error!(error = %err.message(), "request failed");
            ErrorBody {
                erro: UNEXPECTED_MESSAGE,
                codigo: status.as_u16(),
                detalhes: None,
            }
        } else {
            tracing::debug!(status = status.as_u16(), error = %err.message(), "request rejected");
            ErrorBody {
                erro: err.message(),
                codigo: status.as_u16(),
                detalhes: Some(err.details()).filter(|d| !d.is_empty()),
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(e: AppError) -> Self {
        Self(e)
    }
}
