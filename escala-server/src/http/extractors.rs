//! Custom Axum extractors

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;

use super::error::ApiError;
use crate::error::AppError;

const INVALID_BODY: &str = "Corpo da requisição inválido";

/// JSON body whose rejections use the API error shape (400) instead of
/// axum's plain-text responses
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| {
                ApiError(AppError::validation(INVALID_BODY).with_details(vec![rejection.body_text()]))
            })?;
        Ok(Self(value))
    }
}
