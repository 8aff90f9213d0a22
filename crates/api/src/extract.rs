//! Extractors that turn malformed input into `400 VALIDATION_ERROR`.

use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use axum::Json;
use modus_core::error::CoreError;
use modus_core::schema;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::AppError;

/// JSON body that has been deserialized AND passed its `validator` schema.
///
/// Malformed JSON, unknown enum values and missing fields become
/// `400 VALIDATION_ERROR` instead of axum's default 422 plain-text rejection.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::Core(CoreError::Validation(rejection.body_text())))?;
        schema::check(&value)?;
        Ok(ValidatedJson(value))
    }
}

/// Query string deserialized with the same error envelope as [`ValidatedJson`].
///
/// Unknown enum values (`?status=closed`, `?sort_by=title`) would otherwise
/// come back as axum's plain-text 400.
pub struct ValidQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::Core(CoreError::Validation(rejection.body_text())))?;
        Ok(ValidQuery(value))
    }
}
