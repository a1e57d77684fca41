//! JSON body extractor that also runs `validator` rules.

use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use tracing::debug;
use validator::Validate;

use portal_core::error::AppError;

use crate::error::ApiError;

/// Rejection for any malformed or incomplete request body.
pub const INVALID_INPUT: &str = "invalid input";

/// A JSON body that parsed and passed its validation rules.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                debug!(error = %rejection.body_text(), "Rejected request body");
                AppError::validation(INVALID_INPUT)
            })?;

        value.validate().map_err(|errors| {
            debug!(error = %errors, "Request body failed validation");
            AppError::validation(INVALID_INPUT)
        })?;

        Ok(Self(value))
    }
}
