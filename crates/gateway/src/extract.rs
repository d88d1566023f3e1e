//! Request extractors

use axum::{
    extract::{FromRequest, Request},
    Json,
};
use biolens_common::errors::AppError;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

/// JSON body that has been deserialized and validated.
///
/// Malformed, incomplete or oversized bodies are rejected as [`AppError`],
/// so they get the same JSON error body as every other failure.
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate().map_err(validation_error)?;
        Ok(Self(value))
    }
}

fn validation_error(errors: ValidationErrors) -> AppError {
    let field = errors.field_errors().keys().next().map(|field| field.to_string());
    AppError::Validation {
        message: errors.to_string(),
        field,
    }
}
