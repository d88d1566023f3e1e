//! API handlers module

pub mod ask;
pub mod citations;
pub mod health;
pub mod patients;
pub mod sessions;

use axum::http::Uri;
use biolens_common::errors::AppError;

/// Fallback for paths no route matches
pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound {
        resource_type: "route".to_string(),
        id: uri.path().to_string(),
    }
}
