//! Patient profile handlers

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::AppState;
use biolens_common::{
    errors::{AppError, Result},
    profile::{PatientProfile, PatientSummary},
};

/// Fetch the named profile, or the configured default when none is named
pub(crate) async fn load_profile(
    state: &AppState,
    patient_id: Option<&str>,
) -> Result<Arc<PatientProfile>> {
    let id = patient_id
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .unwrap_or(&state.config.ask.default_patient_id);

    state
        .profiles
        .find(id)
        .await?
        .ok_or_else(|| AppError::PatientNotFound { id: id.to_string() })
}

/// List roster summaries
pub async fn list_patients(State(state): State<AppState>) -> Result<Json<Vec<PatientSummary>>> {
    let profiles = state.profiles.list().await?;
    Ok(Json(profiles.iter().map(|p| p.summary()).collect()))
}

/// Get one full profile
pub async fn get_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PatientProfile>> {
    let profile = load_profile(&state, Some(&id)).await?;
    Ok(Json(profile.as_ref().clone()))
}
