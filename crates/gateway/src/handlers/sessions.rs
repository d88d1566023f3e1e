//! Session management handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::extract::ValidatedJson;
use crate::handlers::patients::load_profile;
use crate::AppState;
use biolens_common::{
    context::{AskTurn, SessionSnapshot},
    errors::Result,
    metrics,
};

/// Submit turn request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitTurnRequest {
    #[validate(length(max = 2000))]
    pub question: String,

    #[serde(default)]
    pub patient_id: Option<String>,
}

/// Create a new session
pub async fn create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionSnapshot>) {
    let snapshot = state.transcripts.create().await;
    metrics::record_active_sessions(state.transcripts.live_len().await);

    (StatusCode::CREATED, Json(snapshot))
}

/// Get session state
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>> {
    Ok(Json(state.transcripts.get(session_id).await?))
}

/// Ask a question inside a session
pub async fn submit_turn(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<SubmitTurnRequest>,
) -> Result<(StatusCode, Json<AskTurn>)> {
    let profile = load_profile(&state, request.patient_id.as_deref()).await?;
    let turn = state
        .transcripts
        .submit(session_id, &request.question, &profile)
        .await?;
    metrics::record_ask(turn.topic.as_str());

    Ok((StatusCode::CREATED, Json(turn)))
}
