//! Health check handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Serialize)]
pub struct ReadyResponse {
    pub status: String,
    pub checks: HealthChecks,
}

#[derive(Serialize)]
pub struct HealthChecks {
    pub citations: CheckResult,
    pub profiles: CheckResult,
}

#[derive(Serialize)]
pub struct CheckResult {
    pub status: String,
    pub entries: usize,
}

impl CheckResult {
    fn from_count(entries: usize) -> Self {
        Self {
            status: if entries > 0 { "up" } else { "empty" }.to_string(),
            entries,
        }
    }

    fn is_up(&self) -> bool {
        self.status == "up"
    }
}

/// Liveness probe - always returns healthy if server is running
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: biolens_common::VERSION.to_string(),
    })
}

/// Readiness probe - the registry and roster must both hold data
pub async fn ready(State(state): State<AppState>) -> Json<ReadyResponse> {
    let citations = CheckResult::from_count(state.citations.len());
    let profiles = CheckResult::from_count(state.profiles.len());

    let all_healthy = citations.is_up() && profiles.is_up();

    Json(ReadyResponse {
        status: if all_healthy { "ready" } else { "not_ready" }.to_string(),
        checks: HealthChecks {
            citations,
            profiles,
        },
    })
}
