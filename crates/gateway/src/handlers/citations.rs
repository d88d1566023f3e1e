//! Citation registry handlers

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::extract::ValidatedJson;
use crate::handlers::ask::{cite, CitedSource};
use crate::AppState;
use biolens_common::{
    citations::{segment, Citation, Resolution, Segment},
    errors::Result,
    metrics,
};

/// Registry listing
#[derive(Debug, Serialize)]
pub struct CitationListResponse {
    /// Every accepted lookup key, normalized
    pub keys: Vec<String>,
    pub citations: Vec<Citation>,
}

/// Resolve markers in a text
#[derive(Debug, Deserialize, Validate)]
pub struct ResolveTextRequest {
    #[validate(length(max = 10000))]
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ResolveTextResponse<'a> {
    pub segments: Vec<Segment<'a>>,
    pub citations: Vec<CitedSource>,
}

/// List registered citations
pub async fn list_citations(State(state): State<AppState>) -> Json<CitationListResponse> {
    Json(CitationListResponse {
        keys: state.citations.keys().to_vec(),
        citations: state.citations.records().to_vec(),
    })
}

/// Look up one key; unknown keys get a placeholder record
pub async fn get_citation(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<Resolution> {
    let resolution = state.citations.resolve_or_placeholder(&key);
    metrics::record_citation_lookup(resolution.found);
    Json(resolution)
}

/// Split a text around its markers and resolve each one
pub async fn resolve_text(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<ResolveTextRequest>,
) -> Result<Json<serde_json::Value>> {
    let response = ResolveTextResponse {
        segments: segment(&request.text),
        citations: cite(state.citations, &request.text),
    };

    Ok(Json(serde_json::to_value(&response)?))
}
