//! Ask handlers

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::extract::ValidatedJson;
use crate::handlers::patients::load_profile;
use crate::AppState;
use biolens_common::{
    citations::{CitationRegistry, Resolution},
    context::{route_with_topic, starter_suggestions, AskResult, AskTopic, DEFAULT_SUGGESTIONS},
    errors::Result,
    metrics,
};

/// Ask request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AskRequest {
    #[validate(length(max = 2000))]
    pub question: String,

    /// Profile to answer against; the configured default when absent
    #[serde(default)]
    pub patient_id: Option<String>,
}

/// A cited source referenced by the answer text
#[derive(Debug, Serialize)]
pub struct CitedSource {
    /// Marker as it appears in the text
    pub marker: String,

    #[serde(flatten)]
    pub resolution: Resolution,
}

/// Ask response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AskResponse {
    pub patient_id: String,
    pub topic: AskTopic,

    #[serde(flatten)]
    pub result: AskResult,

    pub citations: Vec<CitedSource>,
}

/// Suggestions response
#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    pub starters: Vec<&'static str>,
    pub defaults: Vec<&'static str>,
}

/// Resolve every marker in `text` against the registry, in order
pub(crate) fn cite(registry: &CitationRegistry, text: &str) -> Vec<CitedSource> {
    registry
        .resolve_markers(text)
        .into_iter()
        .map(|resolved| {
            let resolution = match resolved.citation {
                Some(citation) => Resolution {
                    found: true,
                    citation: citation.clone(),
                },
                None => registry.resolve_or_placeholder(resolved.marker.key),
            };
            metrics::record_citation_lookup(resolution.found);
            CitedSource {
                marker: resolved.marker.raw.to_string(),
                resolution,
            }
        })
        .collect()
}

/// Answer a single question against a patient profile
pub async fn ask(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<AskRequest>,
) -> Result<Json<AskResponse>> {
    let profile = load_profile(&state, request.patient_id.as_deref()).await?;
    let (topic, result) = route_with_topic(&request.question, &profile);
    metrics::record_ask(topic.as_str());

    tracing::info!(
        patient_id = %profile.id,
        topic = topic.as_str(),
        "Question routed"
    );

    let citations = cite(state.citations, &result.detail);

    Ok(Json(AskResponse {
        patient_id: profile.id.clone(),
        topic,
        result,
        citations,
    }))
}

/// Example questions for an empty transcript
pub async fn suggestions() -> Json<SuggestionsResponse> {
    Json(SuggestionsResponse {
        starters: starter_suggestions().to_vec(),
        defaults: DEFAULT_SUGGESTIONS.to_vec(),
    })
}
