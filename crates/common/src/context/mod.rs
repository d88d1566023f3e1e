//! Ask engine
//!
//! Turns a free-text question plus a patient profile into one canned,
//! profile-aware answer:
//! - Keyword predicates checked in a fixed priority order
//! - Answer templates filled from live profile values
//! - A sliding-window transcript of recent turns per session

mod keywords;
mod query_router;
mod transcript;

pub use keywords::Predicate;
pub use query_router::{
    classify, route, route_with_topic, starter_suggestions, AskTopic, DEFAULT_SUGGESTIONS,
};
pub use transcript::{AskTurn, SessionSnapshot, Transcript, TranscriptStore};

use crate::citations::{parse_markers, CitationMarker};
use serde::{Deserialize, Serialize};

/// Answer category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AskKind {
    /// Clinically actionable risk flag
    Warning,
    /// Neutral or explanatory
    Info,
}

/// Biomarker panel the UI should highlight alongside an answer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AskSignal {
    #[serde(rename = "CYP2C19")]
    Cyp2c19,
    #[serde(rename = "VDR")]
    Vdr,
}

/// Page a navigation action points at
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum NavTarget {
    PatientLab,
    PatientDashboard,
}

/// Suggested follow-up action
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AskAction {
    Navigate { to: NavTarget, label: String },
}

impl AskAction {
    pub fn navigate(to: NavTarget, label: &str) -> Self {
        AskAction::Navigate {
            to,
            label: label.to_string(),
        }
    }
}

/// Routed answer to one question
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AskResult {
    /// Short label for the answer category
    pub title: String,

    /// `QUERY: ` plus the question, cut to 64 chars
    pub source: String,

    /// Answer body; may embed `[Ref: <key>]` markers
    pub detail: String,

    #[serde(rename = "type")]
    pub kind: AskKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal: Option<AskSignal>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<AskAction>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub follow_ups: Vec<String>,
}

impl AskResult {
    /// Citation markers embedded in `detail`
    pub fn citations(&self) -> Vec<CitationMarker<'_>> {
        parse_markers(&self.detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_wire_shape() {
        let result = AskResult {
            title: "t".to_string(),
            source: "QUERY: q".to_string(),
            detail: "d [Ref: CPIC]".to_string(),
            kind: AskKind::Warning,
            signal: Some(AskSignal::Cyp2c19),
            actions: vec![AskAction::navigate(NavTarget::PatientLab, "Open lab")],
            follow_ups: vec!["next?".to_string()],
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["type"], "warning");
        assert_eq!(json["signal"], "CYP2C19");
        assert_eq!(json["actions"][0]["type"], "navigate");
        assert_eq!(json["actions"][0]["to"], "patient-lab");
        assert_eq!(json["followUps"][0], "next?");

        let back: AskResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, result);
    }

    #[test]
    fn test_empty_optionals_are_omitted() {
        let result = AskResult {
            title: "t".to_string(),
            source: "QUERY: ".to_string(),
            detail: "plain".to_string(),
            kind: AskKind::Info,
            signal: None,
            actions: Vec::new(),
            follow_ups: Vec::new(),
        };

        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("signal").is_none());
        assert!(json.get("actions").is_none());
        assert!(json.get("followUps").is_none());
        assert!(result.citations().is_empty());
    }
}
