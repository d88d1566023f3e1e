//! Patient profile model
//!
//! Read-only input to the ask router. Profiles come from a
//! [`ProfileSource`]; the demo roster is the only built-in one.

mod demo;
mod source;

pub use demo::{demo_patient, demo_roster};
pub use source::{ProfileSource, StaticProfileSource};

use serde::{Deserialize, Serialize};

/// Categorical risk level shown on the clinician roster
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Lab result status against its reference range
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LabStatus {
    Optimal,
    Warning,
    Critical,
}

/// Drug interaction severity
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// A single lab measurement
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LabResult {
    pub id: String,

    /// Human-readable test name, e.g. "Vitamin D (25-OH)"
    pub name: String,

    pub value: f64,

    pub unit: String,

    /// Reference range as (min, max)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<(f64, f64)>,

    pub status: LabStatus,

    /// Free-text interpretation note
    #[serde(default)]
    pub ai_analysis: String,

    /// Earlier readings, oldest first, ending with the current value
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<LabReading>,
}

/// One point of a lab trend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LabReading {
    /// Period label, e.g. "Mar"
    pub date: String,
    pub value: f64,
}

impl LabResult {
    /// Reference range as `min-max`, or `n/a` when absent
    pub fn format_range(&self) -> String {
        match self.range {
            Some((min, max)) => format!("{}-{}", min, max),
            None => "n/a".to_string(),
        }
    }

    /// Change from the first recorded reading to the current value
    pub fn trend_delta(&self) -> Option<f64> {
        self.history.first().map(|first| self.value - first.value)
    }
}

/// Pharmacogenomic drug interaction attached to a gene trait
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DrugInteraction {
    pub drug: String,
    pub warning: String,
    pub severity: Severity,
}

/// A detected genomic variant
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeneTrait {
    /// Gene symbol, e.g. "CYP2C19"
    pub gene: String,

    /// Variant label, e.g. "*2/*3"
    pub variant: String,

    /// Impact label, e.g. "Poor Metabolizer"
    pub impact: String,

    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drug_interaction: Option<DrugInteraction>,
}

/// One day of wearable readings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WearableReading {
    pub date: String,
    /// 0-100
    pub sleep_quality: u8,
    /// 0-100
    pub stress_level: u8,
}

/// Patient profile consumed by the ask router
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PatientProfile {
    pub id: String,
    pub name: String,
    pub age: u32,

    /// 0-100
    pub health_score: u8,

    pub risk_level: RiskLevel,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_visit: Option<String>,

    #[serde(default)]
    pub lab_results: Vec<LabResult>,

    #[serde(default)]
    pub gene_traits: Vec<GeneTrait>,

    #[serde(default)]
    pub wearable_data: Vec<WearableReading>,
}

impl PatientProfile {
    /// Profile with identity only and no clinical data
    pub fn new(id: impl Into<String>, name: impl Into<String>, age: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            age,
            health_score: 0,
            risk_level: RiskLevel::Low,
            last_visit: None,
            lab_results: Vec::new(),
            gene_traits: Vec::new(),
            wearable_data: Vec::new(),
        }
    }

    /// First lab whose name contains `needle`, case-insensitively
    pub fn find_lab(&self, needle: &str) -> Option<&LabResult> {
        let needle = needle.to_lowercase();
        self.lab_results
            .iter()
            .find(|lab| lab.name.to_lowercase().contains(&needle))
    }

    /// First trait with exactly this gene symbol
    pub fn find_trait(&self, gene: &str) -> Option<&GeneTrait> {
        self.gene_traits.iter().find(|t| t.gene == gene)
    }

    /// Short roster entry
    pub fn summary(&self) -> PatientSummary {
        PatientSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            age: self.age,
            health_score: self.health_score,
            risk_level: self.risk_level,
        }
    }
}

/// Identity fields of a profile for list views
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PatientSummary {
    pub id: String,
    pub name: String,
    pub age: u32,
    pub health_score: u8,
    pub risk_level: RiskLevel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_lab_is_case_insensitive() {
        let patient = demo_patient();
        let lab = patient.find_lab("VITAMIN D").unwrap();
        assert_eq!(lab.id, "L2");
        assert!(patient.find_lab("ferritin").is_none());
    }

    #[test]
    fn test_find_trait_is_exact() {
        let patient = demo_patient();
        assert_eq!(patient.find_trait("CYP2C19").unwrap().variant, "*2/*3");
        assert!(patient.find_trait("cyp2c19").is_none());
    }

    #[test]
    fn test_format_range() {
        let mut lab = demo_patient().find_lab("vitamin d").cloned().unwrap();
        assert_eq!(lab.format_range(), "30-100");

        lab.range = None;
        assert_eq!(lab.format_range(), "n/a");

        lab.range = Some((0.5, 1.5));
        assert_eq!(lab.format_range(), "0.5-1.5");
    }

    #[test]
    fn test_profile_wire_shape() {
        let json = serde_json::to_value(demo_patient()).unwrap();
        assert_eq!(json["riskLevel"], "Medium");
        assert_eq!(json["labResults"][1]["status"], "critical");
        assert_eq!(json["labResults"][1]["range"], serde_json::json!([30.0, 100.0]));
        assert_eq!(json["geneTraits"][1]["drugInteraction"]["severity"], "high");
        assert!(json["geneTraits"][0].get("drugInteraction").is_none());
    }

    #[test]
    fn test_sparse_profile_deserializes() {
        let profile: PatientProfile = serde_json::from_str(
            r#"{"id":"P-1","name":"Sam","age":40,"healthScore":50,"riskLevel":"Low"}"#,
        )
        .unwrap();
        assert!(profile.lab_results.is_empty());
        assert!(profile.gene_traits.is_empty());
    }

    #[test]
    fn test_dashboard_shaped_profile_deserializes() {
        let profile: PatientProfile = serde_json::from_str(
            r#"{
                "id": "P-2", "name": "Ada", "age": 61, "healthScore": 70,
                "riskLevel": "High", "lastVisit": "2024-02-01",
                "labResults": [{
                    "id": "L9", "name": "Vitamin D (25-OH)", "value": 21,
                    "unit": "ng/mL", "range": [30, 100], "status": "warning",
                    "aiAnalysis": "Low."
                }],
                "geneTraits": [],
                "wearableData": [{"date": "Mon", "sleepQuality": 80, "stressLevel": 20}]
            }"#,
        )
        .unwrap();

        assert_eq!(profile.lab_results[0].ai_analysis, "Low.");
        assert!(profile.lab_results[0].history.is_empty());
        assert_eq!(profile.wearable_data[0].sleep_quality, 80);

        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["labResults"][0]["aiAnalysis"], "Low.");
        assert!(json["labResults"][0].get("history").is_none());
        assert_eq!(json["wearableData"][0]["stressLevel"], 20);
    }

    #[test]
    fn test_vitamin_d_trend() {
        let patient = demo_patient();
        let lab = patient.find_lab("vitamin d").unwrap();
        assert_eq!(lab.history.len(), 6);
        assert_eq!(lab.history.last().unwrap().value, lab.value);
        assert_eq!(lab.trend_delta(), Some(-10.0));

        let ldl = patient.find_lab("ldl").unwrap();
        assert_eq!(ldl.trend_delta(), None);
    }
}
