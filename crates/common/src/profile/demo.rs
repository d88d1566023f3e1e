//! Built-in demo profiles
//!
//! All data here is fictional.

use super::{
    DrugInteraction, GeneTrait, LabReading, LabResult, LabStatus, PatientProfile, RiskLevel,
    Severity, WearableReading,
};

/// The demo patient every surface of the product is built around
pub fn demo_patient() -> PatientProfile {
    PatientProfile {
        id: "P-1024".to_string(),
        name: "Jane Doe".to_string(),
        age: 34,
        health_score: 78,
        risk_level: RiskLevel::Medium,
        last_visit: Some("2023-10-15".to_string()),
        lab_results: vec![
            LabResult {
                id: "L1".to_string(),
                name: "LDL Cholesterol".to_string(),
                value: 145.0,
                unit: "mg/dL".to_string(),
                range: Some((0.0, 100.0)),
                status: LabStatus::Warning,
                ai_analysis: "Elevated. Correlates with APOE ε4 variant presence.".to_string(),
                history: Vec::new(),
            },
            LabResult {
                id: "L2".to_string(),
                name: "Vitamin D (25-OH)".to_string(),
                value: 18.0,
                unit: "ng/mL".to_string(),
                range: Some((30.0, 100.0)),
                status: LabStatus::Critical,
                ai_analysis: "Critical deficiency. VDR Taq1 homozygote suggests 30% reduced receptor density."
                    .to_string(),
                history: vitamin_d_history(),
            },
            LabResult {
                id: "L3".to_string(),
                name: "hs-CRP".to_string(),
                value: 0.8,
                unit: "mg/L".to_string(),
                range: Some((0.0, 1.0)),
                status: LabStatus::Optimal,
                ai_analysis: "Inflammatory baseline nominal.".to_string(),
                history: Vec::new(),
            },
        ],
        gene_traits: vec![
            GeneTrait {
                gene: "VDR".to_string(),
                variant: "rs731236 (Taq1)".to_string(),
                impact: "Receptor Density".to_string(),
                description: "Homozygous variant associated with reduced Vitamin D receptor density and lower circulating levels."
                    .to_string(),
                drug_interaction: None,
            },
            GeneTrait {
                gene: "CYP2C19".to_string(),
                variant: "*2/*3".to_string(),
                impact: "Poor Metabolizer".to_string(),
                description: "Loss-of-function alleles. FDA Table 1 Actionable Pharmacogenetic interaction."
                    .to_string(),
                drug_interaction: Some(DrugInteraction {
                    drug: "Clopidogrel".to_string(),
                    warning: "Therapeutic failure likely. Risk of stent thrombosis.".to_string(),
                    severity: Severity::High,
                }),
            },
        ],
        wearable_data: [
            ("2023-11-01", 65, 45),
            ("2023-11-02", 70, 40),
            ("2023-11-03", 55, 75),
            ("2023-11-04", 80, 30),
            ("2023-11-05", 75, 35),
            ("2023-11-06", 85, 20),
            ("2023-11-07", 82, 25),
        ]
        .into_iter()
        .map(|(date, sleep_quality, stress_level)| WearableReading {
            date: date.to_string(),
            sleep_quality,
            stress_level,
        })
        .collect(),
    }
}

/// Bi-monthly 25(OH)D readings leading to the current 18 ng/mL
fn vitamin_d_history() -> Vec<LabReading> {
    [("Jan", 28.0), ("Mar", 25.0), ("May", 22.0), ("Jul", 20.0), ("Sep", 19.0), ("Nov", 18.0)]
        .into_iter()
        .map(|(date, value)| LabReading {
            date: date.to_string(),
            value,
        })
        .collect()
}

/// Clinician roster: the demo patient plus two others sharing her clinical data
pub fn demo_roster() -> Vec<PatientProfile> {
    let base = demo_patient();

    let mut robert = base.clone();
    robert.id = "P-1025".to_string();
    robert.name = "Robert Fox".to_string();
    robert.age = 52;
    robert.health_score = 45;
    robert.risk_level = RiskLevel::High;

    let mut esther = base.clone();
    esther.id = "P-1026".to_string();
    esther.name = "Esther Howard".to_string();
    esther.age = 28;
    esther.health_score = 92;
    esther.risk_level = RiskLevel::Low;

    vec![base, robert, esther]
}
