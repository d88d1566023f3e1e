//! Query router - maps a question to one canned, profile-aware answer
//!
//! Rules are evaluated in priority order and the first one that both
//! matches and has the profile data it needs wins. The last rule always
//! matches, so every input gets an answer.

use super::keywords::{self, Predicate};
use super::{AskAction, AskKind, AskResult, AskSignal, NavTarget};
use crate::profile::PatientProfile;
use serde::{Deserialize, Serialize};

/// Longest question prefix echoed in `AskResult::source`, in chars
const SOURCE_PREVIEW_CHARS: usize = 64;

/// Example questions offered before the first turn and on a miss
pub const DEFAULT_SUGGESTIONS: &[&str] = &[
    "Can I take clopidogrel?",
    "Why is my Vitamin D low?",
    "Do I have risky variants?",
    "What should I do next?",
    "我可以吃氯吡格雷（波立维）吗？",
    "我的维生素 D 为什么这么低？",
    "我有哪些高风险基因变异？",
];

/// Suggestion chips shown above an empty transcript
pub fn starter_suggestions() -> &'static [&'static str] {
    &DEFAULT_SUGGESTIONS[..6]
}

/// Which rule produced an answer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AskTopic {
    Clopidogrel,
    VitaminD,
    Brca,
    AspirinResistance,
    Variants,
    NextSteps,
    Upload,
    Fallback,
}

impl AskTopic {
    pub fn as_str(&self) -> &'static str {
        match self {
            AskTopic::Clopidogrel => "clopidogrel",
            AskTopic::VitaminD => "vitamin_d",
            AskTopic::Brca => "brca",
            AskTopic::AspirinResistance => "aspirin_resistance",
            AskTopic::Variants => "variants",
            AskTopic::NextSteps => "next_steps",
            AskTopic::Upload => "upload",
            AskTopic::Fallback => "fallback",
        }
    }
}

/// Inputs shared by every answer builder
struct Query<'a> {
    source: String,
    profile: &'a PatientProfile,
}

/// Builds the answer, or `None` when the profile lacks the data it needs
type Builder = fn(&Query<'_>) -> Option<AskResult>;

struct Rule {
    topic: AskTopic,
    predicate: Predicate,
    build: Builder,
}

/// Priority order is observable behavior; do not reorder.
const RULES: &[Rule] = &[
    Rule {
        topic: AskTopic::Clopidogrel,
        predicate: Predicate::AnyOf(keywords::CLOPIDOGREL),
        build: clopidogrel_answer,
    },
    Rule {
        topic: AskTopic::VitaminD,
        predicate: Predicate::AnyOf(keywords::VITAMIN_D),
        build: vitamin_d_answer,
    },
    Rule {
        topic: AskTopic::Brca,
        predicate: Predicate::AnyOf(keywords::BRCA),
        build: brca_answer,
    },
    Rule {
        topic: AskTopic::AspirinResistance,
        predicate: Predicate::AllOf(keywords::ASPIRIN_RESISTANCE),
        build: aspirin_answer,
    },
    Rule {
        topic: AskTopic::Variants,
        predicate: Predicate::AnyOf(keywords::VARIANTS),
        build: variants_answer,
    },
    Rule {
        topic: AskTopic::NextSteps,
        predicate: Predicate::AnyOf(keywords::NEXT_STEPS),
        build: next_steps_answer,
    },
    Rule {
        topic: AskTopic::Upload,
        predicate: Predicate::AnyOf(keywords::UPLOAD),
        build: upload_answer,
    },
];

/// Route a question against a profile
pub fn route(question: &str, profile: &PatientProfile) -> AskResult {
    route_with_topic(question, profile).1
}

/// Topic the router would pick for a question
pub fn classify(question: &str, profile: &PatientProfile) -> AskTopic {
    route_with_topic(question, profile).0
}

/// Route and report which rule answered
pub fn route_with_topic(question: &str, profile: &PatientProfile) -> (AskTopic, AskResult) {
    let question = question.trim();
    let normalized = question.to_lowercase();
    let query = Query {
        source: source_line(question),
        profile,
    };

    for rule in RULES {
        if !rule.predicate.matches(&normalized) {
            continue;
        }
        match (rule.build)(&query) {
            Some(answer) => {
                tracing::debug!(topic = rule.topic.as_str(), patient_id = %profile.id, "Question routed");
                return (rule.topic, answer);
            }
            None => {
                tracing::debug!(
                    topic = rule.topic.as_str(),
                    patient_id = %profile.id,
                    "Rule matched but profile lacks its data, falling through"
                );
            }
        }
    }

    tracing::debug!(patient_id = %profile.id, "Question routed to fallback");
    (AskTopic::Fallback, fallback_answer(&query))
}

fn source_line(question: &str) -> String {
    match question.char_indices().nth(SOURCE_PREVIEW_CHARS) {
        Some((cut, _)) => format!("QUERY: {}…", &question[..cut]),
        None => format!("QUERY: {}", question),
    }
}

fn follow_ups(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn clopidogrel_answer(query: &Query<'_>) -> Option<AskResult> {
    let cyp = query.profile.find_trait("CYP2C19")?;

    Some(AskResult {
        title: "PGx: Clopidogrel response risk".to_string(),
        source: query.source.clone(),
        detail: format!(
            "Detected genotype {} {} ({}). Clopidogrel activation may be reduced; consider guideline-backed alternatives and clinician review. [Ref: CPIC]",
            cyp.gene, cyp.variant, cyp.impact
        ),
        kind: AskKind::Warning,
        signal: Some(AskSignal::Cyp2c19),
        actions: Vec::new(),
        follow_ups: follow_ups(&[
            "What alternative antiplatelets are recommended for CYP2C19 poor metabolizers?",
            "Should I change dose or switch drugs?",
        ]),
    })
}

fn vitamin_d_answer(query: &Query<'_>) -> Option<AskResult> {
    let lab = query.profile.find_lab("vitamin d")?;
    let vdr = query
        .profile
        .find_trait("VDR")
        .map(|t| format!("{} {}", t.gene, t.variant))
        .unwrap_or_else(|| "VDR variant".to_string());

    Some(AskResult {
        title: "Lab: Vitamin D deficiency (guided)".to_string(),
        source: query.source.clone(),
        detail: format!(
            "Latest 25(OH)D: {} {} (target range {}). Genomic context: {}. Recommended next step is evidence-linked testing + dosing plan and scheduled re-check. [Ref: ENDO 2011]",
            lab.value,
            lab.unit,
            lab.format_range(),
            vdr
        ),
        kind: AskKind::Warning,
        signal: Some(AskSignal::Vdr),
        actions: vec![AskAction::navigate(NavTarget::PatientLab, "Open Vitamin D lab detail")],
        follow_ups: follow_ups(&[
            "How much Vitamin D should I take?",
            "How long until I re-test 25(OH)D?",
        ]),
    })
}

fn brca_answer(query: &Query<'_>) -> Option<AskResult> {
    Some(AskResult {
        title: "Genetics: BRCA1/2 risk framing (demo)".to_string(),
        source: query.source.clone(),
        detail: "BRCA1/2 are tumor-suppressor genes associated with hereditary breast/ovarian cancer predisposition. Risk depends on the *specific* variant and its classification (pathogenic/likely pathogenic/VUS) plus family history. Upload your 23andMe (.txt) or VCF to flag BRCA loci and attach an evidence trail for interpretation framing. [Ref: ACMG]".to_string(),
        kind: AskKind::Info,
        signal: None,
        actions: Vec::new(),
        follow_ups: follow_ups(&[
            "What does VUS mean for BRCA?",
            "Should I confirm a BRCA finding with a clinical lab?",
            "Which file should I upload (23andMe vs VCF)?",
        ]),
    })
}

fn aspirin_answer(query: &Query<'_>) -> Option<AskResult> {
    Some(AskResult {
        title: "Drug response: Aspirin “resistance” (demo)".to_string(),
        source: query.source.clone(),
        detail: "“Aspirin resistance” is not a single diagnosis; apparent non-response can be driven by adherence, dosing, drug interactions, and platelet biology. In this demo, treat it as a prompt to review therapy with a clinician and consider (when appropriate) platelet function testing rather than changing meds based on genetics alone. If you meant clopidogrel response, ask about CYP2C19. [Ref: ACC/AHA 2022]".to_string(),
        kind: AskKind::Info,
        signal: None,
        actions: Vec::new(),
        follow_ups: follow_ups(&[
            "What can cause aspirin non-response?",
            "Do genetics predict aspirin response?",
            "How is platelet function testing done?",
        ]),
    })
}

fn variants_answer(query: &Query<'_>) -> Option<AskResult> {
    let loci = query
        .profile
        .gene_traits
        .iter()
        .map(|t| format!("{} {} ({})", t.gene, t.variant, t.impact))
        .collect::<Vec<_>>();
    let listed = if loci.is_empty() {
        "none".to_string()
    } else {
        loci.join(" · ")
    };

    Some(AskResult {
        title: "Detected loci (summary)".to_string(),
        source: query.source.clone(),
        detail: format!(
            "Flagged items in this demo profile: {}. Variant interpretation labels should follow standard terminology and criteria. [Ref: ACMG]",
            listed
        ),
        kind: AskKind::Info,
        signal: None,
        actions: Vec::new(),
        follow_ups: follow_ups(&[
            "Which variants are actionable?",
            "What does \"pathogenic\" vs \"VUS\" mean?",
        ]),
    })
}

fn next_steps_answer(query: &Query<'_>) -> Option<AskResult> {
    Some(AskResult {
        title: "Guided next steps".to_string(),
        source: query.source.clone(),
        detail: "1) Review medication response risks (PGx) for CYP2C19 before taking clopidogrel. [Ref: CPIC]\n2) Treat vitamin D deficiency and re-check 25(OH)D on schedule. [Ref: ENDO 2011]".to_string(),
        kind: AskKind::Info,
        signal: None,
        actions: vec![AskAction::navigate(NavTarget::PatientDashboard, "Open dashboard signals")],
        follow_ups: follow_ups(&[
            "Summarize my top risks in one paragraph.",
            "Which lab should I repeat first?",
        ]),
    })
}

fn upload_answer(query: &Query<'_>) -> Option<AskResult> {
    Some(AskResult {
        title: "Upload intake (demo)".to_string(),
        source: query.source.clone(),
        detail: "Use the paperclip icon to upload lab reports (PDF/PNG/JPG) or genome data (23andMe .txt / VCF). Files are queued for analysis in this demo UI.".to_string(),
        kind: AskKind::Info,
        signal: None,
        actions: Vec::new(),
        follow_ups: follow_ups(&[
            "What file types are supported?",
            "Can you parse 23andMe raw data?",
            "Can I upload a lab PDF?",
        ]),
    })
}

fn fallback_answer(query: &Query<'_>) -> AskResult {
    AskResult {
        title: "Ask BioLens (examples)".to_string(),
        source: query.source.clone(),
        detail: "Try:\n- \"Can I take clopidogrel?\"\n- \"Why is my Vitamin D low?\"\n- \"Do I have risky variants?\"\n- \"What should I do next?\"".to_string(),
        kind: AskKind::Info,
        signal: None,
        actions: Vec::new(),
        follow_ups: follow_ups(DEFAULT_SUGGESTIONS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{demo_patient, GeneTrait, LabResult, LabStatus};

    fn profile_with_cyp2c19(variant: &str, impact: &str) -> PatientProfile {
        let mut profile = PatientProfile::new("P-T1", "Test", 40);
        profile.gene_traits.push(GeneTrait {
            gene: "CYP2C19".to_string(),
            variant: variant.to_string(),
            impact: impact.to_string(),
            description: String::new(),
            drug_interaction: None,
        });
        profile
    }

    fn profile_with_vitamin_d(value: f64, unit: &str, range: (f64, f64)) -> PatientProfile {
        let mut profile = PatientProfile::new("P-T2", "Test", 40);
        profile.lab_results.push(LabResult {
            id: "L1".to_string(),
            name: "Vitamin D (25-OH)".to_string(),
            value,
            unit: unit.to_string(),
            range: Some(range),
            status: LabStatus::Critical,
            ai_analysis: String::new(),
            history: Vec::new(),
        });
        profile
    }

    fn empty_profile() -> PatientProfile {
        PatientProfile::new("P-T0", "Nobody", 30)
    }

    #[test]
    fn test_clopidogrel_scenario() {
        let result = route(
            "Can I take clopidogrel?",
            &profile_with_cyp2c19("*2/*3", "Poor Metabolizer"),
        );

        assert_eq!(result.kind, AskKind::Warning);
        assert_eq!(result.signal, Some(AskSignal::Cyp2c19));
        assert!(result.detail.contains("*2/*3"));
        assert!(result.detail.contains("[Ref: CPIC]"));
        assert_eq!(result.source, "QUERY: Can I take clopidogrel?");
        assert!(result.actions.is_empty());
        assert_eq!(result.follow_ups.len(), 2);
    }

    #[test]
    fn test_vitamin_d_scenario() {
        let result = route(
            "Why is my Vitamin D low?",
            &profile_with_vitamin_d(18.0, "ng/mL", (30.0, 100.0)),
        );

        assert_eq!(result.signal, Some(AskSignal::Vdr));
        assert_eq!(result.kind, AskKind::Warning);
        assert!(result.detail.contains("18"));
        assert!(result.detail.contains("ng/mL"));
        assert!(result.detail.contains("30-100"));
        assert!(result.detail.contains("Genomic context: VDR variant."));
        assert!(result
            .actions
            .iter()
            .any(|a| matches!(a, AskAction::Navigate { to: NavTarget::PatientLab, .. })));
    }

    #[test]
    fn test_vitamin_d_uses_vdr_trait_when_present() {
        let result = route("vit d?", &demo_patient());
        assert!(result.detail.contains("Genomic context: VDR rs731236 (Taq1)."));
        assert!(result.detail.contains("[Ref: ENDO 2011]"));
    }

    #[test]
    fn test_vitamin_d_without_lab_never_signals_vdr() {
        let profile = empty_profile();
        for question in ["Why is my Vitamin D low?", "维生素D", "25-OH level", "VDR?"] {
            let (topic, result) = route_with_topic(question, &profile);
            assert_ne!(result.signal, Some(AskSignal::Vdr), "{}", question);
            assert_ne!(topic, AskTopic::VitaminD);
        }

        // Falls through to the next matching rule
        assert_eq!(classify("vitamin d variant", &profile), AskTopic::Variants);
        assert_eq!(classify("Why is my Vitamin D low?", &profile), AskTopic::Fallback);
    }

    #[test]
    fn test_clopidogrel_without_trait_falls_through() {
        let profile = empty_profile();
        assert_eq!(classify("clopidogrel and my genome", &profile), AskTopic::Variants);
        assert_eq!(classify("Can I take plavix?", &profile), AskTopic::Fallback);
    }

    #[test]
    fn test_clopidogrel_beats_vitamin_d() {
        let patient = demo_patient();
        let questions = [
            "clopidogrel and vitamin d",
            "Does VDR change how plavix works?",
            "维生素D 和 氯吡格雷",
        ];
        for question in questions {
            let result = route(question, &patient);
            assert_eq!(result.signal, Some(AskSignal::Cyp2c19), "{}", question);
        }
    }

    #[test]
    fn test_priority_order_for_overlaps() {
        let patient = demo_patient();
        assert_eq!(classify("does my gene affect vitamin d?", &patient), AskTopic::VitaminD);
        assert_eq!(classify("is my BRCA variant risky?", &patient), AskTopic::Brca);
        assert_eq!(classify("next step for my vcf", &patient), AskTopic::Variants);
        assert_eq!(classify("what should i do with this pdf", &patient), AskTopic::NextSteps);
        assert_eq!(classify("遗传性 基因", &patient), AskTopic::Brca);
    }

    #[test]
    fn test_aspirin_needs_both_keyword_groups() {
        let patient = demo_patient();
        assert_eq!(classify("Is aspirin resistance real?", &patient), AskTopic::AspirinResistance);
        assert_eq!(classify("阿司匹林不起作用", &patient), AskTopic::AspirinResistance);
        assert_eq!(classify("Is aspirin safe for me?", &patient), AskTopic::Fallback);

        let result = route("aspirin non-response", &patient);
        assert!(result.detail.contains("[Ref: ACC/AHA 2022]"));
        assert_eq!(result.kind, AskKind::Info);
    }

    #[test]
    fn test_variants_lists_profile_traits() {
        let result = route("Do I have risky variants?", &demo_patient());
        assert_eq!(
            result.detail,
            "Flagged items in this demo profile: VDR rs731236 (Taq1) (Receptor Density) · CYP2C19 *2/*3 (Poor Metabolizer). Variant interpretation labels should follow standard terminology and criteria. [Ref: ACMG]"
        );

        let bare = route("any mutations?", &empty_profile());
        assert!(bare.detail.starts_with("Flagged items in this demo profile: none."));
    }

    #[test]
    fn test_next_steps_navigates_to_dashboard() {
        let result = route("What should I do next?", &demo_patient());
        assert_eq!(result.title, "Guided next steps");
        assert_eq!(
            result.actions,
            vec![AskAction::navigate(NavTarget::PatientDashboard, "Open dashboard signals")]
        );
        assert_eq!(result.citations().len(), 2);
    }

    #[test]
    fn test_upload_intake() {
        let patient = demo_patient();
        assert_eq!(classify("Can I upload my bloodwork?", &patient), AskTopic::Upload);
        assert_eq!(classify("上传体检报告", &patient), AskTopic::Upload);
        assert!(route("jpeg ok?", &patient).follow_ups.contains(&"Can I upload a lab PDF?".to_string()));
    }

    #[test]
    fn test_fallback_coverage() {
        let result = route("asdkjasd random text 12345", &demo_patient());
        assert_eq!(result.kind, AskKind::Info);
        assert_eq!(result.title, "Ask BioLens (examples)");
        assert_eq!(result.follow_ups, follow_ups(DEFAULT_SUGGESTIONS));
        assert!(result.signal.is_none());
    }

    #[test]
    fn test_empty_and_blank_questions_fall_back() {
        for question in ["", "   ", "\n\t"] {
            let (topic, result) = route_with_topic(question, &demo_patient());
            assert_eq!(topic, AskTopic::Fallback);
            assert_eq!(result.source, "QUERY: ");
        }
    }

    #[test]
    fn test_source_truncation() {
        let question = "a".repeat(100);
        let result = route(&question, &demo_patient());
        assert_eq!(result.source, format!("QUERY: {}…", "a".repeat(64)));

        let exact = "b".repeat(64);
        assert_eq!(route(&exact, &demo_patient()).source, format!("QUERY: {}", exact));
    }

    #[test]
    fn test_source_truncation_counts_chars() {
        let question = "维".repeat(70);
        let result = route(&question, &demo_patient());
        assert_eq!(result.source, format!("QUERY: {}…", "维".repeat(64)));
    }

    #[test]
    fn test_source_keeps_question_case() {
        let result = route("   Can I take CLOPIDOGREL?  ", &demo_patient());
        assert_eq!(result.source, "QUERY: Can I take CLOPIDOGREL?");
    }

    #[test]
    fn test_routing_is_deterministic() {
        let patient = demo_patient();
        for question in DEFAULT_SUGGESTIONS {
            assert_eq!(route(question, &patient), route(question, &patient));
        }
    }

    #[test]
    fn test_default_suggestions_route_to_their_topics() {
        let patient = demo_patient();
        let topics: Vec<_> = DEFAULT_SUGGESTIONS.iter().map(|q| classify(q, &patient)).collect();
        assert_eq!(
            topics,
            vec![
                AskTopic::Clopidogrel,
                AskTopic::VitaminD,
                AskTopic::Variants,
                AskTopic::NextSteps,
                AskTopic::Clopidogrel,
                AskTopic::VitaminD,
                AskTopic::Variants,
            ]
        );
        assert_eq!(starter_suggestions().len(), 6);
    }
}
