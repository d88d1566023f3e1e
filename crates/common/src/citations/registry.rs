//! Static citation registry
//!
//! One canonical record per source, reachable through any number of
//! lookup keys. Keys are normalized before matching, so `CPIC`,
//! `ref: CPIC` and `[Ref: cpic]` resolve identically.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Bibliographic record shown when a citation marker is opened
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Citation {
    /// Display key, e.g. "Endocrine Society (Vit D)"
    pub key: String,

    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Quoted excerpt
    pub snippet: String,

    /// When and how to use this citation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Citation {
    /// Stand-in shown for keys with no registered record
    pub fn placeholder(raw_key: &str) -> Self {
        Self {
            key: raw_key.to_string(),
            title: "Unknown reference".to_string(),
            venue: None,
            year: None,
            url: None,
            snippet: "No citation registered for this reference key yet.".to_string(),
            note: Some("Register this key in the citation registry to populate it.".to_string()),
        }
    }
}

/// Outcome of a lookup that always yields something displayable
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Resolution {
    pub found: bool,
    pub citation: Citation,
}

/// Reduce a raw reference key to its lookup form.
///
/// Lower-cases, strips a leading `ref:` and one pair of surrounding
/// brackets, and collapses whitespace. The steps repeat until nothing
/// changes, which makes the function idempotent.
pub fn normalize(raw: &str) -> String {
    let mut current = collapse_whitespace(&raw.to_lowercase());

    loop {
        let next = strip_decorations(&current);
        if next == current {
            return next;
        }
        current = next;
    }
}

fn strip_decorations(value: &str) -> String {
    let mut rest = value.trim();

    if let Some(after) = rest.strip_prefix("ref:") {
        rest = after.trim_start();
    }
    if let Some(after) = rest.strip_prefix('[') {
        rest = after;
    }
    if let Some(before) = rest.strip_suffix(']') {
        rest = before;
    }

    collapse_whitespace(rest)
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Read-only key → record table
#[derive(Debug, Clone)]
pub struct CitationRegistry {
    records: Vec<Citation>,

    /// Normalized lookup keys in registration order
    keys: Vec<String>,

    /// Normalized key → index into `records`
    index: HashMap<String, usize>,
}

impl CitationRegistry {
    /// Build a registry from records and their lookup keys
    pub fn new(entries: Vec<(Citation, Vec<&str>)>) -> Self {
        let mut records = Vec::with_capacity(entries.len());
        let mut keys = Vec::new();
        let mut index = HashMap::new();

        for (record, aliases) in entries {
            let slot = records.len();
            records.push(record);

            for alias in aliases {
                let key = normalize(alias);
                if index.insert(key.clone(), slot).is_none() {
                    keys.push(key);
                }
            }
        }

        Self {
            records,
            keys,
            index,
        }
    }

    /// Registry shared by the whole process
    pub fn global() -> &'static CitationRegistry {
        static REGISTRY: OnceLock<CitationRegistry> = OnceLock::new();
        REGISTRY.get_or_init(Self::builtin)
    }

    /// Find the record for a raw key
    pub fn lookup(&self, raw_key: &str) -> Option<&Citation> {
        let key = normalize(raw_key);
        let found = self.index.get(&key).map(|&slot| &self.records[slot]);

        if found.is_none() {
            tracing::debug!(raw_key = %raw_key, normalized = %key, "Citation key not registered");
        }

        found
    }

    /// Lookup that substitutes a placeholder on a miss
    pub fn resolve_or_placeholder(&self, raw_key: &str) -> Resolution {
        match self.lookup(raw_key) {
            Some(citation) => Resolution {
                found: true,
                citation: citation.clone(),
            },
            None => Resolution {
                found: false,
                citation: Citation::placeholder(raw_key),
            },
        }
    }

    /// Normalized lookup keys
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Canonical records, one per source
    pub fn records(&self) -> &[Citation] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// The built-in guideline set
    pub fn builtin() -> Self {
        Self::new(vec![
            (
                Citation {
                    key: "ACMG".to_string(),
                    title: "Standards and guidelines for the interpretation of sequence variants: a joint consensus recommendation of the ACMG and AMP".to_string(),
                    venue: Some("Genetics in Medicine".to_string()),
                    year: Some(2015),
                    url: Some("https://pubmed.ncbi.nlm.nih.gov/25741868/".to_string()),
                    snippet: "“This report recommends the use of specific standard terminology-\"pathogenic,\" \"likely pathogenic,\" \"uncertain significance,\" \"likely benign,\" and \"benign\"-to describe variants identified in genes that cause Mendelian disorders.”".to_string(),
                    note: Some("Use for variant classification terminology and criteria framing (ACMG/AMP 2015).".to_string()),
                },
                vec!["acmg"],
            ),
            (
                Citation {
                    key: "CPIC".to_string(),
                    title: "CPIC Guideline for CYP2C19 and Clopidogrel Therapy (Update)".to_string(),
                    venue: Some("Clinical Pharmacology & Therapeutics".to_string()),
                    year: Some(2022),
                    url: Some("https://cpicpgx.org/guidelines/".to_string()),
                    snippet: "CPIC guidelines provide peer-reviewed, genotype-based drug therapy recommendations to help clinicians understand how available genetic test results should be used to optimize drug therapy.".to_string(),
                    note: Some("Use for pharmacogenomic recommendations around CYP2C19 and antiplatelet selection.".to_string()),
                },
                vec!["cpic", "cpic guidelines"],
            ),
            (
                Citation {
                    key: "Endocrine Society (Vit D)".to_string(),
                    title: "Evaluation, treatment, and prevention of vitamin D deficiency: an Endocrine Society clinical practice guideline".to_string(),
                    venue: Some("J Clin Endocrinol Metab".to_string()),
                    year: Some(2011),
                    url: Some("https://pubmed.ncbi.nlm.nih.gov/21646368/".to_string()),
                    snippet: "“The Task Force also suggested the measurement of serum 25-hydroxyvitamin D level by a reliable assay as the initial diagnostic test in patients at risk for deficiency. Treatment with either vitamin D(2) or vitamin D(3) was recommended for deficient patients.”".to_string(),
                    note: Some("Use for diagnostic/treatment framing of vitamin D deficiency (Endocrine Society 2011).".to_string()),
                },
                vec!["endo", "endo 2011"],
            ),
            (
                Citation {
                    key: "ACC/AHA 2022".to_string(),
                    title: "ACC/AHA Guideline (Reference Stub)".to_string(),
                    venue: None,
                    year: Some(2022),
                    url: Some("https://www.ahajournals.org/".to_string()),
                    snippet: "Add the exact guideline and excerpt you want to present here (this is a placeholder stub for the demo UI).".to_string(),
                    note: Some("Replace with the specific ACC/AHA document and quoted excerpt used by this insight.".to_string()),
                },
                vec!["acc/aha 2022"],
            ),
        ])
    }
}

/// Look up a raw key in the global registry
pub fn lookup(raw_key: &str) -> Option<&'static Citation> {
    CitationRegistry::global().lookup(raw_key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_decorations() {
        assert_eq!(normalize("  CPIC  "), "cpic");
        assert_eq!(normalize("ref: CPIC"), "cpic");
        assert_eq!(normalize("REF:cpic"), "cpic");
        assert_eq!(normalize("[Ref: cpic]"), "cpic");
        assert_eq!(normalize("ref: [cpic]"), "cpic");
        assert_eq!(normalize("ENDO    2011"), "endo 2011");
        assert_eq!(normalize("[ endo\t2011 ]"), "endo 2011");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let samples = [
            "",
            "   ",
            "[",
            "]",
            "[]",
            "[[cpic]]",
            "ref:",
            "ref: ref: [ref: x ]",
            "Ref:[  ACC/AHA   2022 ]",
            "[Ref: ENDO 2011]",
            "plain text with   gaps",
            "维生素 D",
        ];

        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", sample);
        }
    }

    #[test]
    fn test_lookup_is_format_insensitive() {
        let registry = CitationRegistry::builtin();

        let plain = registry.lookup("CPIC").unwrap();
        assert_eq!(registry.lookup("[Ref: cpic]").unwrap(), plain);
        assert_eq!(registry.lookup("ref: CPIC").unwrap(), plain);
        assert_eq!(plain.key, "CPIC");
    }

    #[test]
    fn test_aliases_share_one_record() {
        let registry = CitationRegistry::builtin();

        assert_eq!(registry.lookup("cpic guidelines"), registry.lookup("cpic"));
        assert_eq!(registry.lookup("ENDO 2011"), registry.lookup("endo"));
        assert_eq!(
            registry.lookup("Endo 2011").unwrap().key,
            "Endocrine Society (Vit D)"
        );

        assert_eq!(registry.records().len(), 4);
        assert_eq!(registry.len(), 6);
    }

    #[test]
    fn test_unknown_key_is_a_miss() {
        let registry = CitationRegistry::builtin();
        assert!(registry.lookup("unknown-key-xyz").is_none());
        assert!(registry.lookup("").is_none());
        assert!(registry.lookup("[[[").is_none());
    }

    #[test]
    fn test_acc_aha_stub_has_no_venue() {
        let stub = lookup("[Ref: ACC/AHA 2022]").unwrap();
        assert!(stub.venue.is_none());
        assert_eq!(stub.year, Some(2022));
    }

    #[test]
    fn test_placeholder_on_miss() {
        let registry = CitationRegistry::builtin();

        let missing = registry.resolve_or_placeholder("NEJM 1999");
        assert!(!missing.found);
        assert_eq!(missing.citation.key, "NEJM 1999");
        assert_eq!(missing.citation.title, "Unknown reference");

        let hit = registry.resolve_or_placeholder("acmg");
        assert!(hit.found);
        assert_eq!(hit.citation.year, Some(2015));
    }

    #[test]
    fn test_keys_keep_registration_order() {
        let registry = CitationRegistry::builtin();
        assert_eq!(
            registry.keys(),
            ["acmg", "cpic", "cpic guidelines", "endo", "endo 2011", "acc/aha 2022"]
        );
    }

    #[test]
    fn test_citation_wire_shape() {
        let json = serde_json::to_value(lookup("acc/aha 2022").unwrap()).unwrap();
        assert!(json.get("venue").is_none());
        assert_eq!(json["year"], 2022);
    }
}
