//! Keyword sets for each ask topic
//!
//! Matching is plain substring search over the trimmed, lower-cased
//! question. English and Chinese variants live side by side.

/// Boolean test over a normalized question
#[derive(Debug, Clone, Copy)]
pub enum Predicate {
    /// At least one keyword occurs
    AnyOf(&'static [&'static str]),
    /// Every group has at least one keyword that occurs
    AllOf(&'static [&'static [&'static str]]),
}

impl Predicate {
    pub fn matches(&self, normalized: &str) -> bool {
        match self {
            Predicate::AnyOf(needles) => contains_any(normalized, needles),
            Predicate::AllOf(groups) => groups.iter().all(|needles| contains_any(normalized, needles)),
        }
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

pub(crate) const CLOPIDOGREL: &[&str] = &[
    "clopidogrel",
    "plavix",
    "cyp2c19",
    "氯吡格雷",
    "波立维",
    "抗血小板",
];

pub(crate) const VITAMIN_D: &[&str] = &[
    "vitamin d",
    "vit d",
    "25-oh",
    "25 oh",
    "25(oh)d",
    "vdr",
    "维生素d",
    "维生素 d",
    "维d",
    "25羟维生素d",
    "25-羟维生素d",
];

pub(crate) const BRCA: &[&str] = &[
    "brca1",
    "brca2",
    "brca",
    "hereditary breast",
    "hereditary ovarian",
    "乳腺癌",
    "卵巢癌",
    "遗传性",
];

pub(crate) const ASPIRIN: &[&str] = &["aspirin", "asa", "阿司匹林"];

pub(crate) const RESISTANCE: &[&str] = &[
    "resistance",
    "nonresponse",
    "non-response",
    "耐药",
    "无效",
    "不起作用",
];

pub(crate) const VARIANTS: &[&str] = &[
    "mutation",
    "mutations",
    "variant",
    "variants",
    "genome",
    "vcf",
    "基因",
    "突变",
    "变异",
];

pub(crate) const NEXT_STEPS: &[&str] = &[
    "what should i do",
    "next step",
    "next",
    "what now",
    "怎么办",
    "我该怎么办",
    "下一步",
    "我该怎么做",
];

pub(crate) const UPLOAD: &[&str] = &[
    "upload",
    "pdf",
    "bloodwork",
    "report",
    "lab report",
    "vcf",
    "23andme",
    "23 and me",
    "raw data",
    "txt",
    "png",
    "jpg",
    "jpeg",
    "image",
    "上传",
    "报告",
    "化验单",
    "体检",
    "检验",
    "图片",
];

pub(crate) const ASPIRIN_RESISTANCE: &[&[&str]] = &[ASPIRIN, RESISTANCE];
