//! Inline citation markers
//!
//! Answer text cites sources as `[Ref: <key>]`. The `Ref:` token is
//! case-insensitive, whitespace after the colon is optional, and the key
//! starts at the first non-space character and runs up to the first `]`.

use super::registry::{Citation, CitationRegistry};
use regex_lite::Regex;
use serde::Serialize;
use std::sync::OnceLock;

fn marker_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)\[Ref:\s*([^\]\s][^\]]*)\]").expect("marker pattern is valid"))
}

/// One marker found in a text
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct CitationMarker<'a> {
    /// Whole marker, brackets included
    pub raw: &'a str,

    /// Key text as written
    pub key: &'a str,

    /// Byte offsets of `raw` in the source text
    pub start: usize,
    pub end: usize,
}

/// Piece of a text split around its markers
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Segment<'a> {
    Text { text: &'a str },
    Citation { raw: &'a str, key: &'a str },
}

/// A marker paired with its registry record
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedMarker<'a, 'r> {
    #[serde(flatten)]
    pub marker: CitationMarker<'a>,

    /// `None` when the key is not registered
    pub citation: Option<&'r Citation>,
}

/// All markers in order of appearance
pub fn parse_markers(text: &str) -> Vec<CitationMarker<'_>> {
    marker_pattern()
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let key = caps.get(1)?;
            Some(CitationMarker {
                raw: whole.as_str(),
                key: key.as_str(),
                start: whole.start(),
                end: whole.end(),
            })
        })
        .collect()
}

/// Split text into plain and citation segments.
///
/// Concatenating the `text` of plain segments and the `raw` of citation
/// segments reproduces the input exactly.
pub fn segment(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut cursor = 0;

    for marker in parse_markers(text) {
        if marker.start > cursor {
            segments.push(Segment::Text {
                text: &text[cursor..marker.start],
            });
        }
        segments.push(Segment::Citation {
            raw: marker.raw,
            key: marker.key,
        });
        cursor = marker.end;
    }

    if cursor < text.len() {
        segments.push(Segment::Text {
            text: &text[cursor..],
        });
    }

    segments
}

impl CitationRegistry {
    /// Pair every marker in `text` with its record
    pub fn resolve_markers<'a, 'r>(&'r self, text: &'a str) -> Vec<ResolvedMarker<'a, 'r>> {
        parse_markers(text)
            .into_iter()
            .map(|marker| ResolvedMarker {
                citation: self.lookup(marker.key),
                marker,
            })
            .collect()
    }
}
