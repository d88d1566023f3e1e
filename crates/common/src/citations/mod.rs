//! Citation registry and inline marker handling
//!
//! Answer text embeds `[Ref: <key>]` markers; this module finds them and
//! resolves each key to a fixed bibliographic record.

mod markers;
mod registry;

pub use markers::{parse_markers, segment, CitationMarker, ResolvedMarker, Segment};
pub use registry::{lookup, normalize, Citation, CitationRegistry, Resolution};
