//! BioLens Common Library
//!
//! Shared code for the BioLens services including:
//! - Ask router (question → canned, profile-aware answer)
//! - Citation registry and inline marker parsing
//! - Patient profile model and demo data source
//! - Error types and handling
//! - Configuration management
//! - Metrics and observability

pub mod citations;
pub mod config;
pub mod context;
pub mod errors;
pub mod metrics;
pub mod profile;

// Re-export commonly used types
pub use citations::{Citation, CitationRegistry};
pub use config::AppConfig;
pub use context::{route, AskResult, AskTopic};
pub use errors::{AppError, Result};
pub use profile::{PatientProfile, ProfileSource};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
