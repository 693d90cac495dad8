//! SID Core - Domain models, errors, and configuration
//!
//! This crate defines the shared abstractions of the subject identification
//! system:
//! - Subject / Category / DomainContext value objects
//! - Analysis result and diagnostic metadata
//! - Common error types
//! - Configuration management

pub mod config;

pub use config::{
    BoostPolicy, CacheConfig, CategoryProfile, ConfigError, EngineConfig, LanguageConfig,
    TimeSlices,
};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for subject identification
#[derive(Error, Debug)]
pub enum SubjectError {
    /// Caller error: empty, whitespace-only, or too-short input text.
    /// Raised synchronously before any extraction is attempted.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The whole operation failed unexpectedly outside the per-extractor
    /// boundaries. Individual extractor failures never surface as this;
    /// they are recorded in the result's error map instead.
    #[error("Subject processing failed: {0}")]
    Processing(String),

    /// A single extractor failed internally. Contained at the task
    /// boundary by the scheduler and converted to an error-map entry.
    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, SubjectError>;

// ============================================================================
// Subject Model
// ============================================================================

/// The kind of extraction strategy that produced a subject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectKind {
    Keyword,
    Topic,
    Entity,
}

impl SubjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Keyword => "keyword",
            Self::Topic => "topic",
            Self::Entity => "entity",
        }
    }
}

impl std::fmt::Display for SubjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A named concept extracted from text
///
/// Immutable once constructed. Identity for deduplication purposes is the
/// normalized name (lower-cased, trimmed), not the kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    /// Surface form of the concept
    pub name: String,

    /// Which extraction strategy produced it
    pub kind: SubjectKind,

    /// Reconciled confidence, always within [0, 1]
    pub confidence: f64,

    /// Caller-supplied context, attached when its domain matched the
    /// subject's category
    pub context: Option<DomainContext>,
}

impl Subject {
    pub fn new(name: impl Into<String>, kind: SubjectKind, confidence: f64) -> Self {
        Self {
            name: name.into(),
            kind,
            confidence: confidence.clamp(0.0, 1.0),
            context: None,
        }
    }

    /// Attach caller context
    pub fn with_context(mut self, context: DomainContext) -> Self {
        self.context = Some(context);
        self
    }

    /// The name form used for deduplication
    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }
}

/// Lower-cased, trimmed form of a subject name
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// A thematic bucket attached to a result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Stable identifier (e.g. "KEYWORD", "characters")
    pub id: String,

    /// Human-readable label
    pub name: String,
}

impl Category {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Optional caller-supplied hint about the content being analyzed
///
/// When the domain matches a subject's matched category, that subject's
/// confidence is boosted and the context is attached to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainContext {
    /// Domain hint (e.g. "characters", "themes")
    pub domain: String,

    /// Expected primary language code (e.g. "en")
    pub language: String,

    /// How much the caller trusts this hint, within [0, 1]
    pub confidence: f64,
}

impl DomainContext {
    pub fn new(domain: impl Into<String>, language: impl Into<String>, confidence: f64) -> Self {
        Self {
            domain: domain.into(),
            language: language.into(),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

// ============================================================================
// Analysis Result
// ============================================================================

/// Diagnostic metadata attached to every analysis result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    /// Wall-clock time for the whole identification call
    pub processing_time_ms: u64,

    /// Resident-memory delta over the call, when the platform exposes it
    pub memory_usage_mb: Option<f64>,

    /// Length of the input text in characters
    pub text_length: usize,

    /// Language codes detected in the input, informational only
    pub languages_detected: Vec<String>,

    /// Whether extractors were dispatched concurrently
    pub parallel_execution: bool,

    /// Per-extractor failure reasons, keyed "<name>_error". Empty when
    /// every extractor completed in time. A failure is never silently
    /// swallowed; every exception or timeout has an entry here.
    pub errors: BTreeMap<String, String>,
}

/// Final output of the subject identification engine
///
/// Subjects are materialized in canonical order: confidence descending,
/// then name ascending, so results are reproducible across runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectAnalysisResult {
    /// Ranked, deduplicated subjects
    pub subjects: Vec<Subject>,

    /// One entry per extractor that produced at least one subject
    pub categories: Vec<Category>,

    /// Diagnostics
    pub metadata: AnalysisMetadata,
}

impl SubjectAnalysisResult {
    /// Subjects of one kind, in result order
    pub fn subjects_of_kind(&self, kind: SubjectKind) -> Vec<&Subject> {
        self.subjects.iter().filter(|s| s.kind == kind).collect()
    }

    /// Subjects at or above a caller-supplied confidence threshold
    pub fn subjects_above(&self, threshold: f64) -> Vec<&Subject> {
        self.subjects
            .iter()
            .filter(|s| s.confidence >= threshold)
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_confidence_clamped() {
        let s = Subject::new("dragon", SubjectKind::Entity, 1.7);
        assert_eq!(s.confidence, 1.0);

        let s = Subject::new("dragon", SubjectKind::Entity, -0.2);
        assert_eq!(s.confidence, 0.0);
    }

    #[test]
    fn test_normalized_name() {
        let s = Subject::new("  Brave Princess ", SubjectKind::Keyword, 0.9);
        assert_eq!(s.normalized_name(), "brave princess");
    }

    #[test]
    fn test_subject_kind_display() {
        assert_eq!(SubjectKind::Keyword.to_string(), "keyword");
        assert_eq!(SubjectKind::Entity.as_str(), "entity");
    }

    #[test]
    fn test_domain_context_clamped() {
        let ctx = DomainContext::new("characters", "en", 2.0);
        assert_eq!(ctx.confidence, 1.0);
    }

    #[test]
    fn test_result_filtering() {
        let result = SubjectAnalysisResult {
            subjects: vec![
                Subject::new("princess", SubjectKind::Keyword, 0.9),
                Subject::new("forest", SubjectKind::Entity, 0.6),
                Subject::new("courage", SubjectKind::Topic, 0.85),
            ],
            categories: vec![],
            metadata: AnalysisMetadata::default(),
        };

        assert_eq!(result.subjects_of_kind(SubjectKind::Entity).len(), 1);
        assert_eq!(result.subjects_above(0.8).len(), 2);
    }

    #[test]
    fn test_invalid_input_error_display() {
        let err = SubjectError::InvalidInput("text too short".to_string());
        assert!(err.to_string().contains("too short"));
    }

    #[test]
    fn test_result_serializes_to_json() {
        let result = SubjectAnalysisResult {
            subjects: vec![
                Subject::new("princess", SubjectKind::Keyword, 0.9)
                    .with_context(DomainContext::new("characters", "en", 0.8)),
            ],
            categories: vec![Category::new("KEYWORD", "Keyword Extraction")],
            metadata: AnalysisMetadata::default(),
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["subjects"][0]["name"], "princess");
        assert_eq!(json["subjects"][0]["kind"], "keyword");
        assert_eq!(json["subjects"][0]["context"]["domain"], "characters");
        assert_eq!(json["categories"][0]["id"], "KEYWORD");
    }
}
