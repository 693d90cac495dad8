//! SID Extractor - Subject extraction strategies
//!
//! Defines the `SubjectExtractor` capability trait and the three built-in
//! strategies: keyword (term frequency), topic (indicator lexicon), and
//! entity (pattern + dictionary).
//!
//! Raw scores are extractor-specific and unbounded; the engine's
//! reconciliation stage normalizes them into [0, 1] confidences.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sid_core::{Result, SubjectError, SubjectKind};

pub mod entity;
pub mod keyword;
pub mod topic;

pub use entity::EntityExtractor;
pub use keyword::KeywordExtractor;
pub use topic::TopicExtractor;

/// Minimum accepted input length in characters
pub const MIN_TEXT_LENGTH: usize = 10;

/// Identifies an extraction strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractorId {
    Keyword,
    Topic,
    Entity,
}

impl ExtractorId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Keyword => "keyword",
            Self::Topic => "topic",
            Self::Entity => "entity",
        }
    }

    /// The subject kind produced by this extractor
    pub fn subject_kind(&self) -> SubjectKind {
        match self {
            Self::Keyword => SubjectKind::Keyword,
            Self::Topic => SubjectKind::Topic,
            Self::Entity => SubjectKind::Entity,
        }
    }
}

impl std::fmt::Display for ExtractorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raw output of one extraction strategy
///
/// A single typed shape for every extractor, validated at this boundary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Candidate name to raw score. Scores are on the extractor's own
    /// scale and are not required to lie in [0, 1].
    pub scores: HashMap<String, f64>,
}

impl ExtractionResult {
    pub fn new(scores: HashMap<String, f64>) -> Self {
        Self { scores }
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

/// Trait for subject extraction strategies
///
/// Implementations must be safe to invoke concurrently against different
/// inputs: stateless, or internally synchronized.
pub trait SubjectExtractor: Send + Sync {
    /// Which strategy this is, used for scheduling, caching, and the
    /// result's category list
    fn id(&self) -> ExtractorId;

    /// Produce raw candidate scores for the given text.
    ///
    /// Must return `SubjectError::InvalidInput` for empty or
    /// sub-minimum-length text so callers can fail fast before dispatch.
    fn extract(&self, text: &str) -> Result<ExtractionResult>;
}

/// Reject empty, whitespace-only, or too-short input
pub fn validate_input(text: &str) -> Result<()> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(SubjectError::InvalidInput(
            "text is empty or whitespace-only".to_string(),
        ));
    }
    if trimmed.chars().count() < MIN_TEXT_LENGTH {
        return Err(SubjectError::InvalidInput(format!(
            "text is shorter than {} characters",
            MIN_TEXT_LENGTH
        )));
    }
    Ok(())
}

/// Split text into at most `max_chunks` chunks of roughly `chunk_size`
/// characters, breaking at whitespace where possible.
///
/// Extractors process only these leading chunks on very long inputs to
/// stay within their time slice; recall on the tail is traded for speed.
pub fn chunk_text(text: &str, chunk_size: usize, max_chunks: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut rest = text;

    while !rest.is_empty() && chunks.len() < max_chunks {
        if rest.chars().count() <= chunk_size {
            chunks.push(rest);
            break;
        }

        // Byte offset of the chunk_size-th character
        let hard_end = rest
            .char_indices()
            .nth(chunk_size)
            .map(|(i, _)| i)
            .unwrap_or(rest.len());

        // Prefer breaking at the last whitespace before the hard limit
        let cut = rest[..hard_end]
            .rfind(char::is_whitespace)
            .filter(|&i| i > 0)
            .unwrap_or(hard_end);

        chunks.push(&rest[..cut]);
        rest = rest[cut..].trim_start();
    }

    chunks
}

/// Tokenize into lower-cased alphabetic words
pub(crate) fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|w| !w.is_empty())
        .map(|w| w.trim_matches('\'').to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}
