//! Engine configuration management
//!
//! Handles configuration from TOML files and environment variables with
//! sensible defaults. Every tuning constant the engine uses lives here so
//! that boost factors and time slices can be adjusted without code changes.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    /// Scheduling and deadline settings
    pub scheduler: SchedulerConfig,

    /// Per-extractor time-slice weights
    pub slices: TimeSlices,

    /// Confidence boost policy
    pub boost: BoostPolicy,

    /// Extraction cache settings
    pub cache: CacheConfig,

    /// Language sampling settings
    pub language: LanguageConfig,

    /// Which category keyword profile to load
    pub profile: CategoryProfile,
}

impl EngineConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(timeout) = std::env::var("SID_TIMEOUT_MS") {
            config.scheduler.timeout_ms =
                timeout.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "SID_TIMEOUT_MS".to_string(),
                    value: timeout,
                })?;
        }
        if let Ok(capacity) = std::env::var("SID_CACHE_CAPACITY") {
            config.cache.max_capacity =
                capacity.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "SID_CACHE_CAPACITY".to_string(),
                    value: capacity,
                })?;
        }
        if let Ok(profile) = std::env::var("SID_PROFILE") {
            config.profile = profile.parse()?;
        }

        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        let env_config = Self::from_env()?;

        if env_config.scheduler.timeout_ms != SchedulerConfig::default().timeout_ms {
            self.scheduler.timeout_ms = env_config.scheduler.timeout_ms;
        }
        if env_config.cache.max_capacity != CacheConfig::default().max_capacity {
            self.cache.max_capacity = env_config.cache.max_capacity;
        }
        if std::env::var("SID_PROFILE").is_ok() {
            self.profile = env_config.profile;
        }

        Ok(self)
    }
}

/// Scheduling and deadline settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Overall wall-clock budget for one identification call
    pub timeout_ms: u64,

    /// Minimum accepted input length in characters
    pub min_text_length: usize,

    /// Characters per extraction chunk for long inputs
    pub chunk_size: usize,

    /// How many chunks an extractor processes before stopping.
    /// Bounding this is a speed/recall tradeoff, not a bug.
    pub max_chunks: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 800,
            min_text_length: 10,
            chunk_size: 1600,
            max_chunks: 3,
        }
    }
}

/// Per-extractor shares of the overall timeout budget
///
/// These are configured weights, not hard per-extractor kills: at dispatch
/// time the scheduler waits `min(deadline - now, slice)` for each result.
/// The remainder of the budget is reserved for language detection and
/// aggregation overhead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSlices {
    /// Fraction of the budget allotted to the keyword extractor
    pub keyword: f64,

    /// Fraction allotted to the entity extractor
    pub entity: f64,

    /// Fraction allotted to the topic extractor
    pub topic: f64,
}

impl Default for TimeSlices {
    fn default() -> Self {
        Self {
            keyword: 0.30,
            entity: 0.25,
            topic: 0.15,
        }
    }
}

/// All confidence-tuning constants in one place
///
/// Pulled out of the reconciliation code so tuning and A/B testing are
/// explicit and testable in isolation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoostPolicy {
    /// Multiplier when a subject exactly matches a category keyword
    pub exact_category_multiplier: f64,

    /// Multiplier when the caller context domain matches the category
    pub context_match_multiplier: f64,

    /// Multiplier when a subject name appears verbatim in the title
    pub title_exact_multiplier: f64,

    /// Multiplier when a word of the subject name appears in the title
    pub title_partial_multiplier: f64,

    /// Subjects at or above this confidence are always kept, regardless
    /// of rank
    pub high_confidence_floor: f64,

    /// Normalized confidence assigned when an extractor's raw scores are
    /// all zero or missing
    pub fallback_confidence: f64,

    /// How many subjects the assembler keeps by rank
    pub top_k: usize,
}

impl Default for BoostPolicy {
    fn default() -> Self {
        Self {
            exact_category_multiplier: 1.2,
            context_match_multiplier: 1.1,
            title_exact_multiplier: 1.5,
            title_partial_multiplier: 1.25,
            high_confidence_floor: 0.8,
            fallback_confidence: 0.5,
            top_k: 20,
        }
    }
}

/// Extraction cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of cached raw extraction results
    pub max_capacity: u64,

    /// Time-to-live for cache entries in seconds
    pub ttl_seconds: u64,

    /// How many leading characters of the input participate in the
    /// cache key hash
    pub key_prefix_chars: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 1_000,
            ttl_seconds: 600,
            key_prefix_chars: 1_000,
        }
    }
}

/// Language sampling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageConfig {
    /// Maximum number of text samples submitted to the detector
    pub max_samples: usize,

    /// Minimum sample length in characters
    pub min_sample_length: usize,

    /// Language codes below this probability are discarded. Kept very
    /// low to catch minority-language presence.
    pub probability_floor: f64,

    /// Stop sampling once this many distinct languages are found
    pub max_languages: usize,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            max_samples: 5,
            min_sample_length: 30,
            probability_floor: 0.10,
            max_languages: 3,
        }
    }
}

/// Which hand-tuned category keyword profile the engine loads
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryProfile {
    /// Children's story content: characters, places, themes, objects, culture
    #[default]
    Story,
    /// Technology / finance / business content
    Business,
}

impl std::str::FromStr for CategoryProfile {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "story" => Ok(Self::Story),
            "business" => Ok(Self::Business),
            _ => Err(ConfigError::InvalidValue {
                key: "SID_PROFILE".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}
