//! Episode-title-driven confidence adjustment
//!
//! A subject whose name overlaps the episode title is more likely to be
//! what the content is actually about. Non-descriptive titles ("Episode
//! 12", "Story Time") never trigger a boost.

use regex::Regex;
use sid_core::BoostPolicy;

/// Applies title-overlap boosts under a generic-title guard
pub struct TitleBooster {
    generic_patterns: Vec<Regex>,
    exact_multiplier: f64,
    partial_multiplier: f64,
}

impl TitleBooster {
    pub fn new(policy: &BoostPolicy) -> Self {
        let patterns = [
            r"(?i)^\s*episode\s+\d+\s*$",
            r"(?i)^\s*chapter\s+\d+\s*$",
            r"(?i)^\s*part\s+\d+\s*$",
            r"(?i)^\s*story\s+time\s*$",
            r"(?i)^\s*podcast\s+recording\s*$",
        ];

        Self {
            generic_patterns: patterns
                .iter()
                .filter_map(|p| Regex::new(p).ok())
                .collect(),
            exact_multiplier: policy.title_exact_multiplier,
            partial_multiplier: policy.title_partial_multiplier,
        }
    }

    /// Titles matching the blocklist carry no information about content
    pub fn is_generic(&self, title: &str) -> bool {
        self.generic_patterns.iter().any(|p| p.is_match(title))
    }

    /// Boost `confidence` by the subject name's overlap with `title`.
    ///
    /// Exact (name verbatim in the title, case-insensitive) multiplies by
    /// the exact factor; a whole-word overlap multiplies by the partial
    /// factor. Always capped at 1.0. Empty names, empty titles, and
    /// generic titles leave the confidence unchanged.
    pub fn boost(&self, subject_name: &str, confidence: f64, title: &str) -> f64 {
        let name = subject_name.trim().to_lowercase();
        let title_trimmed = title.trim();
        if name.is_empty() || title_trimmed.is_empty() || self.is_generic(title_trimmed) {
            return confidence;
        }

        let title_lower = title_trimmed.to_lowercase();

        if title_lower.contains(&name) {
            return (confidence * self.exact_multiplier).min(1.0);
        }

        let title_words: Vec<&str> = title_lower.split_whitespace().collect();
        let partial = name
            .split_whitespace()
            .any(|word| title_words.contains(&word));
        if partial {
            return (confidence * self.partial_multiplier).min(1.0);
        }

        confidence
    }
}
