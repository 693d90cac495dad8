//! Entity extraction: regex patterns plus dictionary matching
//!
//! Two passes over each chunk, in the style of a rule-based NER:
//! - pattern pass: capitalized name sequences and honorific + name forms
//! - dictionary pass: known character/place archetypes with aliases
//!
//! Overlapping mentions are deduplicated by text position, keeping the
//! highest-confidence span. Raw score per name is the sum of its surviving
//! mentions' pattern confidences, so repetition raises the score.

use std::collections::{HashMap, HashSet};

use regex::Regex;

use crate::{chunk_text, validate_input, ExtractionResult, ExtractorId, SubjectExtractor};
use sid_core::Result;

/// A located entity mention within one chunk
#[derive(Debug, Clone)]
struct Mention {
    text: String,
    start: usize,
    end: usize,
    confidence: f64,
}

/// Dictionary entry for known entity archetypes
struct DictionaryEntry {
    term: &'static str,
    aliases: &'static [&'static str],
}

const STORY_DICTIONARY: &[DictionaryEntry] = &[
    DictionaryEntry {
        term: "princess",
        aliases: &["princesses"],
    },
    DictionaryEntry {
        term: "prince",
        aliases: &["princes"],
    },
    DictionaryEntry {
        term: "dragon",
        aliases: &["dragons"],
    },
    DictionaryEntry {
        term: "knight",
        aliases: &["knights"],
    },
    DictionaryEntry {
        term: "wizard",
        aliases: &["wizards", "sorcerer"],
    },
    DictionaryEntry {
        term: "witch",
        aliases: &["witches"],
    },
    DictionaryEntry {
        term: "king",
        aliases: &["kings"],
    },
    DictionaryEntry {
        term: "queen",
        aliases: &["queens"],
    },
    DictionaryEntry {
        term: "castle",
        aliases: &["castles", "palace"],
    },
    DictionaryEntry {
        term: "forest",
        aliases: &["woods", "woodland"],
    },
    DictionaryEntry {
        term: "village",
        aliases: &["villages", "town"],
    },
    DictionaryEntry {
        term: "fairy",
        aliases: &["fairies"],
    },
    DictionaryEntry {
        term: "giant",
        aliases: &["giants", "ogre"],
    },
];

/// Words that start sentences and look capitalized but are not names
const CAPITALIZED_NOISE: &[&str] = &[
    "the", "a", "an", "and", "but", "when", "then", "once", "one", "it", "he", "she", "they",
    "we", "i", "his", "her", "their", "there", "this", "that", "after", "before", "so", "now",
];

/// Pattern- and dictionary-based entity extractor
pub struct EntityExtractor {
    /// (pattern, confidence) pairs run over each chunk
    patterns: Vec<(Regex, f64)>,
    /// Lowercase term -> canonical dictionary form
    lookup: HashMap<String, &'static str>,
    noise: HashSet<&'static str>,
    chunk_size: usize,
    max_chunks: usize,
}

impl EntityExtractor {
    pub fn new() -> Self {
        let mut extractor = Self {
            patterns: Vec::new(),
            lookup: HashMap::new(),
            noise: CAPITALIZED_NOISE.iter().copied().collect(),
            chunk_size: 1600,
            max_chunks: 3,
        };

        // Honorific + proper name ("Princess Elena", "Captain Finn")
        extractor.add_pattern(
            r"\b(?:Princess|Prince|King|Queen|Sir|Lady|Captain|Doctor|Professor) [A-Z][a-z]+\b",
            0.95,
        );
        // Runs of two or more capitalized words ("Dark Forest")
        extractor.add_pattern(r"\b[A-Z][a-z]+(?: [A-Z][a-z]+)+\b", 0.75);
        // Single capitalized words, weakest signal (often sentence starts)
        extractor.add_pattern(r"\b[A-Z][a-z]{2,}\b", 0.4);

        for entry in STORY_DICTIONARY {
            extractor.lookup.insert(entry.term.to_string(), entry.term);
            for alias in entry.aliases {
                extractor.lookup.insert(alias.to_string(), entry.term);
            }
        }

        extractor
    }

    /// Override chunking bounds
    pub fn with_chunking(mut self, chunk_size: usize, max_chunks: usize) -> Self {
        self.chunk_size = chunk_size;
        self.max_chunks = max_chunks;
        self
    }

    fn add_pattern(&mut self, pattern: &str, confidence: f64) {
        if let Ok(regex) = Regex::new(pattern) {
            self.patterns.push((regex, confidence));
        }
    }

    fn extract_by_patterns(&self, chunk: &str) -> Vec<Mention> {
        let mut mentions = Vec::new();

        for (regex, confidence) in &self.patterns {
            for mat in regex.find_iter(chunk) {
                let text = mat.as_str();
                if self.noise.contains(text.to_lowercase().as_str()) {
                    continue;
                }
                mentions.push(Mention {
                    text: text.to_string(),
                    start: mat.start(),
                    end: mat.end(),
                    confidence: *confidence,
                });
            }
        }

        mentions
    }

    fn extract_by_dictionary(&self, chunk: &str) -> Vec<Mention> {
        let mut mentions = Vec::new();
        let chunk_lower = chunk.to_lowercase();

        for (term, canonical) in &self.lookup {
            for (start, _) in chunk_lower.match_indices(term.as_str()) {
                // Whole-word occurrences only
                let before_ok = chunk_lower[..start]
                    .chars()
                    .next_back()
                    .map(|c| !c.is_alphanumeric())
                    .unwrap_or(true);
                let after_ok = chunk_lower[start + term.len()..]
                    .chars()
                    .next()
                    .map(|c| !c.is_alphanumeric())
                    .unwrap_or(true);
                if !before_ok || !after_ok {
                    continue;
                }

                mentions.push(Mention {
                    text: canonical.to_string(),
                    start,
                    end: start + term.len(),
                    confidence: 0.9,
                });
            }
        }

        mentions
    }

    /// Drop overlapping mentions, keeping the highest confidence at each
    /// position
    fn deduplicate(&self, mut mentions: Vec<Mention>) -> Vec<Mention> {
        mentions.sort_by(|a, b| {
            a.start
                .cmp(&b.start)
                .then(b.confidence.total_cmp(&a.confidence))
        });

        let mut kept: Vec<Mention> = Vec::new();
        for mention in mentions {
            let overlaps = kept
                .iter()
                .any(|k| mention.start < k.end && k.start < mention.end);
            if !overlaps {
                kept.push(mention);
            }
        }

        kept
    }
}

impl Default for EntityExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl SubjectExtractor for EntityExtractor {
    fn id(&self) -> ExtractorId {
        ExtractorId::Entity
    }

    fn extract(&self, text: &str) -> Result<ExtractionResult> {
        validate_input(text)?;

        let mut scores: HashMap<String, f64> = HashMap::new();
        for chunk in chunk_text(text, self.chunk_size, self.max_chunks) {
            let mut mentions = self.extract_by_patterns(chunk);
            mentions.extend(self.extract_by_dictionary(chunk));

            for mention in self.deduplicate(mentions) {
                *scores.entry(mention.text.to_lowercase()).or_insert(0.0) += mention.confidence;
            }
        }

        tracing::debug!(entities = scores.len(), "entity extraction complete");
        Ok(ExtractionResult::new(scores))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sid_core::SubjectError;

    #[test]
    fn test_rejects_invalid_input() {
        let extractor = EntityExtractor::new();
        assert!(matches!(
            extractor.extract("short"),
            Err(SubjectError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_honorific_name() {
        let extractor = EntityExtractor::new();
        let result = extractor
            .extract("Princess Elena rode through the valley at dawn.")
            .unwrap();

        assert!(result.scores.contains_key("princess elena"));
    }

    #[test]
    fn test_dictionary_terms() {
        let extractor = EntityExtractor::new();
        let result = extractor
            .extract("A dragon guarded the castle near the dark woods.")
            .unwrap();

        assert!(result.scores.contains_key("dragon"));
        assert!(result.scores.contains_key("castle"));
        // Alias resolves to the canonical form
        assert!(result.scores.contains_key("forest"));
    }

    #[test]
    fn test_capitalized_sequence() {
        let extractor = EntityExtractor::new();
        let result = extractor
            .extract("They wandered into the Whispering Caves that night.")
            .unwrap();

        assert!(result.scores.contains_key("whispering caves"));
    }

    #[test]
    fn test_sentence_start_noise_filtered() {
        let extractor = EntityExtractor::new();
        let result = extractor
            .extract("Then they walked home. Once upon a time it rained.")
            .unwrap();

        assert!(!result.scores.contains_key("then"));
        assert!(!result.scores.contains_key("once"));
    }

    #[test]
    fn test_repetition_raises_score() {
        let extractor = EntityExtractor::new();
        let result = extractor
            .extract("The dragon roared. The dragon circled the village. The dragon slept.")
            .unwrap();

        let dragon = result.scores["dragon"];
        let village = result.scores["village"];
        assert!(dragon > village);
    }

    #[test]
    fn test_overlap_dedup_prefers_longer_match() {
        let extractor = EntityExtractor::new();
        let mentions = vec![
            Mention {
                text: "Princess Elena".to_string(),
                start: 0,
                end: 14,
                confidence: 0.95,
            },
            Mention {
                text: "Elena".to_string(),
                start: 9,
                end: 14,
                confidence: 0.4,
            },
        ];

        let kept = extractor.deduplicate(mentions);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].text, "Princess Elena");
    }
}
