//! Topic extraction: indicator-word lexicon
//!
//! Each topic label carries a small hand-tuned set of indicator words.
//! Raw score = weighted count of indicator hits across the processed
//! chunks. A topic needs at least one hit to appear at all.

use std::collections::HashMap;

use crate::{chunk_text, validate_input, ExtractionResult, ExtractorId, SubjectExtractor};
use sid_core::Result;

/// One topic with its indicator vocabulary
struct TopicEntry {
    label: &'static str,
    /// (indicator word, weight) pairs
    indicators: &'static [(&'static str, f64)],
}

/// Story-domain topic lexicon
const STORY_TOPICS: &[TopicEntry] = &[
    TopicEntry {
        label: "adventure",
        indicators: &[
            ("adventure", 1.0),
            ("journey", 0.9),
            ("quest", 1.0),
            ("explore", 0.8),
            ("travel", 0.7),
            ("discover", 0.8),
            ("treasure", 0.8),
            ("map", 0.5),
        ],
    },
    TopicEntry {
        label: "friendship",
        indicators: &[
            ("friend", 1.0),
            ("friends", 1.0),
            ("friendship", 1.0),
            ("together", 0.7),
            ("help", 0.6),
            ("share", 0.7),
            ("kind", 0.6),
        ],
    },
    TopicEntry {
        label: "bravery",
        indicators: &[
            ("brave", 1.0),
            ("courage", 1.0),
            ("hero", 0.9),
            ("fearless", 0.9),
            ("daring", 0.8),
            ("rescue", 0.8),
            ("save", 0.6),
        ],
    },
    TopicEntry {
        label: "magic",
        indicators: &[
            ("magic", 1.0),
            ("magical", 1.0),
            ("spell", 0.9),
            ("wizard", 0.9),
            ("witch", 0.9),
            ("enchanted", 0.9),
            ("wish", 0.6),
            ("fairy", 0.8),
        ],
    },
    TopicEntry {
        label: "family",
        indicators: &[
            ("family", 1.0),
            ("mother", 0.8),
            ("father", 0.8),
            ("sister", 0.8),
            ("brother", 0.8),
            ("grandma", 0.8),
            ("grandpa", 0.8),
            ("home", 0.6),
        ],
    },
    TopicEntry {
        label: "nature",
        indicators: &[
            ("forest", 0.8),
            ("river", 0.7),
            ("mountain", 0.7),
            ("tree", 0.6),
            ("animal", 0.8),
            ("garden", 0.7),
            ("ocean", 0.7),
            ("rain", 0.6),
        ],
    },
    TopicEntry {
        label: "learning",
        indicators: &[
            ("school", 0.9),
            ("teacher", 0.8),
            ("learn", 0.9),
            ("read", 0.7),
            ("book", 0.7),
            ("lesson", 0.8),
            ("practice", 0.7),
        ],
    },
    TopicEntry {
        label: "music",
        indicators: &[
            ("music", 1.0),
            ("song", 0.9),
            ("sing", 0.9),
            ("dance", 0.8),
            ("drum", 0.7),
            ("melody", 0.8),
        ],
    },
];

/// Business-domain topic lexicon
const BUSINESS_TOPICS: &[TopicEntry] = &[
    TopicEntry {
        label: "technology",
        indicators: &[
            ("software", 1.0),
            ("computer", 0.9),
            ("internet", 0.8),
            ("digital", 0.8),
            ("data", 0.7),
            ("platform", 0.7),
        ],
    },
    TopicEntry {
        label: "finance",
        indicators: &[
            ("money", 0.8),
            ("investment", 1.0),
            ("market", 0.8),
            ("stock", 0.9),
            ("budget", 0.8),
            ("revenue", 0.9),
        ],
    },
    TopicEntry {
        label: "business",
        indicators: &[
            ("company", 0.9),
            ("startup", 1.0),
            ("customer", 0.8),
            ("product", 0.8),
            ("strategy", 0.8),
            ("growth", 0.7),
        ],
    },
];

/// Lexicon-driven topic extractor
pub struct TopicExtractor {
    topics: &'static [TopicEntry],
    chunk_size: usize,
    max_chunks: usize,
}

impl TopicExtractor {
    /// Story-domain lexicon (children's content)
    pub fn new() -> Self {
        Self {
            topics: STORY_TOPICS,
            chunk_size: 1600,
            max_chunks: 3,
        }
    }

    /// Technology/finance/business lexicon
    pub fn business() -> Self {
        Self {
            topics: BUSINESS_TOPICS,
            chunk_size: 1600,
            max_chunks: 3,
        }
    }

    /// Override chunking bounds
    pub fn with_chunking(mut self, chunk_size: usize, max_chunks: usize) -> Self {
        self.chunk_size = chunk_size;
        self.max_chunks = max_chunks;
        self
    }
}

impl Default for TopicExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl SubjectExtractor for TopicExtractor {
    fn id(&self) -> ExtractorId {
        ExtractorId::Topic
    }

    fn extract(&self, text: &str) -> Result<ExtractionResult> {
        validate_input(text)?;

        let mut scores = HashMap::new();
        for chunk in chunk_text(text, self.chunk_size, self.max_chunks) {
            let tokens = crate::words(chunk);

            for topic in self.topics {
                let mut hit_weight = 0.0;
                for token in &tokens {
                    for (indicator, weight) in topic.indicators {
                        if token == indicator {
                            hit_weight += weight;
                        }
                    }
                }
                if hit_weight > 0.0 {
                    *scores.entry(topic.label.to_string()).or_insert(0.0) += hit_weight;
                }
            }
        }

        tracing::debug!(topics = scores.len(), "topic extraction complete");
        Ok(ExtractionResult::new(scores))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sid_core::SubjectError;

    #[test]
    fn test_rejects_invalid_input() {
        let extractor = TopicExtractor::new();
        assert!(matches!(
            extractor.extract("        "),
            Err(SubjectError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_detects_bravery_topic() {
        let extractor = TopicExtractor::new();
        let result = extractor
            .extract("The brave princess showed great courage in the dark forest.")
            .unwrap();

        assert!(result.scores.contains_key("bravery"));
        assert!(result.scores.contains_key("nature"));
    }

    #[test]
    fn test_stronger_signal_scores_higher() {
        let extractor = TopicExtractor::new();
        let result = extractor
            .extract("A magic spell from the wizard made the enchanted forest glow.")
            .unwrap();

        let magic = result.scores["magic"];
        let nature = result.scores["nature"];
        assert!(magic > nature);
    }

    #[test]
    fn test_no_hits_means_no_topics() {
        let extractor = TopicExtractor::new();
        let result = extractor
            .extract("Quarterly fiscal adherence memorandum follows standard formatting.")
            .unwrap();

        assert!(result.scores.is_empty());
    }

    #[test]
    fn test_business_profile() {
        let extractor = TopicExtractor::business();
        let result = extractor
            .extract("The startup raised investment to grow its software platform.")
            .unwrap();

        assert!(result.scores.contains_key("technology"));
        assert!(result.scores.contains_key("finance"));
        assert!(result.scores.contains_key("business"));
    }
}
