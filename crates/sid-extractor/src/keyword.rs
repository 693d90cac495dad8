//! Keyword extraction: stopword-filtered term frequency
//!
//! Raw score = occurrence count, with a small bonus for terms that appear
//! early in the text and for repeated bigrams. Counts are unbounded; the
//! reconciler normalizes them.

use std::collections::{HashMap, HashSet};

use crate::{chunk_text, validate_input, ExtractionResult, ExtractorId, SubjectExtractor};
use sid_core::Result;

/// English stopwords filtered out before counting
const STOPWORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "if", "then", "else", "when", "at", "by", "for", "with",
    "about", "against", "between", "into", "through", "during", "before", "after", "above",
    "below", "to", "from", "up", "down", "in", "out", "on", "off", "over", "under", "again",
    "further", "once", "here", "there", "all", "any", "both", "each", "few", "more", "most",
    "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than", "too",
    "very", "can", "will", "just", "should", "now", "is", "are", "was", "were", "be", "been",
    "being", "have", "has", "had", "having", "do", "does", "did", "doing", "would", "could",
    "ought", "i", "you", "he", "she", "it", "we", "they", "them", "his", "her", "its", "their",
    "what", "which", "who", "whom", "this", "that", "these", "those", "am", "of", "as", "until",
    "while", "because", "him", "hers", "theirs", "my", "your", "our", "me", "us", "showed",
    "great", "said", "went", "got", "one", "two", "also", "like",
];

/// Frequency-based keyword extractor
pub struct KeywordExtractor {
    stopwords: HashSet<&'static str>,
    /// Characters per chunk on long inputs
    chunk_size: usize,
    /// Leading chunks processed before stopping
    max_chunks: usize,
    /// Words shorter than this are skipped
    min_word_length: usize,
}

impl KeywordExtractor {
    pub fn new() -> Self {
        Self {
            stopwords: STOPWORDS.iter().copied().collect(),
            chunk_size: 1600,
            max_chunks: 3,
            min_word_length: 3,
        }
    }

    /// Override chunking bounds
    pub fn with_chunking(mut self, chunk_size: usize, max_chunks: usize) -> Self {
        self.chunk_size = chunk_size;
        self.max_chunks = max_chunks;
        self
    }

    fn is_candidate(&self, word: &str) -> bool {
        word.chars().count() >= self.min_word_length
            && !self.stopwords.contains(word)
            && word.chars().any(|c| c.is_alphabetic())
    }

    /// Count unigrams, weighting early occurrences slightly higher
    fn score_unigrams(&self, tokens: &[String], scores: &mut HashMap<String, f64>) {
        let total = tokens.len().max(1) as f64;

        for (position, word) in tokens.iter().enumerate() {
            if !self.is_candidate(word) {
                continue;
            }
            // Terms introduced early tend to be what the text is about
            let position_bonus = 0.5 * (1.0 - position as f64 / total);
            *scores.entry(word.clone()).or_insert(0.0) += 1.0 + position_bonus;
        }
    }

    /// Count bigrams whose both halves are candidates; only repeated
    /// bigrams score, single co-occurrences are noise
    fn score_bigrams(&self, tokens: &[String], scores: &mut HashMap<String, f64>) {
        let mut counts: HashMap<String, u32> = HashMap::new();

        for pair in tokens.windows(2) {
            if self.is_candidate(&pair[0]) && self.is_candidate(&pair[1]) {
                let bigram = format!("{} {}", pair[0], pair[1]);
                *counts.entry(bigram).or_insert(0) += 1;
            }
        }

        for (bigram, count) in counts {
            if count >= 2 {
                // A repeated pair outranks its constituent words
                *scores.entry(bigram).or_insert(0.0) += count as f64 * 2.0;
            }
        }
    }
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl SubjectExtractor for KeywordExtractor {
    fn id(&self) -> ExtractorId {
        ExtractorId::Keyword
    }

    fn extract(&self, text: &str) -> Result<ExtractionResult> {
        validate_input(text)?;

        let mut scores = HashMap::new();
        for chunk in chunk_text(text, self.chunk_size, self.max_chunks) {
            let tokens = crate::words(chunk);
            self.score_unigrams(&tokens, &mut scores);
            self.score_bigrams(&tokens, &mut scores);
        }

        tracing::debug!(candidates = scores.len(), "keyword extraction complete");
        Ok(ExtractionResult::new(scores))
    }
}
