//! Final result assembly
//!
//! Canonical ordering, top-K plus high-confidence selection, category
//! attribution, and diagnostic metadata.

use std::collections::BTreeMap;

use sid_core::{AnalysisMetadata, BoostPolicy, Category, Subject, SubjectAnalysisResult};
use sid_extractor::ExtractorId;

/// Produces the final immutable result
pub struct ResultAssembler {
    policy: BoostPolicy,
}

impl ResultAssembler {
    pub fn new(policy: BoostPolicy) -> Self {
        Self { policy }
    }

    /// Select and order subjects, attribute categories, attach metadata.
    ///
    /// Subjects are sorted canonically (confidence descending, then name
    /// ascending) and the top K are kept, unioned with every subject at
    /// or above the high-confidence floor so strong long-tail subjects
    /// are never dropped purely by rank.
    pub fn assemble(
        &self,
        mut subjects: Vec<Subject>,
        contributors: &[ExtractorId],
        metadata: AnalysisMetadata,
    ) -> SubjectAnalysisResult {
        subjects.sort_by(|a, b| {
            b.confidence
                .total_cmp(&a.confidence)
                .then_with(|| a.name.cmp(&b.name))
        });

        let selected: Vec<Subject> = subjects
            .into_iter()
            .enumerate()
            .filter(|(rank, subject)| {
                *rank < self.policy.top_k
                    || subject.confidence >= self.policy.high_confidence_floor
            })
            .map(|(_, subject)| subject)
            .collect();

        if selected.is_empty() {
            // A subject-poor result is still a valid result
            tracing::warn!("analysis produced zero subjects");
        }

        let categories = contributors
            .iter()
            .map(|id| {
                Category::new(id.as_str().to_uppercase(), display_name(*id))
            })
            .collect();

        SubjectAnalysisResult {
            subjects: selected,
            categories,
            metadata,
        }
    }
}

fn display_name(id: ExtractorId) -> String {
    match id {
        ExtractorId::Keyword => "Keyword Extraction".to_string(),
        ExtractorId::Topic => "Topic Extraction".to_string(),
        ExtractorId::Entity => "Entity Extraction".to_string(),
    }
}

/// Resident set size in megabytes, when the platform exposes it
#[cfg(target_os = "linux")]
pub fn resident_memory_mb() -> Option<f64> {
    let statm = std::fs::read_to_string("/proc/self/statm").ok()?;
    let resident_pages: f64 = statm.split_whitespace().nth(1)?.parse().ok()?;
    Some(resident_pages * 4096.0 / (1024.0 * 1024.0))
}

#[cfg(not(target_os = "linux"))]
pub fn resident_memory_mb() -> Option<f64> {
    None
}

/// Build the diagnostic metadata block
pub fn build_metadata(
    processing_time_ms: u64,
    memory_delta_mb: Option<f64>,
    text_length: usize,
    languages_detected: Vec<String>,
    parallel_execution: bool,
    errors: BTreeMap<String, String>,
) -> AnalysisMetadata {
    AnalysisMetadata {
        processing_time_ms,
        memory_usage_mb: memory_delta_mb,
        text_length,
        languages_detected,
        parallel_execution,
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sid_core::SubjectKind;

    fn subject(name: &str, confidence: f64) -> Subject {
        Subject::new(name, SubjectKind::Keyword, confidence)
    }

    fn assembler() -> ResultAssembler {
        ResultAssembler::new(BoostPolicy::default())
    }

    #[test]
    fn test_canonical_order() {
        let result = assembler().assemble(
            vec![subject("beta", 0.5), subject("alpha", 0.5), subject("top", 0.9)],
            &[ExtractorId::Keyword],
            AnalysisMetadata::default(),
        );

        let names: Vec<&str> = result.subjects.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["top", "alpha", "beta"]);
    }

    #[test]
    fn test_top_k_cutoff() {
        let subjects: Vec<Subject> = (0..30)
            .map(|i| subject(&format!("subject-{i:02}"), 0.5 - i as f64 * 0.01))
            .collect();

        let result =
            assembler().assemble(subjects, &[ExtractorId::Keyword], AnalysisMetadata::default());
        assert_eq!(result.subjects.len(), 20);
    }

    #[test]
    fn test_high_confidence_survives_rank_cutoff() {
        // 25 mid-confidence subjects, plus one high-confidence subject
        // that would rank last alphabetically
        let mut subjects: Vec<Subject> = (0..25)
            .map(|i| subject(&format!("subject-{i:02}"), 0.6))
            .collect();
        subjects.push(subject("zz-strong", 0.85));

        let result =
            assembler().assemble(subjects, &[ExtractorId::Keyword], AnalysisMetadata::default());

        // zz-strong sorts first by confidence, 20 mid subjects follow
        assert_eq!(result.subjects.len(), 20);
        assert!(result.subjects.iter().any(|s| s.name == "zz-strong"));
    }

    #[test]
    fn test_high_confidence_beyond_top_k() {
        // More than top_k subjects at or above the floor: all survive
        let subjects: Vec<Subject> = (0..25)
            .map(|i| subject(&format!("subject-{i:02}"), 0.9))
            .collect();

        let result =
            assembler().assemble(subjects, &[ExtractorId::Keyword], AnalysisMetadata::default());
        assert_eq!(result.subjects.len(), 25);
    }

    #[test]
    fn test_categories_per_contributor() {
        let result = assembler().assemble(
            vec![subject("something", 0.5)],
            &[ExtractorId::Keyword, ExtractorId::Entity],
            AnalysisMetadata::default(),
        );

        let ids: Vec<&str> = result.categories.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["KEYWORD", "ENTITY"]);
    }

    #[test]
    fn test_empty_subjects_is_valid() {
        let result =
            assembler().assemble(vec![], &[], AnalysisMetadata::default());
        assert!(result.subjects.is_empty());
        assert!(result.categories.is_empty());
    }
}
