//! SID Engine - Subject identification orchestrator
//!
//! Runs the configured extraction strategies concurrently inside a fixed
//! wall-clock budget, reconciles their heterogeneous raw scores into a
//! single ranked and deduplicated subject set, and degrades gracefully
//! when any individual strategy fails or times out.
//!
//! The engine is a pure function of (text, optional context, optional
//! title); the only process-lifetime state is the injected, bounded
//! extraction cache.

use std::sync::Arc;
use std::time::{Duration, Instant};

use sid_core::{
    DomainContext, EngineConfig, Result, SubjectAnalysisResult, SubjectError,
};
use sid_extractor::{validate_input, EntityExtractor, KeywordExtractor, TopicExtractor};

pub mod assemble;
pub mod cache;
pub mod category;
pub mod language;
pub mod reconcile;
pub mod scheduler;
pub mod title;

pub use assemble::ResultAssembler;
pub use cache::{CacheStatsReport, ExtractionCache};
pub use category::{CategoryMatch, CategoryTable};
pub use language::{LanguageDetector, LanguageSampler, StopwordLanguageDetector};
pub use reconcile::{are_similar, ConfidenceReconciler};
pub use scheduler::{ExtractorScheduler, SchedulerOutcome};
pub use title::TitleBooster;

// Re-export the domain types callers consume alongside the engine
pub use sid_core::{
    AnalysisMetadata, BoostPolicy, Category, CategoryProfile, Subject, SubjectKind,
};
pub use sid_extractor::{ExtractionResult, ExtractorId, SubjectExtractor};

/// The subject identification engine
///
/// Construct with [`SubjectEngine::new`] and inject alternatives through
/// the `with_*` builders; every call to [`identify_subjects`] is
/// independent apart from the shared extraction cache.
///
/// [`identify_subjects`]: SubjectEngine::identify_subjects
pub struct SubjectEngine {
    config: EngineConfig,
    extractors: Vec<Arc<dyn SubjectExtractor>>,
    cache: ExtractionCache,
    scheduler: ExtractorScheduler,
    reconciler: ConfidenceReconciler,
    assembler: ResultAssembler,
    sampler: LanguageSampler,
}

impl SubjectEngine {
    /// Build an engine with the three built-in extractors and the
    /// category profile named by the configuration.
    pub fn new(config: EngineConfig) -> Self {
        let topic = match config.profile {
            CategoryProfile::Story => TopicExtractor::new(),
            CategoryProfile::Business => TopicExtractor::business(),
        };
        let chunking = &config.scheduler;

        let extractors: Vec<Arc<dyn SubjectExtractor>> = vec![
            Arc::new(
                KeywordExtractor::new()
                    .with_chunking(chunking.chunk_size, chunking.max_chunks),
            ),
            Arc::new(
                EntityExtractor::new().with_chunking(chunking.chunk_size, chunking.max_chunks),
            ),
            Arc::new(topic.with_chunking(chunking.chunk_size, chunking.max_chunks)),
        ];

        Self {
            cache: ExtractionCache::with_config(&config.cache),
            scheduler: ExtractorScheduler::new(config.scheduler.timeout_ms, config.slices.clone()),
            reconciler: ConfidenceReconciler::new(
                CategoryTable::for_profile(config.profile),
                config.boost.clone(),
            ),
            assembler: ResultAssembler::new(config.boost.clone()),
            sampler: LanguageSampler::new(
                Arc::new(StopwordLanguageDetector::new()),
                config.language.clone(),
            ),
            extractors,
            config,
        }
    }

    /// Replace the extractor set
    pub fn with_extractors(mut self, extractors: Vec<Arc<dyn SubjectExtractor>>) -> Self {
        self.extractors = extractors;
        self
    }

    /// Inject a caller-owned cache (shared across engines, or pre-sized
    /// for tests)
    pub fn with_cache(mut self, cache: ExtractionCache) -> Self {
        self.cache = cache;
        self
    }

    /// Swap the language identification backend
    pub fn with_language_detector(mut self, detector: Arc<dyn LanguageDetector>) -> Self {
        self.sampler = LanguageSampler::new(detector, self.config.language.clone());
        self
    }

    /// Swap the category keyword table
    pub fn with_category_table(mut self, table: CategoryTable) -> Self {
        self.reconciler = ConfidenceReconciler::new(table, self.config.boost.clone());
        self
    }

    /// Identify subjects in `text`.
    ///
    /// Fails with [`SubjectError::InvalidInput`] for empty, whitespace-only,
    /// or sub-minimum-length text, before any extraction is dispatched.
    /// Individual extractor failures and timeouts never fail the call;
    /// they surface in `metadata.errors` and the result carries whatever
    /// the remaining extractors produced. An empty subject set is a valid
    /// result. [`SubjectError::Processing`] escapes only when the engine
    /// itself cannot run at all.
    pub async fn identify_subjects(
        &self,
        text: &str,
        context: Option<&DomainContext>,
        episode_title: Option<&str>,
    ) -> Result<SubjectAnalysisResult> {
        validate_input(text)?;
        if self.extractors.is_empty() {
            return Err(SubjectError::Processing(
                "no extractors configured".to_string(),
            ));
        }

        let started = Instant::now();
        let deadline = tokio::time::Instant::now()
            + Duration::from_millis(self.config.scheduler.timeout_ms);
        let memory_before = assemble::resident_memory_mb();
        tracing::info!(
            text_length = text.chars().count(),
            extractors = self.extractors.len(),
            "subject identification started"
        );

        // Language sampling is informational and independent of
        // extraction; run it alongside on the blocking pool.
        let sampler = self.sampler.clone();
        let sample_text: Arc<str> = Arc::from(text);
        let mut language_handle =
            tokio::task::spawn_blocking(move || sampler.sample_languages(&sample_text));

        let outcome = self
            .scheduler
            .run(&self.extractors, text, &self.cache)
            .await;

        // Language detection only gets whatever budget the extractors left;
        // a slow backend degrades to an empty list, never a late result.
        let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
        let languages_detected =
            match tokio::time::timeout(remaining, &mut language_handle).await {
                Ok(Ok(languages)) => languages,
                Ok(Err(_)) => Vec::new(),
                Err(_elapsed) => {
                    language_handle.abort();
                    tracing::warn!("language detection exceeded the remaining budget");
                    Vec::new()
                }
            };

        let subjects = self
            .reconciler
            .reconcile(&outcome.raw, context, episode_title);

        // One category per extractor that contributed at least one
        // surviving subject
        let contributors: Vec<ExtractorId> = outcome
            .raw
            .iter()
            .map(|(id, _)| *id)
            .filter(|id| subjects.iter().any(|s| s.kind == id.subject_kind()))
            .collect();

        let memory_delta = match (memory_before, assemble::resident_memory_mb()) {
            (Some(before), Some(after)) => Some(after - before),
            _ => None,
        };

        let metadata = assemble::build_metadata(
            started.elapsed().as_millis() as u64,
            memory_delta,
            text.chars().count(),
            languages_detected,
            outcome.dispatched >= 2,
            outcome.errors,
        );

        let result = self.assembler.assemble(subjects, &contributors, metadata);

        tracing::info!(
            subjects = result.subjects.len(),
            elapsed_ms = result.metadata.processing_time_ms,
            errors = result.metadata.errors.len(),
            "subject identification finished"
        );

        Ok(result)
    }

    /// Hit/miss counters for the shared extraction cache
    pub fn cache_stats(&self) -> CacheStatsReport {
        self.cache.stats()
    }
}

impl Default for SubjectEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
