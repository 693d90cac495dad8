//! Concurrent extractor scheduling under one wall-clock deadline
//!
//! Every configured extractor is dispatched at once on the blocking pool
//! (extraction is CPU-bound); results are then collected in priority
//! order — keyword and entity before topic — so the higher-value
//! extractors are serviced first when time runs out.
//!
//! The deadline is computed once at dispatch and never reset; each wait
//! is `min(deadline - now, extractor slice)`. An already-elapsed deadline
//! skips the remaining extractors and proceeds with whatever completed.
//!
//! Cancellation is best-effort: aborting a blocking task that already
//! started does not preempt it — the thread runs to completion and only
//! its result is discarded. True preemption would require cooperative
//! deadline polling inside the extractors or process isolation.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{timeout, Instant};

use sid_core::TimeSlices;
use sid_extractor::{ExtractorId, SubjectExtractor};

use crate::cache::ExtractionCache;

/// What the scheduler managed to collect before the deadline
#[derive(Debug, Default)]
pub struct SchedulerOutcome {
    /// Raw score maps for extractors that completed in time, in the
    /// priority order they were collected
    pub raw: Vec<(ExtractorId, Arc<HashMap<String, f64>>)>,

    /// One entry per extractor that failed, panicked, or timed out,
    /// keyed "<name>_error"
    pub errors: BTreeMap<String, String>,

    /// How many extractors were dispatched concurrently
    pub dispatched: usize,
}

/// Runs extractors in parallel and enforces the time budget
pub struct ExtractorScheduler {
    budget: Duration,
    slices: TimeSlices,
}

impl ExtractorScheduler {
    pub fn new(timeout_ms: u64, slices: TimeSlices) -> Self {
        Self {
            budget: Duration::from_millis(timeout_ms),
            slices,
        }
    }

    /// Dispatch all extractors against `text` and collect whatever
    /// finishes inside the budget.
    ///
    /// Individual failures never propagate: an extractor error, panic,
    /// or timeout becomes an error-map entry and collection continues.
    pub async fn run(
        &self,
        extractors: &[Arc<dyn SubjectExtractor>],
        text: &str,
        cache: &ExtractionCache,
    ) -> SchedulerOutcome {
        let deadline = Instant::now() + self.budget;
        let shared_text: Arc<str> = Arc::from(text);

        let mut handles: Vec<_> = extractors
            .iter()
            .map(|extractor| {
                let id = extractor.id();
                let extractor = Arc::clone(extractor);
                let text = Arc::clone(&shared_text);
                let cache = cache.clone();

                let handle = tokio::task::spawn_blocking(
                    move || -> sid_core::Result<Arc<HashMap<String, f64>>> {
                        if let Some(cached) = cache.get(id, &text) {
                            tracing::debug!(extractor = %id, "cache hit");
                            return Ok(cached);
                        }

                        let result = extractor.extract(&text)?;
                        cache.put(id, &text, result.scores.clone());
                        Ok(Arc::new(result.scores))
                    },
                );

                (id, handle)
            })
            .collect();

        // Keyword and entity are worth more downstream than topic; wait
        // on them first so they win when the budget is tight.
        handles.sort_by_key(|(id, _)| collection_priority(*id));

        let mut outcome = SchedulerOutcome {
            dispatched: handles.len(),
            ..Default::default()
        };

        for (id, mut handle) in handles {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                handle.abort();
                record_timeout(&mut outcome.errors, id);
                continue;
            }

            let wait = remaining.min(self.slice_for(id));
            match timeout(wait, &mut handle).await {
                Ok(Ok(Ok(scores))) => {
                    tracing::debug!(extractor = %id, candidates = scores.len(), "extractor completed");
                    outcome.raw.push((id, scores));
                }
                Ok(Ok(Err(e))) => {
                    tracing::warn!(extractor = %id, error = %e, "extractor failed");
                    outcome
                        .errors
                        .insert(format!("{id}_error"), e.to_string());
                }
                Ok(Err(join_err)) => {
                    let reason = if join_err.is_panic() {
                        format!("{id} processor panicked")
                    } else {
                        format!("{id} processor was cancelled")
                    };
                    tracing::warn!(extractor = %id, "{reason}");
                    outcome.errors.insert(format!("{id}_error"), reason);
                }
                Err(_elapsed) => {
                    handle.abort();
                    record_timeout(&mut outcome.errors, id);
                }
            }
        }

        outcome
    }

    fn slice_for(&self, id: ExtractorId) -> Duration {
        let fraction = match id {
            ExtractorId::Keyword => self.slices.keyword,
            ExtractorId::Entity => self.slices.entity,
            ExtractorId::Topic => self.slices.topic,
        };
        self.budget.mul_f64(fraction.clamp(0.0, 1.0))
    }
}

fn collection_priority(id: ExtractorId) -> u8 {
    match id {
        ExtractorId::Keyword => 0,
        ExtractorId::Entity => 1,
        ExtractorId::Topic => 2,
    }
}

fn record_timeout(errors: &mut BTreeMap<String, String>, id: ExtractorId) {
    tracing::warn!(extractor = %id, "extractor timed out");
    errors.insert(format!("{id}_error"), format!("{id} processor timed out"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use sid_core::Result as SidResult;
    use sid_extractor::ExtractionResult;

    struct FixedExtractor {
        id: ExtractorId,
        name: &'static str,
        delay: Duration,
    }

    impl SubjectExtractor for FixedExtractor {
        fn id(&self) -> ExtractorId {
            self.id
        }

        fn extract(&self, _text: &str) -> SidResult<ExtractionResult> {
            if !self.delay.is_zero() {
                std::thread::sleep(self.delay);
            }
            let mut scores = HashMap::new();
            scores.insert(self.name.to_string(), 1.0);
            Ok(ExtractionResult::new(scores))
        }
    }

    struct PanickingExtractor;

    impl SubjectExtractor for PanickingExtractor {
        fn id(&self) -> ExtractorId {
            ExtractorId::Entity
        }

        fn extract(&self, _text: &str) -> SidResult<ExtractionResult> {
            panic!("synthetic failure");
        }
    }

    fn fixed(id: ExtractorId, name: &'static str) -> Arc<dyn SubjectExtractor> {
        Arc::new(FixedExtractor {
            id,
            name,
            delay: Duration::ZERO,
        })
    }

    #[tokio::test]
    async fn test_collects_all_when_fast() {
        let scheduler = ExtractorScheduler::new(800, TimeSlices::default());
        let cache = ExtractionCache::new();
        let extractors = vec![
            fixed(ExtractorId::Keyword, "kw"),
            fixed(ExtractorId::Entity, "ent"),
            fixed(ExtractorId::Topic, "top"),
        ];

        let outcome = scheduler
            .run(&extractors, "some reasonable input text", &cache)
            .await;

        assert_eq!(outcome.raw.len(), 3);
        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.dispatched, 3);
    }

    #[tokio::test]
    async fn test_priority_collection_order() {
        let scheduler = ExtractorScheduler::new(800, TimeSlices::default());
        let cache = ExtractionCache::new();
        let extractors = vec![
            fixed(ExtractorId::Topic, "top"),
            fixed(ExtractorId::Keyword, "kw"),
            fixed(ExtractorId::Entity, "ent"),
        ];

        let outcome = scheduler
            .run(&extractors, "some reasonable input text", &cache)
            .await;

        let order: Vec<ExtractorId> = outcome.raw.iter().map(|(id, _)| *id).collect();
        assert_eq!(
            order,
            vec![ExtractorId::Keyword, ExtractorId::Entity, ExtractorId::Topic]
        );
    }

    #[tokio::test]
    async fn test_slow_extractor_times_out() {
        let scheduler = ExtractorScheduler::new(200, TimeSlices::default());
        let cache = ExtractionCache::new();
        let extractors: Vec<Arc<dyn SubjectExtractor>> = vec![
            fixed(ExtractorId::Keyword, "kw"),
            Arc::new(FixedExtractor {
                id: ExtractorId::Topic,
                name: "slow",
                delay: Duration::from_millis(400),
            }),
        ];

        let started = std::time::Instant::now();
        let outcome = scheduler
            .run(&extractors, "some reasonable input text", &cache)
            .await;
        let elapsed = started.elapsed();

        assert_eq!(outcome.raw.len(), 1);
        assert_eq!(outcome.raw[0].0, ExtractorId::Keyword);
        assert_eq!(
            outcome.errors.get("topic_error").map(String::as_str),
            Some("topic processor timed out")
        );
        // Budget plus a modest overhead allowance
        assert!(elapsed < Duration::from_millis(240), "took {elapsed:?}");
    }

    #[tokio::test]
    async fn test_panicking_extractor_contained() {
        let scheduler = ExtractorScheduler::new(800, TimeSlices::default());
        let cache = ExtractionCache::new();
        let extractors: Vec<Arc<dyn SubjectExtractor>> = vec![
            fixed(ExtractorId::Keyword, "kw"),
            Arc::new(PanickingExtractor),
        ];

        let outcome = scheduler
            .run(&extractors, "some reasonable input text", &cache)
            .await;

        assert_eq!(outcome.raw.len(), 1);
        assert_eq!(
            outcome.errors.get("entity_error").map(String::as_str),
            Some("entity processor panicked")
        );
    }

    #[tokio::test]
    async fn test_cache_short_circuits_second_run() {
        use std::sync::atomic::{AtomicU32, Ordering};

        struct CountingExtractor(Arc<AtomicU32>);

        impl SubjectExtractor for CountingExtractor {
            fn id(&self) -> ExtractorId {
                ExtractorId::Keyword
            }

            fn extract(&self, _text: &str) -> SidResult<ExtractionResult> {
                self.0.fetch_add(1, Ordering::SeqCst);
                Ok(ExtractionResult::default())
            }
        }

        let calls = Arc::new(AtomicU32::new(0));
        let scheduler = ExtractorScheduler::new(800, TimeSlices::default());
        let cache = ExtractionCache::new();
        let extractors: Vec<Arc<dyn SubjectExtractor>> =
            vec![Arc::new(CountingExtractor(Arc::clone(&calls)))];

        let text = "identical input text for both runs";
        scheduler.run(&extractors, text, &cache).await;
        scheduler.run(&extractors, text, &cache).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
