//! Confidence reconciliation
//!
//! Turns raw per-extractor score maps into deduplicated `Subject` values
//! with confidences in [0, 1]. Raw scales differ per extractor (term
//! counts, pattern weights, lexicon hits), so each map is normalized
//! against its own maximum before anything is compared across extractors.

use std::collections::HashMap;
use std::sync::Arc;

use sid_core::{BoostPolicy, DomainContext, Subject};
use sid_extractor::ExtractorId;

use crate::category::CategoryTable;
use crate::title::TitleBooster;

/// Two normalized names denote the same subject when they are identical,
/// when one is a substring of the other and their lengths differ by at
/// most 3 characters, or when the shared words cover at least 80% of the
/// smaller name's word set.
///
/// Known to over-merge very short names ("cat"/"cats"); the thresholds are
/// pinned by property tests rather than silently tuned.
pub fn are_similar(a: &str, b: &str) -> bool {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();

    if a == b {
        return true;
    }

    let (len_a, len_b) = (a.chars().count(), b.chars().count());
    if (a.contains(&b) || b.contains(&a)) && len_a.abs_diff(len_b) <= 3 {
        return true;
    }

    let words_a: Vec<&str> = a.split_whitespace().collect();
    let words_b: Vec<&str> = b.split_whitespace().collect();
    let smaller = words_a.len().min(words_b.len());
    if smaller == 0 {
        return false;
    }

    let shared = words_a.iter().filter(|w| words_b.contains(w)).count();
    shared as f64 / smaller as f64 >= 0.8
}

/// Normalizes, deduplicates, and boosts raw extraction results
pub struct ConfidenceReconciler {
    categories: CategoryTable,
    title_booster: TitleBooster,
    policy: BoostPolicy,
}

impl ConfidenceReconciler {
    pub fn new(categories: CategoryTable, policy: BoostPolicy) -> Self {
        Self {
            title_booster: TitleBooster::new(&policy),
            categories,
            policy,
        }
    }

    /// Reconcile raw maps into subjects.
    ///
    /// Extractors are processed in scheduler priority order and candidates
    /// within one extractor by raw score descending (name ascending on
    /// ties), so dedup outcomes are deterministic. When a candidate
    /// duplicates an already-accepted subject it is dropped outright;
    /// first-accepted wins, scores are not merged.
    pub fn reconcile(
        &self,
        raw: &[(ExtractorId, Arc<HashMap<String, f64>>)],
        context: Option<&DomainContext>,
        title: Option<&str>,
    ) -> Vec<Subject> {
        let mut accepted: Vec<Subject> = Vec::new();
        let mut accepted_names: Vec<String> = Vec::new();

        for (extractor, scores) in raw {
            let max_raw = scores.values().fold(0.0_f64, |acc, &v| acc.max(v));

            let mut candidates: Vec<(&String, &f64)> = scores.iter().collect();
            candidates.sort_by(|(name_a, score_a), (name_b, score_b)| {
                score_b
                    .total_cmp(score_a)
                    .then_with(|| name_a.cmp(name_b))
            });

            for (name, &raw_score) in candidates {
                let normalized_name = sid_core::normalize_name(name);
                if normalized_name.is_empty() {
                    continue;
                }
                if accepted_names
                    .iter()
                    .any(|existing| are_similar(existing, &normalized_name))
                {
                    continue;
                }

                let base = if max_raw > 0.0 {
                    raw_score / max_raw
                } else {
                    self.policy.fallback_confidence
                };

                let (confidence, matched_context) =
                    self.apply_category_boost(&normalized_name, base, context);

                let confidence = match title {
                    Some(t) => self.title_booster.boost(&normalized_name, confidence, t),
                    None => confidence,
                };

                let mut subject =
                    Subject::new(name.clone(), extractor.subject_kind(), confidence);
                if let (true, Some(ctx)) = (matched_context, context) {
                    subject = subject.with_context(ctx.clone());
                }

                accepted_names.push(normalized_name);
                accepted.push(subject);
            }
        }

        tracing::debug!(subjects = accepted.len(), "reconciliation complete");
        accepted
    }

    /// Category boost: lift the confidence to at least the matched
    /// keyword weight, multiply for exact matches, multiply again when
    /// the caller context domain agrees. Returns whether the context
    /// domain matched.
    fn apply_category_boost(
        &self,
        normalized_name: &str,
        confidence: f64,
        context: Option<&DomainContext>,
    ) -> (f64, bool) {
        let Some(matched) = self.categories.lookup(normalized_name) else {
            return (confidence.clamp(0.0, 1.0), false);
        };

        let mut boosted = confidence.max(matched.weight);
        if matched.exact {
            boosted = (boosted * self.policy.exact_category_multiplier).min(1.0);
        }

        let context_matched = context
            .map(|ctx| ctx.domain.eq_ignore_ascii_case(&matched.category_id))
            .unwrap_or(false);
        if context_matched {
            boosted = (boosted * self.policy.context_match_multiplier).min(1.0);
        }

        (boosted.clamp(0.0, 1.0), context_matched)
    }
}
