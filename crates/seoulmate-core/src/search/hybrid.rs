//! Hybrid Fusion (Semantic + Lexical)
//!
//! Combines the two retrieval channels with a per-request linear weighting:
//! score(d) = alpha * semantic(d) + (1 - alpha) * lexical(d)
//!
//! Each channel is min-max normalized over this request's candidates before
//! weighting, so raw BM25 scores and cosine similarities share one scale.
//! A candidate missing from one channel gets 0 for it rather than being
//! dropped.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::retriever::ScoredId;

// ============================================================================
// FUSION PRIMITIVES
// ============================================================================

/// Min-max normalize scores to [0, 1]
///
/// A zero range (one candidate, or all equal) maps every score to 1.0.
pub fn min_max_normalize(scores: &[f32]) -> Vec<f32> {
    let (min, max) = scores
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), s| (lo.min(*s), hi.max(*s)));
    let range = max - min;

    scores
        .iter()
        .map(|s| {
            if range > f32::EPSILON {
                (s - min) / range
            } else {
                1.0
            }
        })
        .collect()
}

/// Linear combination of normalized channel scores
pub fn fuse_score(semantic: f32, lexical: f32, alpha: f32) -> f32 {
    let alpha = alpha.clamp(0.0, 1.0);
    alpha * semantic + (1.0 - alpha) * lexical
}

// ============================================================================
// CANDIDATES
// ============================================================================

/// An item within one request, with per-channel and fused scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Item identifier
    pub id: String,
    /// Normalized semantic score (0 if the channel missed)
    pub semantic_score: f32,
    /// Normalized lexical score (0 if the channel missed)
    pub lexical_score: f32,
    /// Weighted score, after popularity boost once applied
    pub fused_score: f32,
    /// Score from the rerank model, for the reranked block only
    pub rerank_score: Option<f32>,
    /// Found by the semantic channel
    pub matched_semantic: bool,
    /// Found by the lexical channel
    pub matched_lexical: bool,
    /// Catalog popularity, used for boosting and tie-breaking
    pub popularity: f32,
}

impl Candidate {
    /// Score that decides this candidate's position
    pub fn ranking_score(&self) -> f32 {
        self.rerank_score.unwrap_or(self.fused_score)
    }
}

/// Fusion output
#[derive(Debug, Clone, Default)]
pub struct FusionOutcome {
    /// One candidate per distinct id, in id order
    pub candidates: Vec<Candidate>,
    /// Entries skipped for an empty id or a non-finite score
    pub malformed: usize,
}

/// Keep the highest finite score per id; count what was skipped
fn dedupe_channel(hits: &[ScoredId], malformed: &mut usize) -> BTreeMap<String, f32> {
    let mut best: BTreeMap<String, f32> = BTreeMap::new();
    for (id, score) in hits {
        if id.is_empty() || !score.is_finite() {
            *malformed += 1;
            continue;
        }
        best.entry(id.clone())
            .and_modify(|s| *s = s.max(*score))
            .or_insert(*score);
    }
    best
}

fn normalized_channel(hits: BTreeMap<String, f32>) -> BTreeMap<String, f32> {
    let scores: Vec<f32> = hits.values().copied().collect();
    hits.into_keys().zip(min_max_normalize(&scores)).collect()
}

/// Normalize, merge by id and weight both channels
///
/// Popularity is left at 0; the caller fills it from the catalog.
pub fn fuse(semantic: &[ScoredId], lexical: &[ScoredId], alpha: f32) -> FusionOutcome {
    let mut malformed = 0;
    let semantic = normalized_channel(dedupe_channel(semantic, &mut malformed));
    let lexical = normalized_channel(dedupe_channel(lexical, &mut malformed));

    let mut merged: BTreeMap<&str, (Option<f32>, Option<f32>)> = BTreeMap::new();
    for (id, score) in &semantic {
        merged.entry(id.as_str()).or_default().0 = Some(*score);
    }
    for (id, score) in &lexical {
        merged.entry(id.as_str()).or_default().1 = Some(*score);
    }

    let candidates = merged
        .into_iter()
        .map(|(id, (sem, lex))| {
            let semantic_score = sem.unwrap_or(0.0);
            let lexical_score = lex.unwrap_or(0.0);
            Candidate {
                id: id.to_string(),
                semantic_score,
                lexical_score,
                fused_score: fuse_score(semantic_score, lexical_score, alpha),
                rerank_score: None,
                matched_semantic: sem.is_some(),
                matched_lexical: lex.is_some(),
                popularity: 0.0,
            }
        })
        .collect();

    FusionOutcome {
        candidates,
        malformed,
    }
}

// ============================================================================
// POST-FUSION ADJUSTMENTS
// ============================================================================

/// Multiply fused scores by `1 + (boost - 1) * p`, p being min-max popularity
///
/// A boost of 1.0 leaves scores untouched.
pub fn apply_popularity_boost(candidates: &mut [Candidate], boost: f32) {
    if !boost.is_finite() || (boost - 1.0).abs() <= f32::EPSILON || candidates.is_empty() {
        return;
    }

    let popularity: Vec<f32> = candidates.iter().map(|c| c.popularity).collect();
    let (min, max) = popularity
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), p| (lo.min(*p), hi.max(*p)));
    let range = max - min;
    if range <= f32::EPSILON {
        // No popularity signal to favour anyone with
        return;
    }

    for candidate in candidates.iter_mut() {
        let p = (candidate.popularity - min) / range;
        candidate.fused_score *= 1.0 + (boost - 1.0) * p;
    }
}

/// Final ordering: score descending, popularity descending, id ascending
pub fn compare_candidates(a: &Candidate, b: &Candidate) -> Ordering {
    b.ranking_score()
        .total_cmp(&a.ranking_score())
        .then_with(|| b.popularity.total_cmp(&a.popularity))
        .then_with(|| a.id.cmp(&b.id))
}

/// Sort candidates into final order
pub fn sort_candidates(candidates: &mut [Candidate]) {
    candidates.sort_by(compare_candidates);
}

// ============================================================================
// TESTS
// ============================================================================
