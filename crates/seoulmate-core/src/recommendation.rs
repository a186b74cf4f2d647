//! Request and response types for `recommend`

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::catalog::{CatalogItem, Genre};
use crate::query::{Entities, Intent};
use crate::search::{Candidate, SearchFilters};

// ============================================================================
// DEGRADATION REASONS
// ============================================================================

/// Why a result is less complete than a fully healthy pipeline would make it
///
/// None of these fail a request. They are reported on the result, logged,
/// and passed to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradationReason {
    /// Nothing searchable in the query text
    EmptyQuery,
    /// Semantic index missing or failing; lexical channel used alone
    SemanticUnavailable,
    /// Semantic index answered with no candidates
    SemanticEmpty,
    /// Lexical index missing or failing; semantic channel used alone
    LexicalUnavailable,
    /// Lexical index and fuzzy fallback found nothing
    LexicalEmpty,
    /// Lexical hits come from approximate title matching
    FuzzyFallback,
    /// Rerank model missed its deadline; fused order kept
    RerankTimeout,
    /// Rerank model failed; fused order kept
    RerankFailed,
    /// Filters removed every candidate
    FilterEmptyResult,
    /// At least one candidate record was skipped as malformed
    MalformedCandidate,
}

impl DegradationReason {
    /// Stable reason code
    pub fn code(&self) -> &'static str {
        match self {
            DegradationReason::EmptyQuery => "empty_query",
            DegradationReason::SemanticUnavailable => "semantic_unavailable",
            DegradationReason::SemanticEmpty => "semantic_empty",
            DegradationReason::LexicalUnavailable => "lexical_unavailable",
            DegradationReason::LexicalEmpty => "lexical_empty",
            DegradationReason::FuzzyFallback => "fuzzy_fallback",
            DegradationReason::RerankTimeout => "rerank_timeout",
            DegradationReason::RerankFailed => "rerank_failed",
            DegradationReason::FilterEmptyResult => "filter_empty_result",
            DegradationReason::MalformedCandidate => "malformed_candidate",
        }
    }
}

impl fmt::Display for DegradationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ============================================================================
// REQUEST
// ============================================================================

/// A recommendation request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendRequest {
    /// Free-text query
    pub query: String,
    /// Result count; the configured default when absent
    pub top_n: Option<usize>,
    /// Explicit filters, merged with query-derived hints
    pub filters: SearchFilters,
    /// Fixed semantic weight, bypassing the weighting policy
    pub weight_override: Option<f32>,
    /// Force the rerank pass on or off
    pub rerank: Option<bool>,
}

impl RecommendRequest {
    /// Create a request for a query
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Set the result count
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = Some(top_n);
        self
    }

    /// Set explicit filters
    pub fn with_filters(mut self, filters: SearchFilters) -> Self {
        self.filters = filters;
        self
    }

    /// Fix the semantic weight
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.weight_override = Some(alpha);
        self
    }

    /// Force reranking on or off
    pub fn with_rerank(mut self, enabled: bool) -> Self {
        self.rerank = Some(enabled);
        self
    }
}

// ============================================================================
// RESPONSE
// ============================================================================

/// One ranked result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedItem {
    /// 1-based position
    pub rank: usize,
    /// Item identifier
    pub id: String,
    /// Display title
    pub title: String,
    /// Score that decided the position (rerank score when reranked)
    pub score: f32,
    /// Fused score after popularity boost
    pub fused_score: f32,
    /// Rerank model score
    pub rerank_score: Option<f32>,
    /// Normalized semantic score
    pub semantic_score: f32,
    /// Normalized lexical score
    pub lexical_score: f32,
    /// Found by the semantic channel
    pub matched_semantic: bool,
    /// Found by the lexical channel
    pub matched_lexical: bool,
    /// Genres
    pub genres: BTreeSet<Genre>,
    /// Rating
    pub rating: Option<f32>,
    /// First air year
    pub year: Option<i32>,
    /// Catalog popularity
    pub popularity: f32,
}

impl RankedItem {
    pub(crate) fn new(rank: usize, candidate: &Candidate, item: &CatalogItem) -> Self {
        Self {
            rank,
            id: candidate.id.clone(),
            title: item.title.clone(),
            score: candidate.ranking_score(),
            fused_score: candidate.fused_score,
            rerank_score: candidate.rerank_score,
            semantic_score: candidate.semantic_score,
            lexical_score: candidate.lexical_score,
            matched_semantic: candidate.matched_semantic,
            matched_lexical: candidate.matched_lexical,
            genres: item.genres.clone(),
            rating: item.rating,
            year: item.year,
            popularity: item.popularity,
        }
    }
}

/// Result of `recommend`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Request identifier, also present on the request's log lines
    pub request_id: String,
    /// Query as received
    pub query: String,
    /// Text sent to the semantic channel
    pub expanded_query: String,
    /// Classified intent
    pub intent: Intent,
    /// Classification confidence
    pub confidence: f32,
    /// Semantic weight from the policy or the request override
    pub alpha: f32,
    /// Semantic weight used after channel degradation
    pub effective_alpha: f32,
    /// Extracted entities
    pub entities: Entities,
    /// Filters applied (explicit and query-derived)
    pub applied_filters: SearchFilters,
    /// Ranked results, at most `top_n`
    pub items: Vec<RankedItem>,
    /// Degradations encountered, in pipeline order
    pub degradations: Vec<DegradationReason>,
    /// Whether the top block was ordered by the rerank model
    pub reranked: bool,
}

impl Recommendation {
    /// Ids in rank order
    pub fn ids(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.id.as_str()).collect()
    }

    /// Check for a degradation
    pub fn degraded_by(&self, reason: DegradationReason) -> bool {
        self.degradations.contains(&reason)
    }
}
