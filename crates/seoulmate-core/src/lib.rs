//! # SeoulMate Core
//!
//! Hybrid retrieval and ranking engine for a K-drama catalog:
//!
//! - **Intent Extraction**: rule-table classification over curated lexicons
//!   (actors, genres, emotions, years, similarity and trend markers)
//! - **Query Expansion**: bounded synonym expansion for the semantic channel only
//! - **Adaptive Weighting**: intent and confidence pick the semantic/lexical mix
//! - **Hybrid Retrieval**: dense and BM25 channels in parallel, fuzzy title fallback
//! - **Fusion & Rerank**: per-request min-max fusion, popularity boost, filters,
//!   deadline-bounded reranking, fully deterministic ordering
//! - **Graceful Degradation**: a missing channel or slow model never fails a request
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use seoulmate_core::{EngineConfig, InMemoryCatalog, RecommendRequest, RecommendationEngine};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = Arc::new(InMemoryCatalog::load("catalog.json")?);
//! let engine = RecommendationEngine::from_catalog(EngineConfig::default(), catalog)?;
//!
//! let result = engine.recommend(RecommendRequest::new("sad emotional drama").with_top_n(5)).await;
//! println!("{} (alpha {:.2})", result.intent, result.alpha);
//! for item in &result.items {
//!     println!("{}. {} ({:.3})", item.rank, item.title, item.score);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `embeddings`: dense retrieval and cross-encoder reranking with fastembed
//! - `vector-search`: usearch HNSW store behind dense retrieval (implied by `embeddings`)

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULES
// ============================================================================

pub mod catalog;
pub mod config;
pub mod engine;
pub mod observer;
pub mod query;
pub mod recommendation;
pub mod search;
pub mod weighting;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use catalog::{Catalog, CatalogError, CatalogItem, Genre, InMemoryCatalog};

pub use config::{CacheConfig, ConfigError, EngineConfig, RetrievalConfig};

pub use engine::{EngineBuilder, RecommendationEngine};

pub use observer::{ObserverError, RecommendationEvent, RecommendationObserver, TracingObserver};

pub use query::{
    normalize, Entities, EntityExtractor, EpisodeConstraint, ExpansionConfig, Intent, Lexicon,
    Query, QueryAnalysis, QueryExpander,
};

pub use recommendation::{DegradationReason, RankedItem, RecommendRequest, Recommendation};

pub use search::{
    Bm25Index, Candidate, FuzzyConfig, FuzzyTitleMatcher, LexicalIndex, QueryCache,
    RelevanceModel, RerankerError, RetrieverError, ScoredId, SearchFilters, SemanticIndex,
    TermOverlapModel, TitleMatcher,
};

#[cfg(feature = "embeddings")]
pub use search::{CrossEncoderModel, DenseIndex};

pub use weighting::{
    AutoFilterHints, SearchStrategy, WeightProfile, WeightingConfig, WeightingPolicy,
};

// ============================================================================
// VERSION INFO
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// PRELUDE
// ============================================================================

/// Convenient imports for common usage
pub mod prelude {
    pub use crate::{
        Catalog, CatalogItem, DegradationReason, EngineConfig, Genre, InMemoryCatalog, Intent,
        RecommendRequest, Recommendation, RecommendationEngine, SearchFilters,
    };
}
