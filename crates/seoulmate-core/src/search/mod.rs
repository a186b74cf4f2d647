//! Search Module
//!
//! Retrieval and ranking building blocks:
//! - Collaborator contracts for dense, sparse, title and relevance models
//! - Semantic and lexical channel adapters with caching and fuzzy fallback
//! - Min-max fusion, popularity boost, filters and deterministic ordering
//! - Deadline-bounded reranking
//! - Built-in BM25, fuzzy title and term-overlap collaborators

mod cache;
#[cfg(feature = "embeddings")]
mod dense;
mod filters;
mod fuzzy;
mod hybrid;
mod keyword;
mod lexical;
mod reranker;
mod retriever;
mod semantic;
#[cfg(feature = "vector-search")]
mod vector;

pub use cache::QueryCache;
pub use filters::SearchFilters;
pub use fuzzy::FuzzyTitleMatcher;
pub use hybrid::{
    apply_popularity_boost, compare_candidates, fuse, fuse_score, min_max_normalize,
    sort_candidates, Candidate, FusionOutcome,
};
pub use keyword::{tokenize, Bm25Index};
pub use lexical::{FuzzyConfig, LexicalOutcome, LexicalRetriever};
pub use reranker::{
    Reranker, RerankerConfig, RerankerError, TermOverlapModel, DEFAULT_RERANK_TIMEOUT,
    MAX_RERANK_DEPTH,
};
pub use retriever::{
    LexicalIndex, RelevanceModel, RetrieverError, ScoredId, SemanticIndex, TitleMatcher,
};
pub use semantic::{CachedHits, SemanticRetriever};

#[cfg(feature = "embeddings")]
pub use dense::DenseIndex;
#[cfg(feature = "embeddings")]
pub use reranker::CrossEncoderModel;
#[cfg(feature = "vector-search")]
pub use vector::VectorStore;
