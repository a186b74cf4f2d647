//! Collaborator contracts
//!
//! The engine never builds indexes or trains models. It consumes them
//! through these traits, which the built-in in-process implementations and
//! any external service adapters both satisfy.

/// An `(item_id, score)` pair as returned by a retrieval channel
pub type ScoredId = (String, f32);

/// Retrieval channel error
#[non_exhaustive]
#[derive(Debug, Clone, thiserror::Error)]
pub enum RetrieverError {
    /// The index is empty or cannot be reached
    #[error("Retriever unavailable: {0}")]
    Unavailable(String),
    /// The index was reached but the search failed
    #[error("Retrieval failed: {0}")]
    Failed(String),
}

/// Dense nearest-neighbour index
pub trait SemanticIndex: Send + Sync {
    /// Embed `text` and return up to `k` nearest items with their similarity
    fn embed_and_search(&self, text: &str, k: usize) -> Result<Vec<ScoredId>, RetrieverError>;
}

/// Sparse inverted-index ranker
pub trait LexicalIndex: Send + Sync {
    /// Return up to `k` items ranked by term relevance
    fn lexical_search(&self, text: &str, k: usize) -> Result<Vec<ScoredId>, RetrieverError>;
}

/// Approximate title matcher
pub trait TitleMatcher: Send + Sync {
    /// Titles whose similarity ratio to `text` is at least `threshold`
    ///
    /// Ratios are in [0, 1].
    fn fuzzy_title_match(&self, text: &str, threshold: f32) -> Vec<ScoredId>;
}

/// Pairwise query/document relevance model used by the rerank stage
pub trait RelevanceModel: Send + Sync {
    /// One score per document, in input order
    fn score_pairs(&self, query: &str, documents: &[String]) -> Result<Vec<f32>, RetrieverError>;
}
