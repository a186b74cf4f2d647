//! Candidate Reranking
//!
//! ## Two-Stage Ranking
//!
//! 1. Stage 1: hybrid fusion over both channels (fast, high recall)
//! 2. Stage 2: a pairwise relevance model scores query vs. description for
//!    the top-M fused candidates (slower, high precision)
//!
//! The model call runs on the blocking pool under a deadline. A slow or
//! failing model never fails the request; the caller keeps fused order.
//!
//! With the `embeddings` feature a fastembed cross-encoder is available.
//! [`TermOverlapModel`] is the always-available BM25-style fallback.

use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "embeddings")]
use fastembed::{RerankInitOptions, RerankerModel, TextRerank};
#[cfg(feature = "embeddings")]
use std::sync::Mutex;

use super::keyword::tokenize;
use super::retriever::{RelevanceModel, RetrieverError};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Upper bound on how many candidates are reranked
pub const MAX_RERANK_DEPTH: usize = 20;

/// Default rerank deadline
pub const DEFAULT_RERANK_TIMEOUT: Duration = Duration::from_millis(500);

// ============================================================================
// TYPES
// ============================================================================

/// Rerank error
#[non_exhaustive]
#[derive(Debug, Clone, thiserror::Error)]
pub enum RerankerError {
    /// The model did not answer within the deadline
    #[error("Rerank timed out after {0:?}")]
    Timeout(Duration),
    /// The model failed or its task panicked
    #[error("Reranking failed: {0}")]
    Failed(String),
    /// The model returned a different number of scores than documents
    #[error("Reranker returned {got} scores for {expected} documents")]
    LengthMismatch {
        /// Documents sent
        expected: usize,
        /// Scores received
        got: usize,
    },
}

/// Configuration for reranking
#[derive(Debug, Clone, Copy)]
pub struct RerankerConfig {
    /// Number of top candidates to rerank (capped at [`MAX_RERANK_DEPTH`])
    pub depth: usize,
    /// Deadline for one model call
    pub timeout: Duration,
}

impl Default for RerankerConfig {
    fn default() -> Self {
        Self {
            depth: MAX_RERANK_DEPTH,
            timeout: DEFAULT_RERANK_TIMEOUT,
        }
    }
}

// ============================================================================
// RERANKER SERVICE
// ============================================================================

/// Deadline-bounded wrapper around a [`RelevanceModel`]
pub struct Reranker {
    model: Arc<dyn RelevanceModel>,
    config: RerankerConfig,
}

impl Reranker {
    /// Create a reranker
    pub fn new(model: Arc<dyn RelevanceModel>, config: RerankerConfig) -> Self {
        Self {
            model,
            config: RerankerConfig {
                depth: config.depth.min(MAX_RERANK_DEPTH),
                ..config
            },
        }
    }

    /// Effective rerank depth
    pub fn depth(&self) -> usize {
        self.config.depth
    }

    /// Score documents against the query, one score per document
    pub async fn score(&self, query: &str, documents: Vec<String>) -> Result<Vec<f32>, RerankerError> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        let expected = documents.len();
        let model = Arc::clone(&self.model);
        let query = query.to_string();
        let task = tokio::task::spawn_blocking(move || model.score_pairs(&query, &documents));

        let scores = match tokio::time::timeout(self.config.timeout, task).await {
            Err(_) => return Err(RerankerError::Timeout(self.config.timeout)),
            Ok(Err(join)) => return Err(RerankerError::Failed(join.to_string())),
            Ok(Ok(Err(e))) => return Err(RerankerError::Failed(e.to_string())),
            Ok(Ok(Ok(scores))) => scores,
        };

        if scores.len() != expected {
            return Err(RerankerError::LengthMismatch {
                expected,
                got: scores.len(),
            });
        }
        if scores.iter().any(|s| !s.is_finite()) {
            return Err(RerankerError::Failed("non-finite relevance score".to_string()));
        }
        Ok(scores)
    }
}

// ============================================================================
// TERM OVERLAP MODEL
// ============================================================================

/// BM25-inspired term overlap relevance (no model download required)
///
/// Query and document are split with the keyword tokenizer and compared as
/// whole tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct TermOverlapModel;

impl TermOverlapModel {
    fn relevance(query_terms: &[String], document: &str) -> f32 {
        let doc_terms = tokenize(document);
        let doc_len = doc_terms.len() as f32;
        if doc_len == 0.0 || query_terms.is_empty() {
            return 0.0;
        }

        let k1 = 1.2_f32;
        let b = 0.75_f32;
        // Typical search text length, in tokens
        let avg_doc_len = 80.0_f32;

        let score: f32 = query_terms
            .iter()
            .map(|term| {
                let tf = doc_terms.iter().filter(|t| *t == term).count() as f32;
                if tf > 0.0 {
                    tf * (k1 + 1.0) / (tf + k1 * (1.0 - b + b * (doc_len / avg_doc_len)))
                } else {
                    0.0
                }
            })
            .sum();

        score / query_terms.len() as f32
    }
}

impl RelevanceModel for TermOverlapModel {
    fn score_pairs(&self, query: &str, documents: &[String]) -> Result<Vec<f32>, RetrieverError> {
        let mut terms = tokenize(query);
        terms.sort();
        terms.dedup();
        Ok(documents
            .iter()
            .map(|doc| Self::relevance(&terms, doc))
            .collect())
    }
}

// ============================================================================
// CROSS-ENCODER MODEL
// ============================================================================

/// fastembed cross-encoder (Jina Reranker v1 Turbo)
#[cfg(feature = "embeddings")]
pub struct CrossEncoderModel {
    model: Mutex<TextRerank>,
}

#[cfg(feature = "embeddings")]
impl CrossEncoderModel {
    /// Load the model, downloading it on first use
    ///
    /// Call at startup, not on a request path.
    pub fn try_new() -> Result<Self, RetrieverError> {
        let options = RerankInitOptions::new(RerankerModel::JINARerankerV1TurboEn)
            .with_show_download_progress(false);
        let model = TextRerank::try_new(options)
            .map_err(|e| RetrieverError::Unavailable(format!("cross-encoder init: {e}")))?;
        tracing::info!("Cross-encoder reranker loaded (Jina Reranker v1 Turbo)");
        Ok(Self {
            model: Mutex::new(model),
        })
    }
}

#[cfg(feature = "embeddings")]
impl RelevanceModel for CrossEncoderModel {
    fn score_pairs(&self, query: &str, documents: &[String]) -> Result<Vec<f32>, RetrieverError> {
        let docs: Vec<&str> = documents.iter().map(String::as_str).collect();
        let mut model = self
            .model
            .lock()
            .map_err(|_| RetrieverError::Failed("cross-encoder lock poisoned".to_string()))?;
        let results = model
            .rerank(query, &docs, false, None)
            .map_err(|e| RetrieverError::Failed(e.to_string()))?;

        let mut scores = vec![0.0; documents.len()];
        for result in results {
            if let Some(slot) = scores.get_mut(result.index) {
                *slot = result.score;
            }
        }
        Ok(scores)
    }
}

// ============================================================================
// TESTS
// ============================================================================
