//! Scripted Collaborators
//!
//! Stand-ins for the dense index and the rerank model so journeys run
//! without downloading embedding models:
//! - `TokenOverlapSemantic` scores items by shared tokens, a crude but
//!   deterministic proxy for embedding similarity
//! - `FixedSemantic` replays a scripted hit list
//! - `FixedLexical` replays scripted hits, malformed scores included
//! - `ReversingRelevance` flips the fused order of whatever it reranks
//! - Failing and slow variants drive the degradation paths

use std::collections::HashSet;
use std::thread;
use std::time::Duration;

use seoulmate_core::search::tokenize;
use seoulmate_core::{
    CatalogItem, LexicalIndex, RelevanceModel, RetrieverError, ScoredId, SemanticIndex,
};

/// Semantic index scoring each item by the share of query tokens it contains
pub struct TokenOverlapSemantic {
    docs: Vec<(String, HashSet<String>)>,
}

impl TokenOverlapSemantic {
    pub fn build<'a>(items: impl IntoIterator<Item = &'a CatalogItem>) -> Self {
        let docs = items
            .into_iter()
            .map(|item| (item.id.clone(), tokenize(&item.search_text()).into_iter().collect()))
            .collect();
        Self { docs }
    }
}

impl SemanticIndex for TokenOverlapSemantic {
    fn embed_and_search(&self, text: &str, k: usize) -> Result<Vec<ScoredId>, RetrieverError> {
        let query: HashSet<String> = tokenize(text).into_iter().collect();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let mut hits: Vec<ScoredId> = self
            .docs
            .iter()
            .filter_map(|(id, tokens)| {
                let shared = query.intersection(tokens).count();
                (shared > 0).then(|| (id.clone(), shared as f32 / query.len() as f32))
            })
            .collect();
        hits.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        hits.truncate(k);
        Ok(hits)
    }
}

/// Semantic index that replays a fixed hit list
pub struct FixedSemantic(pub Vec<ScoredId>);

impl SemanticIndex for FixedSemantic {
    fn embed_and_search(&self, _text: &str, k: usize) -> Result<Vec<ScoredId>, RetrieverError> {
        Ok(self.0.iter().take(k).cloned().collect())
    }
}

/// Semantic index whose backend is down
pub struct FailingSemantic;

impl SemanticIndex for FailingSemantic {
    fn embed_and_search(&self, _text: &str, _k: usize) -> Result<Vec<ScoredId>, RetrieverError> {
        Err(RetrieverError::Unavailable("embedding service offline".to_string()))
    }
}

/// Lexical index that errors on every call
pub struct FailingLexical;

impl LexicalIndex for FailingLexical {
    fn lexical_search(&self, _text: &str, _k: usize) -> Result<Vec<ScoredId>, RetrieverError> {
        Err(RetrieverError::Failed("inverted index corrupted".to_string()))
    }
}

/// Lexical index that replays a fixed hit list, scores included
pub struct FixedLexical(pub Vec<ScoredId>);

impl LexicalIndex for FixedLexical {
    fn lexical_search(&self, _text: &str, k: usize) -> Result<Vec<ScoredId>, RetrieverError> {
        Ok(self.0.iter().take(k).cloned().collect())
    }
}

/// Relevance model that ranks documents in reverse of the order given
pub struct ReversingRelevance;

impl RelevanceModel for ReversingRelevance {
    fn score_pairs(&self, _query: &str, documents: &[String]) -> Result<Vec<f32>, RetrieverError> {
        Ok((0..documents.len()).map(|i| i as f32).collect())
    }
}

/// Relevance model that takes longer than any sane deadline
pub struct SlowRelevance(pub Duration);

impl RelevanceModel for SlowRelevance {
    fn score_pairs(&self, _query: &str, documents: &[String]) -> Result<Vec<f32>, RetrieverError> {
        thread::sleep(self.0);
        // Reverse the fused order if it ever finishes
        Ok((0..documents.len()).map(|i| i as f32).collect())
    }
}

/// Relevance model that always fails
pub struct BrokenRelevance;

impl RelevanceModel for BrokenRelevance {
    fn score_pairs(&self, _query: &str, _documents: &[String]) -> Result<Vec<f32>, RetrieverError> {
        Err(RetrieverError::Failed("model weights missing".to_string()))
    }
}
