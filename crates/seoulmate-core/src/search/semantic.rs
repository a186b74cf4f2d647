//! Semantic retriever adapter
//!
//! Wraps a [`SemanticIndex`] with width bounding, deterministic ordering
//! and the shared query cache.

use std::sync::Arc;

use super::cache::QueryCache;
use super::retriever::{RetrieverError, ScoredId, SemanticIndex};

/// Separates the two key parts; cannot occur in normalized text
const KEY_SEPARATOR: char = '\u{1f}';

/// Cached result list
pub type CachedHits = Arc<Vec<ScoredId>>;

/// Semantic channel: expanded text in, `(item_id, similarity)` out
pub struct SemanticRetriever {
    index: Arc<dyn SemanticIndex>,
    cache: Arc<QueryCache<CachedHits>>,
}

impl SemanticRetriever {
    /// Wrap an index with a cache
    pub fn new(index: Arc<dyn SemanticIndex>, cache: Arc<QueryCache<CachedHits>>) -> Self {
        Self { index, cache }
    }

    fn cache_key(normalized: &str, text: &str, k: usize) -> String {
        format!("{normalized}{KEY_SEPARATOR}{text}{KEY_SEPARATOR}{k}")
    }

    /// Search with the expanded text, at most `k` results
    ///
    /// Results are ordered by similarity descending, then id ascending.
    /// Only successful lookups are cached.
    pub fn search(&self, normalized: &str, text: &str, k: usize) -> Result<CachedHits, RetrieverError> {
        let key = Self::cache_key(normalized, text, k);
        if let Some(hits) = self.cache.get(&key) {
            tracing::trace!(k, "Semantic cache hit");
            return Ok(hits);
        }

        let mut hits = self.index.embed_and_search(text, k)?;
        hits.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        hits.truncate(k);

        let hits = Arc::new(hits);
        self.cache.insert(key, Arc::clone(&hits));
        Ok(hits)
    }
}
