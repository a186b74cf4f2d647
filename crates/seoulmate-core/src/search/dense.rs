//! Dense semantic index (fastembed + usearch)
//!
//! Item search texts are embedded once at startup and stored in an HNSW
//! index. Queries are embedded on demand and answered by cosine distance.

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::sync::Mutex;

use super::retriever::{RetrieverError, ScoredId, SemanticIndex};
use super::vector::VectorStore;
use crate::catalog::CatalogItem;

/// Texts embedded per model call while building
const BATCH_SIZE: usize = 32;

/// Longest text sent to the model, in bytes
const MAX_TEXT_LENGTH: usize = 8192;

fn truncate(text: &str) -> &str {
    if text.len() <= MAX_TEXT_LENGTH {
        return text;
    }
    let mut end = MAX_TEXT_LENGTH;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Embedding-backed semantic index
pub struct DenseIndex {
    model: Mutex<TextEmbedding>,
    store: Option<VectorStore>,
}

impl DenseIndex {
    /// Load the embedding model and index every item's search text
    pub fn build<'a>(items: impl IntoIterator<Item = &'a CatalogItem>) -> Result<Self, RetrieverError> {
        let options = InitOptions::new(EmbeddingModel::NomicEmbedTextV15).with_show_download_progress(false);
        let mut model = TextEmbedding::try_new(options)
            .map_err(|e| RetrieverError::Unavailable(format!("embedding model init: {e}")))?;

        let items: Vec<&CatalogItem> = items.into_iter().collect();
        let texts: Vec<String> = items.iter().map(|item| item.search_text()).collect();
        let mut store: Option<VectorStore> = None;

        for (chunk_items, chunk_texts) in items.chunks(BATCH_SIZE).zip(texts.chunks(BATCH_SIZE)) {
            let batch: Vec<&str> = chunk_texts.iter().map(|t| truncate(t)).collect();
            let embeddings = model
                .embed(batch, None)
                .map_err(|e| RetrieverError::Failed(format!("embedding failed: {e}")))?;

            for (item, vector) in chunk_items.iter().zip(embeddings) {
                // Width comes from the first embedding
                if store.is_none() {
                    let created = VectorStore::new(vector.len())?;
                    created.reserve(items.len())?;
                    store = Some(created);
                }
                if let Some(store) = store.as_mut() {
                    store.add(&item.id, &vector)?;
                }
            }
        }

        tracing::info!(
            items = store.as_ref().map_or(0, VectorStore::len),
            "Dense index built"
        );
        Ok(Self {
            model: Mutex::new(model),
            store,
        })
    }
}

impl SemanticIndex for DenseIndex {
    fn embed_and_search(&self, text: &str, k: usize) -> Result<Vec<ScoredId>, RetrieverError> {
        let Some(store) = self.store.as_ref().filter(|s| !s.is_empty()) else {
            return Err(RetrieverError::Unavailable("dense index is empty".to_string()));
        };
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let query = {
            let mut model = self
                .model
                .lock()
                .map_err(|_| RetrieverError::Failed("embedding model lock poisoned".to_string()))?;
            model
                .embed(vec![truncate(text)], None)
                .map_err(|e| RetrieverError::Failed(e.to_string()))?
                .into_iter()
                .next()
                .ok_or_else(|| RetrieverError::Failed("no embedding generated".to_string()))?
        };

        store.search(&query, k)
    }
}
