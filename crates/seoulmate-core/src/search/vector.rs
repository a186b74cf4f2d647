//! HNSW vector store (usearch)
//!
//! Holds one embedding per catalog item and answers nearest-neighbour
//! queries by cosine similarity. Keys are assigned in insertion order and
//! mapped back to item ids on search.

use usearch::{Index, IndexOptions, MetricKind, ScalarKind};

use super::retriever::{RetrieverError, ScoredId};

// ============================================================================
// CONSTANTS
// ============================================================================

/// HNSW connectivity parameter
pub const DEFAULT_CONNECTIVITY: usize = 16;

/// HNSW expansion factor while adding
pub const DEFAULT_EXPANSION_ADD: usize = 128;

/// HNSW expansion factor while searching
pub const DEFAULT_EXPANSION_SEARCH: usize = 64;

// ============================================================================
// VECTOR STORE
// ============================================================================

/// Cosine HNSW index keyed by item id
pub struct VectorStore {
    index: Index,
    dimensions: usize,
    ids: Vec<String>,
}

impl VectorStore {
    /// Create an empty store for vectors of the given width
    pub fn new(dimensions: usize) -> Result<Self, RetrieverError> {
        let options = IndexOptions {
            dimensions,
            metric: MetricKind::Cos,
            quantization: ScalarKind::F32,
            connectivity: DEFAULT_CONNECTIVITY,
            expansion_add: DEFAULT_EXPANSION_ADD,
            expansion_search: DEFAULT_EXPANSION_SEARCH,
            multi: false,
        };
        let index = Index::new(&options)
            .map_err(|e| RetrieverError::Failed(format!("vector index creation: {e}")))?;

        Ok(Self {
            index,
            dimensions,
            ids: Vec::new(),
        })
    }

    /// Number of stored vectors
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check if nothing is stored
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Vector width
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Reserve room for `additional` more vectors
    ///
    /// usearch requires capacity before `add`.
    pub fn reserve(&self, additional: usize) -> Result<(), RetrieverError> {
        self.index
            .reserve(self.ids.len() + additional)
            .map_err(|e| RetrieverError::Failed(format!("vector index reserve: {e}")))
    }

    /// Store the vector for an item
    pub fn add(&mut self, id: &str, vector: &[f32]) -> Result<(), RetrieverError> {
        self.check_dimensions(vector)?;
        if self.index.capacity() <= self.ids.len() {
            self.reserve(self.ids.len().max(16))?;
        }

        let key = self.ids.len() as u64;
        self.index
            .add(key, vector)
            .map_err(|e| RetrieverError::Failed(format!("vector index add: {e}")))?;
        self.ids.push(id.to_string());
        Ok(())
    }

    /// The `k` nearest items, most similar first
    ///
    /// Similarity is `1 - cosine distance`.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredId>, RetrieverError> {
        self.check_dimensions(query)?;
        if self.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let matches = self
            .index
            .search(query, k)
            .map_err(|e| RetrieverError::Failed(format!("vector search: {e}")))?;

        let mut hits: Vec<ScoredId> = matches
            .keys
            .iter()
            .zip(matches.distances.iter())
            .filter_map(|(key, distance)| {
                let id = self.ids.get(*key as usize)?;
                Some((id.clone(), 1.0 - distance))
            })
            .collect();
        hits.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Ok(hits)
    }

    fn check_dimensions(&self, vector: &[f32]) -> Result<(), RetrieverError> {
        if vector.len() != self.dimensions {
            return Err(RetrieverError::Failed(format!(
                "vector has {} dimensions, index expects {}",
                vector.len(),
                self.dimensions
            )));
        }
        Ok(())
    }
}
