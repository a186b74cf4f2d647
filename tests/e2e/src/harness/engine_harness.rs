//! Engine Harness
//!
//! Builds engines over the fixture catalog the way a deployment would:
//! the catalog is written to a JSON export in a temporary directory and
//! loaded back through `InMemoryCatalog::load`.

use std::sync::Arc;

use tempfile::TempDir;

use seoulmate_core::{
    Bm25Index, CatalogItem, EngineBuilder, EngineConfig, FuzzyTitleMatcher, InMemoryCatalog,
    RecommendationEngine, TermOverlapModel,
};

use crate::mocks::{DramaFixtures, TokenOverlapSemantic};

/// Fixture catalog plus engine builders over it
///
/// # Example
///
/// ```rust,ignore
/// let harness = EngineHarness::new();
/// let engine = harness.engine();
///
/// // Swap a collaborator
/// let engine = harness.builder(EngineConfig::default())
///     .semantic_index(Arc::new(FailingSemantic))
///     .build()?;
/// ```
pub struct EngineHarness {
    /// Catalog loaded from the JSON export
    pub catalog: Arc<InMemoryCatalog>,
    /// Kept alive so the export outlives the harness
    _temp_dir: TempDir,
}

impl EngineHarness {
    /// Write the fixture catalog to disk and load it back
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = DramaFixtures::write_json(temp_dir.path());
        let catalog = InMemoryCatalog::load(&path).expect("Failed to load fixture catalog");

        Self {
            catalog: Arc::new(catalog),
            _temp_dir: temp_dir,
        }
    }

    /// Builder with every collaborator wired in
    ///
    /// Semantic search uses token overlap, lexical search uses BM25 with
    /// fuzzy title fallback, and reranking uses term overlap.
    pub fn builder(&self, config: EngineConfig) -> EngineBuilder {
        let items = self.items();
        self.bare_builder(config)
            .semantic_index(Arc::new(TokenOverlapSemantic::build(items.iter().copied())))
            .lexical_index(Arc::new(
                Bm25Index::build(items.iter().copied()).expect("Failed to build keyword index"),
            ))
            .title_matcher(Arc::new(FuzzyTitleMatcher::build(items.iter().copied())))
            .relevance_model(Arc::new(TermOverlapModel))
            .known_titles(items.iter().map(|item| item.title.clone()))
    }

    /// Builder with the catalog only; collaborators are up to the caller
    pub fn bare_builder(&self, config: EngineConfig) -> EngineBuilder {
        RecommendationEngine::builder(config, self.catalog.clone())
    }

    /// Fully wired engine with the default configuration
    pub fn engine(&self) -> RecommendationEngine {
        self.builder(EngineConfig::default())
            .build()
            .expect("default config is valid")
    }

    fn items(&self) -> Vec<&CatalogItem> {
        self.catalog.items().map(|item| item.as_ref()).collect()
    }
}

impl Default for EngineHarness {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_harness_loads_every_fixture() {
        let harness = EngineHarness::new();
        assert_eq!(harness.catalog.len(), DramaFixtures::items().len());
    }
}
