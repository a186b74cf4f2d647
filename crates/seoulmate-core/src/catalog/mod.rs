//! Catalog Module
//!
//! Read-only item records owned outside the ranking core. The engine only
//! ever asks the catalog for `get_item(id)`; everything else here exists so
//! a catalog can be loaded from a JSON export for the built-in collaborators.

mod genre;

pub use genre::Genre;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::Arc;

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Catalog loading error
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The export is not a JSON array of records
    #[error("Catalog parse error: {0}")]
    Parse(#[from] serde_json::Error),
    /// Two records share an identifier
    #[error("Duplicate item id: {0}")]
    DuplicateId(String),
}

// ============================================================================
// ITEM RECORD
// ============================================================================

/// A catalog item (one drama)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Stable item identifier
    pub id: String,
    /// Display title
    pub title: String,
    /// Genres from the fixed genre domain
    #[serde(default)]
    pub genres: BTreeSet<Genre>,
    /// Main cast, in billing order
    #[serde(default)]
    pub cast: Vec<String>,
    /// Director, when known
    #[serde(default)]
    pub director: Option<String>,
    /// Average user rating (0-10)
    #[serde(default)]
    pub rating: Option<f32>,
    /// Popularity, higher is more popular
    #[serde(default)]
    pub popularity: f32,
    /// First air year
    #[serde(default)]
    pub year: Option<i32>,
    /// Episode count
    #[serde(default)]
    pub episodes: Option<u32>,
    /// Synopsis text
    #[serde(default)]
    pub description: String,
    /// Free-form tags
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl CatalogItem {
    /// Create an item with only the identifying fields set
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            genres: BTreeSet::new(),
            cast: Vec::new(),
            director: None,
            rating: None,
            popularity: 0.0,
            year: None,
            episodes: None,
            description: String::new(),
            keywords: Vec::new(),
        }
    }

    /// Check if the item is tagged with a genre
    pub fn has_genre(&self, genre: Genre) -> bool {
        self.genres.contains(&genre)
    }

    /// Text used for lexical indexing and relevance scoring
    pub fn search_text(&self) -> String {
        let genres: Vec<&str> = self.genres.iter().map(Genre::as_str).collect();
        let mut text = format!("{} {} {}", self.title, genres.join(" "), self.description);
        for name in &self.cast {
            text.push(' ');
            text.push_str(name);
        }
        if let Some(director) = &self.director {
            text.push(' ');
            text.push_str(director);
        }
        for keyword in &self.keywords {
            text.push(' ');
            text.push_str(keyword);
        }
        text
    }
}

/// Catalog export record, tolerant of unknown genres and loose numbers
#[derive(Debug, Deserialize)]
struct RawItem {
    id: String,
    title: String,
    #[serde(default)]
    genres: Vec<String>,
    #[serde(default)]
    cast: Vec<String>,
    #[serde(default)]
    director: Option<String>,
    #[serde(default)]
    rating: Option<f32>,
    #[serde(default)]
    popularity: Option<f32>,
    #[serde(default)]
    year: Option<i32>,
    #[serde(default)]
    episodes: Option<u32>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    keywords: Vec<String>,
}

impl RawItem {
    fn into_item(self) -> Option<CatalogItem> {
        if self.id.trim().is_empty() || self.title.trim().is_empty() {
            return None;
        }
        let genres = self
            .genres
            .iter()
            .filter_map(|g| g.parse::<Genre>().ok())
            .collect();
        Some(CatalogItem {
            id: self.id,
            title: self.title,
            genres,
            cast: self.cast,
            director: self.director.filter(|d| !d.trim().is_empty()),
            rating: self.rating.filter(|r| r.is_finite()),
            popularity: self.popularity.filter(|p| p.is_finite()).unwrap_or(0.0),
            year: self.year,
            episodes: self.episodes,
            description: self.description,
            keywords: self.keywords,
        })
    }
}

// ============================================================================
// CATALOG TRAIT
// ============================================================================

/// Read-only item lookup used by the ranking pipeline
pub trait Catalog: Send + Sync {
    /// Fetch an item by identifier
    fn get_item(&self, id: &str) -> Option<Arc<CatalogItem>>;
}

// ============================================================================
// IN-MEMORY CATALOG
// ============================================================================

/// Catalog held entirely in memory, loaded once at startup
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    items: Vec<Arc<CatalogItem>>,
    by_id: HashMap<String, usize>,
}

impl InMemoryCatalog {
    /// Build a catalog from items, rejecting duplicate identifiers
    pub fn from_items(items: Vec<CatalogItem>) -> Result<Self, CatalogError> {
        let mut by_id = HashMap::with_capacity(items.len());
        let mut stored = Vec::with_capacity(items.len());

        for item in items {
            if by_id.contains_key(&item.id) {
                return Err(CatalogError::DuplicateId(item.id));
            }
            by_id.insert(item.id.clone(), stored.len());
            stored.push(Arc::new(item));
        }

        Ok(Self { items: stored, by_id })
    }

    /// Parse a JSON array of records
    ///
    /// Records missing an id or title, or whose fields have the wrong shape,
    /// are skipped with a warning instead of failing the whole load.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let values: Vec<serde_json::Value> = serde_json::from_str(json)?;
        let total = values.len();

        let items: Vec<CatalogItem> = values
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| {
                match serde_json::from_value::<RawItem>(value) {
                    Ok(raw) => {
                        let item = raw.into_item();
                        if item.is_none() {
                            tracing::warn!(index, "Skipping catalog record without id or title");
                        }
                        item
                    }
                    Err(e) => {
                        tracing::warn!(index, error = %e, "Skipping malformed catalog record");
                        None
                    }
                }
            })
            .collect();

        tracing::debug!(loaded = items.len(), total, "Catalog parsed");
        Self::from_items(items)
    }

    /// Load a JSON export from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate over all items in load order
    pub fn items(&self) -> impl Iterator<Item = &Arc<CatalogItem>> {
        self.items.iter()
    }
}

impl Catalog for InMemoryCatalog {
    fn get_item(&self, id: &str) -> Option<Arc<CatalogItem>> {
        self.by_id.get(id).map(|&index| Arc::clone(&self.items[index]))
    }
}

// ============================================================================
// TESTS
// ============================================================================
