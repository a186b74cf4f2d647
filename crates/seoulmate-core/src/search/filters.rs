//! Result filters
//!
//! Explicit request filters merged with the hints the weighting policy
//! derives from the query. Filtering is strict: an item missing the data an
//! active filter needs (no year, no episode count) does not pass.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::catalog::{CatalogItem, Genre};
use crate::weighting::AutoFilterHints;

/// Filters applied after fusion and before truncation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchFilters {
    /// Genres every result must carry
    pub genres: BTreeSet<Genre>,
    /// Director name, case-insensitive exact match
    pub director: Option<String>,
    /// Minimum rating, inclusive
    pub min_rating: Option<f32>,
    /// First air year
    pub year: Option<i32>,
    /// Maximum episode count, inclusive
    pub max_episodes: Option<u32>,
    /// Minimum episode count, inclusive
    pub min_episodes: Option<u32>,
}

impl SearchFilters {
    /// Require a genre
    pub fn with_genre(mut self, genre: Genre) -> Self {
        self.genres.insert(genre);
        self
    }

    /// Require a director
    pub fn with_director(mut self, director: impl Into<String>) -> Self {
        self.director = Some(director.into());
        self
    }

    /// Require a minimum rating
    pub fn with_min_rating(mut self, rating: f32) -> Self {
        self.min_rating = Some(rating);
        self
    }

    /// Require a first air year
    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    /// Check if nothing is filtered
    pub fn is_empty(&self) -> bool {
        self.genres.is_empty()
            && self.director.is_none()
            && self.min_rating.is_none()
            && self.year.is_none()
            && self.max_episodes.is_none()
            && self.min_episodes.is_none()
    }

    /// Add query-derived hints; explicit bounds take precedence
    pub fn merge_hints(&self, hints: &AutoFilterHints) -> Self {
        let mut merged = self.clone();
        merged.genres.extend(hints.genres.iter().copied());
        merged.max_episodes = merged.max_episodes.or(hints.max_episodes);
        merged.min_episodes = merged.min_episodes.or(hints.min_episodes);
        merged
    }

    /// Check an item against every active filter
    pub fn matches(&self, item: &CatalogItem) -> bool {
        if !self.genres.iter().all(|g| item.has_genre(*g)) {
            return false;
        }
        if let Some(director) = &self.director {
            let wanted = director.trim();
            if !item
                .director
                .as_deref()
                .is_some_and(|d| d.trim().eq_ignore_ascii_case(wanted))
            {
                return false;
            }
        }
        if let Some(floor) = self.min_rating {
            if !item.rating.is_some_and(|r| r >= floor) {
                return false;
            }
        }
        if let Some(year) = self.year {
            if item.year != Some(year) {
                return false;
            }
        }
        if let Some(max) = self.max_episodes {
            if !item.episodes.is_some_and(|e| e <= max) {
                return false;
            }
        }
        if let Some(min) = self.min_episodes {
            if !item.episodes.is_some_and(|e| e >= min) {
                return false;
            }
        }
        true
    }
}
