//! Lexical retriever adapter
//!
//! Wraps a [`LexicalIndex`] and a [`TitleMatcher`]. When the index finds no
//! meaningful overlap the query is treated as a possible title typo and the
//! fuzzy matcher takes over with capped scores.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;

use super::retriever::{LexicalIndex, RetrieverError, ScoredId, TitleMatcher};
use crate::catalog::Catalog;

/// Fuzzy fallback configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuzzyConfig {
    /// Minimum title similarity ratio
    pub threshold: f32,
    /// Upper bound on the synthetic score of a fuzzy match
    pub score_cap: f32,
    /// Best lexical score at or below this means no meaningful overlap
    pub min_lexical_score: f32,
}

impl Default for FuzzyConfig {
    fn default() -> Self {
        Self {
            threshold: 0.70,
            score_cap: 0.9,
            min_lexical_score: 1e-6,
        }
    }
}

/// Lexical channel output
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LexicalOutcome {
    /// Ordered hits
    pub hits: Vec<ScoredId>,
    /// Whether the hits came from the fuzzy title matcher
    pub fuzzy_fallback: bool,
    /// Index entries dropped for a non-finite score
    pub malformed: usize,
}

/// Lexical channel: original text in, `(item_id, score)` out
pub struct LexicalRetriever {
    index: Arc<dyn LexicalIndex>,
    titles: Option<Arc<dyn TitleMatcher>>,
    catalog: Arc<dyn Catalog>,
    fuzzy: FuzzyConfig,
}

impl LexicalRetriever {
    /// Create a lexical retriever
    pub fn new(
        index: Arc<dyn LexicalIndex>,
        titles: Option<Arc<dyn TitleMatcher>>,
        catalog: Arc<dyn Catalog>,
        fuzzy: FuzzyConfig,
    ) -> Self {
        Self {
            index,
            titles,
            catalog,
            fuzzy,
        }
    }

    fn popularity(&self, id: &str) -> f32 {
        self.catalog.get_item(id).map(|item| item.popularity).unwrap_or(0.0)
    }

    /// Score descending, then catalog popularity descending, then id ascending
    fn order(&self, a: &ScoredId, b: &ScoredId) -> Ordering {
        b.1.total_cmp(&a.1)
            .then_with(|| self.popularity(&b.0).total_cmp(&self.popularity(&a.0)))
            .then_with(|| a.0.cmp(&b.0))
    }

    /// Search with the unexpanded text, at most `k` results
    pub fn search(&self, text: &str, k: usize) -> Result<LexicalOutcome, RetrieverError> {
        let raw = self.index.lexical_search(text, k)?;
        let returned = raw.len();
        let mut hits: Vec<ScoredId> = raw.into_iter().filter(|(_, score)| score.is_finite()).collect();
        let malformed = returned - hits.len();
        if malformed > 0 {
            tracing::debug!(malformed, "Lexical index returned non-finite scores");
        }

        let best = hits.iter().map(|(_, s)| *s).fold(f32::NEG_INFINITY, f32::max);
        let mut fuzzy_fallback = false;

        if hits.is_empty() || best <= self.fuzzy.min_lexical_score {
            if let Some(titles) = &self.titles {
                let matches = titles.fuzzy_title_match(text, self.fuzzy.threshold);
                if !matches.is_empty() {
                    tracing::debug!(matches = matches.len(), "Lexical miss, using fuzzy title matches");
                    hits = matches
                        .into_iter()
                        .map(|(id, ratio)| (id, ratio.min(self.fuzzy.score_cap)))
                        .collect();
                    fuzzy_fallback = true;
                }
            }
        }

        hits.sort_by(|a, b| self.order(a, b));
        hits.truncate(k);
        Ok(LexicalOutcome {
            hits,
            fuzzy_fallback,
            malformed,
        })
    }
}
