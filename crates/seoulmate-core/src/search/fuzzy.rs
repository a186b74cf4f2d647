//! Approximate title matching
//!
//! Normalized Levenshtein similarity between the query and each title. A
//! query is compared against the whole title and against every run of title
//! words with the same word count, so "gobln" finds "Goblin" and "crash
//! landing" finds "Crash Landing on You".

use super::retriever::{ScoredId, TitleMatcher};
use crate::catalog::CatalogItem;
use crate::query::normalize;

/// Queries shorter than this are only compared to whole titles
const MIN_WINDOW_QUERY_LEN: usize = 4;

/// Fuzzy matcher over catalog titles
#[derive(Debug, Default)]
pub struct FuzzyTitleMatcher {
    titles: Vec<(String, String)>,
}

impl FuzzyTitleMatcher {
    /// Collect and normalize the titles of catalog items
    pub fn build<'a>(items: impl IntoIterator<Item = &'a CatalogItem>) -> Self {
        Self {
            titles: items
                .into_iter()
                .map(|item| (item.id.clone(), normalize(&item.title)))
                .filter(|(_, title)| !title.is_empty())
                .collect(),
        }
    }

    /// Best similarity between a normalized query and a normalized title
    pub fn similarity(query: &str, title: &str) -> f32 {
        let mut best = strsim::normalized_levenshtein(query, title);

        let query_words = query.split(' ').count();
        let title_words: Vec<&str> = title.split(' ').collect();
        if query.chars().count() >= MIN_WINDOW_QUERY_LEN && query_words < title_words.len() {
            for window in title_words.windows(query_words) {
                let candidate = window.join(" ");
                best = best.max(strsim::normalized_levenshtein(query, &candidate));
            }
        }

        best as f32
    }
}

impl TitleMatcher for FuzzyTitleMatcher {
    fn fuzzy_title_match(&self, text: &str, threshold: f32) -> Vec<ScoredId> {
        let query = normalize(text);
        if query.is_empty() {
            return Vec::new();
        }

        let mut matches: Vec<ScoredId> = self
            .titles
            .iter()
            .map(|(id, title)| (id.clone(), Self::similarity(&query, title)))
            .filter(|(_, ratio)| *ratio >= threshold)
            .collect();

        matches.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        matches
    }
}
