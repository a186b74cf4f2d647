//! Query Understanding
//!
//! Turns free text into something the retrievers can act on:
//! - Intent classification over curated lexicons
//! - Entity extraction (actors, genres, years, emotions, episode constraints)
//! - Synonym expansion for the semantic channel

mod expander;
mod extractor;
mod lexicon;

pub use expander::{default_synonyms, ExpansionConfig, QueryExpander, DEFAULT_TERMS_PER_TOKEN};
pub use extractor::{EntityExtractor, AMBIGUITY_PENALTY, DEGENERATE_CONFIDENCE, FALLBACK_CONFIDENCE};
pub use lexicon::Lexicon;

use crate::catalog::Genre;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

// ============================================================================
// INTENT
// ============================================================================

/// Classified purpose of a query
///
/// Declaration order is specificity order: when several rules match,
/// the earliest variant wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Intent {
    /// "something like Goblin"
    SimilarTo,
    /// "Park Seo-joon drama"
    ActorBased,
    /// "2023 dramas", "recent shows"
    YearBased,
    /// "sad emotional drama"
    EmotionBased,
    /// "medical drama", "romantic comedy"
    GenreBrowse,
    /// "best thriller", "top 10"
    TopRated,
    /// "short drama under 12 episodes"
    Constraint,
    /// "what's trending"
    Trending,
    /// "Crash Landing on You"
    SpecificTitle,
    /// Nothing recognizable
    Vague,
}

impl Intent {
    /// All intents in specificity order
    pub const PRECEDENCE: [Intent; 10] = [
        Intent::SimilarTo,
        Intent::ActorBased,
        Intent::YearBased,
        Intent::EmotionBased,
        Intent::GenreBrowse,
        Intent::TopRated,
        Intent::Constraint,
        Intent::Trending,
        Intent::SpecificTitle,
        Intent::Vague,
    ];

    /// Stable string form
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::SimilarTo => "SIMILAR_TO",
            Intent::ActorBased => "ACTOR_BASED",
            Intent::YearBased => "YEAR_BASED",
            Intent::EmotionBased => "EMOTION_BASED",
            Intent::GenreBrowse => "GENRE_BROWSE",
            Intent::TopRated => "TOP_RATED",
            Intent::Constraint => "CONSTRAINT",
            Intent::Trending => "TRENDING",
            Intent::SpecificTitle => "SPECIFIC_TITLE",
            Intent::Vague => "VAGUE",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Intent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_uppercase().replace(['-', ' '], "_");
        Intent::PRECEDENCE
            .into_iter()
            .find(|intent| intent.as_str() == wanted)
            .ok_or_else(|| format!("Unknown intent: {}", s))
    }
}

impl TryFrom<String> for Intent {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Intent> for String {
    fn from(intent: Intent) -> Self {
        intent.as_str().to_string()
    }
}

// ============================================================================
// ENTITIES
// ============================================================================

/// Episode-count bounds mentioned in a query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeConstraint {
    /// "under 12 episodes"
    pub max_episodes: Option<u32>,
    /// "more than 20 episodes"
    pub min_episodes: Option<u32>,
}

impl EpisodeConstraint {
    /// Check if no bound was mentioned
    pub fn is_empty(&self) -> bool {
        self.max_episodes.is_none() && self.min_episodes.is_none()
    }
}

/// Structured entities extracted from a query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entities {
    /// Actor names in canonical lexicon form
    pub actors: BTreeSet<String>,
    /// Genres from the fixed genre domain
    pub genres: BTreeSet<Genre>,
    /// Four-digit years
    pub years: BTreeSet<i32>,
    /// Emotion keywords
    pub emotions: BTreeSet<String>,
    /// Reference title for "like X" queries (normalized text)
    pub reference: Option<String>,
    /// Episode-count bounds
    pub constraints: EpisodeConstraint,
}

impl Entities {
    /// Check if nothing was extracted
    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
            && self.genres.is_empty()
            && self.years.is_empty()
            && self.emotions.is_empty()
            && self.reference.is_none()
            && self.constraints.is_empty()
    }
}

// ============================================================================
// ANALYSIS RESULTS
// ============================================================================

/// Output of `analyze`: intent, entities and classification confidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryAnalysis {
    /// Winning intent
    pub intent: Intent,
    /// Classification confidence in [0, 1]
    pub confidence: f32,
    /// Extracted entities
    pub entities: Entities,
}

/// A fully prepared query for one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// Text as received
    pub raw: String,
    /// Lowercased, punctuation-free form used by the lexical channel
    pub normalized: String,
    /// Synonym-augmented form used by the semantic channel only
    pub expanded: String,
    /// Intent, confidence and entities
    pub analysis: QueryAnalysis,
}

impl Query {
    /// Check if the query carries no searchable text
    pub fn is_degenerate(&self) -> bool {
        self.normalized.is_empty()
    }
}

// ============================================================================
// NORMALIZATION
// ============================================================================

/// Normalize text for matching
///
/// Lowercases, turns every non-alphanumeric character into a separator and
/// collapses runs of whitespace, so "Park Seo-joon!" becomes "park seo joon".
/// Lexicon phrases go through the same function, which keeps matching
/// symmetric.
pub fn normalize(text: &str) -> String {
    let mapped: String = text
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .flat_map(char::to_lowercase)
        .collect();
    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}
