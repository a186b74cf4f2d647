//! Weighting Policy
//!
//! Maps (intent, confidence) to fusion weights:
//! - `alpha` is the semantic weight, the lexical channel gets `1 - alpha`
//! - Below the confidence threshold alpha slides linearly toward 0.5
//! - Genre and episode entities become auto-filter hints, independent of alpha
//! - Some intents carry a popularity boost applied after fusion

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::catalog::Genre;
use crate::query::{Intent, QueryAnalysis};

/// Alpha used when classification carries no confidence at all
pub const NEUTRAL_ALPHA: f32 = 0.5;

/// Default confidence at which the base alpha is used unchanged
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.8;

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Built-in base alpha per intent
pub fn default_base_alpha() -> BTreeMap<Intent, f32> {
    BTreeMap::from([
        (Intent::SpecificTitle, 0.30),
        (Intent::ActorBased, 0.35),
        (Intent::YearBased, 0.50),
        (Intent::GenreBrowse, 0.65),
        (Intent::TopRated, 0.60),
        (Intent::EmotionBased, 0.85),
        (Intent::SimilarTo, 0.75),
        (Intent::Trending, 0.55),
        (Intent::Constraint, 0.60),
        (Intent::Vague, 0.80),
    ])
}

/// Built-in popularity boost per intent (absent means 1.0)
pub fn default_popularity_boost() -> BTreeMap<Intent, f32> {
    BTreeMap::from([
        (Intent::Vague, 1.3),
        (Intent::Trending, 1.5),
        (Intent::TopRated, 1.2),
    ])
}

/// Weighting configuration
///
/// Tables given in a config file are merged over the built-in tables, so an
/// override may name only the intents it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightingConfig {
    /// Confidence at or above which the base alpha applies unchanged
    pub confidence_threshold: f32,
    /// Base alpha per intent
    pub base_alpha: BTreeMap<Intent, f32>,
    /// Popularity boost per intent
    pub popularity_boost: BTreeMap<Intent, f32>,
}

impl Default for WeightingConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            base_alpha: default_base_alpha(),
            popularity_boost: default_popularity_boost(),
        }
    }
}

impl WeightingConfig {
    /// Fill intents missing from the tables with the built-in values
    pub fn merged_with_defaults(mut self) -> Self {
        for (intent, alpha) in default_base_alpha() {
            self.base_alpha.entry(intent).or_insert(alpha);
        }
        for (intent, boost) in default_popularity_boost() {
            self.popularity_boost.entry(intent).or_insert(boost);
        }
        self
    }

    /// Check table values, returning a description of the first problem
    pub fn check(&self) -> Result<(), String> {
        if !(self.confidence_threshold > 0.0 && self.confidence_threshold <= 1.0) {
            return Err(format!(
                "weighting.confidence_threshold must be in (0, 1], got {}",
                self.confidence_threshold
            ));
        }
        for (intent, alpha) in &self.base_alpha {
            if !(0.0..=1.0).contains(alpha) {
                return Err(format!("base alpha for {} must be in [0, 1], got {}", intent, alpha));
            }
        }
        for (intent, boost) in &self.popularity_boost {
            if !(boost.is_finite() && *boost >= 1.0) {
                return Err(format!("popularity boost for {} must be >= 1.0, got {}", intent, boost));
            }
        }
        Ok(())
    }
}

// ============================================================================
// PROFILES
// ============================================================================

/// Filter hints derived from query entities
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutoFilterHints {
    /// Genres every result must carry
    pub genres: BTreeSet<Genre>,
    /// Upper bound on episode count
    pub max_episodes: Option<u32>,
    /// Lower bound on episode count
    pub min_episodes: Option<u32>,
}

impl AutoFilterHints {
    /// Check if no hint is set
    pub fn is_empty(&self) -> bool {
        self.genres.is_empty() && self.max_episodes.is_none() && self.min_episodes.is_none()
    }
}

/// Fusion weights and auxiliary adjustments for one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightProfile {
    /// Semantic weight in [0, 1]; lexical weight is `1 - alpha`
    pub alpha: f32,
    /// Multiplier applied after fusion (1.0 is a no-op)
    pub popularity_boost: f32,
    /// Filters implied by the query itself
    pub auto_filters: AutoFilterHints,
}

/// Per-intent pipeline switches
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchStrategy {
    /// Whether a rerank pass is worth its latency for this intent
    pub use_reranker: bool,
    /// Multiplier applied after fusion
    pub popularity_boost: f32,
}

// ============================================================================
// POLICY
// ============================================================================

/// Intent-adaptive weighting policy
#[derive(Debug, Clone)]
pub struct WeightingPolicy {
    config: WeightingConfig,
}

impl Default for WeightingPolicy {
    fn default() -> Self {
        Self::new(WeightingConfig::default())
    }
}

impl WeightingPolicy {
    /// Create a policy, filling missing intents from the built-in tables
    pub fn new(config: WeightingConfig) -> Self {
        Self {
            config: config.merged_with_defaults(),
        }
    }

    /// Base alpha for an intent
    pub fn base_alpha(&self, intent: Intent) -> f32 {
        self.config
            .base_alpha
            .get(&intent)
            .copied()
            .unwrap_or(NEUTRAL_ALPHA)
    }

    /// Confidence-adjusted alpha
    ///
    /// `alpha = 0.5 + (base - 0.5) * clamp(confidence / threshold, 0, 1)`,
    /// so full confidence commits to the base value and zero confidence is
    /// balanced retrieval.
    pub fn alpha(&self, intent: Intent, confidence: f32) -> f32 {
        let base = self.base_alpha(intent);
        let confidence = if confidence.is_finite() { confidence } else { 0.0 };
        let ratio = (confidence / self.config.confidence_threshold).clamp(0.0, 1.0);
        (NEUTRAL_ALPHA + (base - NEUTRAL_ALPHA) * ratio).clamp(0.0, 1.0)
    }

    /// Pipeline switches for an intent
    pub fn strategy(&self, intent: Intent) -> SearchStrategy {
        SearchStrategy {
            // Exact titles and trend lists gain nothing from a relevance pass
            use_reranker: !matches!(intent, Intent::SpecificTitle | Intent::Trending),
            popularity_boost: self
                .config
                .popularity_boost
                .get(&intent)
                .copied()
                .unwrap_or(1.0),
        }
    }

    /// Full weight profile for an analyzed query
    pub fn profile(&self, analysis: &QueryAnalysis) -> WeightProfile {
        let entities = &analysis.entities;
        WeightProfile {
            alpha: self.alpha(analysis.intent, analysis.confidence),
            popularity_boost: self.strategy(analysis.intent).popularity_boost,
            auto_filters: AutoFilterHints {
                genres: entities.genres.clone(),
                max_episodes: entities.constraints.max_episodes,
                min_episodes: entities.constraints.min_episodes,
            },
        }
    }

    /// The active configuration
    pub fn config(&self) -> &WeightingConfig {
        &self.config
    }
}

// ============================================================================
// TESTS
// ============================================================================
