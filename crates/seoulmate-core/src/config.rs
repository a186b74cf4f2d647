//! Engine configuration
//!
//! Everything tunable lives here and is loaded once at startup: retrieval
//! widths, cache sizing, fuzzy thresholds, the weighting tables, the synonym
//! table and the lexicons. Any field omitted from a TOML file falls back to
//! its built-in default.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::query::{ExpansionConfig, Lexicon};
use crate::search::{FuzzyConfig, RerankerConfig, MAX_RERANK_DEPTH};
use crate::weighting::WeightingConfig;

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Configuration error
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML syntax or shape error
    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// A value outside its allowed range
    #[error("Invalid config: {0}")]
    Invalid(String),
    /// A lexicon that cannot be compiled
    #[error("Lexicon error: {0}")]
    Lexicon(String),
}

// ============================================================================
// SECTIONS
// ============================================================================

/// Retrieval widths and rerank settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Candidates requested from the semantic channel
    pub semantic_k: usize,
    /// Candidates requested from the lexical channel
    pub lexical_k: usize,
    /// Top fused candidates sent to the rerank model (at most 20)
    pub rerank_depth: usize,
    /// Rerank deadline in milliseconds
    pub rerank_timeout_ms: u64,
    /// Global rerank switch
    pub enable_rerank: bool,
    /// Result count when a request does not name one
    pub default_top_n: usize,
    /// Largest result count a request may ask for
    pub max_top_n: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            semantic_k: 50,
            lexical_k: 50,
            rerank_depth: MAX_RERANK_DEPTH,
            rerank_timeout_ms: 500,
            enable_rerank: true,
            default_top_n: 10,
            max_top_n: 100,
        }
    }
}

impl RetrievalConfig {
    /// Reranker settings derived from this section
    pub fn reranker(&self) -> RerankerConfig {
        RerankerConfig {
            depth: self.rerank_depth,
            timeout: Duration::from_millis(self.rerank_timeout_ms),
        }
    }
}

/// Semantic result cache sizing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Total entries across shards
    pub capacity: usize,
    /// Independently locked shards
    pub shards: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 256,
            shards: 8,
        }
    }
}

// ============================================================================
// ENGINE CONFIG
// ============================================================================

/// Complete engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Retrieval widths and rerank settings
    pub retrieval: RetrievalConfig,
    /// Semantic cache sizing
    pub cache: CacheConfig,
    /// Fuzzy title fallback
    pub fuzzy: FuzzyConfig,
    /// Intent weighting tables
    pub weighting: WeightingConfig,
    /// Synonym expansion
    pub expansion: ExpansionConfig,
    /// Classification lexicons
    pub lexicon: Lexicon,
}

impl EngineConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let mut config: EngineConfig = toml::from_str(text)?;
        config.weighting = config.weighting.merged_with_defaults();
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "Loaded engine config");
        Ok(config)
    }

    /// Render as TOML
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Check every value is in range
    pub fn validate(&self) -> Result<(), ConfigError> {
        let r = &self.retrieval;
        if r.semantic_k == 0 || r.lexical_k == 0 {
            return Err(ConfigError::Invalid("retrieval widths must be at least 1".to_string()));
        }
        if r.rerank_depth > MAX_RERANK_DEPTH {
            return Err(ConfigError::Invalid(format!(
                "retrieval.rerank_depth must be at most {}, got {}",
                MAX_RERANK_DEPTH, r.rerank_depth
            )));
        }
        if r.rerank_timeout_ms == 0 {
            return Err(ConfigError::Invalid("retrieval.rerank_timeout_ms must be positive".to_string()));
        }
        if r.default_top_n == 0 || r.default_top_n > r.max_top_n {
            return Err(ConfigError::Invalid(format!(
                "retrieval.default_top_n must be in 1..={}, got {}",
                r.max_top_n, r.default_top_n
            )));
        }

        if self.cache.capacity == 0 || self.cache.shards == 0 {
            return Err(ConfigError::Invalid("cache capacity and shards must be at least 1".to_string()));
        }

        let f = &self.fuzzy;
        if !(0.0..=1.0).contains(&f.threshold) {
            return Err(ConfigError::Invalid(format!(
                "fuzzy.threshold must be in [0, 1], got {}",
                f.threshold
            )));
        }
        if !(f.score_cap > 0.0 && f.score_cap <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "fuzzy.score_cap must be in (0, 1], got {}",
                f.score_cap
            )));
        }
        if !f.min_lexical_score.is_finite() || f.min_lexical_score < 0.0 {
            return Err(ConfigError::Invalid("fuzzy.min_lexical_score must be >= 0".to_string()));
        }

        self.weighting.check().map_err(ConfigError::Invalid)?;

        if self.lexicon.genre_phrases.values().any(Vec::is_empty) {
            return Err(ConfigError::Lexicon(
                "every genre phrase must map to at least one genre".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
