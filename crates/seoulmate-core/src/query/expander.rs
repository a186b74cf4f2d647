//! Query expansion for the semantic channel
//!
//! Appends a bounded number of synonyms per recognized token. The original
//! tokens always come first and in their original order; the lexical channel
//! never sees the expanded text.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use super::Entities;

/// Default number of synonyms appended per token
pub const DEFAULT_TERMS_PER_TOKEN: usize = 3;

/// Expansion configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpansionConfig {
    /// Synonyms appended per token (K)
    pub max_terms_per_token: usize,
    /// Token (or normalized phrase) to synonyms, in preference order
    pub synonyms: BTreeMap<String, Vec<String>>,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            max_terms_per_token: DEFAULT_TERMS_PER_TOKEN,
            synonyms: default_synonyms(),
        }
    }
}

/// Built-in synonym table
pub fn default_synonyms() -> BTreeMap<String, Vec<String>> {
    let entries: &[(&str, &[&str])] = &[
        ("sad", &["melodrama", "tearjerker", "emotional", "tragic", "touching"]),
        ("emotional", &["heartfelt", "moving", "touching", "melodrama"]),
        ("funny", &["comedy", "hilarious", "lighthearted", "witty"]),
        ("scary", &["horror", "thriller", "creepy", "terrifying"]),
        ("happy", &["heartwarming", "uplifting", "feel good", "wholesome"]),
        ("feel good", &["heartwarming", "uplifting", "healing"]),
        ("romantic", &["romance", "love", "sweet"]),
        ("romance", &["love", "romantic", "relationship"]),
        ("exciting", &["action", "thrilling", "intense"]),
        ("dark", &["gritty", "noir", "revenge"]),
        ("old", &["classic", "retro"]),
        ("new", &["recent", "latest"]),
        ("recent", &["new", "latest"]),
        ("best", &["acclaimed", "masterpiece", "top rated"]),
        ("good", &["acclaimed", "well made"]),
        ("popular", &["hit", "famous", "trending"]),
        ("short", &["miniseries", "brief"]),
        ("long", &["epic", "saga"]),
        ("medical", &["hospital", "doctor", "surgeon"]),
        ("legal", &["lawyer", "court", "prosecutor"]),
        ("historical", &["joseon", "sageuk", "period"]),
        ("school", &["youth", "student", "teen"]),
    ];
    entries
        .iter()
        .map(|(key, values)| {
            (
                key.to_string(),
                values.iter().map(|v| v.to_string()).collect(),
            )
        })
        .collect()
}

/// Synonym-based query expander
#[derive(Debug, Clone)]
pub struct QueryExpander {
    config: ExpansionConfig,
}

impl QueryExpander {
    /// Create an expander
    pub fn new(config: ExpansionConfig) -> Self {
        Self { config }
    }

    /// Expand normalized text
    ///
    /// Multi-word emotion entities ("feel good") are looked up as phrases
    /// after the single tokens. An appended term is skipped if it is already
    /// present in the output, so the result never repeats a word.
    pub fn expand(&self, normalized: &str, entities: &Entities) -> String {
        let tokens: Vec<&str> = normalized.split_whitespace().collect();
        if tokens.is_empty() || self.config.max_terms_per_token == 0 {
            return tokens.join(" ");
        }

        let mut seen: HashSet<String> = tokens.iter().map(|t| t.to_string()).collect();
        let mut output: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();

        let phrases = entities
            .emotions
            .iter()
            .filter(|e| e.contains(' '))
            .map(String::as_str);

        let mut looked_up: HashSet<&str> = HashSet::new();
        for key in tokens.iter().copied().chain(phrases) {
            // A repeated token expands once
            if !looked_up.insert(key) {
                continue;
            }
            let Some(synonyms) = self.config.synonyms.get(key) else {
                continue;
            };
            let mut added = 0;
            for synonym in synonyms {
                if added == self.config.max_terms_per_token {
                    break;
                }
                if seen.insert(synonym.clone()) {
                    output.push(synonym.clone());
                    added += 1;
                }
            }
        }

        output.join(" ")
    }
}

impl Default for QueryExpander {
    fn default() -> Self {
        Self::new(ExpansionConfig::default())
    }
}
