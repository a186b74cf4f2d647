//! # Entity & Intent Extraction
//!
//! Rule-based classification over curated lexicons.
//!
//! ## How it works
//!
//! 1. Normalize the query and scan it once against every lexicon,
//!    collecting [`Signals`] (actor hits, years, emotions, markers...)
//! 2. Walk an ordered rule table of `(intent, confidence, predicate)`.
//!    The table is sorted by specificity, so the first matching rule wins
//! 3. Every other intent that also matched makes the query ambiguous and
//!    shaves [`AMBIGUITY_PENALTY`] off the confidence, never below
//!    [`FALLBACK_CONFIDENCE`]
//! 4. No match at all is `Vague` at [`FALLBACK_CONFIDENCE`]; text with nothing
//!    searchable in it is `Vague` at [`DEGENERATE_CONFIDENCE`]
//!
//! Classification is a pure function of the query text and the lexicons.

use regex::Regex;
use std::collections::{BTreeSet, HashSet};

use super::lexicon::Lexicon;
use super::{normalize, Entities, EpisodeConstraint, Intent, QueryAnalysis};
use crate::catalog::Genre;
use crate::config::ConfigError;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Confidence for an exact lexicon hit
const EXACT_CONFIDENCE: f32 = 0.9;

/// Confidence for a pattern (non-lexicon) hit
const PATTERN_CONFIDENCE: f32 = 0.75;

/// Confidence for unmatched input, and the floor for ambiguous matches
pub const FALLBACK_CONFIDENCE: f32 = 0.7;

/// Confidence for empty or punctuation-only input
pub const DEGENERATE_CONFIDENCE: f32 = 0.0;

/// Confidence lost per additional intent that also matched
pub const AMBIGUITY_PENALTY: f32 = 0.05;

/// Lowercase words allowed between capitalized words of a title
const TITLE_CONNECTORS: &[&str] = &[
    "a", "an", "and", "at", "by", "for", "from", "in", "is", "me", "my", "of", "on", "the", "to",
    "with", "you",
];

// ============================================================================
// SIGNALS
// ============================================================================

/// Everything the lexicons found in one query
#[derive(Debug, Default)]
struct Signals {
    actors_exact: BTreeSet<String>,
    actors_pattern: BTreeSet<String>,
    similarity: bool,
    reference: Option<String>,
    years: BTreeSet<i32>,
    relative_year: bool,
    emotions: BTreeSet<String>,
    genres: BTreeSet<Genre>,
    superlative: bool,
    constraint: bool,
    episodes: EpisodeConstraint,
    trending: bool,
    title_exact: bool,
    title_pattern: bool,
}

/// One row of the classification table
struct IntentRule {
    intent: Intent,
    confidence: f32,
    matches: fn(&Signals) -> bool,
}

/// The classification table, most specific first
fn default_rules() -> Vec<IntentRule> {
    vec![
        IntentRule {
            intent: Intent::SimilarTo,
            confidence: EXACT_CONFIDENCE,
            matches: |s| s.similarity,
        },
        IntentRule {
            intent: Intent::ActorBased,
            confidence: EXACT_CONFIDENCE,
            matches: |s| !s.actors_exact.is_empty(),
        },
        IntentRule {
            intent: Intent::ActorBased,
            confidence: PATTERN_CONFIDENCE,
            matches: |s| !s.actors_pattern.is_empty(),
        },
        IntentRule {
            intent: Intent::YearBased,
            confidence: EXACT_CONFIDENCE,
            matches: |s| !s.years.is_empty(),
        },
        IntentRule {
            intent: Intent::YearBased,
            confidence: PATTERN_CONFIDENCE,
            matches: |s| s.relative_year,
        },
        IntentRule {
            intent: Intent::EmotionBased,
            confidence: EXACT_CONFIDENCE,
            matches: |s| !s.emotions.is_empty(),
        },
        IntentRule {
            intent: Intent::GenreBrowse,
            confidence: EXACT_CONFIDENCE,
            matches: |s| !s.genres.is_empty(),
        },
        IntentRule {
            intent: Intent::TopRated,
            confidence: EXACT_CONFIDENCE,
            matches: |s| s.superlative,
        },
        IntentRule {
            intent: Intent::Constraint,
            confidence: 0.85,
            matches: |s| s.constraint || !s.episodes.is_empty(),
        },
        IntentRule {
            intent: Intent::Trending,
            confidence: EXACT_CONFIDENCE,
            matches: |s| s.trending,
        },
        IntentRule {
            intent: Intent::SpecificTitle,
            confidence: 0.95,
            matches: |s| s.title_exact,
        },
        IntentRule {
            intent: Intent::SpecificTitle,
            confidence: PATTERN_CONFIDENCE,
            matches: |s| s.title_pattern,
        },
    ]
}

// ============================================================================
// COMPILED LEXICON
// ============================================================================

/// A lexicon phrase split into normalized tokens
#[derive(Debug, Clone)]
struct Phrase {
    tokens: Vec<String>,
    canonical: String,
}

impl Phrase {
    fn new(text: &str) -> Option<Self> {
        let normalized = normalize(text);
        if normalized.is_empty() {
            return None;
        }
        Some(Self {
            tokens: normalized.split(' ').map(str::to_string).collect(),
            canonical: text.trim().to_string(),
        })
    }

    /// Position of the first occurrence of this phrase in `tokens`
    fn find_in(&self, tokens: &[&str]) -> Option<usize> {
        let len = self.tokens.len();
        if len == 0 || len > tokens.len() {
            return None;
        }
        tokens
            .windows(len)
            .position(|window| window.iter().zip(&self.tokens).all(|(a, b)| *a == b.as_str()))
    }
}

fn phrases(items: &[String]) -> Vec<Phrase> {
    items.iter().filter_map(|s| Phrase::new(s)).collect()
}

// ============================================================================
// EXTRACTOR
// ============================================================================

/// Classifies intent and extracts entities from free text
pub struct EntityExtractor {
    rules: Vec<IntentRule>,
    actors: Vec<Phrase>,
    genres: Vec<(Phrase, Vec<Genre>)>,
    emotions: Vec<Phrase>,
    similarity: Vec<Phrase>,
    superlatives: Vec<Phrase>,
    trending: Vec<Phrase>,
    constraints: Vec<Phrase>,
    relative_years: Vec<Phrase>,
    generic_nouns: HashSet<String>,
    titles: Vec<Phrase>,
    year_pattern: Regex,
    max_episodes_pattern: Regex,
    min_episodes_pattern: Regex,
    top_n_pattern: Regex,
    actor_cue_pattern: Option<Regex>,
}

impl EntityExtractor {
    /// Compile the lexicons into an extractor
    pub fn new(lexicon: &Lexicon) -> Result<Self, ConfigError> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| ConfigError::Invalid(format!("bad pattern: {}", e)))
        };

        let cues: Vec<String> = lexicon
            .actor_cues
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .map(regex::escape)
            .collect();
        let actor_cue_pattern = if cues.is_empty() {
            None
        } else {
            Some(compile(&format!(
                r"(?:^|\s)(?i:{})\s+(\p{{Lu}}[\p{{L}}'-]*(?:\s+\p{{Lu}}[\p{{L}}'-]*){{1,2}})",
                cues.join("|")
            ))?)
        };

        let mut genres: Vec<(Phrase, Vec<Genre>)> = lexicon
            .genre_phrases
            .iter()
            .filter_map(|(phrase, genres)| Phrase::new(phrase).map(|p| (p, genres.clone())))
            .collect();
        // Longer phrases first so "romantic comedy" is seen before "romantic"
        genres.sort_by(|a, b| b.0.tokens.len().cmp(&a.0.tokens.len()));

        Ok(Self {
            rules: default_rules(),
            actors: phrases(&lexicon.actors),
            genres,
            emotions: phrases(&lexicon.emotions),
            similarity: phrases(&lexicon.similarity_markers),
            superlatives: phrases(&lexicon.superlatives),
            trending: phrases(&lexicon.trending_markers),
            constraints: phrases(&lexicon.constraint_markers),
            relative_years: phrases(&lexicon.relative_year_markers),
            generic_nouns: lexicon.generic_nouns.iter().map(|n| normalize(n)).collect(),
            titles: phrases(&lexicon.titles),
            year_pattern: compile(r"\b(19\d{2}|20\d{2})\b")?,
            max_episodes_pattern: compile(
                r"\b(?:under|less than|fewer than|at most|up to|max)\s+(\d{1,4})\s+(?:episodes?|eps?)\b",
            )?,
            min_episodes_pattern: compile(
                r"\b(?:more than|over|at least|min)\s+(\d{1,4})\s+(?:episodes?|eps?)\b",
            )?,
            top_n_pattern: compile(r"\b(?:top|best)\s+\d+\b")?,
            actor_cue_pattern,
        })
    }

    /// Classify a query and extract its entities
    pub fn analyze(&self, raw: &str) -> QueryAnalysis {
        let normalized = normalize(raw);
        if normalized.is_empty() {
            return QueryAnalysis {
                intent: Intent::Vague,
                confidence: DEGENERATE_CONFIDENCE,
                entities: Entities::default(),
            };
        }

        let signals = self.scan(raw, &normalized);
        let (intent, confidence) = self.classify(&signals);

        let mut actors = signals.actors_exact;
        actors.extend(signals.actors_pattern);

        QueryAnalysis {
            intent,
            confidence,
            entities: Entities {
                actors,
                genres: signals.genres,
                years: signals.years,
                emotions: signals.emotions,
                reference: signals.reference,
                constraints: signals.episodes,
            },
        }
    }

    /// Walk the rule table; first match wins, other matches cost confidence
    fn classify(&self, signals: &Signals) -> (Intent, f32) {
        let mut winner: Option<&IntentRule> = None;
        let mut matched: BTreeSet<Intent> = BTreeSet::new();

        for rule in &self.rules {
            if (rule.matches)(signals) {
                matched.insert(rule.intent);
                if winner.is_none() {
                    winner = Some(rule);
                }
            }
        }

        match winner {
            Some(rule) => {
                let others = matched.len().saturating_sub(1) as f32;
                let floor = FALLBACK_CONFIDENCE.min(rule.confidence);
                let confidence = (rule.confidence - AMBIGUITY_PENALTY * others).max(floor);
                (rule.intent, confidence)
            }
            None => (Intent::Vague, FALLBACK_CONFIDENCE),
        }
    }

    fn scan(&self, raw: &str, normalized: &str) -> Signals {
        let tokens: Vec<&str> = normalized.split(' ').collect();
        let mut signals = Signals::default();

        for actor in &self.actors {
            if actor.find_in(&tokens).is_some() {
                signals.actors_exact.insert(actor.canonical.clone());
            }
        }
        if let Some(pattern) = &self.actor_cue_pattern {
            for captures in pattern.captures_iter(raw) {
                if let Some(name) = captures.get(1) {
                    let name = name.as_str().trim().to_string();
                    let known = signals
                        .actors_exact
                        .iter()
                        .any(|a| normalize(a) == normalize(&name));
                    if !known {
                        signals.actors_pattern.insert(name);
                    }
                }
            }
        }

        if let Some((marker, position)) = self
            .similarity
            .iter()
            .filter_map(|m| m.find_in(&tokens).map(|p| (m, p)))
            .min_by_key(|(_, p)| *p)
        {
            signals.similarity = true;
            signals.reference = self.reference_after(&tokens[position + marker.tokens.len()..]);
        }

        for captures in self.year_pattern.captures_iter(normalized) {
            if let Some(year) = captures.get(1).and_then(|m| m.as_str().parse().ok()) {
                signals.years.insert(year);
            }
        }
        signals.relative_year = self.relative_years.iter().any(|p| p.find_in(&tokens).is_some());

        for emotion in &self.emotions {
            if emotion.find_in(&tokens).is_some() {
                signals.emotions.insert(emotion.tokens.join(" "));
            }
        }

        let mut covered = vec![false; tokens.len()];
        for (phrase, genres) in &self.genres {
            let len = phrase.tokens.len();
            for start in 0..tokens.len().saturating_sub(len - 1) {
                let window = &tokens[start..start + len];
                let hit = window.iter().zip(&phrase.tokens).all(|(a, b)| *a == b.as_str());
                if hit && !covered[start..start + len].iter().any(|c| *c) {
                    covered[start..start + len].iter_mut().for_each(|c| *c = true);
                    signals.genres.extend(genres.iter().copied());
                }
            }
        }

        signals.superlative = self.superlatives.iter().any(|p| p.find_in(&tokens).is_some())
            || self.top_n_pattern.is_match(normalized);
        signals.trending = self.trending.iter().any(|p| p.find_in(&tokens).is_some());
        signals.constraint = self.constraints.iter().any(|p| p.find_in(&tokens).is_some());
        signals.episodes = EpisodeConstraint {
            max_episodes: Self::first_number(&self.max_episodes_pattern, normalized),
            min_episodes: Self::first_number(&self.min_episodes_pattern, normalized),
        };

        signals.title_exact = self.titles.iter().any(|t| t.find_in(&tokens).is_some());
        signals.title_pattern = signals.actors_exact.is_empty() && Self::looks_like_title(raw);

        signals
    }

    /// Text following a similarity marker, minus generic nouns at either end
    fn reference_after(&self, rest: &[&str]) -> Option<String> {
        let mut words: Vec<&str> = rest.to_vec();
        while words.last().is_some_and(|w| self.generic_nouns.contains(*w)) {
            words.pop();
        }
        while words
            .first()
            .is_some_and(|w| *w == "the" || self.generic_nouns.contains(*w))
        {
            words.remove(0);
        }
        if words.is_empty() {
            None
        } else {
            Some(words.join(" "))
        }
    }

    fn first_number(pattern: &Regex, text: &str) -> Option<u32> {
        pattern
            .captures(text)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }

    /// "Crash Landing on You": capitalized words joined by small connectors
    fn looks_like_title(raw: &str) -> bool {
        let words: Vec<&str> = raw.split_whitespace().collect();
        if words.len() < 2 {
            return false;
        }

        let capitalized = words
            .iter()
            .filter(|w| w.chars().next().is_some_and(char::is_uppercase))
            .count();
        let all_fit = words.iter().all(|w| {
            w.chars().next().is_some_and(|c| c.is_uppercase() || c.is_numeric())
                || TITLE_CONNECTORS.contains(&w.to_lowercase().as_str())
        });

        capitalized >= 2 && all_fit
    }
}

// ============================================================================
// TESTS
// ============================================================================
