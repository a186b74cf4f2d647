//! Curated lexicons for intent classification and entity extraction
//!
//! Loaded once with the engine configuration and never mutated at request
//! time. Phrases are matched on normalized token boundaries, so entries may
//! be written in any case and with any punctuation.

use crate::catalog::Genre;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lexicons consulted by the entity and intent extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lexicon {
    /// Known actor names in canonical form
    pub actors: Vec<String>,
    /// Genre phrases ("rom com" maps to Romance and Comedy)
    pub genre_phrases: BTreeMap<String, Vec<Genre>>,
    /// Emotion keywords
    pub emotions: Vec<String>,
    /// "like X" style similarity markers
    pub similarity_markers: Vec<String>,
    /// Quality superlatives ("best", "highly rated")
    pub superlatives: Vec<String>,
    /// Trend markers ("trending", "popular now")
    pub trending_markers: Vec<String>,
    /// Length markers ("short", "mini series")
    pub constraint_markers: Vec<String>,
    /// Relative time markers ("recent", "classic")
    pub relative_year_markers: Vec<String>,
    /// Words that introduce a person ("starring")
    pub actor_cues: Vec<String>,
    /// Nouns that carry no signal on their own ("drama", "series")
    pub generic_nouns: Vec<String>,
    /// Known catalog titles, usually filled from the catalog at startup
    pub titles: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_actors() -> Vec<String> {
    strings(&[
        "Park Seo-joon",
        "Gong Yoo",
        "Kim Go-eun",
        "Hyun Bin",
        "Son Ye-jin",
        "Song Joong-ki",
        "Song Hye-kyo",
        "IU",
        "Lee Min-ho",
        "Kim Soo-hyun",
        "Jun Ji-hyun",
        "Park Shin-hye",
        "Lee Jong-suk",
        "Park Bo-gum",
        "Park Min-young",
        "Ji Chang-wook",
        "Nam Joo-hyuk",
        "Kim Tae-ri",
        "Bae Suzy",
        "Seo Hyun-jin",
        "Lee Jun-ki",
        "Jung Hae-in",
        "Kim Seon-ho",
        "Shin Min-a",
        "Cha Eun-woo",
        "Song Kang",
        "Han So-hee",
        "Park Eun-bin",
        "Kang Tae-oh",
        "Jo Jung-suk",
        "Yoo Yeon-seok",
        "Jung Kyung-ho",
        "Jeon Mi-do",
        "Kim Hye-soo",
        "Lee Je-hoon",
        "Lee Byung-hun",
        "Kim Ji-won",
        "Ryu Jun-yeol",
        "Lee Dong-wook",
        "Seo Kang-joon",
        "Go Youn-jung",
        "Lee Do-hyun",
    ])
}

fn default_genre_phrases() -> BTreeMap<String, Vec<Genre>> {
    let entries: &[(&str, &[Genre])] = &[
        ("romance", &[Genre::Romance]),
        ("romantic", &[Genre::Romance]),
        ("love story", &[Genre::Romance]),
        ("romantic comedy", &[Genre::Romance, Genre::Comedy]),
        ("rom com", &[Genre::Romance, Genre::Comedy]),
        ("romcom", &[Genre::Romance, Genre::Comedy]),
        ("comedy", &[Genre::Comedy]),
        ("action", &[Genre::Action]),
        ("adventure", &[Genre::Adventure]),
        ("business", &[Genre::Business]),
        ("office", &[Genre::Business]),
        ("crime", &[Genre::Crime]),
        ("detective", &[Genre::Crime]),
        ("documentary", &[Genre::Documentary]),
        ("family", &[Genre::Family]),
        ("fantasy", &[Genre::Fantasy]),
        ("food", &[Genre::Food]),
        ("cooking", &[Genre::Food]),
        ("friendship", &[Genre::Friendship]),
        ("historical", &[Genre::Historical]),
        ("sageuk", &[Genre::Historical]),
        ("period", &[Genre::Historical]),
        ("joseon", &[Genre::Historical]),
        ("horror", &[Genre::Horror]),
        ("zombie", &[Genre::Horror]),
        ("legal", &[Genre::Law]),
        ("lawyer", &[Genre::Law]),
        ("courtroom", &[Genre::Law]),
        ("slice of life", &[Genre::Life]),
        ("medical", &[Genre::Medical]),
        ("hospital", &[Genre::Medical]),
        ("melodrama", &[Genre::Melodrama]),
        ("military", &[Genre::Military]),
        ("music", &[Genre::Music]),
        ("idol", &[Genre::Music]),
        ("mystery", &[Genre::Mystery]),
        ("political", &[Genre::Political]),
        ("psychological", &[Genre::Psychological]),
        ("sci fi", &[Genre::SciFi]),
        ("science fiction", &[Genre::SciFi]),
        ("sports", &[Genre::Sports]),
        ("supernatural", &[Genre::Supernatural]),
        ("ghost", &[Genre::Supernatural]),
        ("thriller", &[Genre::Thriller]),
        ("suspense", &[Genre::Thriller]),
        ("youth", &[Genre::Youth]),
        ("high school", &[Genre::Youth]),
        ("coming of age", &[Genre::Youth]),
    ];
    entries
        .iter()
        .map(|(phrase, genres)| (phrase.to_string(), genres.to_vec()))
        .collect()
}

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            actors: default_actors(),
            genre_phrases: default_genre_phrases(),
            emotions: strings(&[
                "sad",
                "funny",
                "scary",
                "happy",
                "emotional",
                "touching",
                "heartwarming",
                "heartbreaking",
                "exciting",
                "feel good",
                "tearjerker",
                "cry",
                "laugh",
                "lighthearted",
                "healing",
                "wholesome",
                "uplifting",
                "depressing",
                "dark",
                "cozy",
            ]),
            similarity_markers: strings(&[
                "like",
                "similar to",
                "same as",
                "reminds me of",
                "in the style of",
                "along the lines of",
            ]),
            superlatives: strings(&[
                "best",
                "top rated",
                "highly rated",
                "highest rated",
                "masterpiece",
                "greatest",
                "must watch",
                "acclaimed",
            ]),
            trending_markers: strings(&[
                "trending",
                "popular now",
                "what's hot",
                "hot right now",
                "viral",
                "buzz",
                "everyone is watching",
                "everyone watching",
                "currently watching",
                "popular",
            ]),
            constraint_markers: strings(&[
                "short",
                "quick watch",
                "mini series",
                "limited series",
                "few episodes",
                "long",
            ]),
            relative_year_markers: strings(&[
                "recent",
                "new",
                "latest",
                "current",
                "modern",
                "this year",
                "last year",
                "classic",
                "old",
                "90s",
                "2000s",
                "2010s",
            ]),
            actor_cues: strings(&["with", "starring", "featuring"]),
            generic_nouns: strings(&[
                "drama", "dramas", "kdrama", "kdramas", "k drama", "series", "show", "shows",
            ]),
            titles: Vec::new(),
        }
    }
}
