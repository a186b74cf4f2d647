//! Genre domain
//!
//! Catalog genres come from a fixed, enumerated set. Free-form strings in
//! catalog records and configuration files are parsed leniently
//! ("sci-fi", "Sci Fi" and "science fiction" are all `Genre::SciFi`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A catalog genre
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Genre {
    Action,
    Adventure,
    Business,
    Comedy,
    Crime,
    Documentary,
    Drama,
    Family,
    Fantasy,
    Food,
    Friendship,
    Historical,
    Horror,
    Law,
    Life,
    Medical,
    Melodrama,
    Military,
    Music,
    Mystery,
    Political,
    Psychological,
    Romance,
    SciFi,
    Sports,
    Supernatural,
    Thriller,
    Youth,
}

impl Genre {
    /// Every genre, in declaration order
    pub const ALL: [Genre; 28] = [
        Genre::Action,
        Genre::Adventure,
        Genre::Business,
        Genre::Comedy,
        Genre::Crime,
        Genre::Documentary,
        Genre::Drama,
        Genre::Family,
        Genre::Fantasy,
        Genre::Food,
        Genre::Friendship,
        Genre::Historical,
        Genre::Horror,
        Genre::Law,
        Genre::Life,
        Genre::Medical,
        Genre::Melodrama,
        Genre::Military,
        Genre::Music,
        Genre::Mystery,
        Genre::Political,
        Genre::Psychological,
        Genre::Romance,
        Genre::SciFi,
        Genre::Sports,
        Genre::Supernatural,
        Genre::Thriller,
        Genre::Youth,
    ];

    /// Display name as used by the catalog
    pub fn as_str(&self) -> &'static str {
        match self {
            Genre::Action => "Action",
            Genre::Adventure => "Adventure",
            Genre::Business => "Business",
            Genre::Comedy => "Comedy",
            Genre::Crime => "Crime",
            Genre::Documentary => "Documentary",
            Genre::Drama => "Drama",
            Genre::Family => "Family",
            Genre::Fantasy => "Fantasy",
            Genre::Food => "Food",
            Genre::Friendship => "Friendship",
            Genre::Historical => "Historical",
            Genre::Horror => "Horror",
            Genre::Law => "Law",
            Genre::Life => "Life",
            Genre::Medical => "Medical",
            Genre::Melodrama => "Melodrama",
            Genre::Military => "Military",
            Genre::Music => "Music",
            Genre::Mystery => "Mystery",
            Genre::Political => "Political",
            Genre::Psychological => "Psychological",
            Genre::Romance => "Romance",
            Genre::SciFi => "Sci-Fi",
            Genre::Sports => "Sports",
            Genre::Supernatural => "Supernatural",
            Genre::Thriller => "Thriller",
            Genre::Youth => "Youth",
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Genre {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Compare on letters only so "Sci-Fi", "sci fi" and "SCIFI" agree
        let key: String = s
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect();

        let genre = match key.as_str() {
            "action" => Genre::Action,
            "adventure" => Genre::Adventure,
            "business" => Genre::Business,
            "comedy" => Genre::Comedy,
            "crime" => Genre::Crime,
            "documentary" => Genre::Documentary,
            "drama" => Genre::Drama,
            "family" => Genre::Family,
            "fantasy" => Genre::Fantasy,
            "food" => Genre::Food,
            "friendship" => Genre::Friendship,
            "historical" | "sageuk" => Genre::Historical,
            "horror" => Genre::Horror,
            "law" | "legal" => Genre::Law,
            "life" | "sliceoflife" => Genre::Life,
            "medical" => Genre::Medical,
            "melodrama" => Genre::Melodrama,
            "military" => Genre::Military,
            "music" => Genre::Music,
            "mystery" => Genre::Mystery,
            "political" => Genre::Political,
            "psychological" => Genre::Psychological,
            "romance" => Genre::Romance,
            "scifi" | "sciencefiction" => Genre::SciFi,
            "sports" | "sport" => Genre::Sports,
            "supernatural" => Genre::Supernatural,
            "thriller" => Genre::Thriller,
            "youth" => Genre::Youth,
            _ => return Err(format!("Unknown genre: {}", s)),
        };
        Ok(genre)
    }
}

impl TryFrom<String> for Genre {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Genre> for String {
    fn from(genre: Genre) -> Self {
        genre.as_str().to_string()
    }
}
