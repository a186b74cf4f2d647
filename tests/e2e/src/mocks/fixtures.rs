//! Fixture Catalog
//!
//! A small K-drama catalog with enough overlap between titles, cast and
//! genres to exercise every intent:
//! - Three Park Seo-joon dramas for actor queries
//! - Two Medical dramas plus a non-medical item that mentions medicine
//! - Tearjerkers for emotion queries
//! - Goblin for typo and similarity queries

use std::path::{Path, PathBuf};

use seoulmate_core::{CatalogItem, Genre, InMemoryCatalog};

/// Factory for fixture catalogs
///
/// # Example
///
/// ```rust,ignore
/// let catalog = DramaFixtures::catalog();
/// let path = DramaFixtures::write_json(temp_dir.path());
/// ```
pub struct DramaFixtures;

struct Row {
    id: &'static str,
    title: &'static str,
    genres: &'static [Genre],
    cast: &'static [&'static str],
    director: Option<&'static str>,
    year: i32,
    episodes: u32,
    rating: f32,
    popularity: f32,
    description: &'static str,
}

impl Row {
    fn to_item(&self) -> CatalogItem {
        let mut item = CatalogItem::new(self.id, self.title);
        item.genres = self.genres.iter().copied().collect();
        item.cast = self.cast.iter().map(|s| s.to_string()).collect();
        item.director = self.director.map(str::to_string);
        item.year = Some(self.year);
        item.episodes = Some(self.episodes);
        item.rating = Some(self.rating);
        item.popularity = self.popularity;
        item.description = self.description.to_string();
        item
    }
}

const ROWS: &[Row] = &[
    Row {
        id: "goblin",
        title: "Goblin",
        genres: &[Genre::Fantasy, Genre::Romance, Genre::Melodrama],
        cast: &["Gong Yoo", "Kim Go-eun"],
        director: Some("Lee Eung-bok"),
        year: 2016,
        episodes: 16,
        rating: 8.8,
        popularity: 97.0,
        description: "An immortal guardian cursed for centuries seeks the human bride who can end his life.",
    },
    Row {
        id: "itaewon-class",
        title: "Itaewon Class",
        genres: &[Genre::Drama, Genre::Business],
        cast: &["Park Seo-joon", "Kim Da-mi"],
        director: Some("Kim Sung-yoon"),
        year: 2020,
        episodes: 16,
        rating: 8.2,
        popularity: 92.0,
        description: "An ex-convict opens a pub in Itaewon and plots revenge on a food empire.",
    },
    Row {
        id: "secretary-kim",
        title: "What's Wrong with Secretary Kim",
        genres: &[Genre::Romance, Genre::Comedy, Genre::Business],
        cast: &["Park Seo-joon", "Park Min-young"],
        director: Some("Park Joon-hwa"),
        year: 2018,
        episodes: 16,
        rating: 8.1,
        popularity: 85.0,
        description: "A narcissistic vice chairman panics when his flawless secretary resigns.",
    },
    Row {
        id: "fight-for-my-way",
        title: "Fight for My Way",
        genres: &[Genre::Romance, Genre::Comedy, Genre::Sports],
        cast: &["Park Seo-joon", "Kim Ji-won"],
        director: Some("Lee Na-jeong"),
        year: 2017,
        episodes: 16,
        rating: 8.3,
        popularity: 70.0,
        description: "Childhood friends chase the dreams everyone told them to give up.",
    },
    Row {
        id: "hospital-playlist",
        title: "Hospital Playlist",
        genres: &[Genre::Medical, Genre::Friendship, Genre::Life],
        cast: &["Jo Jung-suk", "Yoo Yeon-seok", "Jeon Mi-do"],
        director: Some("Shin Won-ho"),
        year: 2020,
        episodes: 12,
        rating: 9.0,
        popularity: 90.0,
        description: "Five doctors, friends since medical school, work at the same hospital and play in a band.",
    },
    Row {
        id: "dr-romantic",
        title: "Dr. Romantic",
        genres: &[Genre::Medical, Genre::Drama],
        cast: &["Han Suk-kyu", "Yoo Yeon-seok"],
        director: Some("Yoo In-sik"),
        year: 2016,
        episodes: 20,
        rating: 8.6,
        popularity: 75.0,
        description: "A genius surgeon at a rural medical centre mentors young doctors.",
    },
    Row {
        id: "hometown-cha-cha-cha",
        title: "Hometown Cha-Cha-Cha",
        genres: &[Genre::Romance, Genre::Life],
        cast: &["Shin Min-a", "Kim Seon-ho"],
        director: Some("Yoo Je-won"),
        year: 2021,
        episodes: 16,
        rating: 8.7,
        popularity: 88.0,
        description: "A city dentist leaves her medical practice behind for a seaside village.",
    },
    Row {
        id: "moon-lovers",
        title: "Moon Lovers: Scarlet Heart Ryeo",
        genres: &[Genre::Historical, Genre::Romance, Genre::Melodrama],
        cast: &["Lee Jun-ki", "IU"],
        director: Some("Kim Kyu-tae"),
        year: 2016,
        episodes: 20,
        rating: 8.5,
        popularity: 68.0,
        description: "A tragic, heartbreaking melodrama of a woman thrown back to the Goryeo court.",
    },
    Row {
        id: "my-mister",
        title: "My Mister",
        genres: &[Genre::Melodrama, Genre::Life],
        cast: &["Lee Sun-kyun", "IU"],
        director: Some("Kim Won-seok"),
        year: 2018,
        episodes: 16,
        rating: 9.2,
        popularity: 66.0,
        description: "Two wounded strangers find healing in a touching, emotional tearjerker.",
    },
    Row {
        id: "crash-landing",
        title: "Crash Landing on You",
        genres: &[Genre::Romance, Genre::Comedy],
        cast: &["Hyun Bin", "Son Ye-jin"],
        director: Some("Lee Jeong-hyo"),
        year: 2019,
        episodes: 16,
        rating: 8.7,
        popularity: 99.0,
        description: "A paragliding heiress lands in North Korea and falls for an officer.",
    },
    Row {
        id: "kingdom",
        title: "Kingdom",
        genres: &[Genre::Horror, Genre::Historical, Genre::Thriller],
        cast: &["Ju Ji-hoon", "Bae Doona"],
        director: Some("Kim Seong-hun"),
        year: 2019,
        episodes: 12,
        rating: 8.4,
        popularity: 87.0,
        description: "A crown prince fights a plague of the undead in Joseon.",
    },
    Row {
        id: "reply-1988",
        title: "Reply 1988",
        genres: &[Genre::Comedy, Genre::Family, Genre::Youth],
        cast: &["Lee Hye-ri", "Ryu Jun-yeol", "Park Bo-gum"],
        director: Some("Shin Won-ho"),
        year: 2015,
        episodes: 20,
        rating: 9.5,
        popularity: 89.0,
        description: "Five families share one alley in Seoul in 1988.",
    },
];

impl DramaFixtures {
    /// Every fixture item, in a fixed order
    pub fn items() -> Vec<CatalogItem> {
        ROWS.iter().map(Row::to_item).collect()
    }

    /// Fixture catalog held in memory
    pub fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::from_items(Self::items()).expect("fixture ids are unique")
    }

    /// Write the fixtures as a JSON export and return its path
    pub fn write_json(dir: &Path) -> PathBuf {
        let path = dir.join("catalog.json");
        let json = serde_json::to_string_pretty(&Self::items()).expect("fixtures serialize");
        std::fs::write(&path, json).expect("Failed to write fixture catalog");
        path
    }

    /// Catalog for ordering checks: one leader and three items that will tie
    ///
    /// Popularity: `tie-c` 70, `tie-a` 50, `tie-b` 50.
    pub fn tie_items() -> Vec<CatalogItem> {
        let mut leader = CatalogItem::new("leader", "Leader");
        leader.popularity = 10.0;
        let mut tie_a = CatalogItem::new("tie-a", "Tie A");
        tie_a.popularity = 50.0;
        let mut tie_b = CatalogItem::new("tie-b", "Tie B");
        tie_b.popularity = 50.0;
        let mut tie_c = CatalogItem::new("tie-c", "Tie C");
        tie_c.popularity = 70.0;
        let mut floor = CatalogItem::new("floor", "Floor");
        floor.popularity = 99.0;
        vec![leader, tie_b, tie_c, tie_a, floor]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_catalog_loads() {
        let catalog = DramaFixtures::catalog();
        assert_eq!(catalog.len(), ROWS.len());

        let dir = tempfile::tempdir().unwrap();
        let path = DramaFixtures::write_json(dir.path());
        let loaded = InMemoryCatalog::load(&path).unwrap();
        assert_eq!(loaded.len(), catalog.len());
    }
}
