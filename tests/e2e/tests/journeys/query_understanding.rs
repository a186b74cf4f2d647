//! Journey: how a query is read before anything is retrieved
//!
//! Classification, entity extraction, expansion and weighting, checked
//! through the engine's public surface.

use seoulmate_core::{Genre, Intent};
use seoulmate_e2e_tests::harness::EngineHarness;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

#[test]
fn actor_query_leans_lexical() {
    let harness = EngineHarness::new();
    let engine = harness.engine();

    let analysis = engine.analyze("Park Seo-joon drama");
    assert_eq!(analysis.intent, Intent::ActorBased);
    assert_eq!(
        analysis.entities.actors.iter().collect::<Vec<_>>(),
        vec!["Park Seo-joon"]
    );

    let profile = engine.policy().profile(&analysis);
    assert!(approx(profile.alpha, 0.35), "alpha was {}", profile.alpha);
}

#[test]
fn emotion_query_leans_semantic_and_expands() {
    let harness = EngineHarness::new();
    let engine = harness.engine();

    let query = engine.understand("sad emotional drama");
    assert_eq!(query.analysis.intent, Intent::EmotionBased);
    assert!(query.expanded.contains("melodrama"));
    assert!(query.expanded.contains("tearjerker"));
    // Lexical text stays unexpanded
    assert_eq!(query.normalized, "sad emotional drama");

    let profile = engine.policy().profile(&query.analysis);
    assert!(approx(profile.alpha, 0.85), "alpha was {}", profile.alpha);
}

#[test]
fn genre_query_derives_filter() {
    let harness = EngineHarness::new();
    let engine = harness.engine();

    let analysis = engine.analyze("medical drama");
    assert_eq!(analysis.intent, Intent::GenreBrowse);

    let profile = engine.policy().profile(&analysis);
    assert!(profile.auto_filters.genres.contains(&Genre::Medical));
}

#[test]
fn empty_query_is_vague_and_neutral() {
    let harness = EngineHarness::new();
    let engine = harness.engine();

    for raw in ["", "   ", "?!"] {
        let analysis = engine.analyze(raw);
        assert_eq!(analysis.intent, Intent::Vague);
        let profile = engine.policy().profile(&analysis);
        assert!(approx(profile.alpha, 0.5), "alpha for {raw:?} was {}", profile.alpha);
    }
}

#[test]
fn superlative_query_boosts_popularity() {
    let harness = EngineHarness::new();
    let engine = harness.engine();

    let analysis = engine.analyze("best dramas ever");
    assert_eq!(analysis.intent, Intent::TopRated);
    assert!(engine.policy().profile(&analysis).popularity_boost > 1.0);
}

#[test]
fn catalog_titles_are_recognized() {
    let harness = EngineHarness::new();
    let engine = harness.engine();

    let analysis = engine.analyze("something like Goblin");
    assert_eq!(analysis.intent, Intent::SimilarTo);
    assert_eq!(analysis.entities.reference.as_deref(), Some("goblin"));
}

#[test]
fn analysis_is_repeatable() {
    let harness = EngineHarness::new();
    let engine = harness.engine();

    for raw in ["Park Seo-joon drama", "sad emotional drama", "Gobln", "romance from 2019"] {
        let first = engine.analyze(raw);
        let again = engine.analyze(raw);
        assert_eq!(first, again);
        assert_eq!(
            engine.policy().profile(&first),
            engine.policy().profile(&again)
        );
    }
}
