//! Journey: full recommend requests over the fixture catalog
//!
//! Retrieval, fusion, filtering, ordering and observer notification.

use std::collections::BTreeSet;
use std::sync::Arc;

use seoulmate_core::{
    DegradationReason, EngineConfig, Genre, InMemoryCatalog, Intent, RecommendRequest,
    RecommendationEngine, SearchFilters,
};
use seoulmate_e2e_tests::harness::EngineHarness;
use seoulmate_e2e_tests::mocks::{
    DramaFixtures, EventLog, FixedLexical, FixedSemantic, ReversingRelevance,
};

#[tokio::test]
async fn actor_query_surfaces_their_dramas() {
    let harness = EngineHarness::new();
    let engine = harness.engine();

    let result = engine.recommend(RecommendRequest::new("Park Seo-joon drama")).await;
    assert_eq!(result.intent, Intent::ActorBased);
    assert!((result.alpha - 0.35).abs() < 1e-4);

    let top: BTreeSet<&str> = result.ids().into_iter().take(3).collect();
    let expected: BTreeSet<&str> = ["fight-for-my-way", "itaewon-class", "secretary-kim"]
        .into_iter()
        .collect();
    assert_eq!(top, expected);
    assert!(result.degradations.is_empty(), "{:?}", result.degradations);
}

#[tokio::test]
async fn genre_query_only_returns_that_genre() {
    let harness = EngineHarness::new();
    let engine = harness.engine();

    let result = engine.recommend(RecommendRequest::new("medical drama")).await;
    assert_eq!(result.intent, Intent::GenreBrowse);
    assert!(result.applied_filters.genres.contains(&Genre::Medical));

    assert!(!result.items.is_empty());
    for item in &result.items {
        assert!(item.genres.contains(&Genre::Medical), "{} is not medical", item.id);
    }
    // Mentions medicine in its synopsis but is a romance
    assert!(!result.ids().contains(&"hometown-cha-cha-cha"));
}

#[tokio::test]
async fn typo_falls_back_to_fuzzy_titles() {
    let harness = EngineHarness::new();
    let engine = harness.engine();

    let result = engine.recommend(RecommendRequest::new("Gobln")).await;
    assert!(result.degraded_by(DegradationReason::FuzzyFallback));
    assert_eq!(result.ids().first(), Some(&"goblin"));
    assert!(result.items[0].matched_lexical);
}

#[tokio::test]
async fn empty_query_returns_without_error() {
    let harness = EngineHarness::new();
    let engine = harness.engine();

    let result = engine.recommend(RecommendRequest::new("")).await;
    assert_eq!(result.intent, Intent::Vague);
    assert!((result.alpha - 0.5).abs() < 1e-6);
    assert!(result.items.is_empty());
    assert!(result.degraded_by(DegradationReason::EmptyQuery));
}

#[tokio::test]
async fn tied_scores_order_by_popularity_then_id() {
    let catalog = Arc::new(InMemoryCatalog::from_items(DramaFixtures::tie_items()).unwrap());
    let semantic = FixedSemantic(vec![
        ("leader".to_string(), 1.0),
        ("tie-b".to_string(), 0.81),
        ("tie-a".to_string(), 0.81),
        ("tie-c".to_string(), 0.81),
        ("floor".to_string(), 0.0),
    ]);
    let engine = RecommendationEngine::builder(EngineConfig::default(), catalog)
        .semantic_index(Arc::new(semantic))
        .build()
        .unwrap();

    let result = engine
        .recommend(RecommendRequest::new("Park Seo-joon").with_rerank(false))
        .await;

    // Semantic channel alone carries the full weight
    assert!(result.degraded_by(DegradationReason::LexicalUnavailable));
    assert_eq!(result.effective_alpha, 1.0);

    assert_eq!(result.ids(), vec!["leader", "tie-c", "tie-a", "tie-b", "floor"]);
    for item in &result.items[1..4] {
        assert!((item.fused_score - 0.81).abs() < 1e-6);
    }
}

#[tokio::test]
async fn explicit_filters_are_strict() {
    let harness = EngineHarness::new();
    let engine = harness.engine();

    let filters = SearchFilters::default()
        .with_director("shin won-ho")
        .with_min_rating(9.0);
    let result = engine
        .recommend(RecommendRequest::new("friends").with_filters(filters))
        .await;

    assert_eq!(result.ids(), vec!["hospital-playlist"]);
}

#[tokio::test]
async fn similar_query_excludes_its_reference() {
    let harness = EngineHarness::new();
    let engine = harness.engine();

    let result = engine.recommend(RecommendRequest::new("something like Goblin")).await;
    assert_eq!(result.intent, Intent::SimilarTo);
    assert!(!result.items.is_empty());
    assert!(!result.ids().contains(&"goblin"));
}

#[tokio::test]
async fn top_n_and_weight_override() {
    let harness = EngineHarness::new();
    let engine = harness.engine();

    let result = engine
        .recommend(RecommendRequest::new("romance").with_top_n(2).with_alpha(0.0))
        .await;
    assert_eq!(result.items.len(), 2);
    assert_eq!(result.alpha, 0.0);
    let ranks: Vec<usize> = result.items.iter().map(|i| i.rank).collect();
    assert_eq!(ranks, vec![1, 2]);
}

#[tokio::test]
async fn identical_requests_rank_identically() {
    let harness = EngineHarness::new();
    let engine = harness.engine();

    for raw in ["sad emotional drama", "romantic comedy", "best dramas ever"] {
        let first = engine.recommend(RecommendRequest::new(raw)).await;
        let again = engine.recommend(RecommendRequest::new(raw)).await;
        assert_eq!(first.ids(), again.ids(), "order changed for {raw:?}");
        assert_ne!(first.request_id, again.request_id);
    }
}

#[tokio::test]
async fn observers_see_every_request() {
    let harness = EngineHarness::new();
    let log = Arc::new(EventLog::default());
    let engine = harness
        .builder(EngineConfig::default())
        .observer(log.clone())
        .build()
        .unwrap();

    let result = engine.recommend(RecommendRequest::new("zombie")).await;
    let empty = engine.recommend(RecommendRequest::new("")).await;

    // Delivery is asynchronous and unordered across requests
    let events = log.wait_for(2).await;
    assert_eq!(events.len(), 2);
    let zombie = events
        .iter()
        .find(|e| e.request_id == result.request_id)
        .expect("event for the zombie request");
    assert_eq!(zombie.item_ids, result.ids().iter().map(|s| s.to_string()).collect::<Vec<_>>());
    let blank = events
        .iter()
        .find(|e| e.request_id == empty.request_id)
        .expect("event for the empty request");
    assert_eq!(blank.degradations, vec![DegradationReason::EmptyQuery]);
}

#[tokio::test]
async fn episode_limits_become_filters() {
    let harness = EngineHarness::new();
    let engine = harness.engine();

    let result = engine
        .recommend(RecommendRequest::new("historical drama under 12 episodes"))
        .await;
    assert_eq!(result.applied_filters.max_episodes, Some(12));
    assert!(result.applied_filters.genres.contains(&Genre::Historical));
    // Moon Lovers is historical but runs 20 episodes
    assert_eq!(result.ids(), vec!["kingdom"]);
}

#[tokio::test]
async fn reranker_reorders_only_the_top_block() {
    let harness = EngineHarness::new();
    let mut config = EngineConfig::default();
    config.retrieval.rerank_depth = 3;

    // Strictly decreasing semantic scores give a known fused order
    let pool = [
        "crash-landing",
        "goblin",
        "itaewon-class",
        "hospital-playlist",
        "reply-1988",
        "kingdom",
    ];
    let semantic: Vec<(String, f32)> = pool
        .iter()
        .enumerate()
        .map(|(i, id)| (id.to_string(), 1.0 - i as f32 * 0.1))
        .collect();
    let engine = harness
        .bare_builder(config)
        .semantic_index(Arc::new(FixedSemantic(semantic)))
        .lexical_index(Arc::new(FixedLexical(Vec::new())))
        .relevance_model(Arc::new(ReversingRelevance))
        .build()
        .unwrap();

    // An emotion query derives no filters and no popularity boost
    let request = || RecommendRequest::new("sad").with_top_n(6);
    let fused = engine.recommend(request().with_rerank(false)).await;
    assert_eq!(fused.ids(), pool.to_vec());
    assert!(!fused.reranked);

    let result = engine.recommend(request().with_rerank(true)).await;
    assert!(result.reranked, "{:?}", result.degradations);
    assert!(!result.degraded_by(DegradationReason::RerankTimeout));
    assert!(!result.degraded_by(DegradationReason::RerankFailed));

    // Top three reversed, tail untouched
    assert_eq!(
        result.ids(),
        vec!["itaewon-class", "goblin", "crash-landing", "hospital-playlist", "reply-1988", "kingdom"]
    );
    for item in &result.items[..3] {
        assert!(item.rerank_score.is_some(), "{} was not reranked", item.id);
    }
    for item in &result.items[3..] {
        assert!(item.rerank_score.is_none(), "{} is past the rerank depth", item.id);
    }
    let ranks: Vec<usize> = result.items.iter().map(|item| item.rank).collect();
    assert_eq!(ranks, vec![1, 2, 3, 4, 5, 6]);
}

#[tokio::test]
async fn top_n_fills_from_the_filtered_pool() {
    let harness = EngineHarness::new();

    // The strongest fused candidates are not romances
    let semantic: Vec<(String, f32)> = [
        ("kingdom", 1.0),
        ("reply-1988", 0.95),
        ("dr-romantic", 0.9),
        ("goblin", 0.6),
        ("moon-lovers", 0.5),
        ("crash-landing", 0.4),
        ("secretary-kim", 0.3),
        ("hometown-cha-cha-cha", 0.2),
    ]
    .into_iter()
    .map(|(id, score)| (id.to_string(), score))
    .collect();
    let engine = harness
        .bare_builder(EngineConfig::default())
        .semantic_index(Arc::new(FixedSemantic(semantic)))
        .lexical_index(Arc::new(FixedLexical(Vec::new())))
        .build()
        .unwrap();

    let filters = SearchFilters::default().with_genre(Genre::Romance);
    let result = engine
        .recommend(
            RecommendRequest::new("sad")
                .with_filters(filters)
                .with_top_n(3)
                .with_rerank(false),
        )
        .await;

    assert_eq!(result.items.len(), 3);
    for item in &result.items {
        assert!(item.genres.contains(&Genre::Romance), "{} is not a romance", item.id);
    }
    assert_eq!(result.ids(), vec!["goblin", "moon-lovers", "crash-landing"]);
    assert!(!result.degraded_by(DegradationReason::FilterEmptyResult));
}
