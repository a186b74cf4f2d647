//! Property tests for fusion, weighting and classification

use proptest::prelude::*;
use std::collections::HashSet;

use seoulmate_core::search::{fuse, fuse_score, min_max_normalize, sort_candidates};
use seoulmate_core::{EntityExtractor, Intent, Lexicon, WeightingPolicy};

fn scored_ids() -> impl Strategy<Value = Vec<(String, f32)>> {
    prop::collection::vec(("[a-f]{1,2}", 0.0f32..100.0), 0..30)
}

proptest! {
    #[test]
    fn fused_score_monotonic_in_semantic(
        sem in 0.0f32..1.0,
        delta in 0.0f32..1.0,
        lex in 0.0f32..1.0,
        alpha in 0.0f32..=1.0,
    ) {
        let higher = (sem + delta).min(1.0);
        prop_assert!(fuse_score(higher, lex, alpha) >= fuse_score(sem, lex, alpha));
    }

    #[test]
    fn fused_score_monotonic_in_lexical(
        sem in 0.0f32..1.0,
        lex in 0.0f32..1.0,
        delta in 0.0f32..1.0,
        alpha in 0.0f32..=1.0,
    ) {
        let higher = (lex + delta).min(1.0);
        prop_assert!(fuse_score(sem, higher, alpha) >= fuse_score(sem, lex, alpha));
    }

    #[test]
    fn normalized_scores_in_unit_range(scores in prop::collection::vec(-50.0f32..50.0, 0..40)) {
        let normalized = min_max_normalize(&scores);
        prop_assert_eq!(normalized.len(), scores.len());
        for s in normalized {
            prop_assert!((0.0..=1.0).contains(&s));
        }
    }

    #[test]
    fn alpha_always_in_unit_range(confidence in -2.0f32..3.0, index in 0usize..10) {
        let policy = WeightingPolicy::default();
        let alpha = policy.alpha(Intent::PRECEDENCE[index], confidence);
        prop_assert!((0.0..=1.0).contains(&alpha));
    }

    #[test]
    fn fusion_yields_one_candidate_per_id(
        semantic in scored_ids(),
        lexical in scored_ids(),
        alpha in 0.0f32..=1.0,
    ) {
        let outcome = fuse(&semantic, &lexical, alpha);
        let ids: HashSet<&str> = outcome.candidates.iter().map(|c| c.id.as_str()).collect();
        prop_assert_eq!(ids.len(), outcome.candidates.len());

        let expected: HashSet<&str> = semantic
            .iter()
            .chain(lexical.iter())
            .map(|(id, _)| id.as_str())
            .collect();
        prop_assert_eq!(ids, expected);

        for candidate in &outcome.candidates {
            prop_assert!((0.0..=1.0 + 1e-6).contains(&candidate.fused_score));
        }
    }

    #[test]
    fn ordering_is_total_and_stable(semantic in scored_ids(), lexical in scored_ids()) {
        let mut first = fuse(&semantic, &lexical, 0.5).candidates;
        let mut reversed = first.clone();
        reversed.reverse();

        sort_candidates(&mut first);
        sort_candidates(&mut reversed);

        let a: Vec<&str> = first.iter().map(|c| c.id.as_str()).collect();
        let b: Vec<&str> = reversed.iter().map(|c| c.id.as_str()).collect();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn analysis_is_deterministic_and_total(query in "\\PC{0,60}") {
        let extractor = EntityExtractor::new(&Lexicon::default()).unwrap();
        let first = extractor.analyze(&query);
        let second = extractor.analyze(&query);
        prop_assert_eq!(&first, &second);
        prop_assert!((0.0..=1.0).contains(&first.confidence));
    }
}

#[test]
fn vague_fallback_for_unmatched_text() {
    let extractor = EntityExtractor::new(&Lexicon::default()).unwrap();
    let analysis = extractor.analyze("qzx vbn");
    assert_eq!(analysis.intent, Intent::Vague);
    assert!((analysis.confidence - 0.7).abs() < 1e-6);
}
