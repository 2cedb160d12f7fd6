use geometrics_core::config::EvaluationConfig;
use geometrics_core::models::{MatchStrategy, RawGeometry};
use geometrics_eval::{Matcher, PairGeneration};
use geometrics_geo::GeometryStore;
use proptest::prelude::*;

fn arb_squares(max: usize) -> impl Strategy<Value = Vec<(f64, f64, f64, u8)>> {
    prop::collection::vec((0.0f64..40.0, 0.0f64..40.0, 1.0f64..8.0, 0u8..3), 0..max)
}

fn store(name: &str, squares: &[(f64, f64, f64, u8)]) -> GeometryStore {
    let mut store = GeometryStore::new(name);
    for &(x, y, size, category) in squares {
        let raw = RawGeometry::rectangle(x, y, x + size, y + size);
        store.insert(&raw, Some(format!("c{category}")), None).unwrap();
    }
    store
}

fn matcher(threshold: f64) -> Matcher {
    let config = EvaluationConfig::new(threshold, MatchStrategy::Greedy, true)
        .unwrap()
        .index_min_size(1);
    Matcher::new(&config)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn indexed_and_naive_agree(
        refs in arb_squares(20),
        cands in arb_squares(20),
        threshold in 0.0f64..0.9,
    ) {
        let matcher = matcher(threshold);
        let refs = store("reference", &refs);
        let cands = store("candidate", &cands);

        let indexed = matcher.match_with(&refs, &cands, PairGeneration::Indexed);
        let naive = matcher.match_with(&refs, &cands, PairGeneration::Naive);
        prop_assert_eq!(indexed, naive);
    }

    #[test]
    fn raising_threshold_never_adds_matches(
        refs in arb_squares(15),
        cands in arb_squares(15),
        low in 0.0f64..0.5,
        step in 0.0f64..0.5,
    ) {
        let refs = store("reference", &refs);
        let cands = store("candidate", &cands);

        let loose = matcher(low).match_unit(&refs, &cands);
        let strict = matcher(low + step).match_unit(&refs, &cands);
        prop_assert!(strict.matches.len() <= loose.matches.len());
    }

    #[test]
    fn every_shape_is_accounted_for(refs in arb_squares(15), cands in arb_squares(15)) {
        let refs = store("reference", &refs);
        let cands = store("candidate", &cands);

        let result = matcher(0.3).match_unit(&refs, &cands);
        prop_assert_eq!(result.matches.len() + result.unmatched_references.len(), refs.len());
        prop_assert_eq!(result.matches.len() + result.unmatched_candidates.len(), cands.len());
    }
}
