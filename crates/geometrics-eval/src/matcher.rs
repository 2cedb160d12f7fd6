use crate::strategy::{assign, resolve_strategy, ResolvedStrategy, ScoredPair};
use geometrics_core::config::EvaluationConfig;
use geometrics_core::models::{MatchResult, MatchStrategy, MatchedPair, Unmatched};
use geometrics_geo::{
    GeoBooleanOps, GeometryStore, IntersectionArea, LabeledGeometry, OverlapEvaluator,
};
use std::collections::HashSet;

/// How candidate pairs are enumerated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairGeneration {
    /// Every reference against every candidate
    Naive,
    /// Candidates found through the candidate store's R-tree
    Indexed,
}

/// One-to-one matcher between a reference and a candidate store
pub struct Matcher<B: IntersectionArea = GeoBooleanOps> {
    threshold: f64,
    strategy: ResolvedStrategy,
    class_agnostic: bool,
    index_min_size: usize,
    evaluator: OverlapEvaluator<B>,
}

impl Matcher<GeoBooleanOps> {
    /// Build a matcher from a validated configuration
    pub fn new(config: &EvaluationConfig) -> Self {
        Self::with_evaluator(config, OverlapEvaluator::new(config.point_radius))
    }
}

impl<B: IntersectionArea> Matcher<B> {
    pub fn with_evaluator(config: &EvaluationConfig, evaluator: OverlapEvaluator<B>) -> Self {
        Self {
            threshold: config.threshold,
            strategy: resolve_strategy(config.strategy),
            class_agnostic: config.class_agnostic,
            index_min_size: config.index_min_size,
            evaluator,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Strategy in effect after feature resolution
    pub fn strategy(&self) -> MatchStrategy {
        self.strategy.as_match_strategy()
    }

    pub fn evaluator(&self) -> &OverlapEvaluator<B> {
        &self.evaluator
    }

    /// Pair generation used for the given stores
    pub fn pair_generation(
        &self,
        references: &GeometryStore,
        candidates: &GeometryStore,
    ) -> PairGeneration {
        if references.len() >= self.index_min_size && candidates.len() >= self.index_min_size {
            PairGeneration::Indexed
        } else {
            PairGeneration::Naive
        }
    }

    /// Match the shapes of one unit
    ///
    /// Matches are sorted by reference id; both unmatched lists are ascending.
    pub fn match_unit(
        &self,
        references: &GeometryStore,
        candidates: &GeometryStore,
    ) -> MatchResult {
        let generation = self.pair_generation(references, candidates);
        self.match_with(references, candidates, generation)
    }

    /// Match with an explicit pair generation
    pub fn match_with(
        &self,
        references: &GeometryStore,
        candidates: &GeometryStore,
        generation: PairGeneration,
    ) -> MatchResult {
        let pairs = self.eligible_pairs(references, candidates, generation);
        let assigned = assign(&pairs, self.strategy);

        tracing::trace!(
            references = references.len(),
            candidates = candidates.len(),
            eligible = pairs.len(),
            matched = assigned.len(),
            "Matched unit"
        );

        build_result(references, candidates, &assigned)
    }

    /// Pairs that may be matched: compatible categories, score >= threshold and > 0
    pub fn eligible_pairs(
        &self,
        references: &GeometryStore,
        candidates: &GeometryStore,
        generation: PairGeneration,
    ) -> Vec<ScoredPair> {
        let mut pairs = Vec::new();

        for reference in references.shapes() {
            match generation {
                PairGeneration::Naive => {
                    for candidate in candidates.shapes() {
                        self.consider(reference, candidate, &mut pairs);
                    }
                }
                PairGeneration::Indexed => {
                    // Widened by the radius so distance-based pairs are found too
                    let radius = self.evaluator.point_radius();
                    let bbox = reference.geometry.bounding_box();
                    for id in candidates.spatial_index().query_within(&bbox, radius) {
                        if let Some(candidate) = candidates.get(id) {
                            self.consider(reference, candidate, &mut pairs);
                        }
                    }
                }
            }
        }

        pairs
    }

    fn consider(
        &self,
        reference: &LabeledGeometry,
        candidate: &LabeledGeometry,
        pairs: &mut Vec<ScoredPair>,
    ) {
        if !self.class_agnostic && !reference.category_compatible(candidate) {
            return;
        }

        let (a, b) = (&reference.geometry, &candidate.geometry);
        if self.evaluator.score_upper_bound(a, b) < self.threshold {
            return;
        }

        let score = self.evaluator.overlap_score(a, b);
        if score > 0.0 && score >= self.threshold {
            pairs.push(ScoredPair::new(reference.id, candidate.id, score));
        }
    }
}

fn build_result(
    references: &GeometryStore,
    candidates: &GeometryStore,
    assigned: &[ScoredPair],
) -> MatchResult {
    let matched_references: HashSet<usize> = assigned.iter().map(|p| p.reference).collect();
    let matched_candidates: HashSet<usize> = assigned.iter().map(|p| p.candidate).collect();

    let matches = assigned
        .iter()
        .map(|pair| MatchedPair {
            reference: pair.reference,
            candidate: pair.candidate,
            score: pair.score,
            category: references.get(pair.reference).and_then(|r| r.category.clone()),
        })
        .collect();

    let unmatched = |store: &GeometryStore, matched: &HashSet<usize>| -> Vec<Unmatched> {
        store
            .shapes()
            .iter()
            .filter(|s| !matched.contains(&s.id))
            .map(|s| Unmatched { id: s.id, category: s.category.clone() })
            .collect()
    };

    MatchResult {
        matches,
        unmatched_references: unmatched(references, &matched_references),
        unmatched_candidates: unmatched(candidates, &matched_candidates),
    }
}
