//! Folding unit outcomes into confusion counts and finalized metrics.

use crate::unit::UnitOutcome;
use chrono::Utc;
use geometrics_core::models::{Counts, MatchStrategy, MetricReport, MetricSet, ShapeSide};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Running totals over any number of evaluation units
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub global: Counts,
    /// Only shapes that carry a category contribute here
    pub categories: BTreeMap<String, Counts>,
    pub units_evaluated: usize,
    pub units_failed: usize,
    /// Units never submitted because the batch was stopped
    pub units_skipped: usize,
    pub shapes_excluded: usize,
    pub units_with_exclusions: usize,
    pub candidates_filtered: usize,
    pub stopped_early: bool,
}

/// Unit-local counts, added to the summary in one step
#[derive(Default)]
struct UnitCounts {
    global: Counts,
    categories: BTreeMap<String, Counts>,
}

impl UnitCounts {
    fn record(&mut self, category: Option<&String>, apply: impl Fn(&mut Counts)) {
        apply(&mut self.global);
        if let Some(category) = category {
            apply(self.categories.entry(category.clone()).or_default());
        }
    }
}

impl MetricSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one unit's matches, misses and exclusions
    ///
    /// The unit is tallied on its own first, so folding units A then B gives
    /// exactly the same summary as B then A.
    pub fn fold(&mut self, outcome: &UnitOutcome) {
        let mut unit = UnitCounts::default();

        for pair in &outcome.result.matches {
            unit.record(pair.category.as_ref(), |c| {
                c.true_positives += 1;
                c.overlap_sum += pair.score;
            });
        }
        for missed in &outcome.result.unmatched_references {
            unit.record(missed.category.as_ref(), |c| c.false_negatives += 1);
        }
        for extra in &outcome.result.unmatched_candidates {
            unit.record(extra.category.as_ref(), |c| c.false_positives += 1);
        }
        // Excluded shapes are never dropped silently
        for shape in &outcome.excluded {
            match shape.side {
                ShapeSide::Reference => {
                    unit.record(shape.category.as_ref(), |c| c.false_negatives += 1)
                }
                ShapeSide::Candidate => {
                    unit.record(shape.category.as_ref(), |c| c.false_positives += 1)
                }
            }
        }

        self.global.add(&unit.global);
        for (category, counts) in &unit.categories {
            self.categories.entry(category.clone()).or_default().add(counts);
        }

        self.units_evaluated += 1;
        self.shapes_excluded += outcome.excluded.len();
        if outcome.has_exclusions() {
            self.units_with_exclusions += 1;
        }
        self.candidates_filtered += outcome.filtered_candidates;
    }

    /// Count a unit that could not be evaluated
    pub fn record_failure(&mut self) {
        self.units_failed += 1;
    }

    /// Combine with a summary from an independent run
    pub fn merge(&mut self, other: &MetricSummary) {
        self.global.add(&other.global);
        for (category, counts) in &other.categories {
            self.categories.entry(category.clone()).or_default().add(counts);
        }
        self.units_evaluated += other.units_evaluated;
        self.units_failed += other.units_failed;
        self.units_skipped += other.units_skipped;
        self.shapes_excluded += other.shapes_excluded;
        self.units_with_exclusions += other.units_with_exclusions;
        self.candidates_filtered += other.candidates_filtered;
        self.stopped_early |= other.stopped_early;
    }

    /// Compute the metric report
    ///
    /// Per-category sets are only reported when `per_category` is set.
    pub fn finalize(
        &self,
        threshold: f64,
        strategy: MatchStrategy,
        per_category: bool,
    ) -> MetricReport {
        let categories = if per_category {
            self.categories
                .iter()
                .map(|(name, counts)| (name.clone(), MetricSet::from_counts(counts)))
                .collect()
        } else {
            BTreeMap::new()
        };

        MetricReport {
            threshold,
            strategy,
            global: MetricSet::from_counts(&self.global),
            categories,
            units_evaluated: self.units_evaluated,
            units_failed: self.units_failed,
            units_skipped: self.units_skipped,
            shapes_excluded: self.shapes_excluded,
            units_with_exclusions: self.units_with_exclusions,
            candidates_filtered: self.candidates_filtered,
            stopped_early: self.stopped_early,
            generated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geometrics_core::models::{
        ExcludedShape, MatchResult, MatchedPair, MetricValue, Unmatched,
    };

    fn outcome(result: MatchResult) -> UnitOutcome {
        UnitOutcome { unit: "u".to_string(), result, excluded: Vec::new(), filtered_candidates: 0 }
    }

    fn pair(reference: usize, candidate: usize, score: f64, category: &str) -> MatchedPair {
        MatchedPair { reference, candidate, score, category: Some(category.to_string()) }
    }

    fn unmatched(id: usize, category: Option<&str>) -> Unmatched {
        Unmatched { id, category: category.map(String::from) }
    }

    #[test]
    fn test_single_match_scenario() {
        let mut summary = MetricSummary::new();
        summary.fold(&outcome(MatchResult {
            matches: vec![pair(0, 0, 80.0 / 120.0, "a")],
            ..Default::default()
        }));

        let report = summary.finalize(0.5, MatchStrategy::Greedy, true);
        assert_eq!(report.global.precision, MetricValue::Value(1.0));
        assert_eq!(report.global.recall, MetricValue::Value(1.0));
        assert_eq!(report.global.f1, MetricValue::Value(1.0));
        let mean = report.global.mean_overlap.value().unwrap();
        assert!((mean - 0.6667).abs() < 1e-4);
        assert_eq!(report.categories["a"].true_positives, 1);
        assert_eq!(report.threshold, 0.5);
    }

    #[test]
    fn test_only_candidates_scenario() {
        let mut summary = MetricSummary::new();
        summary.fold(&outcome(MatchResult {
            unmatched_candidates: vec![unmatched(0, None)],
            ..Default::default()
        }));

        let report = summary.finalize(0.5, MatchStrategy::Greedy, true);
        assert_eq!(report.global.false_positives, 1);
        assert_eq!(report.global.precision, MetricValue::Value(0.0));
        assert!(report.global.recall.is_undefined());
        assert!(report.global.f1.is_undefined());
        assert!(report.global.mean_overlap.is_undefined());
        // Uncategorized shapes only count globally
        assert!(report.categories.is_empty());
    }

    #[test]
    fn test_excluded_shapes_are_forced_errors() {
        let mut summary = MetricSummary::new();
        summary.fold(&UnitOutcome {
            unit: "u".to_string(),
            result: MatchResult::default(),
            excluded: vec![
                ExcludedShape {
                    side: ShapeSide::Reference,
                    index: 0,
                    category: Some("road".to_string()),
                    reason: "open ring".to_string(),
                },
                ExcludedShape {
                    side: ShapeSide::Candidate,
                    index: 3,
                    category: None,
                    reason: "zero area".to_string(),
                },
            ],
            filtered_candidates: 0,
        });

        assert_eq!(summary.global.false_negatives, 1);
        assert_eq!(summary.global.false_positives, 1);
        assert_eq!(summary.categories["road"].false_negatives, 1);
        assert_eq!(summary.shapes_excluded, 2);
        assert_eq!(summary.units_with_exclusions, 1);
    }

    #[test]
    fn test_per_category_disabled() {
        let mut summary = MetricSummary::new();
        summary.fold(&outcome(MatchResult {
            matches: vec![pair(0, 0, 0.9, "a")],
            unmatched_references: vec![unmatched(1, Some("b"))],
            ..Default::default()
        }));

        let report = summary.finalize(0.5, MatchStrategy::Greedy, false);
        assert!(report.categories.is_empty());
        assert_eq!(report.global.true_positives, 1);
        assert_eq!(report.global.false_negatives, 1);
        assert_eq!(report.global.recall, MetricValue::Value(0.5));
    }

    #[test]
    fn test_fold_order_independence() {
        let a = outcome(MatchResult {
            matches: vec![pair(0, 0, 0.71, "a"), pair(1, 2, 0.93, "b")],
            unmatched_candidates: vec![unmatched(1, Some("a"))],
            ..Default::default()
        });
        let b = outcome(MatchResult {
            matches: vec![pair(0, 1, 0.57, "a")],
            unmatched_references: vec![unmatched(1, Some("b"))],
            ..Default::default()
        });

        let mut ab = MetricSummary::new();
        ab.fold(&a);
        ab.fold(&b);
        let mut ba = MetricSummary::new();
        ba.fold(&b);
        ba.fold(&a);

        assert_eq!(ab, ba);
    }

    #[test]
    fn test_merge_matches_sequential_fold() {
        let a = outcome(MatchResult {
            matches: vec![pair(0, 0, 0.8, "a")],
            ..Default::default()
        });
        let b = outcome(MatchResult {
            unmatched_references: vec![unmatched(0, Some("a"))],
            ..Default::default()
        });

        let mut sequential = MetricSummary::new();
        sequential.fold(&a);
        sequential.fold(&b);

        let mut left = MetricSummary::new();
        left.fold(&a);
        let mut right = MetricSummary::new();
        right.fold(&b);
        right.record_failure();
        left.merge(&right);

        assert_eq!(left.global, sequential.global);
        assert_eq!(left.categories, sequential.categories);
        assert_eq!(left.units_evaluated, 2);
        assert_eq!(left.units_failed, 1);
    }

    #[test]
    fn test_empty_summary_is_all_undefined() {
        let report = MetricSummary::new().finalize(0.5, MatchStrategy::Optimal, true);

        assert!(report.global.precision.is_undefined());
        assert!(report.global.recall.is_undefined());
        assert!(report.global.f1.is_undefined());
        assert_eq!(report.strategy, MatchStrategy::Optimal);
    }
}
