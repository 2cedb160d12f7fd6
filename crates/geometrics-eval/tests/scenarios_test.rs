//! End-to-end evaluation scenarios
//!
//! Each test builds unit inputs, runs them through the batch driver and checks
//! the finalized report.

use geometrics_core::config::EvaluationConfig;
use geometrics_core::models::{MatchStrategy, MetricValue, RawGeometry, ShapeInput, UnitInput};
use geometrics_eval::BatchDriver;

fn config(strategy: MatchStrategy) -> EvaluationConfig {
    EvaluationConfig::new(0.5, strategy, true).unwrap().workers(2)
}

#[tokio::test]
async fn test_partial_overlap_single_match() {
    let unit = UnitInput::new("p1-p2")
        .reference(
            ShapeInput::new(RawGeometry::rectangle(0.0, 0.0, 10.0, 10.0)).category("a"),
        )
        .candidate(
            ShapeInput::new(RawGeometry::rectangle(2.0, 0.0, 12.0, 10.0)).category("a"),
        );

    let report = BatchDriver::new(config(MatchStrategy::Greedy)).run(vec![unit]).await.unwrap();

    assert_eq!(report.global.true_positives, 1);
    assert_eq!(report.global.precision, MetricValue::Value(1.0));
    assert_eq!(report.global.recall, MetricValue::Value(1.0));
    let mean = report.global.mean_overlap.value().unwrap();
    assert!((mean - 0.667).abs() < 1e-3);
    assert_eq!(report.categories["a"].true_positives, 1);
    assert_eq!(report.threshold, 0.5);
}

#[tokio::test]
async fn test_candidates_without_references() {
    let unit = UnitInput::new("empty-refs")
        .candidate(ShapeInput::new(RawGeometry::rectangle(0.0, 0.0, 1.0, 1.0)));

    let report = BatchDriver::new(config(MatchStrategy::Greedy)).run(vec![unit]).await.unwrap();

    assert_eq!(report.global.true_positives, 0);
    assert_eq!(report.global.false_positives, 1);
    assert_eq!(report.global.precision, MetricValue::Value(0.0));
    assert!(report.global.recall.is_undefined());
}

#[tokio::test]
async fn test_invalid_reference_is_a_forced_miss() {
    let open_ring =
        RawGeometry::polygon(vec![vec![[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0]]]);
    let unit = UnitInput::new("tile")
        .reference(ShapeInput::new(RawGeometry::rectangle(0.0, 0.0, 1.0, 1.0)))
        .reference(ShapeInput::new(open_ring).category("building"))
        .candidate(ShapeInput::new(RawGeometry::rectangle(0.0, 0.0, 1.0, 1.0)));

    let report = BatchDriver::new(config(MatchStrategy::Greedy)).run(vec![unit]).await.unwrap();

    assert_eq!(report.global.true_positives, 1);
    assert_eq!(report.global.false_negatives, 1);
    assert_eq!(report.shapes_excluded, 1);
    assert_eq!(report.units_with_exclusions, 1);
    assert_eq!(report.categories["building"].recall, MetricValue::Value(0.0));
}

#[tokio::test]
async fn test_confidence_floor_drops_candidates() {
    let unit = UnitInput::new("scored")
        .reference(ShapeInput::new(RawGeometry::rectangle(0.0, 0.0, 1.0, 1.0)))
        .candidate(ShapeInput::new(RawGeometry::rectangle(0.0, 0.0, 1.0, 1.0)).confidence(0.9))
        .candidate(ShapeInput::new(RawGeometry::rectangle(5.0, 5.0, 6.0, 6.0)).confidence(0.1));

    let cfg = config(MatchStrategy::Greedy).min_confidence(Some(0.5));
    let report = BatchDriver::new(cfg).run(vec![unit]).await.unwrap();

    assert_eq!(report.global.true_positives, 1);
    assert_eq!(report.global.false_positives, 0);
    assert_eq!(report.candidates_filtered, 1);
    assert_eq!(report.shapes_excluded, 0);
}

#[cfg(feature = "optimal")]
#[tokio::test]
async fn test_optimal_recovers_more_overlap_than_greedy() {
    // Reference 0 overlaps both candidates; reference 1 only the first one.
    // Greedy gives candidate 0 to reference 0 and strands reference 1.
    let unit = UnitInput::new("crossing")
        .reference(ShapeInput::new(RawGeometry::rectangle(0.0, 0.0, 10.0, 10.0)))
        .reference(ShapeInput::new(RawGeometry::rectangle(1.5, 0.0, 11.5, 10.0)))
        .candidate(ShapeInput::new(RawGeometry::rectangle(0.5, 0.0, 10.5, 10.0)))
        .candidate(ShapeInput::new(RawGeometry::rectangle(-3.0, 0.0, 7.0, 10.0)));

    let greedy =
        BatchDriver::new(config(MatchStrategy::Greedy)).run(vec![unit.clone()]).await.unwrap();
    let optimal =
        BatchDriver::new(config(MatchStrategy::Optimal)).run(vec![unit]).await.unwrap();

    assert_eq!(greedy.global.true_positives, 1);
    assert_eq!(optimal.global.true_positives, 2);
    assert_eq!(optimal.strategy, MatchStrategy::Optimal);
}

#[tokio::test]
async fn test_report_serializes_undefined_explicitly() {
    let report = BatchDriver::new(config(MatchStrategy::Greedy)).run(Vec::new()).await.unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["global"]["precision"], "undefined");
    assert_eq!(json["strategy"], "greedy");
    assert_eq!(json["threshold"], 0.5);
}
