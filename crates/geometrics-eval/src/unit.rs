use crate::matcher::Matcher;
use geometrics_core::error::{GeometricsError, Result};
use geometrics_core::models::{ExcludedShape, MatchResult, ShapeInput, ShapeSide, UnitInput};
use geometrics_geo::{GeometryStore, IntersectionArea};
use serde::{Deserialize, Serialize};

/// Validated shapes of one evaluation unit
#[derive(Debug)]
pub struct EvaluationUnit {
    pub id: String,
    pub references: GeometryStore,
    pub candidates: GeometryStore,
    /// Shapes rejected by validation, in input order per side
    pub excluded: Vec<ExcludedShape>,
    /// Candidates dropped for falling below the confidence floor
    pub filtered_candidates: usize,
}

impl EvaluationUnit {
    /// Validate every shape of `input`
    ///
    /// Invalid or degenerate shapes are excluded and recorded, never repaired.
    /// Candidates whose confidence is below `min_confidence` are dropped and not
    /// counted at all; candidates without a confidence are always kept.
    pub fn build(input: &UnitInput, min_confidence: Option<f64>) -> Self {
        let mut excluded = Vec::new();

        let mut references = GeometryStore::new("reference");
        for (index, shape) in input.references.iter().enumerate() {
            let excluded_shape = insert_shape(&mut references, shape, ShapeSide::Reference, index);
            excluded.extend(excluded_shape);
        }

        let mut candidates = GeometryStore::new("candidate");
        let mut filtered_candidates = 0;
        for (index, shape) in input.candidates.iter().enumerate() {
            let below_floor = matches!(
                (min_confidence, shape.confidence),
                (Some(floor), Some(confidence)) if confidence < floor
            );
            if below_floor {
                candidates.skip();
                filtered_candidates += 1;
                continue;
            }
            let excluded_shape = insert_shape(&mut candidates, shape, ShapeSide::Candidate, index);
            excluded.extend(excluded_shape);
        }

        for shape in &excluded {
            tracing::warn!(unit = %input.id, side = %shape.side, "Excluding shape: {}", shape.reason);
        }

        Self { id: input.id.clone(), references, candidates, excluded, filtered_candidates }
    }

    /// Match the validated shapes
    pub fn evaluate<B: IntersectionArea>(self, matcher: &Matcher<B>) -> UnitOutcome {
        let result = matcher.match_unit(&self.references, &self.candidates);
        UnitOutcome {
            unit: self.id,
            result,
            excluded: self.excluded,
            filtered_candidates: self.filtered_candidates,
        }
    }
}

/// Insert one shape, returning its exclusion record if validation fails
fn insert_shape(
    store: &mut GeometryStore,
    shape: &ShapeInput,
    side: ShapeSide,
    index: usize,
) -> Option<ExcludedShape> {
    let e = store.insert(&shape.geometry, shape.category.clone(), shape.confidence).err()?;
    Some(ExcludedShape { side, index, category: shape.category.clone(), reason: e.to_string() })
}

/// Result of evaluating one unit, ready to be folded into a summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitOutcome {
    pub unit: String,
    pub result: MatchResult,
    pub excluded: Vec<ExcludedShape>,
    pub filtered_candidates: usize,
}

impl UnitOutcome {
    pub fn has_exclusions(&self) -> bool {
        !self.excluded.is_empty()
    }
}

/// Reject a unit with more than `limit` shapes on either side
///
/// Runs before any shape is validated; an oversized unit counts as failed.
pub fn check_unit_size(input: &UnitInput, limit: usize) -> Result<()> {
    let sides = [
        (ShapeSide::Reference, input.references.len()),
        (ShapeSide::Candidate, input.candidates.len()),
    ];
    for (side, count) in sides {
        if count > limit {
            return Err(GeometricsError::UnitFailed {
                unit: input.id.clone(),
                reason: format!("{} {} shapes exceed the limit of {}", count, side, limit),
            });
        }
    }
    Ok(())
}

/// Validate and match one unit
pub fn evaluate_unit<B: IntersectionArea>(
    input: &UnitInput,
    matcher: &Matcher<B>,
    min_confidence: Option<f64>,
    max_shapes_per_unit: usize,
) -> Result<UnitOutcome> {
    check_unit_size(input, max_shapes_per_unit)?;
    Ok(EvaluationUnit::build(input, min_confidence).evaluate(matcher))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geometrics_core::config::EvaluationConfig;
    use geometrics_core::models::RawGeometry;

    fn square(x: f64, y: f64) -> ShapeInput {
        ShapeInput::new(RawGeometry::rectangle(x, y, x + 1.0, y + 1.0))
    }

    fn open_ring() -> ShapeInput {
        ShapeInput::new(RawGeometry::polygon(vec![vec![
            [0.0, 0.0],
            [1.0, 0.0],
            [1.0, 1.0],
            [0.0, 1.0],
        ]]))
    }

    #[test]
    fn test_invalid_shapes_are_excluded_with_their_index() {
        let input = UnitInput::new("tile-1")
            .reference(square(0.0, 0.0))
            .reference(open_ring().category("roof"))
            .candidate(square(0.0, 0.0))
            .candidate(ShapeInput::new(RawGeometry::point(f64::NAN, 0.0)));

        let unit = EvaluationUnit::build(&input, None);

        assert_eq!(unit.references.len(), 1);
        assert_eq!(unit.candidates.len(), 1);
        assert_eq!(unit.excluded.len(), 2);
        assert_eq!(unit.excluded[0].side, ShapeSide::Reference);
        assert_eq!(unit.excluded[0].index, 1);
        assert_eq!(unit.excluded[0].category.as_deref(), Some("roof"));
        assert_eq!(unit.excluded[1].side, ShapeSide::Candidate);
        assert_eq!(unit.excluded[1].index, 1);
    }

    #[test]
    fn test_low_confidence_candidates_are_dropped() {
        let input = UnitInput::new("tile-2")
            .reference(square(0.0, 0.0))
            .candidate(square(0.0, 0.0).confidence(0.2))
            .candidate(square(0.0, 0.0).confidence(0.9))
            .candidate(square(5.0, 5.0));

        let unit = EvaluationUnit::build(&input, Some(0.5));

        assert_eq!(unit.filtered_candidates, 1);
        assert_eq!(unit.candidates.len(), 2);
        // Ids keep their input ordinals
        assert!(unit.candidates.get(0).is_none());
        assert!(unit.candidates.get(1).is_some());
        assert!(unit.excluded.is_empty());
    }

    #[test]
    fn test_evaluate_unit() {
        let config = EvaluationConfig::default();
        let matcher = Matcher::new(&config);
        let input = UnitInput::new("tile-3")
            .reference(square(0.0, 0.0))
            .candidate(square(0.0, 0.0))
            .candidate(square(9.0, 9.0));

        let outcome = evaluate_unit(&input, &matcher, None, 10).unwrap();

        assert_eq!(outcome.unit, "tile-3");
        assert_eq!(outcome.result.matches.len(), 1);
        assert_eq!(outcome.result.unmatched_candidates.len(), 1);
        assert!(!outcome.has_exclusions());
    }

    #[test]
    fn test_oversized_unit_is_rejected() {
        let matcher = Matcher::new(&EvaluationConfig::default());
        let input = UnitInput::new("tile-4")
            .reference(square(0.0, 0.0))
            .candidate(square(0.0, 0.0))
            .candidate(square(2.0, 0.0))
            .candidate(square(4.0, 0.0));

        assert!(check_unit_size(&input, 3).is_ok());

        let err = evaluate_unit(&input, &matcher, None, 2).unwrap_err();
        match err {
            GeometricsError::UnitFailed { unit, reason } => {
                assert_eq!(unit, "tile-4");
                assert_eq!(reason, "3 candidate shapes exceed the limit of 2");
            }
            other => panic!("expected unit failure, got {other:?}"),
        }
    }
}
