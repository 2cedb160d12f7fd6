//! Pairwise overlap scores.
//!
//! Areal pairs are scored by intersection over union. Pairs involving a point
//! or a line use a linear distance decay over the Hausdorff distance.

use crate::store::Geometry;
use geo::{Area, BooleanOps, HausdorffDistance, MultiPolygon};
use geometrics_core::config::DEFAULT_POINT_RADIUS;

/// Exact intersection area of two polygonal shapes
pub trait IntersectionArea: Send + Sync {
    fn intersection_area(&self, a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> f64;
}

/// Intersection via `geo`'s boolean operations
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoBooleanOps;

impl IntersectionArea for GeoBooleanOps {
    fn intersection_area(&self, a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> f64 {
        a.intersection(b).unsigned_area()
    }
}

/// Scores pairs of validated geometries in `[0, 1]`
#[derive(Debug, Clone)]
pub struct OverlapEvaluator<B: IntersectionArea = GeoBooleanOps> {
    point_radius: f64,
    ops: B,
}

impl OverlapEvaluator<GeoBooleanOps> {
    /// Evaluator with the default boolean operations
    ///
    /// `point_radius` must be finite and positive; configuration validation
    /// enforces this before an evaluator is built.
    pub fn new(point_radius: f64) -> Self {
        Self::with_ops(point_radius, GeoBooleanOps)
    }
}

impl Default for OverlapEvaluator<GeoBooleanOps> {
    fn default() -> Self {
        Self::new(DEFAULT_POINT_RADIUS)
    }
}

impl<B: IntersectionArea> OverlapEvaluator<B> {
    pub fn with_ops(point_radius: f64, ops: B) -> Self {
        Self { point_radius, ops }
    }

    pub fn point_radius(&self) -> f64 {
        self.point_radius
    }

    pub fn ops(&self) -> &B {
        &self.ops
    }

    /// Similarity of `a` and `b`
    ///
    /// Symmetric and deterministic. Identical shapes score exactly 1.
    pub fn overlap_score(&self, a: &Geometry, b: &Geometry) -> f64 {
        match (a.areal(), b.areal()) {
            (Some(pa), Some(pb)) => self.areal_score(a, b, pa, pb),
            _ => self.distance_score(a, b),
        }
    }

    fn areal_score(
        &self,
        a: &Geometry,
        b: &Geometry,
        pa: &MultiPolygon<f64>,
        pb: &MultiPolygon<f64>,
    ) -> f64 {
        if !a.bounding_box().intersects(&b.bounding_box()) {
            return 0.0;
        }
        if a.same_shape(b) {
            return 1.0;
        }

        let intersection = self.ops.intersection_area(pa, pb);
        if intersection <= 0.0 {
            return 0.0;
        }

        let union = a.area() + b.area() - intersection;
        if union <= 0.0 {
            return 0.0;
        }

        (intersection / union).clamp(0.0, 1.0)
    }

    fn distance_score(&self, a: &Geometry, b: &Geometry) -> f64 {
        // The Hausdorff distance is never below the gap between the boxes
        if a.bounding_box().gap(&b.bounding_box()) >= self.point_radius {
            return 0.0;
        }
        if a.same_shape(b) {
            return 1.0;
        }

        let distance = a.as_geo().hausdorff_distance(b.as_geo());
        (1.0 - distance / self.point_radius).clamp(0.0, 1.0)
    }

    /// Upper bound of [`overlap_score`](Self::overlap_score) that needs no
    /// boolean operation
    ///
    /// For areal pairs IoU never exceeds `min(area) / max(area)`. Other pairs
    /// are bounded by 1.
    pub fn score_upper_bound(&self, a: &Geometry, b: &Geometry) -> f64 {
        if a.is_areal() && b.is_areal() {
            let (small, large) = if a.area() <= b.area() {
                (a.area(), b.area())
            } else {
                (b.area(), a.area())
            };
            if large <= 0.0 {
                return 0.0;
            }
            small / large
        } else {
            1.0
        }
    }
}
