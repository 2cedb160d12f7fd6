//! Canonical raw geometry types shared by all geometrics crates.
//!
//! `RawGeometry` is what callers hand in: coordinates in GeoJSON nesting, not yet
//! validated. The validated counterpart lives in `geometrics-geo`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Geometry kind classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryKind {
    Point,
    LineString,
    Polygon,
    MultiPolygon,
}

impl GeometryKind {
    /// Polygon-like kinds are scored by intersection over union
    pub fn is_areal(&self) -> bool {
        matches!(self, GeometryKind::Polygon | GeometryKind::MultiPolygon)
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GeometryKind::Point => "Point",
            GeometryKind::LineString => "LineString",
            GeometryKind::Polygon => "Polygon",
            GeometryKind::MultiPolygon => "MultiPolygon",
        };
        f.write_str(name)
    }
}

/// GeoJSON-compatible raw geometry representation
///
/// Polygon rings are listed exterior first, holes after. Rings must be closed
/// explicitly; nothing is closed or repaired on the caller's behalf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RawGeometry {
    Point {
        coordinates: [f64; 2],
    },
    LineString {
        coordinates: Vec<[f64; 2]>,
    },
    Polygon {
        coordinates: Vec<Vec<[f64; 2]>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<[f64; 2]>>>,
    },
}

impl RawGeometry {
    /// Create a Point geometry
    pub fn point(x: f64, y: f64) -> Self {
        RawGeometry::Point { coordinates: [x, y] }
    }

    /// Create a LineString geometry
    pub fn line_string(coords: Vec<[f64; 2]>) -> Self {
        RawGeometry::LineString { coordinates: coords }
    }

    /// Create a Polygon geometry
    pub fn polygon(rings: Vec<Vec<[f64; 2]>>) -> Self {
        RawGeometry::Polygon { coordinates: rings }
    }

    /// Create a MultiPolygon geometry
    pub fn multi_polygon(polygons: Vec<Vec<Vec<[f64; 2]>>>) -> Self {
        RawGeometry::MultiPolygon { coordinates: polygons }
    }

    /// Axis-aligned rectangle as a closed, counter-clockwise polygon
    pub fn rectangle(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self::polygon(vec![vec![
            [min_x, min_y],
            [max_x, min_y],
            [max_x, max_y],
            [min_x, max_y],
            [min_x, min_y],
        ]])
    }

    /// Get the geometry kind
    pub fn kind(&self) -> GeometryKind {
        match self {
            RawGeometry::Point { .. } => GeometryKind::Point,
            RawGeometry::LineString { .. } => GeometryKind::LineString,
            RawGeometry::Polygon { .. } => GeometryKind::Polygon,
            RawGeometry::MultiPolygon { .. } => GeometryKind::MultiPolygon,
        }
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl BoundingBox {
    pub fn new(min: [f64; 2], max: [f64; 2]) -> Self {
        Self { min, max }
    }

    /// Degenerate box around a single position
    pub fn from_point(p: [f64; 2]) -> Self {
        Self { min: p, max: p }
    }

    /// Check if two bounding boxes intersect (touching edges count)
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        let x_overlap = self.min[0] <= other.max[0] && self.max[0] >= other.min[0];
        let y_overlap = self.min[1] <= other.max[1] && self.max[1] >= other.min[1];

        x_overlap && y_overlap
    }

    /// Euclidean gap between the boxes, 0 when they intersect
    pub fn gap(&self, other: &BoundingBox) -> f64 {
        let dx = (other.min[0] - self.max[0]).max(self.min[0] - other.max[0]).max(0.0);
        let dy = (other.min[1] - self.max[1]).max(self.min[1] - other.max[1]).max(0.0);

        (dx * dx + dy * dy).sqrt()
    }

    /// Grow the box by `margin` on every side
    pub fn expand(&self, margin: f64) -> Self {
        Self {
            min: [self.min[0] - margin, self.min[1] - margin],
            max: [self.max[0] + margin, self.max[1] + margin],
        }
    }
}
