//! Geometry Store: validated, immutable shapes with cached measures.

use crate::index::SpatialIndex;
use crate::models::to_bounding_box;
use crate::validation::validate_and_wrap;
use geo::{Area, BoundingRect, Euclidean, Length, MultiPolygon, Polygon};
use geometrics_core::error::{GeometricsError, Result};
use geometrics_core::models::{BoundingBox, GeometryKind, RawGeometry};
use std::sync::OnceLock;

/// A validated shape
///
/// Built only through [`validate_and_wrap`]; there are no mutating operations.
/// Area, length and the polygonal form are computed on first use and cached.
#[derive(Debug)]
pub struct Geometry {
    kind: GeometryKind,
    shape: geo::Geometry<f64>,
    bbox: BoundingBox,
    area: OnceLock<f64>,
    length: OnceLock<f64>,
    areal: OnceLock<Option<MultiPolygon<f64>>>,
}

impl Geometry {
    /// Wrap an already validated `geo` shape
    pub(crate) fn from_validated(kind: GeometryKind, shape: geo::Geometry<f64>) -> Self {
        let bbox = match &shape {
            geo::Geometry::Point(p) => BoundingBox::from_point([p.x(), p.y()]),
            other => other
                .bounding_rect()
                .map(to_bounding_box)
                .unwrap_or_else(|| BoundingBox::from_point([0.0, 0.0])),
        };

        Self {
            kind,
            shape,
            bbox,
            area: OnceLock::new(),
            length: OnceLock::new(),
            areal: OnceLock::new(),
        }
    }

    pub fn kind(&self) -> GeometryKind {
        self.kind
    }

    pub fn is_areal(&self) -> bool {
        self.kind.is_areal()
    }

    /// The underlying `geo` shape
    pub fn as_geo(&self) -> &geo::Geometry<f64> {
        &self.shape
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.bbox
    }

    /// Planar area; 0 for points and lines
    pub fn area(&self) -> f64 {
        *self.area.get_or_init(|| match self.kind {
            GeometryKind::Point | GeometryKind::LineString => 0.0,
            GeometryKind::Polygon | GeometryKind::MultiPolygon => self.shape.unsigned_area(),
        })
    }

    /// Path length for lines, perimeter (all rings) for polygons, 0 for points
    pub fn length(&self) -> f64 {
        *self.length.get_or_init(|| match &self.shape {
            geo::Geometry::LineString(ls) => Euclidean.length(ls),
            geo::Geometry::Polygon(p) => perimeter(p),
            geo::Geometry::MultiPolygon(mp) => mp.iter().map(perimeter).sum(),
            _ => 0.0,
        })
    }

    /// Polygonal form used by the boolean operations; `None` for points and lines
    pub fn areal(&self) -> Option<&MultiPolygon<f64>> {
        self.areal
            .get_or_init(|| match &self.shape {
                geo::Geometry::Polygon(p) => Some(MultiPolygon::new(vec![p.clone()])),
                geo::Geometry::MultiPolygon(mp) => Some(mp.clone()),
                _ => None,
            })
            .as_ref()
    }

    /// Whether both shapes have exactly the same kind and vertices
    pub fn same_shape(&self, other: &Geometry) -> bool {
        self.kind == other.kind && self.shape == other.shape
    }
}

fn perimeter(polygon: &Polygon<f64>) -> f64 {
    Euclidean.length(polygon.exterior())
        + polygon.interiors().iter().map(|ring| Euclidean.length(ring)).sum::<f64>()
}

/// A validated geometry with its id, category and confidence
#[derive(Debug)]
pub struct LabeledGeometry {
    /// Ordinal of the shape in its input set
    pub id: usize,
    pub geometry: Geometry,
    pub category: Option<String>,
    pub confidence: Option<f64>,
}

impl LabeledGeometry {
    /// Whether two shapes may be paired under category rules
    pub fn category_compatible(&self, other: &LabeledGeometry) -> bool {
        self.category == other.category
    }
}

/// Owner of the validated shapes of one reference or candidate set
#[derive(Debug, Default)]
pub struct GeometryStore {
    name: String,
    shapes: Vec<LabeledGeometry>,
    next_id: usize,
    index: OnceLock<SpatialIndex>,
}

impl GeometryStore {
    /// Create an empty store; `name` prefixes shape labels in errors
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    /// Validate a raw shape and take ownership of it
    ///
    /// Every call consumes one id, including failed ones, so ids stay aligned
    /// with input ordinals.
    pub fn insert(
        &mut self,
        raw: &RawGeometry,
        category: Option<String>,
        confidence: Option<f64>,
    ) -> Result<usize> {
        let id = self.next_id;
        self.next_id += 1;

        let geometry = validate_and_wrap(raw).map_err(|e| {
            let error = self.label_error(e, id);
            tracing::debug!(store = %self.name, id, error = %error, "Shape rejected");
            error
        })?;

        self.shapes.push(LabeledGeometry { id, geometry, category, confidence });
        // New shapes invalidate a previously built index
        self.index = OnceLock::new();

        Ok(id)
    }

    /// Skip an id without storing a shape (e.g. filtered-out candidates)
    pub fn skip(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn label_error(&self, error: GeometricsError, id: usize) -> GeometricsError {
        let shape = format!("{}[{}]", self.name, id);
        match error {
            GeometricsError::InvalidGeometry { reason, .. } => {
                GeometricsError::InvalidGeometry { shape, reason }
            }
            GeometricsError::DegenerateGeometry { kind, .. } => {
                GeometricsError::DegenerateGeometry { shape, kind }
            }
            other => other,
        }
    }

    pub fn shapes(&self) -> &[LabeledGeometry] {
        &self.shapes
    }

    /// Look up a shape by id
    pub fn get(&self, id: usize) -> Option<&LabeledGeometry> {
        self.shapes
            .binary_search_by_key(&id, |s| s.id)
            .ok()
            .map(|pos| &self.shapes[pos])
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// R-tree over the bounding boxes, built on first use
    pub fn spatial_index(&self) -> &SpatialIndex {
        self.index.get_or_init(|| {
            SpatialIndex::from_entries(
                self.shapes.iter().map(|s| (s.id, s.geometry.bounding_box())).collect(),
            )
        })
    }
}
