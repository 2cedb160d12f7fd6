use crate::models::to_geo_geometry;
use crate::store::Geometry;
use geo::Validation;
use geometrics_core::error::{GeometricsError, Result};
use geometrics_core::models::{GeometryKind, RawGeometry};

/// Validation result with details
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

/// Validation error with location details
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub location: String,
    pub reason: String,
}

impl ValidationResult {
    /// Create a valid result
    pub fn valid() -> Self {
        Self { is_valid: true, errors: Vec::new() }
    }

    /// Add an error to the result
    pub fn add_error(&mut self, location: String, reason: String) {
        self.is_valid = false;
        self.errors.push(ValidationError { location, reason });
    }

    /// First error formatted as "location: reason"
    pub fn first_reason(&self) -> Option<String> {
        self.errors.first().map(|e| format!("{}: {}", e.location, e.reason))
    }
}

/// Structural checks on raw coordinates
///
/// Covers finiteness, minimum position counts and ring closure. Simplicity
/// (self-intersection, hole placement) is left to the geometry library.
pub fn check_structure(geometry: &RawGeometry) -> ValidationResult {
    match geometry {
        RawGeometry::Point { coordinates } => check_point(coordinates),
        RawGeometry::LineString { coordinates } => check_linestring(coordinates),
        RawGeometry::Polygon { coordinates } => check_polygon(coordinates),
        RawGeometry::MultiPolygon { coordinates } => check_multipolygon(coordinates),
    }
}

fn check_point(point: &[f64; 2]) -> ValidationResult {
    let mut result = ValidationResult::valid();
    if !point[0].is_finite() || !point[1].is_finite() {
        result.add_error(
            format!("Point({}, {})", point[0], point[1]),
            "Coordinates must be finite".to_string(),
        );
    }
    result
}

fn check_linestring(coords: &[[f64; 2]]) -> ValidationResult {
    let mut result = ValidationResult::valid();

    // LineString must have at least 2 points
    if coords.len() < 2 {
        result.add_error(
            "LineString".to_string(),
            format!("LineString must have at least 2 points, found {}", coords.len()),
        );
        return result;
    }

    for (i, coord) in coords.iter().enumerate() {
        if !coord[0].is_finite() || !coord[1].is_finite() {
            result
                .add_error(format!("LineString[{}]", i), "Coordinates must be finite".to_string());
        }
    }

    result
}

fn check_ring(ring: &[[f64; 2]], location: &str, result: &mut ValidationResult) {
    if ring.len() < 4 {
        result.add_error(
            location.to_string(),
            format!("Ring must have at least 4 points, found {}", ring.len()),
        );
    }

    for (i, coord) in ring.iter().enumerate() {
        if !coord[0].is_finite() || !coord[1].is_finite() {
            result.add_error(format!("{}[{}]", location, i), "Coordinates must be finite".to_string());
        }
    }

    if let (Some(first), Some(last)) = (ring.first(), ring.last()) {
        if first != last {
            result.add_error(
                location.to_string(),
                "Ring must be closed (first point == last point)".to_string(),
            );
        }
    }
}

fn check_polygon(rings: &[Vec<[f64; 2]>]) -> ValidationResult {
    let mut result = ValidationResult::valid();

    if rings.is_empty() {
        result.add_error("Polygon".to_string(), "Polygon must have an exterior ring".to_string());
        return result;
    }

    check_ring(&rings[0], "Polygon exterior", &mut result);
    for (i, interior) in rings.iter().enumerate().skip(1) {
        check_ring(interior, &format!("Polygon interior[{}]", i - 1), &mut result);
    }

    result
}

fn check_multipolygon(polygons: &[Vec<Vec<[f64; 2]>>]) -> ValidationResult {
    let mut result = ValidationResult::valid();

    if polygons.is_empty() {
        result.add_error(
            "MultiPolygon".to_string(),
            "MultiPolygon must have at least one polygon".to_string(),
        );
        return result;
    }

    for (i, polygon) in polygons.iter().enumerate() {
        let poly_result = check_polygon(polygon);
        for error in poly_result.errors {
            result.add_error(format!("MultiPolygon[{}].{}", i, error.location), error.reason);
        }
    }

    result
}

/// Validate a raw shape and wrap it as an immutable [`Geometry`]
///
/// Fails with `InvalidGeometry` on structural or simplicity violations and with
/// `DegenerateGeometry` when a polygon has zero area or a line zero length.
/// Invalid input is never repaired.
pub fn validate_and_wrap(raw: &RawGeometry) -> Result<Geometry> {
    let kind = raw.kind();
    let structure = check_structure(raw);
    if !structure.is_valid {
        return Err(GeometricsError::InvalidGeometry {
            shape: kind.to_string(),
            reason: structure.first_reason().unwrap_or_else(|| "Invalid geometry".to_string()),
        });
    }

    let shape = to_geo_geometry(raw);

    let simple = match &shape {
        geo::Geometry::Polygon(p) => p.is_valid(),
        geo::Geometry::MultiPolygon(mp) => mp.is_valid(),
        _ => true,
    };
    if !simple {
        return Err(GeometricsError::InvalidGeometry {
            shape: kind.to_string(),
            reason: format!("{} is not simple (self-intersecting or malformed rings)", kind),
        });
    }

    let geometry = Geometry::from_validated(kind, shape);

    let degenerate = match kind {
        GeometryKind::Point => false,
        GeometryKind::LineString => geometry.length() == 0.0,
        GeometryKind::Polygon | GeometryKind::MultiPolygon => geometry.area() == 0.0,
    };
    if degenerate {
        return Err(GeometricsError::DegenerateGeometry { shape: kind.to_string(), kind });
    }

    Ok(geometry)
}
