//! Conversions between raw geometries and `geo` crate types.

use geo::{Coord, LineString, MultiPolygon, Point, Polygon};
use geometrics_core::models::{BoundingBox, RawGeometry};

fn to_line_string(coords: &[[f64; 2]]) -> LineString<f64> {
    LineString::new(coords.iter().map(|c| Coord { x: c[0], y: c[1] }).collect())
}

fn to_polygon(rings: &[Vec<[f64; 2]>]) -> Polygon<f64> {
    match rings.split_first() {
        Some((exterior, interiors)) => Polygon::new(
            to_line_string(exterior),
            interiors.iter().map(|ring| to_line_string(ring)).collect(),
        ),
        None => Polygon::new(LineString::new(vec![]), vec![]),
    }
}

/// Convert a raw geometry to a `geo::Geometry`
///
/// Note that `geo::Polygon::new` closes open rings, so closure has to be checked
/// on the raw coordinates before converting.
pub fn to_geo_geometry(geom: &RawGeometry) -> geo::Geometry<f64> {
    match geom {
        RawGeometry::Point { coordinates } => {
            geo::Geometry::Point(Point::new(coordinates[0], coordinates[1]))
        }
        RawGeometry::LineString { coordinates } => {
            geo::Geometry::LineString(to_line_string(coordinates))
        }
        RawGeometry::Polygon { coordinates } => geo::Geometry::Polygon(to_polygon(coordinates)),
        RawGeometry::MultiPolygon { coordinates } => geo::Geometry::MultiPolygon(
            MultiPolygon::new(coordinates.iter().map(|poly| to_polygon(poly)).collect()),
        ),
    }
}

/// Convert a `geo::Rect` to the shared bounding box type
pub fn to_bounding_box(rect: geo::Rect<f64>) -> BoundingBox {
    let min = rect.min();
    let max = rect.max();
    BoundingBox::new([min.x, min.y], [max.x, max.y])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_conversion() {
        let geom = to_geo_geometry(&RawGeometry::point(115.0, -8.5));

        if let geo::Geometry::Point(p) = geom {
            assert!((p.x() - 115.0).abs() < 1e-10);
            assert!((p.y() + 8.5).abs() < 1e-10);
        } else {
            panic!("Expected Point geometry");
        }
    }

    #[test]
    fn test_polygon_with_hole_conversion() {
        let raw = RawGeometry::polygon(vec![
            vec![[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0], [0.0, 0.0]],
            vec![[2.0, 2.0], [4.0, 2.0], [4.0, 4.0], [2.0, 4.0], [2.0, 2.0]],
        ]);

        match to_geo_geometry(&raw) {
            geo::Geometry::Polygon(p) => {
                assert_eq!(p.exterior().0.len(), 5);
                assert_eq!(p.interiors().len(), 1);
            }
            other => panic!("Expected Polygon, got {other:?}"),
        }
    }

    #[test]
    fn test_multi_polygon_conversion() {
        let raw = RawGeometry::multi_polygon(vec![
            vec![vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]],
            vec![vec![[5.0, 5.0], [6.0, 5.0], [6.0, 6.0], [5.0, 5.0]]],
        ]);

        assert!(matches!(to_geo_geometry(&raw), geo::Geometry::MultiPolygon(mp) if mp.0.len() == 2));
    }

    #[test]
    fn test_to_bounding_box() {
        let rect = geo::Rect::new(Coord { x: 3.0, y: 4.0 }, Coord { x: 1.0, y: 2.0 });
        let bbox = to_bounding_box(rect);
        assert_eq!(bbox.min, [1.0, 2.0]);
        assert_eq!(bbox.max, [3.0, 4.0]);
    }
}
