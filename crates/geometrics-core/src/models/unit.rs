use crate::models::geometry::RawGeometry;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One input shape: geometry plus optional category and confidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeInput {
    pub geometry: RawGeometry,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Candidate confidence; ignored on the reference side
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl ShapeInput {
    pub fn new(geometry: RawGeometry) -> Self {
        Self { geometry, category: None, confidence: None }
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }
}

/// Input for one evaluation unit (one image, one tile, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitInput {
    pub id: String,

    #[serde(default)]
    pub references: Vec<ShapeInput>,

    #[serde(default)]
    pub candidates: Vec<ShapeInput>,
}

impl UnitInput {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), references: Vec::new(), candidates: Vec::new() }
    }

    pub fn reference(mut self, shape: ShapeInput) -> Self {
        self.references.push(shape);
        self
    }

    pub fn candidate(mut self, shape: ShapeInput) -> Self {
        self.candidates.push(shape);
        self
    }

    pub fn shape_count(&self) -> usize {
        self.references.len() + self.candidates.len()
    }
}

/// Which set of a unit a shape belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeSide {
    Reference,
    Candidate,
}

impl fmt::Display for ShapeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeSide::Reference => f.write_str("reference"),
            ShapeSide::Candidate => f.write_str("candidate"),
        }
    }
}

/// A shape rejected by validation; counted as a forced false negative
/// (reference side) or forced false positive (candidate side)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExcludedShape {
    pub side: ShapeSide,
    /// Ordinal of the shape in its input set
    pub index: usize,
    pub category: Option<String>,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_input_deserialization_defaults() {
        let unit: UnitInput = serde_json::from_str(
            r#"{"id":"tile-1","candidates":[{"geometry":{"type":"Point","coordinates":[1.0,2.0]},"confidence":0.9}]}"#,
        )
        .unwrap();

        assert_eq!(unit.id, "tile-1");
        assert!(unit.references.is_empty());
        assert_eq!(unit.candidates.len(), 1);
        assert_eq!(unit.candidates[0].confidence, Some(0.9));
        assert_eq!(unit.candidates[0].category, None);
    }

    #[test]
    fn test_unit_input_builder() {
        let unit = UnitInput::new("u")
            .reference(ShapeInput::new(RawGeometry::point(0.0, 0.0)).category("tree"))
            .candidate(ShapeInput::new(RawGeometry::point(0.1, 0.0)).confidence(0.4));

        assert_eq!(unit.shape_count(), 2);
        assert_eq!(unit.references[0].category.as_deref(), Some("tree"));
    }
}
