//! geometrics geo - validated geometries and pairwise overlap
//!
//! This crate wraps raw shapes into immutable, validated geometries, keeps them
//! in per-side stores with an R-tree over their bounding boxes, and scores pairs
//! of shapes by overlap.

pub mod index;
pub mod models;
pub mod overlap;
pub mod store;
pub mod validation;

pub use index::SpatialIndex;
pub use overlap::{GeoBooleanOps, IntersectionArea, OverlapEvaluator};
pub use store::{Geometry, GeometryStore, LabeledGeometry};
pub use validation::validate_and_wrap;
