pub mod geometry;
pub mod matching;
pub mod report;
pub mod unit;

pub use geometry::{BoundingBox, GeometryKind, RawGeometry};
pub use matching::{MatchResult, MatchStrategy, MatchedPair, Unmatched};
pub use report::{Counts, MetricReport, MetricSet, MetricValue};
pub use unit::{ExcludedShape, ShapeInput, ShapeSide, UnitInput};
