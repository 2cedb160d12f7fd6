use geometrics_core::models::BoundingBox;
use rstar::{RTree, RTreeObject, AABB};
use std::fmt;

/// Shape id with its bounding box
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedShape {
    /// Id of the shape in its store
    pub id: usize,

    /// Bounding box for spatial indexing
    envelope: AABB<[f64; 2]>,
}

impl IndexedShape {
    pub fn new(id: usize, bbox: &BoundingBox) -> Self {
        Self { id, envelope: to_envelope(bbox) }
    }
}

impl RTreeObject for IndexedShape {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

fn to_envelope(bbox: &BoundingBox) -> AABB<[f64; 2]> {
    AABB::from_corners(bbox.min, bbox.max)
}

/// R-tree over the bounding boxes of one store
///
/// Only used to prune the pair space. A query returns every shape whose box
/// intersects the query box (touching counts), so nothing that could overlap
/// is ever missed.
pub struct SpatialIndex {
    tree: RTree<IndexedShape>,
}

impl SpatialIndex {
    /// Create a new empty spatial index
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Bulk load an index from `(id, bbox)` pairs
    pub fn from_entries(entries: Vec<(usize, BoundingBox)>) -> Self {
        let indexed: Vec<IndexedShape> =
            entries.iter().map(|(id, bbox)| IndexedShape::new(*id, bbox)).collect();

        Self { tree: RTree::bulk_load(indexed) }
    }

    /// Ids of shapes whose bounding box intersects `bbox`, ascending
    pub fn query_bbox(&self, bbox: &BoundingBox) -> Vec<usize> {
        let mut ids: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&to_envelope(bbox))
            .map(|shape| shape.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Ids of shapes whose bounding box lies within `distance` of `bbox`
    ///
    /// Uses the expanded box as an approximation, so results are a superset.
    pub fn query_within(&self, bbox: &BoundingBox, distance: f64) -> Vec<usize> {
        self.query_bbox(&bbox.expand(distance))
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SpatialIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpatialIndex").field("len", &self.len()).finish()
    }
}
