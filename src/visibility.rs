//! Per-ray visibility: which walls a ray crosses and in what order.
//!
//! Crossings at distance zero (the eye sitting on a wall) are dropped.
//! Hits come back nearest-first, then regrouped so every hit sharing a
//! segment id sits in one contiguous block. A block is placed by its
//! farthest member, which is what a backward scan from the far end
//! (pull the farthest unplaced hit's whole id in front of everything placed
//! so far) produces. For convex cells that keeps plain distance order; for
//! non-convex cells crossed more than twice the whole id collapses into the
//! slot of its farthest crossing, members still ordered by distance.

use crate::geometry::{Segment, Vec2, intersect};
use crate::world::{SegmentId, WallSegment};

/// One ray/wall crossing.
#[derive(Debug, Clone, Copy)]
pub struct Hit<'a> {
    pub distance: f32,
    pub point: Vec2,
    pub wall: &'a WallSegment,
}

impl Hit<'_> {
    #[inline]
    pub fn segment_id(&self) -> SegmentId {
        self.wall.segment_id
    }
}

/// Reusable scratch for resolving many rays against one wall list.
/// One per worker; the buffers are recycled between columns.
#[derive(Debug, Default)]
pub struct Resolver<'a> {
    hits: Vec<Hit<'a>>,
    farthest: Vec<(SegmentId, usize)>,
}

impl<'a> Resolver<'a> {
    pub fn new() -> Self {
        Self {
            hits: Vec::new(),
            farthest: Vec::new(),
        }
    }

    /// Ordered hits for `ray` against `walls`, valid until the next call.
    pub fn resolve(&mut self, ray: Segment, walls: &'a [WallSegment]) -> &[Hit<'a>] {
        self.hits.clear();
        self.hits.extend(walls.iter().filter_map(|wall| {
            let point = intersect(ray, wall.segment())?;
            let distance = ray.a.distance(point);
            (distance > 0.0).then_some(Hit {
                distance,
                point,
                wall,
            })
        }));

        // Stable: equal distances keep level order.
        self.hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));

        self.farthest.clear();
        for (i, hit) in self.hits.iter().enumerate() {
            match self.farthest.iter_mut().find(|(id, _)| *id == hit.segment_id()) {
                Some(slot) => slot.1 = i,
                None => self.farthest.push((hit.segment_id(), i)),
            }
        }

        let farthest = &self.farthest;
        self.hits.sort_by_key(|hit| block_rank(farthest, hit.segment_id()));
        &self.hits
    }
}

fn block_rank(farthest: &[(SegmentId, usize)], id: SegmentId) -> usize {
    farthest
        .iter()
        .find(|(candidate, _)| *candidate == id)
        .map_or(usize::MAX, |(_, rank)| *rank)
}

/// Allocating convenience wrapper around [`Resolver::resolve`].
pub fn resolve<'a>(ray: Segment, walls: &'a [WallSegment]) -> Vec<Hit<'a>> {
    Resolver::new().resolve(ray, walls).to_vec()
}

/// Maximal runs of hits sharing one segment id.
pub fn blocks<'h, 'a>(hits: &'h [Hit<'a>]) -> impl Iterator<Item = &'h [Hit<'a>]> {
    hits.chunk_by(|a, b| a.segment_id() == b.segment_id())
}
