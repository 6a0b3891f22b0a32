use std::collections::HashMap;

use crate::error::LevelError;
use crate::geometry::{Segment, Vec2};
use crate::texture::TextureId;

/// Tag shared by every edge of one cell.
pub type SegmentId = u32;

#[derive(Debug, Clone, PartialEq)]
pub struct WallSegment {
    pub point_a: Vec2,
    pub point_b: Vec2,
    pub floor_height_frac: f32, // share of the face taken by the floor riser
    pub ceiling_height_frac: f32, // share of the face taken by the ceiling riser
    pub segment_id: SegmentId,
    pub wall_texture: TextureId,
    pub floor_texture: TextureId,
    pub ceiling_texture: TextureId,
}

impl WallSegment {
    #[inline]
    pub fn segment(&self) -> Segment {
        Segment::new(self.point_a, self.point_b)
    }
}

/// Billboard placed in the world. Texels equal to `transparent_key` are not drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    pub position: Vec2,
    pub texture: TextureId,
    pub transparent_key: u32,
}

/// Immutable, validated wall list.
#[derive(Debug, Clone, Default)]
pub struct Level {
    walls: Vec<WallSegment>,
}

impl Level {
    /// Checks finite distinct endpoints, height fractions in `[0, 1]`, and
    /// that each segment id traces closed outlines (every endpoint shared
    /// by an even number of that id's edges).
    pub fn new(walls: Vec<WallSegment>) -> Result<Self, LevelError> {
        for (index, wall) in walls.iter().enumerate() {
            if !wall.point_a.is_finite() || !wall.point_b.is_finite() {
                return Err(LevelError::NonFiniteWall { index });
            }
            if wall.point_a == wall.point_b {
                return Err(LevelError::DegenerateWall { index });
            }
            check_fraction(index, "floor_height_frac", wall.floor_height_frac)?;
            check_fraction(index, "ceiling_height_frac", wall.ceiling_height_frac)?;
        }
        check_closed_outlines(&walls)?;

        log::debug!("level validated: {} walls", walls.len());
        Ok(Self { walls })
    }

    #[inline]
    pub fn walls(&self) -> &[WallSegment] {
        &self.walls
    }

    /// Distinct segment ids in order of first appearance.
    pub fn segment_ids(&self) -> Vec<SegmentId> {
        let mut ids: Vec<SegmentId> = Vec::new();
        for wall in &self.walls {
            if !ids.contains(&wall.segment_id) {
                ids.push(wall.segment_id);
            }
        }
        ids
    }
}

fn check_fraction(index: usize, field: &'static str, value: f32) -> Result<(), LevelError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(LevelError::FractionOutOfRange {
            index,
            field,
            value,
        })
    }
}

// Exact vertex identity; adding 0.0 folds -0.0 into 0.0.
fn vertex_key(p: Vec2) -> (u32, u32) {
    ((p.x + 0.0).to_bits(), (p.y + 0.0).to_bits())
}

fn check_closed_outlines(walls: &[WallSegment]) -> Result<(), LevelError> {
    let mut degree: HashMap<(SegmentId, (u32, u32)), u32> = HashMap::new();
    for wall in walls {
        for p in [wall.point_a, wall.point_b] {
            *degree.entry((wall.segment_id, vertex_key(p))).or_default() += 1;
        }
    }

    let mut open: Vec<SegmentId> = degree
        .iter()
        .filter(|(_, count)| *count % 2 == 1)
        .map(|((id, _), _)| *id)
        .collect();
    open.sort_unstable();
    match open.first() {
        Some(&segment_id) => Err(LevelError::OpenOutline { segment_id }),
        None => Ok(()),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::texture::{Texture, TextureBank};
    use test_log::test;

    /// Closed axis-aligned box as four walls sharing `segment_id`.
    pub(crate) fn box_walls(
        min: Vec2,
        max: Vec2,
        segment_id: SegmentId,
        floor: f32,
        ceiling: f32,
        textures: (TextureId, TextureId),
    ) -> Vec<WallSegment> {
        let corners = [
            Vec2::new(min.x, min.y),
            Vec2::new(max.x, min.y),
            Vec2::new(max.x, max.y),
            Vec2::new(min.x, max.y),
        ];
        (0..4)
            .map(|i| WallSegment {
                point_a: corners[i],
                point_b: corners[(i + 1) % 4],
                floor_height_frac: floor,
                ceiling_height_frac: ceiling,
                segment_id,
                wall_texture: textures.0,
                floor_texture: textures.1,
                ceiling_texture: textures.1,
            })
            .collect()
    }

    fn ids() -> (TextureId, TextureId) {
        let mut bank = TextureBank::new();
        let t = bank.insert("t", Texture::solid(1, 1, 0).unwrap()).unwrap();
        (t, t)
    }

    #[test]
    fn closed_box_is_accepted() {
        let walls = box_walls(Vec2::new(64.0, 64.0), Vec2::new(70.0, 70.0), 0, 0.2, 0.6, ids());
        let level = Level::new(walls).unwrap();
        assert_eq!(level.walls().len(), 4);
        assert_eq!(level.segment_ids(), vec![0]);
    }

    #[test]
    fn degenerate_wall_is_rejected() {
        let mut walls = box_walls(Vec2::ZERO, Vec2::new(1.0, 1.0), 0, 0.0, 0.0, ids());
        walls[2].point_b = walls[2].point_a;
        assert!(matches!(
            Level::new(walls),
            Err(LevelError::DegenerateWall { index: 2 })
        ));
    }

    #[test]
    fn out_of_range_fraction_is_rejected() {
        let mut walls = box_walls(Vec2::ZERO, Vec2::new(1.0, 1.0), 0, 0.0, 0.0, ids());
        walls[1].ceiling_height_frac = 1.5;
        assert!(matches!(
            Level::new(walls),
            Err(LevelError::FractionOutOfRange {
                index: 1,
                field: "ceiling_height_frac",
                ..
            })
        ));

        let mut walls = box_walls(Vec2::ZERO, Vec2::new(1.0, 1.0), 0, 0.0, 0.0, ids());
        walls[0].floor_height_frac = f32::NAN;
        assert!(Level::new(walls).is_err());
    }

    #[test]
    fn open_outline_is_rejected() {
        let mut walls = box_walls(Vec2::ZERO, Vec2::new(1.0, 1.0), 3, 0.0, 0.0, ids());
        walls.pop();
        assert!(matches!(
            Level::new(walls),
            Err(LevelError::OpenOutline { segment_id: 3 })
        ));
    }

    #[test]
    fn outlines_are_checked_per_segment_id() {
        // Two boxes sharing an edge position but with different ids are both closed.
        let t = ids();
        let mut walls = box_walls(Vec2::ZERO, Vec2::new(1.0, 1.0), 0, 0.0, 0.0, t);
        walls.extend(box_walls(Vec2::new(1.0, 0.0), Vec2::new(2.0, 1.0), 1, 0.0, 0.0, t));
        let level = Level::new(walls).unwrap();
        assert_eq!(level.segment_ids(), vec![0, 1]);

        // Moving one edge of id 1 leaves both of its ends dangling.
        let mut walls = box_walls(Vec2::ZERO, Vec2::new(1.0, 1.0), 0, 0.0, 0.0, t);
        let mut other = box_walls(Vec2::new(1.0, 0.0), Vec2::new(2.0, 1.0), 1, 0.0, 0.0, t);
        other[0].point_b = Vec2::new(3.0, 0.0);
        walls.extend(other);
        assert!(matches!(
            Level::new(walls),
            Err(LevelError::OpenOutline { segment_id: 1 })
        ));
    }
}
