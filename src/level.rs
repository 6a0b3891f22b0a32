//! TOML level assets.
//!
//! A level file names its textures, lists cells (closed polygons expanded
//! into one wall per edge) and free walls, and places the player and
//! sprites. Loading resolves texture names to ids and validates everything
//! before a [`Scene`] is handed to the renderer.

use std::path::Path;

use serde::Deserialize;

use crate::camera::PlayerPose;
use crate::error::LevelError;
use crate::geometry::Vec2;
use crate::texture::{Texture, TextureBank, TextureId};
use crate::world::{Level, SegmentId, Sprite, WallSegment};

/// Magenta, the conventional "see-through" sprite color.
pub const DEFAULT_TRANSPARENT_KEY: u32 = 0xFF00FF;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LevelAsset {
    #[serde(default)]
    pub player: PoseAsset,
    #[serde(default)]
    pub textures: Vec<TextureAsset>,
    #[serde(default)]
    pub cells: Vec<CellAsset>,
    #[serde(default)]
    pub walls: Vec<WallAsset>,
    #[serde(default)]
    pub sprites: Vec<SpriteAsset>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoseAsset {
    pub position: [f32; 2],
    pub view_angle_deg: f32,
    pub fov_deg: f32,
    pub max_ray_length: f32,
    pub eye_offset: f32,
}

impl Default for PoseAsset {
    fn default() -> Self {
        let pose = PlayerPose::default();
        Self {
            position: [pose.position.x, pose.position.y],
            view_angle_deg: pose.view_angle_deg,
            fov_deg: pose.fov_deg,
            max_ray_length: pose.max_ray_length,
            eye_offset: pose.eye_offset,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TextureAsset {
    pub name: String,
    pub width: usize,
    pub height: usize,
    pub pattern: PatternAsset,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PatternAsset {
    Solid {
        color: u32,
    },
    Checker {
        a: u32,
        b: u32,
        cells: usize,
    },
    Bricks {
        brick: u32,
        mortar: u32,
        rows: usize,
        columns: usize,
    },
    Disc {
        color: u32,
        background: u32,
    },
    /// Row-major texel list, `width * height` entries.
    Texels {
        data: Vec<u32>,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CellAsset {
    pub segment_id: SegmentId,
    pub points: Vec<[f32; 2]>,
    pub floor_height_frac: f32,
    pub ceiling_height_frac: f32,
    pub wall_texture: String,
    pub floor_texture: String,
    /// Falls back to `floor_texture`.
    pub ceiling_texture: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WallAsset {
    pub a: [f32; 2],
    pub b: [f32; 2],
    pub segment_id: SegmentId,
    pub floor_height_frac: f32,
    pub ceiling_height_frac: f32,
    pub wall_texture: String,
    pub floor_texture: String,
    pub ceiling_texture: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpriteAsset {
    pub position: [f32; 2],
    pub texture: String,
    #[serde(default = "default_transparent_key")]
    pub transparent_key: u32,
}

fn default_transparent_key() -> u32 {
    DEFAULT_TRANSPARENT_KEY
}

/// Everything one frame needs, validated.
#[derive(Debug, Clone)]
pub struct Scene {
    pub level: Level,
    pub textures: TextureBank,
    pub pose: PlayerPose,
    pub sprites: Vec<Sprite>,
}

impl Scene {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| LevelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let scene = Self::from_toml_str(&text)?;
        log::info!(
            "loaded level {}: {} walls in {} cells, {} textures, {} sprites",
            path.display(),
            scene.level.walls().len(),
            scene.level.segment_ids().len(),
            scene.textures.len(),
            scene.sprites.len()
        );
        Ok(scene)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, LevelError> {
        let asset: LevelAsset = toml::from_str(text)?;
        asset.resolve()
    }
}

impl LevelAsset {
    pub fn resolve(self) -> Result<Scene, LevelError> {
        let mut textures = TextureBank::new();
        for t in &self.textures {
            let texture = t.pattern.build(t.width, t.height).map_err(|source| {
                LevelError::Texture {
                    name: t.name.clone(),
                    source,
                }
            })?;
            if !texture.is_canonical() {
                log::debug!("texture `{}` is {}x{}", t.name, t.width, t.height);
            }
            textures.insert(&t.name, texture)?;
        }

        let mut walls = Vec::new();
        for cell in &self.cells {
            if cell.points.len() < 3 {
                return Err(LevelError::CellTooSmall {
                    segment_id: cell.segment_id,
                    count: cell.points.len(),
                });
            }
            let surface = Surface::resolve(
                &textures,
                &cell.wall_texture,
                &cell.floor_texture,
                cell.ceiling_texture.as_deref(),
            )?;
            let n = cell.points.len();
            for i in 0..n {
                walls.push(surface.wall(
                    cell.points[i].into(),
                    cell.points[(i + 1) % n].into(),
                    cell.segment_id,
                    cell.floor_height_frac,
                    cell.ceiling_height_frac,
                ));
            }
        }
        for wall in &self.walls {
            let surface = Surface::resolve(
                &textures,
                &wall.wall_texture,
                &wall.floor_texture,
                wall.ceiling_texture.as_deref(),
            )?;
            walls.push(surface.wall(
                wall.a.into(),
                wall.b.into(),
                wall.segment_id,
                wall.floor_height_frac,
                wall.ceiling_height_frac,
            ));
        }
        let level = Level::new(walls)?;

        let pose = self.player.resolve()?;

        let sprites = self
            .sprites
            .iter()
            .enumerate()
            .map(|(index, s)| {
                let position = Vec2::from(s.position);
                if !position.is_finite() {
                    return Err(LevelError::InvalidSprite { index });
                }
                Ok(Sprite {
                    position,
                    texture: textures.resolve(&s.texture)?,
                    transparent_key: s.transparent_key,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Scene {
            level,
            textures,
            pose,
            sprites,
        })
    }
}

impl PatternAsset {
    fn build(&self, width: usize, height: usize) -> Result<Texture, crate::error::TextureError> {
        match self {
            PatternAsset::Solid { color } => Texture::solid(width, height, *color),
            PatternAsset::Checker { a, b, cells } => Texture::checker(width, height, *a, *b, *cells),
            PatternAsset::Bricks {
                brick,
                mortar,
                rows,
                columns,
            } => Texture::bricks(width, height, *brick, *mortar, *rows, *columns),
            PatternAsset::Disc { color, background } => {
                Texture::disc(width, height, *color, *background)
            }
            PatternAsset::Texels { data } => Texture::new(width, height, data.clone()),
        }
    }
}

impl PoseAsset {
    fn resolve(&self) -> Result<PlayerPose, LevelError> {
        let position = Vec2::from(self.position);
        if !position.is_finite() || !self.view_angle_deg.is_finite() {
            return Err(LevelError::InvalidPose("position and angle must be finite"));
        }
        if !(self.fov_deg > 0.0 && self.fov_deg < 180.0) {
            return Err(LevelError::InvalidPose("field of view must be in (0, 180)"));
        }
        if !(self.max_ray_length > 0.0 && self.max_ray_length.is_finite()) {
            return Err(LevelError::InvalidPose("ray length must be positive"));
        }
        if !self.eye_offset.is_finite() {
            return Err(LevelError::InvalidPose("eye offset must be finite"));
        }
        Ok(PlayerPose {
            position,
            view_angle_deg: self.view_angle_deg,
            fov_deg: self.fov_deg,
            max_ray_length: self.max_ray_length,
            eye_offset: self.eye_offset,
        })
    }
}

/// Texture ids shared by every wall of one cell or free wall entry.
struct Surface {
    wall: TextureId,
    floor: TextureId,
    ceiling: TextureId,
}

impl Surface {
    fn resolve(
        textures: &TextureBank,
        wall: &str,
        floor: &str,
        ceiling: Option<&str>,
    ) -> Result<Self, LevelError> {
        let floor = textures.resolve(floor)?;
        Ok(Self {
            wall: textures.resolve(wall)?,
            floor,
            ceiling: match ceiling {
                Some(name) => textures.resolve(name)?,
                None => floor,
            },
        })
    }

    fn wall(
        &self,
        point_a: Vec2,
        point_b: Vec2,
        segment_id: SegmentId,
        floor_height_frac: f32,
        ceiling_height_frac: f32,
    ) -> WallSegment {
        WallSegment {
            point_a,
            point_b,
            floor_height_frac,
            ceiling_height_frac,
            segment_id,
            wall_texture: self.wall,
            floor_texture: self.floor,
            ceiling_texture: self.ceiling,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TextureError;
    use crate::renderer::render_frame;
    use test_log::test;

    const ROOM: &str = r#"
        [player]
        position = [63.0, 63.0]
        view_angle_deg = 0.0
        fov_deg = 75.0

        [[textures]]
        name = "brick"
        width = 64
        height = 32
        pattern = { kind = "bricks", brick = 0xA0522D, mortar = 0x808080, rows = 4, columns = 2 }

        [[textures]]
        name = "tiles"
        width = 64
        height = 64
        pattern = { kind = "checker", a = 0x303030, b = 0x505050, cells = 8 }

        [[textures]]
        name = "lamp"
        width = 2
        height = 1
        pattern = { kind = "texels", data = [0xFF00FF, 0xFFFF00] }

        [[cells]]
        segment_id = 0
        points = [[64.0, 64.0], [70.0, 64.0], [70.0, 70.0], [64.0, 70.0]]
        floor_height_frac = 0.2
        ceiling_height_frac = 0.6
        wall_texture = "brick"
        floor_texture = "tiles"

        [[sprites]]
        position = [67.0, 67.0]
        texture = "lamp"
    "#;

    #[test]
    fn room_level_resolves() {
        let scene = Scene::from_toml_str(ROOM).unwrap();
        assert_eq!(scene.level.walls().len(), 4);
        assert_eq!(scene.textures.len(), 3);
        assert_eq!(scene.pose.position, Vec2::new(63.0, 63.0));
        assert_eq!(scene.pose.fov_deg, 75.0);
        // Unspecified pose fields keep their defaults.
        assert_eq!(scene.pose.max_ray_length, PlayerPose::default().max_ray_length);

        let wall = &scene.level.walls()[3];
        assert_eq!(wall.point_a, Vec2::new(64.0, 70.0));
        assert_eq!(wall.point_b, Vec2::new(64.0, 64.0));
        assert_eq!(wall.floor_texture, wall.ceiling_texture);
        assert_eq!(Some(wall.wall_texture), scene.textures.id("brick"));

        assert_eq!(scene.sprites.len(), 1);
        assert_eq!(scene.sprites[0].transparent_key, DEFAULT_TRANSPARENT_KEY);
    }

    #[test]
    fn unknown_texture_is_reported_by_name() {
        let text = ROOM.replace("floor_texture = \"tiles\"", "floor_texture = \"marble\"");
        match Scene::from_toml_str(&text) {
            Err(LevelError::UnknownTexture(name)) => assert_eq!(name, "marble"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn bad_texel_count_names_the_texture() {
        let text = ROOM.replace("data = [0xFF00FF, 0xFFFF00]", "data = [0xFF00FF]");
        match Scene::from_toml_str(&text) {
            Err(LevelError::Texture { name, .. }) => assert_eq!(name, "lamp"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn oversized_texture_is_a_level_error() {
        let text = format!(
            "{ROOM}\n[[textures]]\nname = \"vast\"\nwidth = 4294967296\nheight = 4294967296\n\
             pattern = {{ kind = \"solid\", color = 0 }}\n"
        );
        match Scene::from_toml_str(&text) {
            Err(LevelError::Texture { name, source }) => {
                assert_eq!(name, "vast");
                assert!(matches!(source, TextureError::TooLarge { .. }));
            }
            other => panic!("unexpected: {other:?}"),
        }

        let text = ROOM.replace("height = 32", "height = 4294967296");
        assert!(matches!(
            Scene::from_toml_str(&text),
            Err(LevelError::Texture { .. })
        ));
    }

    #[test]
    fn huge_checker_cell_count_loads_and_renders() {
        let text = ROOM.replace("cells = 8", "cells = 9223372036854775807");
        let scene = Scene::from_toml_str(&text).unwrap();
        let fb = render_frame(&scene.level, &scene.textures, &scene.pose, &scene.sprites, 48, 32);
        assert_eq!(fb.pixels().len(), 48 * 32);
    }

    #[test]
    fn degenerate_cells_are_rejected() {
        let text = ROOM.replace(
            "points = [[64.0, 64.0], [70.0, 64.0], [70.0, 70.0], [64.0, 70.0]]",
            "points = [[64.0, 64.0], [70.0, 64.0]]",
        );
        assert!(matches!(
            Scene::from_toml_str(&text),
            Err(LevelError::CellTooSmall { segment_id: 0, count: 2 })
        ));

        let text = ROOM.replace(
            "points = [[64.0, 64.0], [70.0, 64.0], [70.0, 70.0], [64.0, 70.0]]",
            "points = [[64.0, 64.0], [70.0, 64.0], [70.0, 64.0], [64.0, 70.0]]",
        );
        assert!(matches!(
            Scene::from_toml_str(&text),
            Err(LevelError::DegenerateWall { index: 1 })
        ));
    }

    #[test]
    fn dangling_free_wall_leaves_outline_open() {
        let text = format!(
            "{ROOM}\n{}",
            r#"
            [[walls]]
            a = [0.0, 0.0]
            b = [1.0, 0.0]
            segment_id = 9
            floor_height_frac = 0.0
            ceiling_height_frac = 0.0
            wall_texture = "brick"
            floor_texture = "tiles"
            "#
        );
        assert!(matches!(
            Scene::from_toml_str(&text),
            Err(LevelError::OpenOutline { segment_id: 9 })
        ));
    }

    #[test]
    fn invalid_pose_is_rejected() {
        let text = ROOM.replace("fov_deg = 75.0", "fov_deg = 180.0");
        assert!(matches!(
            Scene::from_toml_str(&text),
            Err(LevelError::InvalidPose(_))
        ));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        assert!(matches!(
            Scene::from_toml_str("[[cells]]\nsegment_id = \"x\""),
            Err(LevelError::Parse(_))
        ));
        assert!(matches!(
            Scene::from_toml_str("[mystery]\n"),
            Err(LevelError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            Scene::load("/definitely/not/here.toml"),
            Err(LevelError::Io { .. })
        ));
    }

    #[test]
    fn bundled_demo_level_is_valid() {
        let scene = Scene::from_toml_str(crate::DEMO_LEVEL).unwrap();
        assert!(!scene.level.walls().is_empty());
        assert!(!scene.sprites.is_empty());
    }
}
