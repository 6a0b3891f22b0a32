//! Billboard sprites composited into rendered columns.
//!
//! Sprites are projected once per frame, then each column blends the
//! sprites covering it. A sprite at distance `d` is clipped to the window
//! the column's geometry left open at `d`: the window the first hit farther
//! than `d` was clipped into, or whatever stayed open after the last hit.

use crate::camera::PlayerPose;
use crate::color::{darkness, mix};
use crate::geometry::wrap_angle_deg;
use crate::span::{ColumnSpan, Window, rows};
use crate::texture::{Texture, TextureBank};
use crate::world::Sprite;

/// Sprites closer than this to the eye are dropped.
pub const MIN_SPRITE_DISTANCE: f32 = 1e-3;

/// Screen-space placement of one sprite for the current frame.
#[derive(Debug, Clone, Copy)]
pub struct ProjectedSprite<'a> {
    pub distance: f32,    // raw eye distance, same measure as hit distances
    pub bearing_deg: f32, // relative to view-forward, in (-180, 180]
    pub center_x: f32,
    pub center_y: f32,
    pub half_size: f32,
    pub shade: f32,
    texture: &'a Texture,
    transparent_key: u32,
}

impl ProjectedSprite<'_> {
    #[inline]
    pub fn left(&self) -> f32 {
        self.center_x - self.half_size
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.center_y - self.half_size
    }

    /// Horizontal texture coordinate for column `x`, if the sprite covers it.
    #[inline]
    fn u_at(&self, x: usize) -> Option<f32> {
        let u = (x as f32 + 0.5 - self.left()) / (2.0 * self.half_size);
        (0.0..1.0).contains(&u).then_some(u)
    }
}

/// Place every visible sprite on screen, farthest first.
pub fn project_sprites<'a>(
    sprites: &[Sprite],
    textures: &'a TextureBank,
    pose: &PlayerPose,
    width: usize,
    height: usize,
) -> Vec<ProjectedSprite<'a>> {
    let half_h = height as f32 * 0.5;
    let mut out: Vec<ProjectedSprite<'a>> = sprites
        .iter()
        .filter_map(|sprite| {
            let delta = sprite.position - pose.position;
            let distance = delta.length();
            if !distance.is_finite() || distance < MIN_SPRITE_DISTANCE {
                return None;
            }

            let bearing_deg = wrap_angle_deg(delta.angle_deg() - pose.view_angle_deg);
            if bearing_deg.abs() >= 90.0 {
                return None;
            }

            // Sized by camera-plane distance, like wall faces, not raw distance.
            let fixed = distance * bearing_deg.to_radians().cos();
            let half_size = half_h / fixed;
            let center_x = pose.bearing_to_screen_x(bearing_deg, width);
            if center_x + half_size < 0.0 || center_x - half_size > width as f32 {
                return None;
            }

            let Some(texture) = textures.get(sprite.texture) else {
                log::debug!("sprite texture {:?} missing; skipped", sprite.texture);
                return None;
            };

            Some(ProjectedSprite {
                distance,
                bearing_deg,
                center_x,
                center_y: half_h - 2.0 * half_size * pose.eye_offset,
                half_size,
                shade: darkness(fixed),
                texture,
                transparent_key: sprite.transparent_key,
            })
        })
        .collect();

    out.sort_by(|a, b| b.distance.total_cmp(&a.distance));
    out
}

/// Window of a column left open at `distance`.
pub fn clip_window(spans: &[ColumnSpan], open: Window, distance: f32) -> Window {
    spans
        .iter()
        .find(|span| span.distance > distance)
        .map_or(open, |span| span.window)
}

/// Blend the sprites covering column `x` into it, farthest first.
pub fn composite_column(
    x: usize,
    column: &mut [u32],
    spans: &[ColumnSpan],
    open: Window,
    sprites: &[ProjectedSprite<'_>],
) {
    for sprite in sprites {
        let Some(u) = sprite.u_at(x) else {
            continue;
        };
        let clip = clip_window(spans, open, sprite.distance);
        if clip.is_closed() {
            continue;
        }

        let top = sprite.top();
        let size = 2.0 * sprite.half_size;
        let face = rows(top, top + size);
        let visible = clip.rows();
        let start = face.start.max(visible.start);
        let end = face.end.min(visible.end).min(column.len());

        for y in start..end {
            let v = (y as f32 + 0.5 - top) / size;
            let texel = sprite.texture.sample(u, v);
            if texel == sprite.transparent_key {
                continue;
            }
            column[y] = mix(texel, sprite.shade);
        }
    }
}
