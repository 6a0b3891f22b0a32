//! Column renderer.
//!
//! Every screen column casts one ray, resolves its ordered hits, and paints
//! hit by hit front to back. Each hit only paints inside the window the
//! nearer hits left open, so nothing is ever overdrawn. A hit whose cell
//! was already entered by the previous hit (same segment id) paints that
//! cell's floor and ceiling instead of a second wall face.
//!
//! Columns write disjoint slices of a column-major scratch buffer and run
//! in parallel; the scratch is transposed into the row-major framebuffer
//! after the join.

use std::ops::Range;

use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::ParallelSliceMut,
};

use crate::camera::{MIN_FISHEYE_COS, PlayerPose};
use crate::color::{darkness, mix};
use crate::framebuffer::Framebuffer;
use crate::geometry::Vec2;
use crate::span::{ColumnSpan, Span, Window, rows};
use crate::sprites::{ProjectedSprite, composite_column, project_sprites};
use crate::texture::{TextureBank, TextureId};
use crate::visibility::{Hit, Resolver, blocks};
use crate::world::{Level, SegmentId, Sprite, WallSegment};

/// Everything a column task reads. Shared immutably across workers.
struct ColumnContext<'a> {
    walls: &'a [WallSegment],
    textures: &'a TextureBank,
    pose: &'a PlayerPose,
    sprites: &'a [ProjectedSprite<'a>],
    height: usize,
}

pub struct Renderer {
    width: usize,
    height: usize,
    clear_color: u32,
    columns: Vec<u32>, // column-major: column x is columns[x * height..][..height]
}

impl Renderer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            clear_color: 0,
            columns: vec![0; width * height],
        }
    }

    pub fn with_clear_color(mut self, color: u32) -> Self {
        self.clear_color = color;
        self
    }

    pub fn set_clear_color(&mut self, color: u32) {
        self.clear_color = color;
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        if width != self.width || height != self.height {
            log::debug!("renderer resized to {}x{}", width, height);
            self.width = width;
            self.height = height;
            self.columns = vec![0; width * height];
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Render one frame into `fb`, resizing it to the renderer's size.
    /// Output depends only on the arguments.
    pub fn render(
        &mut self,
        level: &Level,
        textures: &TextureBank,
        pose: &PlayerPose,
        sprites: &[Sprite],
        fb: &mut Framebuffer,
    ) {
        let (width, height) = (self.width, self.height);
        fb.resize(width, height);
        if width == 0 || height == 0 {
            return;
        }

        let projected = project_sprites(sprites, textures, pose, width, height);
        log::trace!(
            "frame: {} walls, {}/{} sprites in view",
            level.walls().len(),
            projected.len(),
            sprites.len()
        );

        let ctx = ColumnContext {
            walls: level.walls(),
            textures,
            pose,
            sprites: &projected,
            height,
        };
        let clear = self.clear_color;

        self.columns.par_chunks_mut(height).enumerate().for_each_init(
            || (Resolver::new(), Vec::new()),
            |(resolver, spans), (x, column)| {
                column.fill(clear);
                let angle = pose.ray_angle_deg(x, width);
                let hits = resolver.resolve(pose.ray(angle), ctx.walls);
                let open = render_column(&ctx, angle, hits, column, spans);
                composite_column(x, column, spans, open, ctx.sprites);
            },
        );

        let columns = &self.columns;
        fb.pixels_mut()
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, px) in row.iter_mut().enumerate() {
                    *px = columns[x * height + y];
                }
            });
    }
}

/// One-shot render into a fresh framebuffer.
pub fn render_frame(
    level: &Level,
    textures: &TextureBank,
    pose: &PlayerPose,
    sprites: &[Sprite],
    width: usize,
    height: usize,
) -> Framebuffer {
    let mut fb = Framebuffer::new(width, height);
    Renderer::new(width, height).render(level, textures, pose, sprites, &mut fb);
    fb
}

/// Paint one column's walls, floors and ceilings. `spans` receives one entry
/// per painted hit; the return value is the window still open afterwards.
fn render_column(
    ctx: &ColumnContext<'_>,
    angle: f32,
    hits: &[Hit<'_>],
    column: &mut [u32],
    spans: &mut Vec<ColumnSpan>,
) -> Window {
    spans.clear();

    let cos = ctx.pose.fisheye_cos(angle);
    if cos < MIN_FISHEYE_COS {
        return Window::full(ctx.height);
    }

    let height = ctx.height as f32;
    let half_h = height * 0.5;
    let eye = ctx.pose.eye_offset;

    let mut prev_floor = Span::default();
    let mut prev_ceiling = Span::default();
    let mut prev_id: Option<SegmentId> = None;

    // A lone first crossing means the viewer stands inside that cell.
    let inside_first_cell = blocks(hits).next().is_some_and(|block| block.len() == 1);

    for hit in hits {
        let first = prev_id.is_none();
        let window = if first {
            Window::full(ctx.height)
        } else {
            Window::between(prev_ceiling, prev_floor)
        };
        if window.is_closed() {
            return window;
        }

        let wall = hit.wall;
        let fixed = hit.distance * cos;
        let half_wall = half_h / fixed;

        let bottom = half_h + half_wall;
        let top = half_h - half_wall;
        let mut floor = Span::between(
            bottom - 2.0 * half_wall * (wall.floor_height_frac + eye),
            bottom - 2.0 * half_wall * eye,
        )
        .clamped(0.0, height);
        let mut ceiling = Span::between(
            top + 2.0 * half_wall * -eye,
            top + 2.0 * half_wall * (wall.ceiling_height_frac - eye),
        )
        .clamped(0.0, height);
        if !first {
            floor = floor.clamped(window.top, window.bottom);
            ceiling = ceiling.clamped(window.top, window.bottom);
        }

        let culled = if first {
            inside_first_cell
        } else {
            prev_id == Some(wall.segment_id)
        };

        if culled {
            let dir = Vec2::from_angle_deg(angle);
            let floor_rows = rows(floor.lo, window.bottom);
            let ceiling_rows = rows(window.top, ceiling.hi);
            cast_flats(ctx, dir, cos, floor_rows, wall.floor_texture, column);
            cast_flats(ctx, dir, cos, ceiling_rows, wall.ceiling_texture, column);
        } else {
            draw_wall_face(ctx, hit, fixed, top - 2.0 * half_wall * eye, floor, ceiling, column);
        }

        spans.push(ColumnSpan {
            distance: hit.distance,
            window,
            floor,
            ceiling,
            culled,
        });
        prev_floor = floor;
        prev_ceiling = ceiling;
        prev_id = Some(wall.segment_id);
    }

    if prev_id.is_none() {
        Window::full(ctx.height)
    } else {
        Window::between(prev_ceiling, prev_floor)
    }
}

/// Texture the floor and ceiling risers of a wall face.
fn draw_wall_face(
    ctx: &ColumnContext<'_>,
    hit: &Hit<'_>,
    fixed: f32,
    face_top: f32,
    floor: Span,
    ceiling: Span,
    column: &mut [u32],
) {
    let Some(texture) = ctx.textures.get(hit.wall.wall_texture) else {
        return;
    };
    let u = hit.wall.point_a.distance(hit.point).rem_euclid(1.0);
    let face_h = ctx.height as f32 / fixed;
    let shade = darkness(fixed);

    for y in floor.rows().chain(ceiling.rows()) {
        let Some(px) = column.get_mut(y) else { break };
        let v = (y as f32 + 0.5 - face_top) / face_h;
        *px = mix(texture.sample(u, v), shade);
    }
}

/// Perspective floor/ceiling casting for `rows` of this column.
fn cast_flats(
    ctx: &ColumnContext<'_>,
    dir: Vec2,
    cos: f32,
    rows: Range<usize>,
    texture: TextureId,
    column: &mut [u32],
) {
    let Some(texture) = ctx.textures.get(texture) else {
        return;
    };
    let height = ctx.height as f32;

    for y in rows {
        let denom = 2.0 * y as f32 - height;
        // Horizon row.
        if denom == 0.0 {
            continue;
        }
        let Some(px) = column.get_mut(y) else { break };
        let plane = (height / denom.abs()) / cos;
        let p = ctx.pose.position + dir * plane;
        *px = mix(texture.sample(p.x, p.y), darkness(plane));
    }
}

/// Single column, same path as `Renderer::render`, for inspection in tests.
#[cfg(test)]
pub(crate) fn trace_column(
    level: &Level,
    textures: &TextureBank,
    pose: &PlayerPose,
    sprites: &[Sprite],
    x: usize,
    width: usize,
    height: usize,
) -> (Vec<u32>, Vec<ColumnSpan>) {
    let projected = project_sprites(sprites, textures, pose, width, height);
    let ctx = ColumnContext {
        walls: level.walls(),
        textures,
        pose,
        sprites: &projected,
        height,
    };
    let mut column = vec![0; height];
    let mut spans = Vec::new();
    let mut resolver = Resolver::new();
    let angle = pose.ray_angle_deg(x, width);
    let hits = resolver.resolve(pose.ray(angle), ctx.walls);
    let open = render_column(&ctx, angle, hits, &mut column, &mut spans);
    composite_column(x, &mut column, &spans, open, ctx.sprites);
    (column, spans)
}
