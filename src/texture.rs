//! Texel tables and the bank that owns them.
//!
//! Textures are plain grids of packed `0x00RRGGBB` colors. Nothing here
//! decodes image formats; level assets describe textures as procedural
//! patterns or raw texel lists.

use std::collections::HashMap;

use crate::error::{LevelError, TextureError};

/// Canonical wall texture grid (u across the wall, v up the face).
pub const WALL_TEXTURE_SIZE: (usize, usize) = (64, 32);
/// Canonical floor/ceiling tile, one tile per world unit.
pub const FLAT_TEXTURE_SIZE: (usize, usize) = (64, 64);
/// Largest accepted texture edge.
pub const MAX_TEXTURE_DIM: usize = 4096;

/// Texel count for a `width × height` grid, if the size is acceptable.
fn texel_count(width: usize, height: usize) -> Result<usize, TextureError> {
    if width == 0 || height == 0 {
        return Err(TextureError::EmptySize { width, height });
    }
    if width > MAX_TEXTURE_DIM || height > MAX_TEXTURE_DIM {
        return Err(TextureError::TooLarge { width, height });
    }
    Ok(width * height)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(u32);

impl TextureId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    width: usize,
    height: usize,
    texels: Vec<u32>,
}

impl Texture {
    pub fn new(width: usize, height: usize, texels: Vec<u32>) -> Result<Self, TextureError> {
        let expected = texel_count(width, height)?;
        if texels.len() != expected {
            return Err(TextureError::TexelCount {
                expected,
                actual: texels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            texels,
        })
    }

    pub fn solid(width: usize, height: usize, color: u32) -> Result<Self, TextureError> {
        let count = texel_count(width, height)?;
        Self::new(width, height, vec![color; count])
    }

    /// `cells` squares along each axis, alternating `a` and `b`.
    pub fn checker(
        width: usize,
        height: usize,
        a: u32,
        b: u32,
        cells: usize,
    ) -> Result<Self, TextureError> {
        if cells == 0 {
            return Err(TextureError::ZeroPatternParameter("cells"));
        }
        let cell = |i: usize, extent: usize| (i as u128 * cells as u128 / extent as u128) as u64;
        Self::generate(width, height, |x, y| {
            if (cell(x, width) ^ cell(y, height)) & 1 == 0 { a } else { b }
        })
    }

    /// Running-bond brick courses with one-texel mortar lines.
    pub fn bricks(
        width: usize,
        height: usize,
        brick: u32,
        mortar: u32,
        rows: usize,
        columns: usize,
    ) -> Result<Self, TextureError> {
        if rows == 0 {
            return Err(TextureError::ZeroPatternParameter("rows"));
        }
        if columns == 0 {
            return Err(TextureError::ZeroPatternParameter("columns"));
        }
        let course_h = (height / rows).max(1);
        let brick_w = (width / columns).max(1);
        Self::generate(width, height, |x, y| {
            let course = y / course_h;
            let shift = if course % 2 == 1 { brick_w / 2 } else { 0 };
            let bx = (x + shift) % brick_w;
            if y % course_h == 0 || bx == 0 {
                mortar
            } else {
                brick
            }
        })
    }

    /// A filled circle on `background`. Paired with a transparent key equal
    /// to `background` this makes a round billboard.
    pub fn disc(
        width: usize,
        height: usize,
        color: u32,
        background: u32,
    ) -> Result<Self, TextureError> {
        let cx = width as f32 * 0.5;
        let cy = height as f32 * 0.5;
        let r = cx.min(cy);
        Self::generate(width, height, |x, y| {
            let dx = x as f32 + 0.5 - cx;
            let dy = y as f32 + 0.5 - cy;
            if dx * dx + dy * dy <= r * r {
                color
            } else {
                background
            }
        })
    }

    fn generate(
        width: usize,
        height: usize,
        texel: impl Fn(usize, usize) -> u32,
    ) -> Result<Self, TextureError> {
        texel_count(width, height)?;
        let texels = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| texel(x, y))
            .collect();
        Self::new(width, height, texels)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Whether this is one of the standard wall or flat grid sizes.
    pub fn is_canonical(&self) -> bool {
        let size = (self.width, self.height);
        size == WALL_TEXTURE_SIZE || size == FLAT_TEXTURE_SIZE
    }

    /// Texel lookup with wrap-around on both axes.
    #[inline]
    pub fn texel(&self, x: i64, y: i64) -> u32 {
        let tx = x.rem_euclid(self.width as i64) as usize;
        let ty = y.rem_euclid(self.height as i64) as usize;
        self.texels[ty * self.width + tx]
    }

    /// Sample at fractional coordinates; one unit spans the whole texture
    /// and anything outside `[0, 1)` tiles.
    #[inline]
    pub fn sample(&self, u: f32, v: f32) -> u32 {
        let tx = (u * self.width as f32).floor() as i64;
        let ty = (v * self.height as f32).floor() as i64;
        self.texel(tx, ty)
    }
}

/// Named texture storage. Ids are dense indices handed out in insertion order.
#[derive(Debug, Default, Clone)]
pub struct TextureBank {
    textures: Vec<Texture>,
    names: HashMap<String, TextureId>,
}

impl TextureBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, texture: Texture) -> Result<TextureId, LevelError> {
        if self.names.contains_key(name) {
            return Err(LevelError::DuplicateTexture(name.to_owned()));
        }
        let id = TextureId(self.textures.len() as u32);
        self.textures.push(texture);
        self.names.insert(name.to_owned(), id);
        Ok(id)
    }

    pub fn id(&self, name: &str) -> Option<TextureId> {
        self.names.get(name).copied()
    }

    pub fn resolve(&self, name: &str) -> Result<TextureId, LevelError> {
        self.id(name)
            .ok_or_else(|| LevelError::UnknownTexture(name.to_owned()))
    }

    #[inline]
    pub fn get(&self, id: TextureId) -> Option<&Texture> {
        self.textures.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}
