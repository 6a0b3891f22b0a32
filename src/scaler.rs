//! Presentation upscaling: stretch the internal framebuffer onto the window
//! surface with bilinear filtering, optionally followed by a cross sharpen.

use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::ParallelSliceMut,
};

use crate::framebuffer::Framebuffer;

/// Source neighbours and blend weight (0..=256) for each destination index
/// along one axis.
#[derive(Debug, Clone, Default)]
struct Axis {
    near: Vec<usize>,
    far: Vec<usize>,
    weight: Vec<u32>,
}

impl Axis {
    /// Pixel centers are aligned, so an identity mapping has zero weights.
    fn build(dst: usize, src: usize) -> Self {
        let mut axis = Self {
            near: Vec::with_capacity(dst),
            far: Vec::with_capacity(dst),
            weight: Vec::with_capacity(dst),
        };
        if src == 0 {
            return axis;
        }
        let step = src as f32 / dst as f32;
        let last = src - 1;
        for i in 0..dst {
            let f = ((i as f32 + 0.5) * step - 0.5).max(0.0);
            let near = (f.floor() as usize).min(last);
            axis.near.push(near);
            axis.far.push((near + 1).min(last));
            axis.weight.push(((f - near as f32) * 256.0).round().clamp(0.0, 256.0) as u32);
        }
        axis
    }
}

/// Precomputed stretch from one source size to one destination size.
#[derive(Debug, Clone, Default)]
pub struct Upscaler {
    src: (usize, usize),
    dst: (usize, usize),
    xs: Axis,
    ys: Axis,
    scratch: Vec<u32>,
}

impl Upscaler {
    pub fn new(src_w: usize, src_h: usize, dst_w: usize, dst_h: usize) -> Self {
        Self {
            src: (src_w, src_h),
            dst: (dst_w, dst_h),
            xs: Axis::build(dst_w, src_w),
            ys: Axis::build(dst_h, src_h),
            scratch: Vec::new(),
        }
    }

    #[inline]
    pub fn src_size(&self) -> (usize, usize) {
        self.src
    }

    #[inline]
    pub fn dst_size(&self) -> (usize, usize) {
        self.dst
    }

    /// Stretch `src` into the row-major `dst` surface. Does nothing when
    /// `src` does not have the size this scaler was built for.
    pub fn blit(&self, src: &Framebuffer, dst: &mut [u32]) {
        let (sw, sh) = self.src;
        let (dw, dh) = self.dst;
        if (src.width(), src.height()) != self.src || sw == 0 || sh == 0 || dw == 0 {
            return;
        }
        let pixels = src.pixels();

        dst.par_chunks_mut(dw)
            .take(dh)
            .enumerate()
            .for_each(|(y, row)| {
                let top = &pixels[self.ys.near[y] * sw..][..sw];
                let bottom = &pixels[self.ys.far[y] * sw..][..sw];
                let wy = self.ys.weight[y];

                for (x, px) in row.iter_mut().enumerate() {
                    let (x0, x1, wx) = (self.xs.near[x], self.xs.far[x], self.xs.weight[x]);
                    let upper = lerp_rgb(top[x0], top[x1], wx);
                    let lower = lerp_rgb(bottom[x0], bottom[x1], wx);
                    *px = lerp_rgb(upper, lower, wy);
                }
            });
    }

    /// Cross-shaped 3x3 sharpen of the destination surface, in place.
    /// Border pixels are left alone.
    pub fn sharpen(&mut self, dst: &mut [u32]) {
        let (w, h) = self.dst;
        if w < 3 || h < 3 || dst.len() < w * h {
            return;
        }
        self.scratch.clear();
        self.scratch.extend_from_slice(&dst[..w * h]);
        let src = &self.scratch;

        dst.par_chunks_mut(w)
            .take(h)
            .enumerate()
            .filter(|(y, _)| *y > 0 && *y < h - 1)
            .for_each(|(y, row)| {
                let above = &src[(y - 1) * w..][..w];
                let here = &src[y * w..][..w];
                let below = &src[(y + 1) * w..][..w];
                for x in 1..w - 1 {
                    row[x] = sharpen_texel(here[x], [above[x], below[x], here[x - 1], here[x + 1]]);
                }
            });
    }
}

/// Blend two packed colors; `w` is the weight of `b` out of 256.
#[inline]
fn lerp_rgb(a: u32, b: u32, w: u32) -> u32 {
    let inv = 256 - w;
    // Red and blue share one multiply, green gets its own.
    let rb = (((a & 0x00FF_00FF) * inv + (b & 0x00FF_00FF) * w) >> 8) & 0x00FF_00FF;
    let g = (((a & 0x0000_FF00) * inv + (b & 0x0000_FF00) * w) >> 8) & 0x0000_FF00;
    rb | g
}

#[inline]
fn sharpen_texel(center: u32, neighbours: [u32; 4]) -> u32 {
    let channel = |shift: u32| {
        let c = ((center >> shift) & 0xFF) as i32;
        let sum: i32 = neighbours.iter().map(|n| ((n >> shift) & 0xFF) as i32).sum();
        ((5 * c - sum).clamp(0, 255) as u32) << shift
    };
    channel(16) | channel(8) | channel(0)
}
