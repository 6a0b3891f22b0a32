//! Packed 24-bit color helpers. Every pixel and texel is `0x00RRGGBB`.

use crate::geometry::lerp;

#[inline]
pub fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
}

#[inline]
pub fn unpack_rgb(c: u32) -> (u8, u8, u8) {
    ((c >> 16) as u8, (c >> 8) as u8, c as u8)
}

/// Distance falloff: `1 / distance`, capped to `[0, 1]`.
/// Anything at or inside one world unit is fully lit.
#[inline]
pub fn darkness(distance: f32) -> f32 {
    lerp(0.0, 1.0, 1.0 / distance).clamp(0.0, 1.0)
}

/// Multiply each channel by `factor` and repack. Channels are clamped to
/// `[0, 255]` individually so an overflow never bleeds into its neighbour.
#[inline]
pub fn mix(color: u32, factor: f32) -> u32 {
    let (r, g, b) = unpack_rgb(color);
    let scale = |c: u8| (c as f32 * factor).clamp(0.0, 255.0) as u8;
    pack_rgb(scale(r), scale(g), scale(b))
}
