//! 2D world-space primitives shared by the resolver and the renderers.

use std::ops::{Add, Mul, Sub};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing along `deg` (0° = +X, 90° = +Y).
    #[inline]
    pub fn from_angle_deg(deg: f32) -> Self {
        let r = deg.to_radians();
        Self::new(r.cos(), r.sin())
    }

    #[inline]
    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }

    #[inline]
    pub fn distance(self, other: Vec2) -> f32 {
        (other - self).length()
    }

    /// Zero vector stays zero instead of turning into NaNs.
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len == 0.0 {
            return Vec2::ZERO;
        }
        Self::new(self.x / len, self.y / len)
    }

    #[inline]
    pub fn lerp(self, other: Vec2, t: f32) -> Self {
        Self::new(lerp(self.x, other.x, t), lerp(self.y, other.y, t))
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Angle of this vector in degrees, measured like `from_angle_deg`.
    #[inline]
    pub fn angle_deg(self) -> f32 {
        self.y.atan2(self.x).to_degrees()
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    #[inline]
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    #[inline]
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    #[inline]
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl From<[f32; 2]> for Vec2 {
    fn from(p: [f32; 2]) -> Self {
        Vec2::new(p[0], p[1])
    }
}

/// A directed segment from `a` to `b`. Used both for walls and for rays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub a: Vec2,
    pub b: Vec2,
}

impl Segment {
    #[inline]
    pub const fn new(a: Vec2, b: Vec2) -> Self {
        Self { a, b }
    }
}

/// Parametric segment/segment intersection.
///
/// Returns the crossing point when both parameters lie in `[0, 1]`
/// (endpoints included). Parallel, coincident and zero-length segments all
/// have a zero denominator and report no hit.
pub fn intersect(ray: Segment, wall: Segment) -> Option<Vec2> {
    let (x1, y1) = (ray.a.x, ray.a.y);
    let (x2, y2) = (ray.b.x, ray.b.y);
    let (x3, y3) = (wall.a.x, wall.a.y);
    let (x4, y4) = (wall.b.x, wall.b.y);

    let denom = (y4 - y3) * (x2 - x1) - (x4 - x3) * (y2 - y1);
    if denom == 0.0 {
        return None;
    }

    let ua = ((x4 - x3) * (y1 - y3) - (y4 - y3) * (x1 - x3)) / denom;
    if !(0.0..=1.0).contains(&ua) {
        return None;
    }
    let ub = ((x2 - x1) * (y1 - y3) - (y2 - y1) * (x1 - x3)) / denom;
    if !(0.0..=1.0).contains(&ub) {
        return None;
    }

    Some(ray.a.lerp(ray.b, ua))
}

/// Clamp into the range spanned by `a` and `b`, whichever order they come in.
#[inline]
pub fn clamp_ordered(value: f32, a: f32, b: f32) -> f32 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    value.max(lo).min(hi)
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Normalize an angle in degrees into `(-180, 180]`.
pub fn wrap_angle_deg(deg: f32) -> f32 {
    let a = deg.rem_euclid(360.0);
    if a > 180.0 { a - 360.0 } else { a }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn seg(ax: f32, ay: f32, bx: f32, by: f32) -> Segment {
        Segment::new(Vec2::new(ax, ay), Vec2::new(bx, by))
    }

    #[test]
    fn crossing_segments_meet_at_expected_point() {
        let p = intersect(seg(0.0, 0.0, 10.0, 0.0), seg(4.0, -1.0, 4.0, 1.0)).unwrap();
        assert!((p.x - 4.0).abs() < 1e-6);
        assert!(p.y.abs() < 1e-6);
    }

    #[test]
    fn endpoints_count_as_hits() {
        // Ray ends exactly on the wall.
        assert!(intersect(seg(0.0, 0.0, 4.0, 0.0), seg(4.0, -1.0, 4.0, 1.0)).is_some());
        // Ray grazes the wall's endpoint.
        assert!(intersect(seg(0.0, 0.0, 10.0, 0.0), seg(4.0, 0.0, 4.0, 1.0)).is_some());
    }

    #[test]
    fn parallel_and_coincident_segments_miss() {
        assert_eq!(intersect(seg(0.0, 0.0, 10.0, 0.0), seg(0.0, 1.0, 10.0, 1.0)), None);
        assert_eq!(intersect(seg(0.0, 0.0, 10.0, 0.0), seg(2.0, 0.0, 5.0, 0.0)), None);
    }

    #[test]
    fn zero_length_wall_misses() {
        assert_eq!(intersect(seg(0.0, 0.0, 10.0, 0.0), seg(3.0, 0.0, 3.0, 0.0)), None);
    }

    #[test]
    fn out_of_range_parameters_miss() {
        // Wall lies past the end of the ray.
        assert_eq!(intersect(seg(0.0, 0.0, 3.0, 0.0), seg(4.0, -1.0, 4.0, 1.0)), None);
        // Ray passes beside the wall.
        assert_eq!(intersect(seg(0.0, 0.0, 10.0, 0.0), seg(4.0, 1.0, 4.0, 2.0)), None);
    }

    #[test]
    fn hit_parameters_stay_inside_unit_range() {
        let ray = seg(63.0, 63.0, 191.0, 63.0 + 128.0 * 0.4);
        let walls = [
            seg(64.0, 64.0, 70.0, 64.0),
            seg(70.0, 64.0, 70.0, 70.0),
            seg(70.0, 70.0, 64.0, 70.0),
            seg(64.0, 70.0, 64.0, 64.0),
        ];
        for wall in walls {
            if let Some(p) = intersect(ray, wall) {
                let along_wall = wall.a.distance(p) / wall.a.distance(wall.b);
                let along_ray = ray.a.distance(p) / ray.a.distance(ray.b);
                assert!((0.0..=1.0 + 1e-5).contains(&along_wall));
                assert!((0.0..=1.0 + 1e-5).contains(&along_ray));
            }
        }
    }

    #[test]
    fn clamp_ordered_accepts_inverted_bounds() {
        assert_eq!(clamp_ordered(5.0, 10.0, 0.0), 5.0);
        assert_eq!(clamp_ordered(-3.0, 10.0, 0.0), 0.0);
        assert_eq!(clamp_ordered(12.0, 10.0, 0.0), 10.0);
        assert_eq!(clamp_ordered(12.0, 0.0, 10.0), 10.0);
    }

    #[test]
    fn normalize_handles_zero() {
        assert_eq!(Vec2::ZERO.normalize(), Vec2::ZERO);
        let n = Vec2::new(3.0, 4.0).normalize();
        assert!((n.length() - 1.0).abs() < 1e-6);
        assert!((n.x - 0.6).abs() < 1e-6);
    }

    #[test]
    fn lerp_endpoints() {
        assert_eq!(lerp(2.0, 6.0, 0.0), 2.0);
        assert_eq!(lerp(2.0, 6.0, 1.0), 6.0);
        assert_eq!(lerp(2.0, 6.0, 0.25), 3.0);
    }

    #[test]
    fn wrap_angle_lands_in_half_open_range() {
        assert_eq!(wrap_angle_deg(180.0), 180.0);
        assert_eq!(wrap_angle_deg(-180.0), 180.0);
        assert_eq!(wrap_angle_deg(190.0), -170.0);
        assert_eq!(wrap_angle_deg(-190.0), 170.0);
        assert_eq!(wrap_angle_deg(720.0), 0.0);
    }
}
