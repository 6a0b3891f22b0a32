use crate::geometry::{Segment, Vec2};

/// Below this the fisheye cosine is treated as a ray running along the
/// camera plane and the hit is skipped.
pub const MIN_FISHEYE_COS: f32 = 1e-4;

/// Viewer state, snapshotted once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerPose {
    pub position: Vec2,      // (x, y) in world space
    pub view_angle_deg: f32, // 0° looks along +X, angles grow toward +Y
    pub fov_deg: f32,        // horizontal field of view
    pub max_ray_length: f32, // rays stop here
    pub eye_offset: f32,     // signed bob/crouch offset, fraction of half-height
}

impl Default for PlayerPose {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            view_angle_deg: 0.0,
            fov_deg: 60.0,
            max_ray_length: 128.0,
            eye_offset: 0.0,
        }
    }
}

impl PlayerPose {
    /// Angle of the ray cast for screen column `x`.
    #[inline]
    pub fn ray_angle_deg(&self, x: usize, width: usize) -> f32 {
        let step = self.fov_deg / width as f32;
        self.view_angle_deg - self.fov_deg * 0.5 + x as f32 * step
    }

    /// Ray from the eye out to `max_ray_length` along `angle_deg`.
    #[inline]
    pub fn ray(&self, angle_deg: f32) -> Segment {
        let far = self.position + Vec2::from_angle_deg(angle_deg) * self.max_ray_length;
        Segment::new(self.position, far)
    }

    /// Cosine of the offset from view-forward; multiplies raw hit distance
    /// into camera-plane distance.
    #[inline]
    pub fn fisheye_cos(&self, angle_deg: f32) -> f32 {
        (angle_deg - self.view_angle_deg).to_radians().cos()
    }

    /// Inverse of `ray_angle_deg` for a bearing relative to view-forward.
    #[inline]
    pub fn bearing_to_screen_x(&self, bearing_deg: f32, width: usize) -> f32 {
        (bearing_deg + self.fov_deg * 0.5) * width as f32 / self.fov_deg
    }

    #[inline]
    pub fn forward(&self) -> Vec2 {
        Vec2::from_angle_deg(self.view_angle_deg)
    }

    /// Move along the view direction (`forward`) and its right-hand
    /// perpendicular (`strafe`), in world units.
    pub fn translate(&mut self, forward: f32, strafe: f32) {
        let fwd = self.forward();
        let right = Vec2::from_angle_deg(self.view_angle_deg + 90.0);
        self.position = self.position + fwd * forward + right * strafe;
    }
}
