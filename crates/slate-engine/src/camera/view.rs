use crate::coords::{Vec2, Viewport};

use super::Mat4;

/// Zoom values at or below this are rejected.
pub const MIN_ZOOM: f32 = 0.001;

/// 2D camera: world position shown at the screen's top-left corner, zoom
/// factor, and rotation in degrees.
///
/// Invariant: `zoom > MIN_ZOOM`, so the transform is never singular.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    position: Vec2,
    zoom: f32,
    rotation_degrees: f32,
}

impl Camera {
    pub const fn new() -> Self {
        Self {
            position: Vec2::zero(),
            zoom: 1.0,
            rotation_degrees: 0.0,
        }
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    #[inline]
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    #[inline]
    pub fn rotation_degrees(&self) -> f32 {
        self.rotation_degrees
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Sets the zoom factor. Returns `false` and keeps the previous zoom when
    /// `zoom <= MIN_ZOOM` or not finite.
    pub fn set_zoom(&mut self, zoom: f32) -> bool {
        if !(zoom > MIN_ZOOM) || !zoom.is_finite() {
            return false;
        }
        self.zoom = zoom;
        true
    }

    pub fn set_rotation(&mut self, degrees: f32) {
        self.rotation_degrees = degrees;
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Maps a world point to screen pixels: translate by `-position`, rotate
    /// by `-rotation`, scale by `zoom`.
    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        let (s, c) = self.radians().sin_cos();
        let dx = f64::from(world.x) - f64::from(self.position.x);
        let dy = f64::from(world.y) - f64::from(self.position.y);
        let z = f64::from(self.zoom);
        Vec2::new(((dx * c + dy * s) * z) as f32, ((-dx * s + dy * c) * z) as f32)
    }

    /// Inverse of [`world_to_screen`](Self::world_to_screen).
    ///
    /// Both directions work in f64 and round to f32 once at the end.
    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        let (s, c) = self.radians().sin_cos();
        let z = f64::from(self.zoom);
        let (sx, sy) = (f64::from(screen.x) / z, f64::from(screen.y) / z);
        Vec2::new(
            (sx * c - sy * s + f64::from(self.position.x)) as f32,
            (sx * s + sy * c + f64::from(self.position.y)) as f32,
        )
    }

    /// Combined camera + orthographic projection for a `viewport`-sized
    /// target with +Y down.
    pub fn projection(&self, viewport: Viewport) -> Mat4 {
        let vp = viewport.non_degenerate();
        let sx = 2.0 / f64::from(vp.width);
        let sy = -2.0 / f64::from(vp.height);

        let z = f64::from(self.zoom);
        let (s, c) = self.radians().sin_cos();
        let (cx, cy) = (f64::from(self.position.x), f64::from(self.position.y));

        Mat4::from_affine_2d(
            [(sx * z * c) as f32, (sy * z * -s) as f32],
            [(sx * z * s) as f32, (sy * z * c) as f32],
            [
                (sx * z * (-cx * c - cy * s) - 1.0) as f32,
                (sy * z * (cx * s - cy * c) + 1.0) as f32,
            ],
        )
    }

    #[inline]
    fn radians(&self) -> f64 {
        f64::from(self.rotation_degrees).to_radians()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}
