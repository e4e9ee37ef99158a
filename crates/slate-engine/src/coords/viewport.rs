/// Drawable surface size in physical pixels.
///
/// The projection maps `[0, width] × [0, height]` to normalized device coordinates.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn from_physical(width: u32, height: u32) -> Self {
        Self::new(width as f32, height as f32)
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Same viewport with each side clamped to at least one pixel.
    ///
    /// Used before dividing by the size (minimized windows report 0×0).
    #[inline]
    pub fn non_degenerate(self) -> Self {
        Self::new(self.width.max(1.0), self.height.max(1.0))
    }
}
