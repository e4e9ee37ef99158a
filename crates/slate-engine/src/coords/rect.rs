use super::{Vec2, Viewport};

/// Axis-aligned rectangle in pixels (top-left origin).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub fn max(self) -> Vec2 {
        self.origin + self.size
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    /// Normalizes the rectangle so width/height are non-negative.
    #[inline]
    pub fn normalized(self) -> Self {
        let mut x = self.origin.x;
        let mut y = self.origin.y;
        let mut w = self.size.x;
        let mut h = self.size.y;

        if w < 0.0 {
            x += w;
            w = -w;
        }
        if h < 0.0 {
            y += h;
            h = -h;
        }

        Rect::new(x, y, w, h)
    }

    #[inline]
    pub fn intersect(self, other: Rect) -> Option<Rect> {
        let a = self.normalized();
        let b = other.normalized();

        let x0 = a.origin.x.max(b.origin.x);
        let y0 = a.origin.y.max(b.origin.y);
        let x1 = a.max().x.min(b.max().x);
        let y1 = a.max().y.min(b.max().y);

        let w = x1 - x0;
        let h = y1 - y0;

        if w <= 0.0 || h <= 0.0 {
            None
        } else {
            Some(Rect::new(x0, y0, w, h))
        }
    }

    /// Converts a screen-pixel rectangle into integer scissor arguments
    /// `(x, y, w, h)` clamped to `viewport`.
    ///
    /// Returns `None` when nothing of the rectangle is on screen; callers
    /// should then skip rasterization entirely rather than disable clipping.
    pub fn to_scissor(self, viewport: Viewport) -> Option<(u32, u32, u32, u32)> {
        let screen = Rect::new(0.0, 0.0, viewport.width, viewport.height);
        let r = self.intersect(screen)?;

        let x0 = r.origin.x.floor() as u32;
        let y0 = r.origin.y.floor() as u32;
        let x1 = (r.max().x.ceil() as u32).min(viewport.width as u32);
        let y1 = (r.max().y.ceil() as u32).min(viewport.height as u32);

        let w = x1.saturating_sub(x0);
        let h = y1.saturating_sub(y0);
        if w == 0 || h == 0 { None } else { Some((x0, y0, w, h)) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(x: f32, y: f32, w: f32, h: f32) -> Rect { Rect::new(x, y, w, h) }

    // ── normalized ────────────────────────────────────────────────────────

    #[test]
    fn normalized_positive_is_identity() {
        let rect = r(1.0, 2.0, 10.0, 20.0);
        assert_eq!(rect.normalized(), rect);
    }

    #[test]
    fn normalized_negative_width() {
        let n = r(10.0, 0.0, -4.0, 5.0).normalized();
        assert_eq!(n.origin.x, 6.0);
        assert_eq!(n.size.x, 4.0);
    }

    // ── intersect ─────────────────────────────────────────────────────────

    #[test]
    fn intersect_overlapping() {
        let i = r(0.0, 0.0, 10.0, 10.0).intersect(r(5.0, 5.0, 10.0, 10.0));
        assert_eq!(i, Some(r(5.0, 5.0, 5.0, 5.0)));
    }

    #[test]
    fn intersect_touching_edge_returns_none() {
        let a = r(0.0, 0.0, 10.0, 10.0);
        let b = r(10.0, 0.0, 10.0, 10.0);
        assert!(a.intersect(b).is_none());
    }

    // ── to_scissor ────────────────────────────────────────────────────────

    #[test]
    fn scissor_inside_viewport_is_unchanged() {
        let vp = Viewport::new(800.0, 600.0);
        assert_eq!(r(10.0, 20.0, 100.0, 50.0).to_scissor(vp), Some((10, 20, 100, 50)));
    }

    #[test]
    fn scissor_is_clamped_to_viewport() {
        let vp = Viewport::new(800.0, 600.0);
        assert_eq!(r(-10.0, 550.0, 100.0, 100.0).to_scissor(vp), Some((0, 550, 90, 50)));
    }

    #[test]
    fn scissor_fully_offscreen_is_none() {
        let vp = Viewport::new(800.0, 600.0);
        assert_eq!(r(900.0, 0.0, 10.0, 10.0).to_scissor(vp), None);
    }
}
