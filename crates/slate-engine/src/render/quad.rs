//! Rotated, pivoted, UV-mapped rectangle geometry.

use crate::coords::{Rect, Vec2};
use crate::paint::Color;

use super::backend::TextureKey;
use super::Vertex;

/// Texture-coordinate rectangle: `(u0, v0)` maps to the top-left corner,
/// `(u1, v1)` to the bottom-right.
///
/// Swapping a pair of bounds mirrors the image along that axis.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct UvRect {
    pub u0: f32,
    pub v0: f32,
    pub u1: f32,
    pub v1: f32,
}

impl UvRect {
    pub const FULL: UvRect = UvRect::new(0.0, 0.0, 1.0, 1.0);

    #[inline]
    pub const fn new(u0: f32, v0: f32, u1: f32, v1: f32) -> Self {
        Self { u0, v0, u1, v1 }
    }

    /// Swaps the horizontal and/or vertical bounds.
    #[inline]
    pub fn flipped(self, flip_x: bool, flip_y: bool) -> Self {
        let (u0, u1) = if flip_x { (self.u1, self.u0) } else { (self.u0, self.u1) };
        let (v0, v1) = if flip_y { (self.v1, self.v0) } else { (self.v0, self.v1) };
        Self { u0, v0, u1, v1 }
    }

    /// UV of each corner in quad order: TL, TR, BR, BL.
    #[inline]
    fn corners(self) -> [[f32; 2]; 4] {
        [
            [self.u0, self.v0],
            [self.u1, self.v0],
            [self.u1, self.v1],
            [self.u0, self.v1],
        ]
    }
}

impl Default for UvRect {
    fn default() -> Self {
        Self::FULL
    }
}

/// One rectangle to be turned into four vertices.
///
/// `pivot` is normalized to the rectangle (`(0, 0)` top-left, `(1, 1)`
/// bottom-right) and is both the rotation center and the anchor that stays at
/// `dst.origin + pivot * dst.size`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct QuadRequest {
    pub dst: Rect,
    pub uv: UvRect,
    pub rotation_degrees: f32,
    pub pivot: Vec2,
    pub color: Color,
    pub texture: Option<TextureKey>,
}

impl QuadRequest {
    /// Axis-aligned untextured rectangle.
    #[inline]
    pub fn solid(dst: Rect, color: Color) -> Self {
        Self {
            dst,
            uv: UvRect::FULL,
            rotation_degrees: 0.0,
            pivot: Vec2::zero(),
            color,
            texture: None,
        }
    }
}

/// Computes the four vertices of `req` in the order top-left, top-right,
/// bottom-right, bottom-left (before rotation).
///
/// The order matches the batch's `(0, 1, 2), (2, 3, 0)` triangulation.
/// Inputs are not validated: zero or negative sizes are transformed as given.
pub fn build_quad(req: &QuadRequest) -> [Vertex; 4] {
    let Rect { origin, size } = req.dst;
    let pivot = req.pivot;

    let left = -pivot.x * size.x;
    let right = (1.0 - pivot.x) * size.x;
    let top = -pivot.y * size.y;
    let bottom = (1.0 - pivot.y) * size.y;

    let anchor = Vec2::new(origin.x + pivot.x * size.x, origin.y + pivot.y * size.y);
    let radians = req.rotation_degrees.to_radians();

    let corners = [
        Vec2::new(left, top),
        Vec2::new(right, top),
        Vec2::new(right, bottom),
        Vec2::new(left, bottom),
    ];
    let uvs = req.uv.corners();

    std::array::from_fn(|i| Vertex::new(anchor + corners[i].rotated(radians), uvs[i], req.color))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions(q: &[Vertex; 4]) -> [(f32, f32); 4] {
        q.map(|v| (v.pos[0], v.pos[1]))
    }

    fn assert_close(a: Vec2, b: Vec2) {
        assert!(
            (a.x - b.x).abs() < 1e-4 && (a.y - b.y).abs() < 1e-4,
            "{a:?} != {b:?}"
        );
    }

    #[test]
    fn unrotated_quad_winds_tl_tr_br_bl() {
        let q = build_quad(&QuadRequest::solid(Rect::new(0.0, 0.0, 10.0, 20.0), Color::WHITE));
        assert_eq!(positions(&q), [(0.0, 0.0), (10.0, 0.0), (10.0, 20.0), (0.0, 20.0)]);
    }

    #[test]
    fn quarter_turn_moves_top_left_to_top_right() {
        let base = QuadRequest {
            pivot: Vec2::new(0.5, 0.5),
            ..QuadRequest::solid(Rect::new(0.0, 0.0, 10.0, 10.0), Color::WHITE)
        };
        let unrotated = build_quad(&base);
        let rotated = build_quad(&QuadRequest { rotation_degrees: 90.0, ..base });

        assert_close(rotated[0].position(), unrotated[1].position());
        assert_close(rotated[1].position(), unrotated[2].position());
    }

    #[test]
    fn pivot_stays_fixed_under_rotation() {
        let req = QuadRequest {
            pivot: Vec2::new(0.25, 0.75),
            rotation_degrees: 33.0,
            ..QuadRequest::solid(Rect::new(100.0, 50.0, 40.0, 20.0), Color::WHITE)
        };
        let q = build_quad(&req);
        // Rotation about the anchor preserves each corner's distance to it.
        let anchor = Vec2::new(110.0, 65.0);
        let unrotated = build_quad(&QuadRequest { rotation_degrees: 0.0, ..req });
        for i in 0..4 {
            let a = (q[i].position() - anchor).length();
            let b = (unrotated[i].position() - anchor).length();
            assert!((a - b).abs() < 1e-3);
        }
    }

    #[test]
    fn uv_corners_follow_vertex_order() {
        let req = QuadRequest {
            uv: UvRect::new(0.25, 0.5, 0.75, 1.0),
            ..QuadRequest::solid(Rect::new(0.0, 0.0, 1.0, 1.0), Color::WHITE)
        };
        let q = build_quad(&req);
        assert_eq!(q.map(|v| v.uv), [[0.25, 0.5], [0.75, 0.5], [0.75, 1.0], [0.25, 1.0]]);
    }

    #[test]
    fn flip_swaps_uv_bounds() {
        let uv = UvRect::FULL.flipped(true, false);
        assert_eq!(uv, UvRect::new(1.0, 0.0, 0.0, 1.0));
        assert_eq!(UvRect::FULL.flipped(true, true), UvRect::new(1.0, 1.0, 0.0, 0.0));
    }

    #[test]
    fn negative_size_is_transformed_as_is() {
        let q = build_quad(&QuadRequest::solid(Rect::new(5.0, 5.0, -2.0, 3.0), Color::WHITE));
        assert_eq!(positions(&q), [(5.0, 5.0), (3.0, 5.0), (3.0, 8.0), (5.0, 8.0)]);
    }

    #[test]
    fn all_vertices_share_color() {
        let c = Color::rgba(0.1, 0.2, 0.3, 0.4);
        let q = build_quad(&QuadRequest::solid(Rect::new(0.0, 0.0, 1.0, 1.0), c));
        assert!(q.iter().all(|v| v.color == c.to_array()));
    }
}
