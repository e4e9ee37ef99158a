//! Rectangles, lines, circles, and triangles decomposed into batch quads.
//!
//! Every primitive is untextured and goes through the same flush rules as
//! sprites.

use std::f32::consts::TAU;

use crate::coords::{Rect, Vec2};
use crate::paint::Color;

use super::backend::RenderBackend;
use super::batch::Batch;
use super::quad::{build_quad, QuadRequest};
use super::Vertex;

/// Segments used to approximate circles.
pub const CIRCLE_SEGMENTS: usize = 32;

/// Lines shorter than this are dropped.
pub const MIN_LINE_LENGTH: f32 = 0.001;

/// Stroke width of outlines, in pixels.
pub const OUTLINE_WIDTH: f32 = 1.0;

pub fn fill_rect<B>(batch: &mut Batch, backend: &mut B, rect: Rect, color: Color)
where
    B: RenderBackend + ?Sized,
{
    batch.push_quad(backend, build_quad(&QuadRequest::solid(rect, color)), None);
}

/// Outlines `rect` with four 1-px bars: top, bottom, left, right.
///
/// The vertical bars span the full height, so only the corner pixels are
/// covered twice.
pub fn draw_rect<B>(batch: &mut Batch, backend: &mut B, rect: Rect, color: Color)
where
    B: RenderBackend + ?Sized,
{
    let Rect { origin: o, size: s } = rect;
    let t = OUTLINE_WIDTH;

    fill_rect(batch, backend, Rect::new(o.x, o.y, s.x, t), color);
    fill_rect(batch, backend, Rect::new(o.x, o.y + s.y - t, s.x, t), color);
    fill_rect(batch, backend, Rect::new(o.x, o.y, t, s.y), color);
    fill_rect(batch, backend, Rect::new(o.x + s.x - t, o.y, t, s.y), color);
}

/// Draws a segment as a quad of the given width centered on the segment.
///
/// Returns `false` (and draws nothing) for segments shorter than
/// [`MIN_LINE_LENGTH`].
pub fn draw_line<B>(
    batch: &mut Batch,
    backend: &mut B,
    from: Vec2,
    to: Vec2,
    width: f32,
    color: Color,
) -> bool
where
    B: RenderBackend + ?Sized,
{
    let dir = to - from;
    let len = dir.length();
    if len < MIN_LINE_LENGTH {
        return false;
    }

    let half = (dir / len).perp() * (width * 0.5);
    let quad = [
        Vertex::solid(from + half, color),
        Vertex::solid(to + half, color),
        Vertex::solid(to - half, color),
        Vertex::solid(from - half, color),
    ];
    batch.push_quad(backend, quad, None);
    true
}

/// Outlines a circle with [`CIRCLE_SEGMENTS`] 1-px line segments.
pub fn draw_circle<B>(
    batch: &mut Batch,
    backend: &mut B,
    center: Vec2,
    radius: f32,
    color: Color,
) where
    B: RenderBackend + ?Sized,
{
    for (p0, p1) in circle_edges(center, radius) {
        draw_line(batch, backend, p0, p1, OUTLINE_WIDTH, color);
    }
}

/// Fills a circle with a fan of [`CIRCLE_SEGMENTS`] triangles around `center`.
pub fn fill_circle<B>(
    batch: &mut Batch,
    backend: &mut B,
    center: Vec2,
    radius: f32,
    color: Color,
) where
    B: RenderBackend + ?Sized,
{
    let c = Vertex::solid(center, color);
    for (p0, p1) in circle_edges(center, radius) {
        batch.push_triangle(
            backend,
            [Vertex::solid(p0, color), c, Vertex::solid(p1, color)],
        );
    }
}

pub fn fill_triangle<B>(batch: &mut Batch, backend: &mut B, pts: [Vec2; 3], color: Color)
where
    B: RenderBackend + ?Sized,
{
    batch.push_triangle(backend, pts.map(|p| Vertex::solid(p, color)));
}

pub fn draw_triangle<B>(batch: &mut Batch, backend: &mut B, pts: [Vec2; 3], color: Color)
where
    B: RenderBackend + ?Sized,
{
    let [a, b, c] = pts;
    for (p0, p1) in [(a, b), (b, c), (c, a)] {
        draw_line(batch, backend, p0, p1, OUTLINE_WIDTH, color);
    }
}

/// Consecutive points on the circumference, starting at angle 0.
fn circle_edges(center: Vec2, radius: f32) -> impl Iterator<Item = (Vec2, Vec2)> {
    let step = TAU / CIRCLE_SEGMENTS as f32;
    let point = move |i: usize| {
        let a = i as f32 * step;
        Vec2::new(center.x + a.cos() * radius, center.y + a.sin() * radius)
    };
    (0..CIRCLE_SEGMENTS).map(move |i| (point(i), point(i + 1)))
}
