//! Capacity-bounded quad accumulator and its flush policy.

use super::backend::{RenderBackend, TextureKey};
use super::Vertex;

/// Maximum number of quads submitted by a single draw call.
pub const MAX_QUADS: usize = 4096;

/// Builds the shared index buffer for `max_quads` quads.
///
/// Quad `i` owns vertices `4i..4i + 4` and is split into the triangles
/// `(0, 1, 2)` and `(2, 3, 0)` relative to its base.
pub fn quad_indices(max_quads: usize) -> Vec<u32> {
    let mut indices = Vec::with_capacity(max_quads * 6);
    for i in 0..max_quads as u32 {
        let base = i * 4;
        indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }
    indices
}

/// Per-frame batching counters.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct BatchStats {
    /// Draw calls issued.
    pub flushes: u32,
    /// Quads submitted (triangles count as one quad each).
    pub quads: u32,
}

/// Append-only vertex accumulator.
///
/// All quads between two flushes share one texture (or none) and are drawn
/// with a single indexed call. A flush is forced before appending when the
/// texture binding changes or the buffer is full.
#[derive(Debug)]
pub struct Batch {
    vertices: Vec<Vertex>,
    capacity: usize,
    quad_count: usize,
    bound_texture: Option<TextureKey>,
    uses_texture: bool,
    stats: BatchStats,
}

impl Batch {
    pub fn new() -> Self {
        Self::with_capacity(MAX_QUADS)
    }

    /// Creates a batch holding at most `max_quads` quads per draw call.
    pub fn with_capacity(max_quads: usize) -> Self {
        assert!(max_quads > 0, "batch capacity must be non-zero");
        Self {
            vertices: Vec::with_capacity(max_quads * 4),
            capacity: max_quads,
            quad_count: 0,
            bound_texture: None,
            uses_texture: false,
            stats: BatchStats::default(),
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn quad_count(&self) -> usize {
        self.quad_count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.quad_count == 0
    }

    /// Texture of the pending quads; `None` while untextured or empty.
    #[inline]
    pub fn bound_texture(&self) -> Option<TextureKey> {
        if self.uses_texture { self.bound_texture } else { None }
    }

    #[inline]
    pub fn uses_texture(&self) -> bool {
        self.uses_texture
    }

    #[inline]
    pub fn stats(&self) -> BatchStats {
        self.stats
    }

    /// Returns the counters accumulated since the last call and resets them.
    pub fn take_stats(&mut self) -> BatchStats {
        std::mem::take(&mut self.stats)
    }

    /// Appends one quad, flushing first if its texture differs from the
    /// pending quads or the batch is full.
    pub fn push_quad<B>(&mut self, backend: &mut B, quad: [Vertex; 4], texture: Option<TextureKey>)
    where
        B: RenderBackend + ?Sized,
    {
        self.prepare(backend, texture);
        self.vertices.extend_from_slice(&quad);
        self.quad_count += 1;
    }

    /// Appends one untextured triangle.
    ///
    /// Encoded as a quad whose last two vertices coincide, so the second
    /// triangle of the shared index pattern has zero area.
    pub fn push_triangle<B>(&mut self, backend: &mut B, tri: [Vertex; 3])
    where
        B: RenderBackend + ?Sized,
    {
        let [a, b, c] = tri;
        self.push_quad(backend, [a, b, c, c], None);
    }

    /// Submits the pending quads as one draw call. No-op when empty.
    pub fn flush<B>(&mut self, backend: &mut B)
    where
        B: RenderBackend + ?Sized,
    {
        if self.quad_count == 0 {
            return;
        }

        debug_assert_eq!(self.vertices.len(), self.quad_count * 4);
        backend.draw_quads(&self.vertices, self.bound_texture());

        self.stats.flushes += 1;
        self.stats.quads += self.quad_count as u32;

        self.vertices.clear();
        self.quad_count = 0;
        self.bound_texture = None;
        self.uses_texture = false;
    }

    fn prepare<B>(&mut self, backend: &mut B, texture: Option<TextureKey>)
    where
        B: RenderBackend + ?Sized,
    {
        let uses_texture = texture.is_some();

        if self.quad_count > 0
            && (texture != self.bound_texture || uses_texture != self.uses_texture)
        {
            self.flush(backend);
        }
        if self.quad_count == self.capacity {
            self.flush(backend);
        }

        self.bound_texture = texture;
        self.uses_texture = uses_texture;
    }
}

impl Default for Batch {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Vec2;
    use crate::paint::Color;
    use crate::render::recording::{Call, RecordingBackend};

    fn quad(x: f32) -> [Vertex; 4] {
        let v = |dx: f32, dy: f32| Vertex::solid(Vec2::new(x + dx, dy), Color::WHITE);
        [v(0.0, 0.0), v(1.0, 0.0), v(1.0, 1.0), v(0.0, 1.0)]
    }

    fn key(n: u64) -> Option<TextureKey> {
        Some(TextureKey(n))
    }

    // ── index pattern ─────────────────────────────────────────────────────

    #[test]
    fn indices_follow_fixed_pattern() {
        let idx = quad_indices(3);
        assert_eq!(idx.len(), 18);
        assert_eq!(&idx[0..6], &[0, 1, 2, 2, 3, 0]);
        assert_eq!(&idx[12..18], &[8, 9, 10, 10, 11, 8]);
    }

    // ── flush policy ──────────────────────────────────────────────────────

    #[test]
    fn flush_on_empty_batch_is_noop() {
        let mut backend = RecordingBackend::default();
        let mut batch = Batch::new();
        batch.flush(&mut backend);
        assert!(backend.calls.is_empty());
        assert_eq!(batch.stats(), BatchStats::default());
    }

    #[test]
    fn texture_switches_coalesce_runs() {
        let mut backend = RecordingBackend::default();
        let mut batch = Batch::new();
        let (a, b) = (key(1), key(2));

        for tex in [a, a, a, b, b, a] {
            batch.push_quad(&mut backend, quad(0.0), tex);
        }
        assert_eq!(backend.draw_sizes(), vec![3, 2]);

        batch.flush(&mut backend);
        assert_eq!(backend.draw_sizes(), vec![3, 2, 1]);
        assert_eq!(backend.draw_textures(), vec![a, b, a]);
    }

    #[test]
    fn textured_and_untextured_never_share_a_draw() {
        let mut backend = RecordingBackend::default();
        let mut batch = Batch::new();

        batch.push_quad(&mut backend, quad(0.0), None);
        batch.push_quad(&mut backend, quad(1.0), key(7));
        batch.push_quad(&mut backend, quad(2.0), None);
        batch.flush(&mut backend);

        assert_eq!(backend.draw_sizes(), vec![1, 1, 1]);
        assert_eq!(backend.draw_textures(), vec![None, key(7), None]);
    }

    #[test]
    fn capacity_is_never_exceeded() {
        let mut backend = RecordingBackend::default();
        let mut batch = Batch::with_capacity(8);
        let n: usize = 8 * 3 + 5;

        for i in 0..n {
            batch.push_quad(&mut backend, quad(i as f32), None);
            assert!(batch.quad_count() <= batch.capacity());
        }
        let before_final = backend.draw_sizes().len();
        batch.flush(&mut backend);

        let sizes = backend.draw_sizes();
        assert!(before_final >= n.div_ceil(8) - 1);
        assert!(sizes.iter().all(|&s| s <= 8));
        assert_eq!(sizes.iter().sum::<usize>(), n);
        assert_eq!(sizes, vec![8, 8, 8, 5]);
    }

    #[test]
    fn full_batch_flushes_before_append() {
        let mut backend = RecordingBackend::default();
        let mut batch = Batch::with_capacity(2);

        batch.push_quad(&mut backend, quad(0.0), key(1));
        batch.push_quad(&mut backend, quad(1.0), key(1));
        assert!(backend.calls.is_empty());

        batch.push_quad(&mut backend, quad(2.0), key(1));
        assert_eq!(backend.draw_sizes(), vec![2]);
        assert_eq!(batch.quad_count(), 1);
        assert_eq!(batch.bound_texture(), key(1));
    }

    #[test]
    fn flush_uploads_only_pending_vertices_in_order() {
        let mut backend = RecordingBackend::default();
        let mut batch = Batch::new();

        batch.push_quad(&mut backend, quad(10.0), None);
        batch.push_quad(&mut backend, quad(20.0), None);
        batch.flush(&mut backend);

        let Some(Call::Draw { vertices, .. }) = backend.calls.first() else {
            panic!("expected a draw call, got {:?}", backend.calls);
        };
        assert_eq!(vertices.len(), 8);
        assert_eq!(vertices[0].pos, [10.0, 0.0]);
        assert_eq!(vertices[4].pos, [20.0, 0.0]);
    }

    #[test]
    fn flush_resets_binding() {
        let mut backend = RecordingBackend::default();
        let mut batch = Batch::new();

        batch.push_quad(&mut backend, quad(0.0), key(3));
        batch.flush(&mut backend);

        assert!(batch.is_empty());
        assert_eq!(batch.bound_texture(), None);
        assert!(!batch.uses_texture());
    }

    // ── triangles ─────────────────────────────────────────────────────────

    #[test]
    fn triangle_is_degenerate_quad() {
        let mut backend = RecordingBackend::default();
        let mut batch = Batch::new();
        let v = |x: f32, y: f32| Vertex::solid(Vec2::new(x, y), Color::WHITE);

        batch.push_triangle(&mut backend, [v(0.0, 0.0), v(4.0, 0.0), v(0.0, 4.0)]);
        batch.flush(&mut backend);

        let Some(Call::Draw { vertices, texture }) = backend.calls.first() else {
            panic!("expected a draw call");
        };
        assert_eq!(*texture, None);
        assert_eq!(vertices.len(), 4);
        assert_eq!(vertices[2], vertices[3]);
    }

    #[test]
    fn triangle_after_textured_quad_flushes() {
        let mut backend = RecordingBackend::default();
        let mut batch = Batch::new();
        let v = |x: f32| Vertex::solid(Vec2::new(x, 0.0), Color::WHITE);

        batch.push_quad(&mut backend, quad(0.0), key(1));
        batch.push_triangle(&mut backend, [v(0.0), v(1.0), v(2.0)]);
        batch.flush(&mut backend);

        assert_eq!(backend.draw_textures(), vec![key(1), None]);
    }

    #[test]
    fn stats_count_flushes_and_quads() {
        let mut backend = RecordingBackend::default();
        let mut batch = Batch::new();

        batch.push_quad(&mut backend, quad(0.0), key(1));
        batch.push_quad(&mut backend, quad(0.0), key(2));
        batch.push_quad(&mut backend, quad(0.0), key(2));
        batch.flush(&mut backend);

        assert_eq!(batch.take_stats(), BatchStats { flushes: 2, quads: 3 });
        assert_eq!(batch.stats(), BatchStats::default());
    }
}
