//! Frame driver: the drawing API on top of the batch, camera, and pools.
//!
//! Per frame: `clear` → draw calls → `present`. Pending quads are flushed
//! before anything that changes how they would be rasterized (camera,
//! viewport, scissor, clear, present), so every draw call sees exactly the
//! state that was current when its quads were issued.

use std::path::Path;

use crate::camera::Camera;
use crate::coords::{Rect, Vec2, Viewport};
use crate::paint::Color;
use crate::render::primitives;
use crate::render::{build_quad, Batch, QuadRequest, RenderBackend, UvRect};
use crate::resources::{
    FontHandle, FontPool, ResourceError, TextureHandle, TexturePool, TextureInfo,
};

/// Extra parameters for [`Renderer::draw_sprite_ex`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SpriteOptions {
    /// Source region in texture coordinates.
    pub uv: UvRect,
    /// Clockwise rotation in degrees about `pivot`.
    pub rotation_degrees: f32,
    /// Rotation center, normalized to the destination rectangle.
    pub pivot: Vec2,
    pub tint: Color,
    pub flip_x: bool,
    pub flip_y: bool,
}

impl Default for SpriteOptions {
    fn default() -> Self {
        Self {
            uv: UvRect::FULL,
            rotation_degrees: 0.0,
            pivot: Vec2::zero(),
            tint: Color::WHITE,
            flip_x: false,
            flip_y: false,
        }
    }
}

/// Batched 2D renderer over a [`RenderBackend`].
pub struct Renderer<B: RenderBackend> {
    backend: B,
    batch: Batch,
    camera: Camera,
    viewport: Viewport,
    clip: Option<Rect>,
    textures: TexturePool,
    fonts: FontPool,
}

impl<B: RenderBackend> Renderer<B> {
    pub fn new(backend: B, viewport: Viewport) -> Self {
        let mut renderer = Self {
            backend,
            batch: Batch::new(),
            camera: Camera::new(),
            viewport,
            clip: None,
            textures: TexturePool::new(),
            fonts: FontPool::new(),
        };
        renderer.apply_projection();
        renderer
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[inline]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Active clip rectangle, in screen pixels.
    #[inline]
    pub fn clip(&self) -> Option<Rect> {
        self.clip
    }

    // ── frame ─────────────────────────────────────────────────────────────

    /// Adapts to a new drawable size (physical pixels).
    pub fn resize(&mut self, width: u32, height: u32) {
        self.batch.flush(&mut self.backend);
        self.viewport = Viewport::from_physical(width, height);
        self.backend.resize(width, height);
        self.apply_projection();
    }

    pub fn clear(&mut self, color: Color) {
        self.batch.flush(&mut self.backend);
        self.backend.clear(color);
    }

    pub fn present(&mut self) {
        self.batch.flush(&mut self.backend);
        let stats = self.batch.take_stats();
        log::trace!("frame: {} draw calls, {} quads", stats.flushes, stats.quads);
        self.backend.present();
    }

    /// Submits pending quads now.
    pub fn flush(&mut self) {
        self.batch.flush(&mut self.backend);
    }

    // ── sprites ───────────────────────────────────────────────────────────

    /// Draws the whole texture stretched over `dst`.
    pub fn draw_sprite(&mut self, texture: TextureHandle, dst: Rect) {
        self.draw_sprite_ex(texture, dst, &SpriteOptions::default());
    }

    /// Draws the `uv` sub-rectangle of the texture (sprite sheets).
    pub fn draw_sprite_region(&mut self, texture: TextureHandle, dst: Rect, uv: UvRect) {
        self.draw_sprite_ex(
            texture,
            dst,
            &SpriteOptions {
                uv,
                ..SpriteOptions::default()
            },
        );
    }

    /// Draws the texture mirrored horizontally and/or vertically.
    pub fn draw_sprite_flip(&mut self, texture: TextureHandle, dst: Rect, flip_x: bool, flip_y: bool) {
        self.draw_sprite_ex(
            texture,
            dst,
            &SpriteOptions {
                pivot: Vec2::new(0.5, 0.5),
                flip_x,
                flip_y,
                ..SpriteOptions::default()
            },
        );
    }

    /// Draws a sprite with rotation, pivot, tint, UV region, and flips.
    ///
    /// Invalid or freed handles draw nothing.
    pub fn draw_sprite_ex(&mut self, texture: TextureHandle, dst: Rect, opts: &SpriteOptions) {
        let Some(info) = self.textures.get(texture) else { return };

        let req = QuadRequest {
            dst,
            uv: opts.uv.flipped(opts.flip_x, opts.flip_y),
            rotation_degrees: opts.rotation_degrees,
            pivot: opts.pivot,
            color: opts.tint,
            texture: Some(info.key),
        };
        self.batch.push_quad(&mut self.backend, build_quad(&req), req.texture);
    }

    // ── primitives ────────────────────────────────────────────────────────

    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        primitives::fill_rect(&mut self.batch, &mut self.backend, rect, color);
    }

    pub fn draw_rect(&mut self, rect: Rect, color: Color) {
        primitives::draw_rect(&mut self.batch, &mut self.backend, rect, color);
    }

    pub fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        primitives::fill_circle(&mut self.batch, &mut self.backend, center, radius, color);
    }

    pub fn draw_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        primitives::draw_circle(&mut self.batch, &mut self.backend, center, radius, color);
    }

    /// 1-px line.
    pub fn draw_line(&mut self, from: Vec2, to: Vec2, color: Color) {
        self.draw_line_width(from, to, primitives::OUTLINE_WIDTH, color);
    }

    pub fn draw_line_width(&mut self, from: Vec2, to: Vec2, width: f32, color: Color) {
        primitives::draw_line(&mut self.batch, &mut self.backend, from, to, width, color);
    }

    pub fn fill_triangle(&mut self, a: Vec2, b: Vec2, c: Vec2, color: Color) {
        primitives::fill_triangle(&mut self.batch, &mut self.backend, [a, b, c], color);
    }

    pub fn draw_triangle(&mut self, a: Vec2, b: Vec2, c: Vec2, color: Color) {
        primitives::draw_triangle(&mut self.batch, &mut self.backend, [a, b, c], color);
    }

    // ── textures ──────────────────────────────────────────────────────────

    /// Loads an image file. Returns [`TextureHandle::INVALID`] on failure.
    pub fn load_texture(&mut self, path: impl AsRef<Path>) -> TextureHandle {
        let path = path.as_ref();
        self.try_load_texture(path)
            .unwrap_or_else(|e| invalid_texture(&format!("{}", path.display()), e))
    }

    pub fn try_load_texture(&mut self, path: impl AsRef<Path>) -> Result<TextureHandle, ResourceError> {
        self.textures.load_path(&mut self.backend, path.as_ref())
    }

    /// Decodes an in-memory image. Returns [`TextureHandle::INVALID`] on failure.
    pub fn load_texture_bytes(&mut self, bytes: &[u8]) -> TextureHandle {
        self.try_load_texture_bytes(bytes)
            .unwrap_or_else(|e| invalid_texture("image bytes", e))
    }

    pub fn try_load_texture_bytes(&mut self, bytes: &[u8]) -> Result<TextureHandle, ResourceError> {
        self.textures.load_bytes(&mut self.backend, bytes)
    }

    /// Uploads RGBA8 pixels. Returns [`TextureHandle::INVALID`] on failure.
    pub fn load_texture_rgba(&mut self, pixels: &[u8], width: u32, height: u32) -> TextureHandle {
        self.try_load_texture_rgba(pixels, width, height)
            .unwrap_or_else(|e| invalid_texture("rgba pixels", e))
    }

    pub fn try_load_texture_rgba(
        &mut self,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> Result<TextureHandle, ResourceError> {
        self.textures.load_rgba(&mut self.backend, pixels, width, height)
    }

    /// Releases a texture. Invalid or already-freed handles are ignored.
    ///
    /// Pending quads are flushed first if they sample this texture.
    pub fn free_texture(&mut self, texture: TextureHandle) {
        let Some(info) = self.textures.get(texture) else { return };
        if self.batch.bound_texture() == Some(info.key) {
            self.batch.flush(&mut self.backend);
        }
        self.textures.free(&mut self.backend, texture);
    }

    pub fn texture(&self, texture: TextureHandle) -> Option<TextureInfo> {
        self.textures.get(texture)
    }

    /// Width in pixels; 0 for invalid handles.
    pub fn texture_width(&self, texture: TextureHandle) -> u32 {
        self.textures.width(texture)
    }

    /// Height in pixels; 0 for invalid handles.
    pub fn texture_height(&self, texture: TextureHandle) -> u32 {
        self.textures.height(texture)
    }

    // ── fonts ─────────────────────────────────────────────────────────────

    /// Loads and bakes a font file at `size` pixels. Returns
    /// [`FontHandle::INVALID`] on failure.
    pub fn load_font(&mut self, path: impl AsRef<Path>, size: f32) -> FontHandle {
        let path = path.as_ref();
        self.try_load_font(path, size)
            .unwrap_or_else(|e| invalid_font(&format!("{}", path.display()), e))
    }

    pub fn try_load_font(&mut self, path: impl AsRef<Path>, size: f32) -> Result<FontHandle, ResourceError> {
        self.fonts.load_path(&mut self.backend, path.as_ref(), size)
    }

    pub fn load_font_bytes(&mut self, bytes: &[u8], size: f32) -> FontHandle {
        self.try_load_font_bytes(bytes, size)
            .unwrap_or_else(|e| invalid_font("font bytes", e))
    }

    pub fn try_load_font_bytes(&mut self, bytes: &[u8], size: f32) -> Result<FontHandle, ResourceError> {
        self.fonts.load_bytes(&mut self.backend, bytes, size)
    }

    /// Loads the first available system font. Returns
    /// [`FontHandle::INVALID`] when none is installed.
    pub fn load_default_font(&mut self, size: f32) -> FontHandle {
        self.try_load_default_font(size)
            .unwrap_or_else(|e| invalid_font("default font", e))
    }

    pub fn try_load_default_font(&mut self, size: f32) -> Result<FontHandle, ResourceError> {
        self.fonts.load_default(&mut self.backend, size)
    }

    /// Releases a font. Invalid or already-freed handles are ignored.
    pub fn free_font(&mut self, font: FontHandle) {
        let Some((_, key)) = self.fonts.get(font) else { return };
        if self.batch.bound_texture() == Some(key) {
            self.batch.flush(&mut self.backend);
        }
        self.fonts.free(&mut self.backend, font);
    }

    /// Draws `text` with the pen starting at `(x, baseline)`.
    ///
    /// Characters outside printable ASCII advance the pen by half the font
    /// size and draw nothing. Invalid fonts draw nothing.
    pub fn draw_text(&mut self, font: FontHandle, text: &str, x: f32, baseline: f32, color: Color) {
        let Some((baked, key)) = self.fonts.get(font) else { return };

        for (dst, uv) in baked.layout(text, x, baseline) {
            let req = QuadRequest {
                uv,
                texture: Some(key),
                ..QuadRequest::solid(dst, color)
            };
            self.batch.push_quad(&mut self.backend, build_quad(&req), req.texture);
        }
    }

    /// Horizontal advance of `text`; 0 for invalid fonts.
    pub fn text_width(&self, font: FontHandle, text: &str) -> f32 {
        self.fonts.get(font).map_or(0.0, |(baked, _)| baked.text_width(text))
    }

    /// Line height of `font` (its baked pixel size); 0 for invalid fonts.
    pub fn text_height(&self, font: FontHandle) -> f32 {
        self.fonts.get(font).map_or(0.0, |(baked, _)| baked.size())
    }

    // ── camera ────────────────────────────────────────────────────────────

    pub fn set_camera_position(&mut self, position: Vec2) {
        self.batch.flush(&mut self.backend);
        self.camera.set_position(position);
        self.apply_projection();
    }

    /// Sets the zoom factor; values at or below [`MIN_ZOOM`](crate::camera::MIN_ZOOM)
    /// are ignored.
    pub fn set_camera_zoom(&mut self, zoom: f32) {
        let mut next = self.camera;
        if !next.set_zoom(zoom) {
            log::debug!("ignoring camera zoom {zoom}");
            return;
        }
        self.batch.flush(&mut self.backend);
        self.camera = next;
        self.apply_projection();
    }

    pub fn set_camera_rotation(&mut self, degrees: f32) {
        self.batch.flush(&mut self.backend);
        self.camera.set_rotation(degrees);
        self.apply_projection();
    }

    pub fn reset_camera(&mut self) {
        self.batch.flush(&mut self.backend);
        self.camera.reset();
        self.apply_projection();
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        self.camera.screen_to_world(screen)
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        self.camera.world_to_screen(world)
    }

    // ── clipping ──────────────────────────────────────────────────────────

    /// Restricts subsequent drawing to `rect` (screen pixels), replacing any
    /// active clip.
    pub fn clip_begin(&mut self, rect: Rect) {
        self.batch.flush(&mut self.backend);
        self.clip = Some(rect);
        self.backend.set_scissor(self.clip);
    }

    pub fn clip_end(&mut self) {
        self.batch.flush(&mut self.backend);
        self.clip = None;
        self.backend.set_scissor(None);
    }

    // ── teardown ──────────────────────────────────────────────────────────

    /// Frees every live texture and font. Returns how many were released.
    ///
    /// Also run on drop.
    pub fn release_all(&mut self) -> usize {
        self.batch.flush(&mut self.backend);
        let textures = self.textures.clear(&mut self.backend);
        let fonts = self.fonts.clear(&mut self.backend);
        textures + fonts
    }

    fn apply_projection(&mut self) {
        self.backend.set_projection(self.camera.projection(self.viewport));
    }
}

impl<B: RenderBackend> Drop for Renderer<B> {
    fn drop(&mut self) {
        let n = self.release_all();
        if n > 0 {
            log::info!("renderer dropped; released {n} textures/fonts");
        }
    }
}

fn invalid_texture(what: &str, err: ResourceError) -> TextureHandle {
    log::warn!("texture load failed ({what}): {err}");
    TextureHandle::INVALID
}

fn invalid_font(what: &str, err: ResourceError) -> FontHandle {
    log::warn!("font load failed ({what}): {err}");
    FontHandle::INVALID
}
