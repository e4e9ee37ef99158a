//! GPU interface consumed by the batch and the frame driver.
//!
//! Everything above this trait is plain CPU code; everything below it talks to
//! the graphics API. The wgpu implementation lives in `wgpu_backend`.

use crate::camera::Mat4;
use crate::coords::Rect;
use crate::paint::Color;
use crate::resources::ResourceError;

use super::Vertex;

/// Identity of a GPU-resident texture.
///
/// Keys are assigned by the backend and never reused, so a key that outlives
/// its texture can never alias a newer one.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TextureKey(pub(crate) u64);

/// Sampler filtering for a texture.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TextureFilter {
    /// Pixel-exact sampling; used for sprites.
    Nearest,
    /// Bilinear sampling; used for font atlases.
    Linear,
}

/// Minimal set of GPU operations the renderer needs.
///
/// Calls arrive in program order and the backend must execute them in that
/// order: a draw issued before `set_projection`/`set_scissor` is rendered with
/// the previous state.
pub trait RenderBackend {
    /// Clears the color target of the current frame.
    fn clear(&mut self, color: Color);

    /// Sets the projection used by subsequent draws.
    fn set_projection(&mut self, projection: Mat4);

    /// Sets (or removes) the scissor rectangle, in screen pixels, used by
    /// subsequent draws.
    fn set_scissor(&mut self, clip: Option<Rect>);

    /// Uploads `vertices` (four per quad) and issues one indexed draw call
    /// covering `vertices.len() / 4` quads.
    ///
    /// `texture = None` selects the untextured shader branch.
    fn draw_quads(&mut self, vertices: &[Vertex], texture: Option<TextureKey>);

    /// Finishes the frame and shows it.
    fn present(&mut self);

    /// Adapts the color target to a new drawable size (physical pixels).
    fn resize(&mut self, width: u32, height: u32);

    /// Uploads a tightly packed RGBA8 image.
    fn create_texture(
        &mut self,
        rgba: &[u8],
        width: u32,
        height: u32,
        filter: TextureFilter,
    ) -> Result<TextureKey, ResourceError>;

    /// Releases a texture. Unknown keys are ignored.
    fn destroy_texture(&mut self, key: TextureKey);

    /// Returns `true` once the backend can no longer render (e.g. device lost).
    fn is_lost(&self) -> bool {
        false
    }
}
