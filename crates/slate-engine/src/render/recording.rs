//! In-memory `RenderBackend` that records every call, for tests.

use crate::camera::Mat4;
use crate::coords::Rect;
use crate::paint::Color;
use crate::resources::ResourceError;

use super::backend::{RenderBackend, TextureFilter, TextureKey};
use super::Vertex;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Clear(Color),
    Projection(Mat4),
    Scissor(Option<Rect>),
    Draw {
        vertices: Vec<Vertex>,
        texture: Option<TextureKey>,
    },
    Present,
    Resize(u32, u32),
    CreateTexture {
        key: TextureKey,
        width: u32,
        height: u32,
        filter: TextureFilter,
    },
    DestroyTexture(TextureKey),
}

#[derive(Debug, Default)]
pub(crate) struct RecordingBackend {
    pub calls: Vec<Call>,
    pub next_key: u64,
    /// When set, `create_texture` fails as if the GPU upload was rejected.
    pub fail_uploads: bool,
}

impl RecordingBackend {
    /// Quad counts of each draw call, in submission order.
    pub fn draw_sizes(&self) -> Vec<usize> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Draw { vertices, .. } => Some(vertices.len() / 4),
                _ => None,
            })
            .collect()
    }

    pub fn draw_textures(&self) -> Vec<Option<TextureKey>> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Draw { texture, .. } => Some(*texture),
                _ => None,
            })
            .collect()
    }

    /// All vertices submitted so far, flattened across draw calls.
    pub fn drawn_vertices(&self) -> Vec<Vertex> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Draw { vertices, .. } => Some(vertices.clone()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    pub fn live_textures(&self) -> usize {
        let created = self
            .calls
            .iter()
            .filter(|c| matches!(c, Call::CreateTexture { .. }))
            .count();
        let destroyed = self
            .calls
            .iter()
            .filter(|c| matches!(c, Call::DestroyTexture(_)))
            .count();
        created - destroyed
    }
}

impl RenderBackend for RecordingBackend {
    fn clear(&mut self, color: Color) {
        self.calls.push(Call::Clear(color));
    }

    fn set_projection(&mut self, projection: Mat4) {
        self.calls.push(Call::Projection(projection));
    }

    fn set_scissor(&mut self, clip: Option<Rect>) {
        self.calls.push(Call::Scissor(clip));
    }

    fn draw_quads(&mut self, vertices: &[Vertex], texture: Option<TextureKey>) {
        self.calls.push(Call::Draw {
            vertices: vertices.to_vec(),
            texture,
        });
    }

    fn present(&mut self) {
        self.calls.push(Call::Present);
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.calls.push(Call::Resize(width, height));
    }

    fn create_texture(
        &mut self,
        rgba: &[u8],
        width: u32,
        height: u32,
        filter: TextureFilter,
    ) -> Result<TextureKey, ResourceError> {
        if self.fail_uploads {
            return Err(ResourceError::Upload("recording backend rejects uploads".into()));
        }
        assert_eq!(rgba.len(), (width * height * 4) as usize);

        self.next_key += 1;
        let key = TextureKey(self.next_key);
        self.calls.push(Call::CreateTexture {
            key,
            width,
            height,
            filter,
        });
        Ok(key)
    }

    fn destroy_texture(&mut self, key: TextureKey) {
        self.calls.push(Call::DestroyTexture(key));
    }
}
