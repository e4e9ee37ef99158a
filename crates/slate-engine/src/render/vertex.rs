//! Per-vertex attributes shared by every draw call.

use bytemuck::{Pod, Zeroable};

use crate::coords::Vec2;
use crate::paint::Color;

/// One batched vertex: position in world pixels, texture coordinate, tint.
///
/// Layout (32 bytes):
///
///  offset  0  pos    [f32; 2]   loc 0
///  offset  8  uv     [f32; 2]   loc 1
///  offset 16  color  [f32; 4]   loc 2
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 2],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x2, // pos
        1 => Float32x2, // uv
        2 => Float32x4  // color
    ];

    #[inline]
    pub fn new(pos: Vec2, uv: [f32; 2], color: Color) -> Self {
        Self {
            pos: [pos.x, pos.y],
            uv,
            color: color.to_array(),
        }
    }

    /// Untextured vertex; the UV is ignored by the shader.
    #[inline]
    pub fn solid(pos: Vec2, color: Color) -> Self {
        Self::new(pos, [0.0, 0.0], color)
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.pos[0], self.pos[1])
    }

    pub(crate) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_is_32_bytes() {
        assert_eq!(std::mem::size_of::<Vertex>(), 32);
    }

    #[test]
    fn layout_stride_matches_size() {
        assert_eq!(Vertex::layout().array_stride, 32);
        assert_eq!(Vertex::layout().attributes.len(), 3);
    }
}
