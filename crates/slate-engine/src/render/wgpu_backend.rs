//! `RenderBackend` on top of wgpu.
//!
//! One pipeline serves every draw. Each flush writes its vertices at a
//! per-frame cursor in a shared vertex buffer and its projection at a
//! per-frame slot of a dynamic-offset uniform ring, then records one render
//! pass that loads the previous contents. Nothing is overwritten before the
//! frame's single submit, so any number of flushes per frame is safe.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::camera::Mat4;
use crate::coords::{Rect, Viewport};
use crate::device::{Gpu, GpuFrame, GpuInit, SurfaceErrorAction};
use crate::paint::Color;
use crate::resources::ResourceError;

use super::backend::{RenderBackend, TextureFilter, TextureKey};
use super::batch::{quad_indices, MAX_QUADS};
use super::Vertex;

const VERTEX_SIZE: u64 = std::mem::size_of::<Vertex>() as u64;
const GLOBALS_SIZE: u64 = std::mem::size_of::<Globals>() as u64;

/// Initial per-frame vertex capacity: four full batches.
const INITIAL_VERTEX_CAPACITY: u64 = (MAX_QUADS * 4 * 4) as u64;
const INITIAL_GLOBALS_SLOTS: u64 = 64;

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct Globals {
    proj: Mat4,
    use_texture: u32,
    _pad: [u32; 3], // 16-byte alignment
}

struct GpuTexture {
    _texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

/// Per-frame vertex storage. Flushes append; `present` rewinds.
struct VertexArena {
    buffer: wgpu::Buffer,
    capacity: u64,
    cursor: u64,
}

/// Per-frame uniform slots addressed with dynamic offsets.
struct GlobalsRing {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    stride: u64,
    slots: u64,
    cursor: u64,
}

/// wgpu implementation of [`RenderBackend`] drawing into a window surface.
pub struct WgpuBackend {
    gpu: Gpu,

    pipeline: wgpu::RenderPipeline,
    globals_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
    nearest: wgpu::Sampler,
    linear: wgpu::Sampler,

    index_buffer: wgpu::Buffer,
    vertices: VertexArena,
    globals: GlobalsRing,

    white: GpuTexture,
    textures: HashMap<TextureKey, GpuTexture>,
    next_key: u64,

    frame: Option<GpuFrame>,
    frame_skipped: bool,
    projection: Mat4,
    scissor: Option<Rect>,
    lost: bool,
}

impl WgpuBackend {
    /// Creates the device, surface, and pipeline for `window`.
    pub fn new(window: Arc<Window>, init: GpuInit) -> Result<Self> {
        let gpu = pollster::block_on(Gpu::new(window, init))?;
        let device = gpu.device();

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("slate batch shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/batch.wgsl").into()),
        });

        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("slate globals bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(GLOBALS_SIZE),
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("slate texture bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("slate batch pipeline layout"),
            bind_group_layouts: &[&globals_layout, &texture_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("slate batch pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[Vertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.surface_format(),
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let nearest = create_sampler(device, TextureFilter::Nearest);
        let linear = create_sampler(device, TextureFilter::Linear);

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("slate quad ibo"),
            contents: bytemuck::cast_slice(&quad_indices(MAX_QUADS)),
            usage: wgpu::BufferUsages::INDEX,
        });

        let vertices = create_vertex_arena(device, INITIAL_VERTEX_CAPACITY);
        let stride = globals_stride(device);
        let globals = create_globals_ring(device, &globals_layout, stride, INITIAL_GLOBALS_SLOTS);

        let white = upload_texture(
            device,
            gpu.queue(),
            &texture_layout,
            &nearest,
            &[255; 4],
            1,
            1,
            "slate white texture",
        );

        Ok(Self {
            gpu,
            pipeline,
            globals_layout,
            texture_layout,
            nearest,
            linear,
            index_buffer,
            vertices,
            globals,
            white,
            textures: HashMap::new(),
            next_key: 0,
            frame: None,
            frame_skipped: false,
            projection: Mat4::IDENTITY,
            scissor: None,
            lost: false,
        })
    }

    /// Current drawable size in physical pixels.
    pub fn viewport(&self) -> Viewport {
        let size = self.gpu.size();
        Viewport::from_physical(size.width, size.height)
    }

    pub fn gpu(&self) -> &Gpu {
        &self.gpu
    }

    /// Acquires the swapchain image for this frame if not done yet.
    ///
    /// Returns `false` when nothing can be drawn this frame (minimized
    /// window, transient surface error, or lost device).
    fn ensure_frame(&mut self) -> bool {
        if self.frame.is_some() {
            return true;
        }
        if self.lost || self.frame_skipped {
            return false;
        }
        let size = self.gpu.size();
        if size.width == 0 || size.height == 0 {
            self.frame_skipped = true;
            return false;
        }

        for attempt in 0..2 {
            match self.gpu.begin_frame() {
                Ok(frame) => {
                    self.frame = Some(frame);
                    return true;
                }
                Err(err) => match self.gpu.handle_surface_error(err) {
                    SurfaceErrorAction::Reconfigured if attempt == 0 => {
                        log::debug!("surface reconfigured; retrying frame acquisition");
                    }
                    SurfaceErrorAction::Fatal => {
                        log::error!("surface error is fatal; rendering stopped");
                        self.lost = true;
                        return false;
                    }
                    action => {
                        log::warn!("skipping frame after surface error ({action:?})");
                        break;
                    }
                },
            }
        }

        self.frame_skipped = true;
        false
    }

    /// Returns the byte offset of a fresh uniform slot holding `globals`.
    fn push_globals(&mut self, globals: Globals) -> u32 {
        if self.globals.cursor == self.globals.slots {
            let slots = self.globals.slots * 2;
            log::debug!("growing uniform ring to {slots} slots");
            self.globals = create_globals_ring(
                self.gpu.device(),
                &self.globals_layout,
                self.globals.stride,
                slots,
            );
        }

        let offset = self.globals.cursor * self.globals.stride;
        self.gpu
            .queue()
            .write_buffer(&self.globals.buffer, offset, bytemuck::bytes_of(&globals));
        self.globals.cursor += 1;
        offset as u32
    }

    /// Writes `vertices` into the arena and returns their base vertex.
    fn push_vertices(&mut self, vertices: &[Vertex]) -> u64 {
        let needed = vertices.len() as u64;
        if self.vertices.cursor + needed > self.vertices.capacity {
            let capacity = (self.vertices.capacity * 2).max(needed.next_power_of_two());
            log::debug!("growing vertex arena to {capacity} vertices");
            self.vertices = create_vertex_arena(self.gpu.device(), capacity);
        }

        let base = self.vertices.cursor;
        self.gpu.queue().write_buffer(
            &self.vertices.buffer,
            base * VERTEX_SIZE,
            bytemuck::cast_slice(vertices),
        );
        self.vertices.cursor += needed;
        base
    }

    fn draw_chunk(
        &mut self,
        vertices: &[Vertex],
        texture: Option<TextureKey>,
        scissor: Option<(u32, u32, u32, u32)>,
    ) {
        let offset = self.push_globals(Globals {
            proj: self.projection,
            use_texture: texture.is_some() as u32,
            _pad: [0; 3],
        });
        let base_vertex = self.push_vertices(vertices);
        let quads = (vertices.len() / 4) as u32;

        let bind_group = match texture {
            None => &self.white.bind_group,
            Some(key) => match self.textures.get(&key) {
                Some(t) => &t.bind_group,
                None => {
                    log::debug!("draw with destroyed texture {key:?}; using white");
                    &self.white.bind_group
                }
            },
        };

        let Some(frame) = self.frame.as_mut() else { return };
        let mut rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("slate batch pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &frame.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &self.globals.bind_group, &[offset]);
        rpass.set_bind_group(1, bind_group, &[]);
        rpass.set_vertex_buffer(0, self.vertices.buffer.slice(..));
        rpass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        if let Some((x, y, w, h)) = scissor {
            rpass.set_scissor_rect(x, y, w, h);
        }
        rpass.draw_indexed(0..quads * 6, base_vertex as i32, 0..1);
    }
}

impl RenderBackend for WgpuBackend {
    fn clear(&mut self, color: Color) {
        if !self.ensure_frame() {
            return;
        }
        let Some(frame) = self.frame.as_mut() else { return };

        let _rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("slate clear pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &frame.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: color.r as f64,
                        g: color.g as f64,
                        b: color.b as f64,
                        a: color.a as f64,
                    }),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
    }

    fn set_projection(&mut self, projection: Mat4) {
        self.projection = projection;
    }

    fn set_scissor(&mut self, clip: Option<Rect>) {
        self.scissor = clip;
    }

    fn draw_quads(&mut self, vertices: &[Vertex], texture: Option<TextureKey>) {
        if vertices.is_empty() || !self.ensure_frame() {
            return;
        }

        let scissor = match self.scissor {
            None => None,
            Some(clip) => match clip.to_scissor(self.viewport()) {
                Some(s) => Some(s),
                // Clip region is off screen: nothing to rasterize.
                None => return,
            },
        };

        for chunk in vertices.chunks(MAX_QUADS * 4) {
            self.draw_chunk(chunk, texture, scissor);
        }
    }

    fn present(&mut self) {
        if let Some(frame) = self.frame.take() {
            self.gpu.submit(frame);
        }
        self.vertices.cursor = 0;
        self.globals.cursor = 0;
        self.frame_skipped = false;
    }

    fn resize(&mut self, width: u32, height: u32) {
        if self.frame.take().is_some() {
            log::debug!("resize discarded an unpresented frame");
        }
        self.gpu.resize(PhysicalSize::new(width, height));
        self.frame_skipped = false;
    }

    fn create_texture(
        &mut self,
        rgba: &[u8],
        width: u32,
        height: u32,
        filter: TextureFilter,
    ) -> Result<TextureKey, ResourceError> {
        let max = self.gpu.device().limits().max_texture_dimension_2d;
        if width == 0 || height == 0 || width > max || height > max {
            return Err(ResourceError::Upload(format!(
                "texture size {width}x{height} outside 1..={max}"
            )));
        }
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(ResourceError::Upload(format!(
                "expected {expected} bytes of RGBA, got {}",
                rgba.len()
            )));
        }

        let sampler = match filter {
            TextureFilter::Nearest => &self.nearest,
            TextureFilter::Linear => &self.linear,
        };
        let texture = upload_texture(
            self.gpu.device(),
            self.gpu.queue(),
            &self.texture_layout,
            sampler,
            rgba,
            width,
            height,
            "slate texture",
        );

        self.next_key += 1;
        let key = TextureKey(self.next_key);
        self.textures.insert(key, texture);
        Ok(key)
    }

    fn destroy_texture(&mut self, key: TextureKey) {
        // Dropping releases the GPU memory once pending frames no longer use it.
        self.textures.remove(&key);
    }

    fn is_lost(&self) -> bool {
        self.lost
    }
}

fn globals_stride(device: &wgpu::Device) -> u64 {
    let align = device.limits().min_uniform_buffer_offset_alignment as u64;
    GLOBALS_SIZE.div_ceil(align) * align
}

fn create_vertex_arena(device: &wgpu::Device, capacity: u64) -> VertexArena {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("slate vertex arena"),
        size: capacity * VERTEX_SIZE,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    VertexArena {
        buffer,
        capacity,
        cursor: 0,
    }
}

fn create_globals_ring(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    stride: u64,
    slots: u64,
) -> GlobalsRing {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("slate globals ring"),
        size: stride * slots,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("slate globals bind group"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: wgpu::BufferSize::new(GLOBALS_SIZE),
            }),
        }],
    });

    GlobalsRing {
        buffer,
        bind_group,
        stride,
        slots,
        cursor: 0,
    }
}

fn create_sampler(device: &wgpu::Device, filter: TextureFilter) -> wgpu::Sampler {
    let (mode, label) = match filter {
        TextureFilter::Nearest => (wgpu::FilterMode::Nearest, "slate nearest sampler"),
        TextureFilter::Linear => (wgpu::FilterMode::Linear, "slate linear sampler"),
    };
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: mode,
        min_filter: mode,
        mipmap_filter: wgpu::MipmapFilterMode::Nearest,
        ..Default::default()
    })
}

#[allow(clippy::too_many_arguments)]
fn upload_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    rgba: &[u8],
    width: u32,
    height: u32,
    label: &str,
) -> GpuTexture {
    let size = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        rgba,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(width * 4),
            rows_per_image: Some(height),
        },
        size,
    );

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    });

    GpuTexture {
        _texture: texture,
        bind_group,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn globals_match_wgsl_layout() {
        // mat4x4<f32> (64) + u32, rounded up to 16-byte struct alignment.
        assert_eq!(GLOBALS_SIZE, 80);
    }

    #[test]
    fn index_buffer_covers_a_full_batch() {
        assert_eq!(quad_indices(MAX_QUADS).len(), MAX_QUADS * 6);
        assert!((MAX_QUADS * 4) as u64 <= u32::MAX as u64);
    }
}
