/// The swapchain image being drawn this frame, plus the encoder recording
/// into it.
///
/// Acquired lazily by the first clear or draw after a present and finalized
/// by the next present. Holding it prevents acquisition of subsequent frames.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}
