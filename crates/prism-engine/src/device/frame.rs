/// One acquired display frame.
///
/// Short-lived: holding the surface texture blocks acquisition of the next one.
/// Passes record into `encoder`; `view` is the display surface target.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}
