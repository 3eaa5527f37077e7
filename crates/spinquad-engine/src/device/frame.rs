/// Represents a single acquired frame.
///
/// This object is short-lived and must be presented promptly. Holding the surface
/// texture prevents acquisition of subsequent frames.
pub struct WgpuFrame {
    pub view: wgpu::TextureView,
    pub surface_texture: wgpu::SurfaceTexture,
}

/// A configured surface. Recreated, never reconfigured to a new size in place.
pub struct WgpuSwapchain<'w> {
    pub(crate) surface: wgpu::Surface<'w>,
    pub(crate) config: wgpu::SurfaceConfiguration,
}
