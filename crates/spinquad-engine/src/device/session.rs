use anyhow::Result;

use super::RenderBackend;

/// Root owner of every GPU-side handle.
///
/// Wraps a backend that has already acquired its instance, device and queue.
/// Everything created through the session must be dropped before it.
pub struct DeviceSession<B: RenderBackend> {
    backend: B,
    format: wgpu::TextureFormat,
}

impl<B: RenderBackend> DeviceSession<B> {
    pub fn initialize(backend: B) -> Result<Self> {
        let format = backend.surface_format();
        anyhow::ensure!(
            !format.is_depth_stencil_format(),
            "presentation format {format:?} is not a color format"
        );

        log::info!(
            "device session ready on {} (format {format:?})",
            backend.adapter_summary()
        );

        Ok(Self { backend, format })
    }

    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Presentation format shared by the pipeline and every swapchain.
    #[inline]
    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }
}

impl<B: RenderBackend> Drop for DeviceSession<B> {
    fn drop(&mut self) {
        log::debug!("device session released");
    }
}
