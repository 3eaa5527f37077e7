use anyhow::{Context, Result};

use super::backend::SwapchainDesc;
use super::{CanvasInfo, DeviceSession, RenderBackend, SessionInit};

impl SwapchainDesc {
    /// Builds the swapchain parameters for a session's presentation format.
    pub fn from_init(init: &SessionInit, format: wgpu::TextureFormat) -> Self {
        Self {
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            present_mode: init.present_mode,
            alpha_mode: init.alpha_mode,
            desired_maximum_frame_latency: init.desired_maximum_frame_latency,
        }
    }
}

/// Owns the single live swapchain.
///
/// Every rebuild releases the previous swapchain before creating the next one;
/// there is never more than one alive.
pub struct SwapchainManager<B: RenderBackend> {
    desc: SwapchainDesc,
    current: Option<B::Swapchain>,
    rebuilds: u64,
}

impl<B: RenderBackend> SwapchainManager<B> {
    pub fn new(desc: SwapchainDesc) -> Self {
        Self {
            desc,
            current: None,
            rebuilds: 0,
        }
    }

    /// Releases the current swapchain and creates one sized to `canvas`.
    ///
    /// A zero-area canvas leaves no live swapchain until the next rebuild.
    pub fn rebuild(&mut self, session: &DeviceSession<B>, canvas: &CanvasInfo) -> Result<()> {
        if self.current.take().is_some() {
            log::debug!("released swapchain for canvas '{}'", canvas.name);
        }

        if canvas.is_empty() {
            log::debug!(
                "canvas '{}' is {}x{}; swapchain deferred",
                canvas.name,
                canvas.width,
                canvas.height
            );
            return Ok(());
        }

        let swapchain = session
            .backend()
            .create_swapchain(canvas, &self.desc)
            .with_context(|| format!("failed to rebuild swapchain for canvas '{}'", canvas.name))?;

        self.current = Some(swapchain);
        self.rebuilds += 1;

        log::info!(
            "swapchain for canvas '{}' is {}x{} ({:?}, {:?})",
            canvas.name,
            canvas.width,
            canvas.height,
            self.desc.format,
            self.desc.present_mode
        );

        Ok(())
    }

    #[inline]
    pub fn current(&self) -> Option<&B::Swapchain> {
        self.current.as_ref()
    }

    /// Number of swapchains created so far.
    #[inline]
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }
}
