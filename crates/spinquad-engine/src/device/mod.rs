//! GPU device, surface and swapchain management.
//!
//! This module is responsible for:
//! - the [`RenderBackend`] seam and its wgpu and recording implementations
//! - the device session that owns instance/adapter/device/queue
//! - rebuilding the swapchain whenever the canvas changes size

mod backend;
mod canvas;
mod error;
mod frame;
mod gpu;
mod init;
#[cfg(any(test, feature = "recording"))]
pub mod recording;
mod session;
mod surface;
mod swapchain;

pub use backend::{DrawIndexed, PassDesc, PipelineDesc, RenderBackend, SwapchainDesc};
pub use canvas::CanvasInfo;
pub use error::{FrameError, SurfaceErrorAction};
pub use frame::{WgpuFrame, WgpuSwapchain};
pub use gpu::WgpuBackend;
pub use init::SessionInit;
pub use session::DeviceSession;
pub use swapchain::SwapchainManager;

pub(crate) use surface::map_surface_error;
