use anyhow::{Context, Result};

use crate::device::{
    CanvasInfo, DeviceSession, FrameError, RenderBackend, SessionInit, SurfaceErrorAction,
    SwapchainDesc, SwapchainManager,
};
use crate::render::{FrameLoop, PipelineBuilder, QUAD_WGSL, QuadPipeline, ResourceStore};
use crate::time::{AnimationState, FrameTime};

use super::app::{App, AppControl};

/// Scene parameters.
#[derive(Debug, Clone)]
pub struct SceneConfig {
    /// Degrees added to the rotation every frame.
    pub rotation_step: f32,
    pub clear_color: wgpu::Color,
    /// WGSL with `vs_main` and `fs_main` entry points.
    pub shader_source: String,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            rotation_step: AnimationState::DEFAULT_STEP,
            clear_color: wgpu::Color {
                r: 0.2,
                g: 0.2,
                b: 0.3,
                a: 1.0,
            },
            shader_source: QUAD_WGSL.to_string(),
        }
    }
}

/// The complete state of one rotating-quad context.
///
/// Construction runs the setup sequence in order; dropping releases everything
/// in reverse. Fields drop in declaration order.
pub struct Scene<B: RenderBackend> {
    resources: ResourceStore<B>,
    pipeline: QuadPipeline<B>,
    swapchain: SwapchainManager<B>,
    frame_loop: FrameLoop,
    canvas: CanvasInfo,
    session: DeviceSession<B>,
}

impl<B: RenderBackend> Scene<B> {
    /// Device session → initial swapchain → pipeline → resources.
    pub fn new(
        backend: B,
        canvas: CanvasInfo,
        init: &SessionInit,
        config: &SceneConfig,
    ) -> Result<Self> {
        let session = DeviceSession::initialize(backend).context("device session")?;

        let mut swapchain =
            SwapchainManager::new(SwapchainDesc::from_init(init, session.format()));
        swapchain.rebuild(&session, &canvas)?;

        let pipeline = PipelineBuilder::new(&config.shader_source).build(&session)?;

        let animation = AnimationState::new(config.rotation_step);
        let resources = ResourceStore::create(&session, &pipeline, animation.rotation_degrees());

        Ok(Self {
            resources,
            pipeline,
            swapchain,
            frame_loop: FrameLoop::new(animation, config.clear_color),
            canvas,
            session,
        })
    }

    /// Updates the canvas size and rebuilds the swapchain, even for an unchanged size.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        if !self.canvas.resize(width, height) {
            log::debug!("canvas '{}' resized to its current size", self.canvas.name);
        }
        self.swapchain.rebuild(&self.session, &self.canvas)
    }

    pub fn draw(&mut self, time: FrameTime) -> Result<(), FrameError> {
        self.frame_loop.draw(
            &self.session,
            &self.swapchain,
            &self.pipeline,
            &self.resources,
            time,
        )
    }

    #[inline]
    pub fn canvas(&self) -> &CanvasInfo {
        &self.canvas
    }

    #[inline]
    pub fn swapchain(&self) -> &SwapchainManager<B> {
        &self.swapchain
    }

    #[inline]
    pub fn resources(&self) -> &ResourceStore<B> {
        &self.resources
    }

    #[inline]
    pub fn rotation_degrees(&self) -> f32 {
        self.frame_loop.animation().rotation_degrees()
    }
}

impl<B: RenderBackend> App for Scene<B> {
    fn on_resize(&mut self, width: u32, height: u32) -> AppControl {
        match self.resize(width, height) {
            Ok(()) => AppControl::Continue,
            Err(e) => {
                log::error!("resize failed: {e:#}");
                AppControl::Exit
            }
        }
    }

    fn on_frame(&mut self, time: FrameTime) -> AppControl {
        match self.draw(time) {
            Ok(()) => AppControl::Continue,
            Err(FrameError::NoSwapchain) => {
                log::debug!("frame {} skipped: canvas has no swapchain", time.frame_index);
                AppControl::Continue
            }
            Err(FrameError::Surface(SurfaceErrorAction::Fatal)) => {
                log::error!("surface out of memory; shutting down");
                AppControl::Exit
            }
            Err(e @ FrameError::Surface(_)) => {
                log::debug!("frame {} skipped: {e}", time.frame_index);
                AppControl::Continue
            }
        }
    }
}
