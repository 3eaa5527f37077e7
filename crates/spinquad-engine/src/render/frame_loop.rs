use crate::device::{
    DeviceSession, DrawIndexed, FrameError, PassDesc, RenderBackend, SurfaceErrorAction,
    SwapchainManager, map_surface_error,
};
use crate::time::{AnimationState, FrameTime};

use super::pipeline::QuadPipeline;
use super::resources::ResourceStore;
use super::vertex::{QUAD_INDEX_FORMAT, QUAD_INDICES};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FramePhase {
    Idle,
    Recording,
}

/// Per-frame callback state.
///
/// Only the animation carries over between frames; every encoder, pass, command
/// buffer and view is created and released inside [`FrameLoop::draw`].
#[derive(Debug, Clone)]
pub struct FrameLoop {
    animation: AnimationState,
    clear: wgpu::Color,
    phase: FramePhase,
    submitted: u64,
}

impl FrameLoop {
    /// Frames between progress lines at `debug`.
    const PROGRESS_INTERVAL: u64 = 600;

    pub fn new(animation: AnimationState, clear: wgpu::Color) -> Self {
        Self {
            animation,
            clear,
            phase: FramePhase::Idle,
            submitted: 0,
        }
    }

    #[inline]
    pub fn animation(&self) -> &AnimationState {
        &self.animation
    }

    #[inline]
    pub fn phase(&self) -> FramePhase {
        self.phase
    }

    /// Frames submitted so far.
    #[inline]
    pub fn submitted(&self) -> u64 {
        self.submitted
    }

    /// Advances the rotation, uploads it and draws one frame.
    ///
    /// The rotation advances even when no frame can be acquired.
    pub fn draw<B: RenderBackend>(
        &mut self,
        session: &DeviceSession<B>,
        swapchains: &SwapchainManager<B>,
        pipeline: &QuadPipeline<B>,
        resources: &ResourceStore<B>,
        time: FrameTime,
    ) -> Result<(), FrameError> {
        debug_assert_eq!(self.phase, FramePhase::Idle, "frame loop re-entered");

        let degrees = self.animation.advance();
        resources.write_rotation(session, degrees);

        let backend = session.backend();
        let swapchain = swapchains.current().ok_or(FrameError::NoSwapchain)?;

        let frame = match backend.acquire_frame(swapchain) {
            Ok(frame) => frame,
            Err(err) => {
                let action = map_surface_error(&err);
                if action == SurfaceErrorAction::Reconfigured {
                    backend.reconfigure_swapchain(swapchain);
                }
                log::debug!("frame {} not acquired: {err}", time.frame_index);
                return Err(FrameError::Surface(action));
            }
        };

        self.phase = FramePhase::Recording;

        let commands = backend.encode_pass(
            &frame,
            &PassDesc {
                label: "spinquad quad pass",
                clear: self.clear,
                pipeline: pipeline.raw(),
                bind_group: resources.bind_group(),
                vertex_buffer: resources.vertex_buffer(),
                index_buffer: resources.index_buffer(),
                index_format: QUAD_INDEX_FORMAT,
                draw: DrawIndexed {
                    indices: 0..QUAD_INDICES.len() as u32,
                    base_vertex: 0,
                    instances: 0..1,
                },
            },
        );
        backend.submit(commands);
        backend.present(frame);

        self.phase = FramePhase::Idle;
        self.submitted += 1;

        log::trace!(
            "frame {} rotation {degrees:.1} dt {:.4}s",
            time.frame_index,
            time.dt
        );
        if time.frame_index > 0 && time.frame_index % Self::PROGRESS_INTERVAL == 0 {
            log::debug!(
                "frame {}: rotation {degrees:.1} deg, {:.1} fps",
                time.frame_index,
                time.fps()
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::recording::{HandleKind, RecordingBackend};
    use crate::device::{CanvasInfo, SessionInit, SwapchainDesc};
    use crate::render::{PipelineBuilder, QUAD_WGSL};

    struct Rig {
        resources: ResourceStore<RecordingBackend>,
        pipeline: QuadPipeline<RecordingBackend>,
        swapchains: SwapchainManager<RecordingBackend>,
        frames: FrameLoop,
        session: DeviceSession<RecordingBackend>,
    }

    impl Rig {
        fn new() -> Self {
            let session = DeviceSession::initialize(RecordingBackend::new()).unwrap();
            let mut swapchains = SwapchainManager::new(SwapchainDesc::from_init(
                &SessionInit::default(),
                session.format(),
            ));
            swapchains
                .rebuild(&session, &CanvasInfo::new("canvas", 800, 600))
                .unwrap();
            let pipeline = PipelineBuilder::new(QUAD_WGSL).build(&session).unwrap();
            let resources = ResourceStore::create(&session, &pipeline, 0.0);
            let frames = FrameLoop::new(
                AnimationState::default(),
                wgpu::Color { r: 0.2, g: 0.2, b: 0.3, a: 1.0 },
            );
            Self {
                session,
                swapchains,
                pipeline,
                resources,
                frames,
            }
        }

        fn draw(&mut self) -> Result<(), FrameError> {
            self.frames.draw(
                &self.session,
                &self.swapchains,
                &self.pipeline,
                &self.resources,
                FrameTime::first(),
            )
        }
    }

    #[test]
    fn one_pass_with_one_indexed_draw() {
        let mut rig = Rig::new();
        rig.draw().unwrap();

        let ledger = rig.session.backend().ledger();
        let passes = ledger.submitted();
        assert_eq!(passes.len(), 1);

        let pass = &passes[0];
        assert_eq!(pass.clear, wgpu::Color { r: 0.2, g: 0.2, b: 0.3, a: 1.0 });
        assert_eq!(pass.target_size, (800, 600));
        assert_eq!(pass.index_format, wgpu::IndexFormat::Uint16);
        assert_eq!(pass.vertex_buffer, "spinquad vertex buffer");
        assert_eq!(pass.index_buffer, "spinquad index buffer");

        assert_eq!(pass.draws.len(), 1);
        let draw = &pass.draws[0];
        assert_eq!(draw.index_count(), 6);
        assert_eq!(draw.instance_count(), 1);
        assert_eq!((draw.indices.start, draw.base_vertex, draw.instances.start), (0, 0, 0));
    }

    #[test]
    fn transients_do_not_outlive_the_frame() {
        let mut rig = Rig::new();
        for _ in 0..5 {
            rig.draw().unwrap();
        }

        let ledger = rig.session.backend().ledger();
        assert_eq!(ledger.created(HandleKind::Frame), 5);
        assert_eq!(ledger.live(HandleKind::Frame), 0);
        assert_eq!(ledger.created(HandleKind::CommandBuffer), 5);
        assert_eq!(ledger.live(HandleKind::CommandBuffer), 0);
        assert_eq!(ledger.presents(), 5);
        assert_eq!(rig.frames.phase(), FramePhase::Idle);
        assert_eq!(rig.frames.submitted(), 5);
    }

    #[test]
    fn uniform_follows_rotation() {
        let mut rig = Rig::new();
        rig.draw().unwrap();

        assert_eq!(rig.frames.animation().rotation_degrees(), 0.1);
        assert_eq!(rig.resources.uniform_buffer().contents(), 0.1f32.to_ne_bytes());
    }

    #[test]
    fn missing_swapchain_skips_but_still_animates() {
        let mut rig = Rig::new();
        rig.swapchains
            .rebuild(&rig.session, &CanvasInfo::new("canvas", 0, 0))
            .unwrap();

        assert_eq!(rig.draw(), Err(FrameError::NoSwapchain));
        assert_eq!(rig.frames.animation().rotation_degrees(), 0.1);
        assert!(rig.session.backend().ledger().submitted().is_empty());
    }

    #[test]
    fn outdated_surface_is_reconfigured() {
        let mut rig = Rig::new();
        let ledger = rig.session.backend().ledger();

        ledger.fail_next_acquire(wgpu::SurfaceError::Outdated);
        assert_eq!(
            rig.draw(),
            Err(FrameError::Surface(SurfaceErrorAction::Reconfigured))
        );
        assert_eq!(ledger.reconfigures(), 1);

        rig.draw().unwrap();
        assert_eq!(ledger.submitted().len(), 1);
    }

    #[test]
    fn out_of_memory_is_fatal() {
        let mut rig = Rig::new();
        rig.session
            .backend()
            .ledger()
            .fail_next_acquire(wgpu::SurfaceError::OutOfMemory);

        let err = rig.draw().unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(rig.frames.phase(), FramePhase::Idle);
    }
}
