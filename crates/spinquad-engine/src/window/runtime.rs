use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App, AppControl, Scene, SceneConfig};
use crate::device::{CanvasInfo, SessionInit, WgpuBackend};
use crate::time::FrameClock;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Canvas name; also used as the window title.
    pub canvas_name: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            canvas_name: CanvasInfo::DEFAULT_NAME.to_string(),
            initial_size: LogicalSize::new(800.0, 600.0),
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens the canvas window and runs until it closes or the scene asks to exit.
    pub fn run(config: RuntimeConfig, init: SessionInit, scene: SceneConfig) -> Result<()> {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = RuntimeState::new(config, init, scene);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct CanvasEntry {
    clock: FrameClock,

    window: Window,

    #[borrows(window)]
    #[not_covariant]
    scene: Scene<WgpuBackend<'this>>,
}

struct RuntimeState {
    config: RuntimeConfig,
    init: SessionInit,
    scene_config: SceneConfig,

    canvas: Option<CanvasEntry>,
    exit_requested: bool,
    failure: Option<anyhow::Error>,
}

impl RuntimeState {
    fn new(config: RuntimeConfig, init: SessionInit, scene_config: SceneConfig) -> Self {
        Self {
            config,
            init,
            scene_config,
            canvas: None,
            exit_requested: false,
            failure: None,
        }
    }

    fn request_exit(&mut self, event_loop: &ActiveEventLoop) {
        self.exit_requested = true;
        event_loop.exit();
    }

    fn create_canvas(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.canvas_name.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let size = window.inner_size();
        let canvas = CanvasInfo::new(self.config.canvas_name.clone(), size.width, size.height);
        let (init, scene_config) = (&self.init, &self.scene_config);

        let entry = CanvasEntry::try_new(FrameClock::default(), window, |w| {
            let backend = pollster::block_on(WgpuBackend::new(w, init))
                .context("GPU initialization failed for canvas")?;
            Scene::new(backend, canvas, init, scene_config)
        })?;

        entry.with_window(|w| w.request_redraw());
        self.canvas = Some(entry);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.failure = Some(err);
        self.canvas = None;
        self.request_exit(event_loop);
    }
}

impl ApplicationHandler for RuntimeState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.canvas.is_some() || self.exit_requested {
            return;
        }

        if let Err(e) = self.create_canvas(event_loop) {
            self.fail(event_loop, e.context("failed to create canvas"));
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw; FIFO presentation paces it to the display.
        if let Some(entry) = &self.canvas {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        let Some(entry) = self.canvas.as_mut() else {
            return;
        };
        if entry.with_window(|w| w.id()) != window_id {
            return;
        }

        let redraw = wants_redraw(&event);
        let control = match event {
            WindowEvent::CloseRequested => {
                log::info!("canvas closed");
                AppControl::Exit
            }

            WindowEvent::Resized(new_size) => {
                let control =
                    entry.with_scene_mut(|scene| scene.on_resize(new_size.width, new_size.height));
                entry.with_clock_mut(|clock| clock.reset());
                control
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let new_size = entry.with_window(|w| w.inner_size());
                entry.with_scene_mut(|scene| scene.on_resize(new_size.width, new_size.height))
            }

            WindowEvent::RedrawRequested => entry.with_mut(|fields| {
                let time = fields.clock.tick();
                fields.scene.on_frame(time)
            }),

            _ => AppControl::Continue,
        };

        if control == AppControl::Exit {
            // Drop the scene (and with it every GPU handle) before the window.
            self.canvas = None;
            self.request_exit(event_loop);
            return;
        }

        if redraw {
            entry.with_window(|w| w.request_redraw());
        }
    }
}

/// Events after which the canvas is drawn again: every frame re-arms the next.
fn wants_redraw(event: &WindowEvent) -> bool {
    matches!(
        event,
        WindowEvent::RedrawRequested
            | WindowEvent::Resized(_)
            | WindowEvent::ScaleFactorChanged { .. }
    )
}
