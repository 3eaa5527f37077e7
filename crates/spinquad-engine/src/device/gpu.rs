use anyhow::{Context, Result};
use winit::window::Window;

use super::backend::{PassDesc, PipelineDesc, RenderBackend, SwapchainDesc};
use super::frame::{WgpuFrame, WgpuSwapchain};
use super::surface;
use super::{CanvasInfo, SessionInit};

/// wgpu implementation of [`RenderBackend`].
///
/// Owns the core objects of a device session:
/// - creates and stores Instance/Adapter/Device/Queue
/// - creates a fresh Surface for every swapchain rebuild
/// - records and submits the per-frame command buffer
///
/// Fields drop in declaration order: queue and device go before the instance.
pub struct WgpuBackend<'w> {
    /// Command queue.
    queue: wgpu::Queue,

    /// Logical device.
    device: wgpu::Device,

    /// Selected adapter.
    adapter: wgpu::Adapter,

    /// wgpu instance used to create the adapter and every surface.
    instance: wgpu::Instance,

    /// Window the surfaces are bound to. Must outlive the backend.
    window: &'w Window,

    /// Presentation format shared by the pipeline and every swapchain.
    format: wgpu::TextureFormat,
}

impl<'w> WgpuBackend<'w> {
    /// Acquires instance, adapter, device and queue for `window`.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu.
    pub async fn new(window: &'w Window, init: &SessionInit) -> Result<Self> {
        let size = window.inner_size();
        anyhow::ensure!(size.width > 0 && size.height > 0, "window has zero size");

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        // Probe surface for adapter compatibility and format selection. Dropped
        // before the first swapchain is created.
        let probe = instance
            .create_surface(window)
            .context("failed to create wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: init.power_preference,
                compatible_surface: Some(&probe),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("spinquad device"),
                required_features: init.required_features,
                required_limits: init.required_limits.clone(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        let caps = probe.get_capabilities(&adapter);
        let format = surface::choose_surface_format(&caps.formats, init.preferred_format)
            .context("no supported surface formats")?;
        drop(probe);

        Ok(Self {
            queue,
            device,
            adapter,
            instance,
            window,
            format,
        })
    }
}

impl<'w> RenderBackend for WgpuBackend<'w> {
    type Swapchain = WgpuSwapchain<'w>;
    type ShaderModule = wgpu::ShaderModule;
    type BindGroupLayout = wgpu::BindGroupLayout;
    type PipelineLayout = wgpu::PipelineLayout;
    type Pipeline = wgpu::RenderPipeline;
    type Buffer = wgpu::Buffer;
    type BindGroup = wgpu::BindGroup;
    type Frame = WgpuFrame;
    type CommandBuffer = wgpu::CommandBuffer;

    fn adapter_summary(&self) -> String {
        let info = self.adapter.get_info();
        format!("{} ({:?}, {:?})", info.name, info.backend, info.device_type)
    }

    fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }

    fn create_swapchain(
        &self,
        canvas: &CanvasInfo,
        desc: &SwapchainDesc,
    ) -> Result<Self::Swapchain> {
        let surface = self
            .instance
            .create_surface(self.window)
            .with_context(|| format!("failed to create surface for canvas '{}'", canvas.name))?;

        let caps = surface.get_capabilities(&self.adapter);
        anyhow::ensure!(
            caps.formats.contains(&desc.format),
            "surface for canvas '{}' does not support {:?}",
            canvas.name,
            desc.format
        );

        let config = wgpu::SurfaceConfiguration {
            usage: desc.usage,
            format: desc.format,
            width: canvas.width,
            height: canvas.height,
            present_mode: desc.present_mode,
            alpha_mode: surface::choose_alpha_mode(&caps.alpha_modes, desc.alpha_mode),
            view_formats: vec![],
            desired_maximum_frame_latency: desc.desired_maximum_frame_latency,
        };

        surface.configure(&self.device, &config);

        Ok(WgpuSwapchain { surface, config })
    }

    fn reconfigure_swapchain(&self, swapchain: &Self::Swapchain) {
        swapchain.surface.configure(&self.device, &swapchain.config);
    }

    fn create_shader_module(&self, label: &str, wgsl: &str) -> Self::ShaderModule {
        self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(wgsl.into()),
        })
    }

    fn create_bind_group_layout(
        &self,
        label: &str,
        entries: &[wgpu::BindGroupLayoutEntry],
    ) -> Self::BindGroupLayout {
        self.device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(label),
                entries,
            })
    }

    fn create_pipeline_layout(
        &self,
        label: &str,
        bind_group_layout: &Self::BindGroupLayout,
    ) -> Self::PipelineLayout {
        self.device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(label),
                bind_group_layouts: &[bind_group_layout],
                immediate_size: 0,
            })
    }

    fn create_render_pipeline(
        &self,
        layout: &Self::PipelineLayout,
        module: &Self::ShaderModule,
        desc: &PipelineDesc<'_>,
    ) -> Self::Pipeline {
        self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(desc.label),
            layout: Some(layout),

            vertex: wgpu::VertexState {
                module,
                entry_point: Some(desc.vertex_entry),
                compilation_options: Default::default(),
                buffers: std::slice::from_ref(&desc.vertex_layout),
            },

            fragment: Some(wgpu::FragmentState {
                module,
                entry_point: Some(desc.fragment_entry),
                compilation_options: Default::default(),
                targets: &[Some(desc.color_target.clone())],
            }),

            primitive: desc.primitive,
            depth_stencil: None,
            multisample: desc.multisample,

            multiview_mask: None,
            cache: None,
        })
    }

    fn create_buffer(&self, label: &str, size: u64, usage: wgpu::BufferUsages) -> Self::Buffer {
        self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage,
            mapped_at_creation: false,
        })
    }

    fn write_buffer(&self, buffer: &Self::Buffer, offset: u64, data: &[u8]) {
        self.queue.write_buffer(buffer, offset, data);
    }

    fn create_bind_group(
        &self,
        label: &str,
        pipeline: &Self::Pipeline,
        group: u32,
        binding: u32,
        buffer: &Self::Buffer,
    ) -> Self::BindGroup {
        let layout = pipeline.get_bind_group_layout(group);
        self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding,
                resource: buffer.as_entire_binding(),
            }],
        })
    }

    fn acquire_frame(
        &self,
        swapchain: &Self::Swapchain,
    ) -> std::result::Result<Self::Frame, wgpu::SurfaceError> {
        let surface_texture = swapchain.surface.get_current_texture()?;
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        Ok(WgpuFrame {
            view,
            surface_texture,
        })
    }

    fn encode_pass(&self, frame: &Self::Frame, pass: &PassDesc<'_, Self>) -> Self::CommandBuffer {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("spinquad frame encoder"),
            });

        // The pass must end (drop) before the encoder can be finished.
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some(pass.label),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(pass.clear),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            rpass.set_pipeline(pass.pipeline);
            rpass.set_bind_group(0, pass.bind_group, &[]);
            rpass.set_vertex_buffer(0, pass.vertex_buffer.slice(..));
            rpass.set_index_buffer(pass.index_buffer.slice(..), pass.index_format);
            rpass.draw_indexed(
                pass.draw.indices.clone(),
                pass.draw.base_vertex,
                pass.draw.instances.clone(),
            );
        }

        encoder.finish()
    }

    fn submit(&self, commands: Self::CommandBuffer) {
        self.queue.submit(std::iter::once(commands));
    }

    fn present(&self, frame: Self::Frame) {
        let WgpuFrame {
            view,
            surface_texture,
        } = frame;
        drop(view);
        self.window.pre_present_notify();
        surface_texture.present();
    }
}
