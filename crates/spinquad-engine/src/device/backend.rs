use std::ops::Range;

use anyhow::Result;

use super::CanvasInfo;

/// Swapchain parameters applied on every rebuild.
#[derive(Debug, Clone, PartialEq)]
pub struct SwapchainDesc {
    pub format: wgpu::TextureFormat,
    pub usage: wgpu::TextureUsages,
    pub present_mode: wgpu::PresentMode,
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,
    pub desired_maximum_frame_latency: u32,
}

/// Fixed-function and shader-stage state for one render pipeline.
#[derive(Debug, Clone)]
pub struct PipelineDesc<'a> {
    pub label: &'a str,
    pub vertex_entry: &'a str,
    pub fragment_entry: &'a str,
    pub vertex_layout: wgpu::VertexBufferLayout<'a>,
    pub primitive: wgpu::PrimitiveState,
    pub color_target: wgpu::ColorTargetState,
    pub multisample: wgpu::MultisampleState,
}

/// Arguments of a single indexed draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawIndexed {
    pub indices: Range<u32>,
    pub base_vertex: i32,
    pub instances: Range<u32>,
}

impl DrawIndexed {
    #[inline]
    pub fn index_count(&self) -> u32 {
        self.indices.end - self.indices.start
    }

    #[inline]
    pub fn instance_count(&self) -> u32 {
        self.instances.end - self.instances.start
    }
}

/// Everything needed to record one clear-and-draw pass.
pub struct PassDesc<'a, B: RenderBackend> {
    pub label: &'a str,
    pub clear: wgpu::Color,
    pub pipeline: &'a B::Pipeline,
    pub bind_group: &'a B::BindGroup,
    pub vertex_buffer: &'a B::Buffer,
    pub index_buffer: &'a B::Buffer,
    pub index_format: wgpu::IndexFormat,
    pub draw: DrawIndexed,
}

/// Graphics API seam.
///
/// Every associated handle type owns its native object and releases it on drop.
/// Callers express release ordering purely through ownership.
pub trait RenderBackend: Sized {
    type Swapchain;
    type ShaderModule;
    type BindGroupLayout;
    type PipelineLayout;
    type Pipeline;
    type Buffer;
    type BindGroup;
    type Frame;
    type CommandBuffer;

    /// Human-readable adapter description for logs.
    fn adapter_summary(&self) -> String;

    /// Presentation format resolved when the backend was acquired.
    fn surface_format(&self) -> wgpu::TextureFormat;

    /// Creates a new surface bound to `canvas` and configures it.
    fn create_swapchain(
        &self,
        canvas: &CanvasInfo,
        desc: &SwapchainDesc,
    ) -> Result<Self::Swapchain>;

    /// Re-applies the swapchain's configuration after it was lost or became outdated.
    fn reconfigure_swapchain(&self, swapchain: &Self::Swapchain);

    fn create_shader_module(&self, label: &str, wgsl: &str) -> Self::ShaderModule;

    fn create_bind_group_layout(
        &self,
        label: &str,
        entries: &[wgpu::BindGroupLayoutEntry],
    ) -> Self::BindGroupLayout;

    fn create_pipeline_layout(
        &self,
        label: &str,
        bind_group_layout: &Self::BindGroupLayout,
    ) -> Self::PipelineLayout;

    fn create_render_pipeline(
        &self,
        layout: &Self::PipelineLayout,
        module: &Self::ShaderModule,
        desc: &PipelineDesc<'_>,
    ) -> Self::Pipeline;

    /// Allocates an uninitialized buffer of `size` bytes.
    fn create_buffer(&self, label: &str, size: u64, usage: wgpu::BufferUsages) -> Self::Buffer;

    /// Queues a write of `data` at `offset`.
    fn write_buffer(&self, buffer: &Self::Buffer, offset: u64, data: &[u8]);

    /// Binds the whole of `buffer` at `binding` of the pipeline's bind group layout `group`.
    ///
    /// The layout is introspected from `pipeline` rather than stored separately.
    fn create_bind_group(
        &self,
        label: &str,
        pipeline: &Self::Pipeline,
        group: u32,
        binding: u32,
        buffer: &Self::Buffer,
    ) -> Self::BindGroup;

    /// Acquires the current presentable texture and a view of it.
    fn acquire_frame(
        &self,
        swapchain: &Self::Swapchain,
    ) -> std::result::Result<Self::Frame, wgpu::SurfaceError>;

    /// Records begin pass, bindings, the draw and end pass, then finishes the encoder.
    fn encode_pass(&self, frame: &Self::Frame, pass: &PassDesc<'_, Self>) -> Self::CommandBuffer;

    fn submit(&self, commands: Self::CommandBuffer);

    /// Presents the frame and releases the texture and its view.
    fn present(&self, frame: Self::Frame);
}
