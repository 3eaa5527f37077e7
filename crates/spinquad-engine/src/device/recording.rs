//! Headless backend that records instead of rendering.
//!
//! Every handle carries a tracker that bumps per-kind create/release counters in
//! a shared [`Ledger`]. Buffers keep their bytes in memory and passes are kept as
//! [`RecordedPass`] values, so lifecycle and draw behavior can be checked without
//! a GPU.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use anyhow::Result;

use super::backend::{DrawIndexed, PassDesc, PipelineDesc, RenderBackend, SwapchainDesc};
use super::CanvasInfo;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum HandleKind {
    Swapchain,
    ShaderModule,
    BindGroupLayout,
    PipelineLayout,
    Pipeline,
    Buffer,
    BindGroup,
    Frame,
    CommandBuffer,
}

impl HandleKind {
    pub const ALL: [HandleKind; 9] = [
        HandleKind::Swapchain,
        HandleKind::ShaderModule,
        HandleKind::BindGroupLayout,
        HandleKind::PipelineLayout,
        HandleKind::Pipeline,
        HandleKind::Buffer,
        HandleKind::BindGroup,
        HandleKind::Frame,
        HandleKind::CommandBuffer,
    ];
}

/// One submitted clear-and-draw pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedPass {
    pub label: String,
    pub clear: wgpu::Color,
    pub target_size: (u32, u32),
    pub pipeline: String,
    pub vertex_buffer: String,
    pub index_buffer: String,
    pub index_format: wgpu::IndexFormat,
    pub draws: Vec<DrawIndexed>,
}

#[derive(Default)]
struct LedgerState {
    created: HashMap<HandleKind, usize>,
    released: HashMap<HandleKind, usize>,
    submitted: Vec<RecordedPass>,
    presents: usize,
    reconfigures: usize,
    pending_acquire_error: Option<wgpu::SurfaceError>,
}

/// Shared counters. Cloning yields another view of the same state.
#[derive(Clone, Default)]
pub struct Ledger(Rc<RefCell<LedgerState>>);

impl Ledger {
    pub fn created(&self, kind: HandleKind) -> usize {
        self.0.borrow().created.get(&kind).copied().unwrap_or(0)
    }

    pub fn released(&self, kind: HandleKind) -> usize {
        self.0.borrow().released.get(&kind).copied().unwrap_or(0)
    }

    pub fn live(&self, kind: HandleKind) -> usize {
        self.created(kind) - self.released(kind)
    }

    /// Total live handles across every kind.
    pub fn live_total(&self) -> usize {
        HandleKind::ALL.iter().map(|k| self.live(*k)).sum()
    }

    /// Passes in submission order.
    pub fn submitted(&self) -> Vec<RecordedPass> {
        self.0.borrow().submitted.clone()
    }

    pub fn presents(&self) -> usize {
        self.0.borrow().presents
    }

    pub fn reconfigures(&self) -> usize {
        self.0.borrow().reconfigures
    }

    /// Makes the next `acquire_frame` fail with `err`.
    pub fn fail_next_acquire(&self, err: wgpu::SurfaceError) {
        self.0.borrow_mut().pending_acquire_error = Some(err);
    }

    fn track(&self, kind: HandleKind) -> Tracked {
        *self.0.borrow_mut().created.entry(kind).or_default() += 1;
        Tracked {
            kind,
            ledger: self.clone(),
        }
    }
}

/// Counts one release when dropped.
struct Tracked {
    kind: HandleKind,
    ledger: Ledger,
}

impl Drop for Tracked {
    fn drop(&mut self) {
        *self
            .ledger
            .0
            .borrow_mut()
            .released
            .entry(self.kind)
            .or_default() += 1;
    }
}

pub struct FakeSwapchain {
    pub width: u32,
    pub height: u32,
    pub format: wgpu::TextureFormat,
    pub present_mode: wgpu::PresentMode,
    _tracked: Tracked,
}

pub struct FakeShaderModule {
    pub label: String,
    _tracked: Tracked,
}

pub struct FakeBindGroupLayout {
    entries: Vec<wgpu::BindGroupLayoutEntry>,
    _tracked: Tracked,
}

pub struct FakePipelineLayout {
    entries: Vec<wgpu::BindGroupLayoutEntry>,
    _tracked: Tracked,
}

/// Pipeline state as it was handed to the backend.
pub struct FakePipeline {
    pub label: String,
    pub shader: String,
    pub vertex_entry: String,
    pub fragment_entry: String,
    pub vertex_stride: u64,
    pub vertex_attributes: Vec<wgpu::VertexAttribute>,
    pub primitive: wgpu::PrimitiveState,
    pub color_target: wgpu::ColorTargetState,
    pub multisample: wgpu::MultisampleState,
    pub bind_group_entries: Vec<wgpu::BindGroupLayoutEntry>,
    _tracked: Tracked,
}

pub struct FakeBuffer {
    pub label: String,
    pub usage: wgpu::BufferUsages,
    contents: RefCell<Vec<u8>>,
    writes: Cell<usize>,
    _tracked: Tracked,
}

impl FakeBuffer {
    pub fn contents(&self) -> Vec<u8> {
        self.contents.borrow().clone()
    }

    /// Number of queue writes this buffer received.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }
}

pub struct FakeBindGroup {
    pub group: u32,
    pub binding: u32,
    pub buffer: String,
    pub visibility: wgpu::ShaderStages,
    _tracked: Tracked,
}

pub struct FakeFrame {
    pub size: (u32, u32),
    _tracked: Tracked,
}

pub struct FakeCommandBuffer {
    pass: RecordedPass,
    _tracked: Tracked,
}

/// [`RenderBackend`] that records everything into a [`Ledger`].
pub struct RecordingBackend {
    ledger: Ledger,
    format: wgpu::TextureFormat,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::with_format(wgpu::TextureFormat::Bgra8Unorm)
    }

    pub fn with_format(format: wgpu::TextureFormat) -> Self {
        Self {
            ledger: Ledger::default(),
            format,
        }
    }

    /// Returns a handle to the shared counters; it stays valid after the backend drops.
    pub fn ledger(&self) -> Ledger {
        self.ledger.clone()
    }
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderBackend for RecordingBackend {
    type Swapchain = FakeSwapchain;
    type ShaderModule = FakeShaderModule;
    type BindGroupLayout = FakeBindGroupLayout;
    type PipelineLayout = FakePipelineLayout;
    type Pipeline = FakePipeline;
    type Buffer = FakeBuffer;
    type BindGroup = FakeBindGroup;
    type Frame = FakeFrame;
    type CommandBuffer = FakeCommandBuffer;

    fn adapter_summary(&self) -> String {
        "recording backend".to_string()
    }

    fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }

    fn create_swapchain(
        &self,
        canvas: &CanvasInfo,
        desc: &SwapchainDesc,
    ) -> Result<Self::Swapchain> {
        anyhow::ensure!(!canvas.is_empty(), "cannot configure a zero-area surface");
        Ok(FakeSwapchain {
            width: canvas.width,
            height: canvas.height,
            format: desc.format,
            present_mode: desc.present_mode,
            _tracked: self.ledger.track(HandleKind::Swapchain),
        })
    }

    fn reconfigure_swapchain(&self, _swapchain: &Self::Swapchain) {
        self.ledger.0.borrow_mut().reconfigures += 1;
    }

    fn create_shader_module(&self, label: &str, _wgsl: &str) -> Self::ShaderModule {
        FakeShaderModule {
            label: label.to_string(),
            _tracked: self.ledger.track(HandleKind::ShaderModule),
        }
    }

    fn create_bind_group_layout(
        &self,
        _label: &str,
        entries: &[wgpu::BindGroupLayoutEntry],
    ) -> Self::BindGroupLayout {
        FakeBindGroupLayout {
            entries: entries.to_vec(),
            _tracked: self.ledger.track(HandleKind::BindGroupLayout),
        }
    }

    fn create_pipeline_layout(
        &self,
        _label: &str,
        bind_group_layout: &Self::BindGroupLayout,
    ) -> Self::PipelineLayout {
        FakePipelineLayout {
            entries: bind_group_layout.entries.clone(),
            _tracked: self.ledger.track(HandleKind::PipelineLayout),
        }
    }

    fn create_render_pipeline(
        &self,
        layout: &Self::PipelineLayout,
        module: &Self::ShaderModule,
        desc: &PipelineDesc<'_>,
    ) -> Self::Pipeline {
        FakePipeline {
            label: desc.label.to_string(),
            shader: module.label.clone(),
            vertex_entry: desc.vertex_entry.to_string(),
            fragment_entry: desc.fragment_entry.to_string(),
            vertex_stride: desc.vertex_layout.array_stride,
            vertex_attributes: desc.vertex_layout.attributes.to_vec(),
            primitive: desc.primitive,
            color_target: desc.color_target.clone(),
            multisample: desc.multisample,
            bind_group_entries: layout.entries.clone(),
            _tracked: self.ledger.track(HandleKind::Pipeline),
        }
    }

    fn create_buffer(&self, label: &str, size: u64, usage: wgpu::BufferUsages) -> Self::Buffer {
        FakeBuffer {
            label: label.to_string(),
            usage,
            contents: RefCell::new(vec![0; size as usize]),
            writes: Cell::new(0),
            _tracked: self.ledger.track(HandleKind::Buffer),
        }
    }

    fn write_buffer(&self, buffer: &Self::Buffer, offset: u64, data: &[u8]) {
        assert!(
            buffer.usage.contains(wgpu::BufferUsages::COPY_DST),
            "buffer '{}' is not a copy destination",
            buffer.label
        );

        let start = offset as usize;
        let end = start + data.len();
        let mut contents = buffer.contents.borrow_mut();
        assert!(
            end <= contents.len(),
            "write of {}..{end} overruns buffer '{}' ({} bytes)",
            start,
            buffer.label,
            contents.len()
        );

        contents[start..end].copy_from_slice(data);
        buffer.writes.set(buffer.writes.get() + 1);
    }

    fn create_bind_group(
        &self,
        _label: &str,
        pipeline: &Self::Pipeline,
        group: u32,
        binding: u32,
        buffer: &Self::Buffer,
    ) -> Self::BindGroup {
        let visibility = pipeline
            .bind_group_entries
            .iter()
            .find(|e| e.binding == binding)
            .map_or(wgpu::ShaderStages::NONE, |e| e.visibility);

        FakeBindGroup {
            group,
            binding,
            buffer: buffer.label.clone(),
            visibility,
            _tracked: self.ledger.track(HandleKind::BindGroup),
        }
    }

    fn acquire_frame(
        &self,
        swapchain: &Self::Swapchain,
    ) -> std::result::Result<Self::Frame, wgpu::SurfaceError> {
        let pending = self.ledger.0.borrow_mut().pending_acquire_error.take();
        if let Some(err) = pending {
            return Err(err);
        }

        Ok(FakeFrame {
            size: (swapchain.width, swapchain.height),
            _tracked: self.ledger.track(HandleKind::Frame),
        })
    }

    fn encode_pass(&self, frame: &Self::Frame, pass: &PassDesc<'_, Self>) -> Self::CommandBuffer {
        FakeCommandBuffer {
            pass: RecordedPass {
                label: pass.label.to_string(),
                clear: pass.clear,
                target_size: frame.size,
                pipeline: pass.pipeline.label.clone(),
                vertex_buffer: pass.vertex_buffer.label.clone(),
                index_buffer: pass.index_buffer.label.clone(),
                index_format: pass.index_format,
                draws: vec![pass.draw.clone()],
            },
            _tracked: self.ledger.track(HandleKind::CommandBuffer),
        }
    }

    fn submit(&self, commands: Self::CommandBuffer) {
        let FakeCommandBuffer { pass, _tracked } = commands;
        self.ledger.0.borrow_mut().submitted.push(pass);
    }

    fn present(&self, frame: Self::Frame) {
        drop(frame);
        self.ledger.0.borrow_mut().presents += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_count_release_on_drop() {
        let backend = RecordingBackend::new();
        let ledger = backend.ledger();

        let a = backend.create_buffer("a", 4, wgpu::BufferUsages::UNIFORM);
        let b = backend.create_buffer("b", 4, wgpu::BufferUsages::UNIFORM);
        assert_eq!(ledger.live(HandleKind::Buffer), 2);

        drop(a);
        assert_eq!(ledger.released(HandleKind::Buffer), 1);
        drop(b);
        assert_eq!(ledger.live_total(), 0);
    }

    #[test]
    fn writes_land_at_offset() {
        let backend = RecordingBackend::new();
        let usage = wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST;
        let buffer = backend.create_buffer("u", 8, usage);

        backend.write_buffer(&buffer, 4, &[1, 2, 3, 4]);

        assert_eq!(buffer.contents(), vec![0, 0, 0, 0, 1, 2, 3, 4]);
        assert_eq!(buffer.write_count(), 1);
    }

    #[test]
    #[should_panic(expected = "not a copy destination")]
    fn writes_require_copy_dst() {
        let backend = RecordingBackend::new();
        let buffer = backend.create_buffer("v", 4, wgpu::BufferUsages::VERTEX);
        backend.write_buffer(&buffer, 0, &[0; 4]);
    }

    #[test]
    fn pending_error_fails_one_acquire() {
        let backend = RecordingBackend::new();
        let desc = SwapchainDesc {
            format: wgpu::TextureFormat::Bgra8Unorm,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            desired_maximum_frame_latency: 2,
        };
        let swapchain = backend
            .create_swapchain(&CanvasInfo::new("canvas", 16, 16), &desc)
            .unwrap();

        backend.ledger().fail_next_acquire(wgpu::SurfaceError::Timeout);
        assert!(backend.acquire_frame(&swapchain).is_err());
        assert!(backend.acquire_frame(&swapchain).is_ok());
    }
}
