use anyhow::{Context, Result};

use crate::device::{DeviceSession, PipelineDesc, RenderBackend};

use super::shader::{self, FRAGMENT_ENTRY, VERTEX_ENTRY};
use super::vertex::{QuadVertex, ROTATION_UNIFORM_SIZE};

/// Bind group slot of the rotation uniform.
pub const ROTATION_GROUP: u32 = 0;
/// Binding of the rotation uniform inside [`ROTATION_GROUP`].
pub const ROTATION_BINDING: u32 = 0;

/// Immutable compiled render pipeline.
pub struct QuadPipeline<B: RenderBackend> {
    raw: B::Pipeline,
}

impl<B: RenderBackend> QuadPipeline<B> {
    #[inline]
    pub fn raw(&self) -> &B::Pipeline {
        &self.raw
    }
}

const PIPELINE_LABEL: &str = "spinquad quad";

/// Builds the one render pipeline of a scene.
pub struct PipelineBuilder<'s> {
    source: &'s str,
}

impl<'s> PipelineBuilder<'s> {
    pub fn new(source: &'s str) -> Self {
        Self { source }
    }

    /// Compiles the shader, declares the layouts and creates the pipeline.
    ///
    /// The shader module and both layout objects are dropped before returning;
    /// the pipeline keeps what it needs.
    pub fn build<B: RenderBackend>(self, session: &DeviceSession<B>) -> Result<QuadPipeline<B>> {
        shader::validate_wgsl(self.source)
            .with_context(|| format!("failed to compile shader for '{PIPELINE_LABEL}'"))?;

        let backend = session.backend();
        let format = session.format();

        let module = backend.create_shader_module(PIPELINE_LABEL, self.source);

        let bind_group_layout = backend.create_bind_group_layout(
            PIPELINE_LABEL,
            &[wgpu::BindGroupLayoutEntry {
                binding: ROTATION_BINDING,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(ROTATION_UNIFORM_SIZE),
                },
                count: None,
            }],
        );

        let pipeline_layout = backend.create_pipeline_layout(PIPELINE_LABEL, &bind_group_layout);

        let raw = backend.create_render_pipeline(
            &pipeline_layout,
            &module,
            &PipelineDesc {
                label: PIPELINE_LABEL,
                vertex_entry: VERTEX_ENTRY,
                fragment_entry: FRAGMENT_ENTRY,
                vertex_layout: QuadVertex::layout(),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                color_target: wgpu::ColorTargetState {
                    format,
                    blend: Some(additive_blend()),
                    write_mask: wgpu::ColorWrites::ALL,
                },
                multisample: wgpu::MultisampleState {
                    count: 1,
                    mask: !0,
                    alpha_to_coverage_enabled: false,
                },
            },
        );

        drop(bind_group_layout);
        drop(pipeline_layout);
        drop(module);

        log::info!("built pipeline '{PIPELINE_LABEL}' for {format:?}");

        Ok(QuadPipeline { raw })
    }
}

// Colors add onto the clear color instead of replacing it.
fn additive_blend() -> wgpu::BlendState {
    wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::One,
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::One,
            operation: wgpu::BlendOperation::Add,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::recording::{HandleKind, RecordingBackend};
    use crate::render::shader::QUAD_WGSL;

    fn session() -> DeviceSession<RecordingBackend> {
        DeviceSession::initialize(RecordingBackend::new()).unwrap()
    }

    #[test]
    fn pipeline_state_matches_quad_contract() {
        let session = session();
        let pipeline = PipelineBuilder::new(QUAD_WGSL).build(&session).unwrap();
        let raw = pipeline.raw();

        assert_eq!(raw.vertex_entry, "vs_main");
        assert_eq!(raw.fragment_entry, "fs_main");
        assert_eq!(raw.vertex_stride, 20);
        assert_eq!(raw.vertex_attributes.len(), 2);

        assert_eq!(raw.primitive.topology, wgpu::PrimitiveTopology::TriangleList);
        assert_eq!(raw.primitive.front_face, wgpu::FrontFace::Ccw);
        assert_eq!(raw.primitive.cull_mode, None);

        assert_eq!(raw.color_target.format, wgpu::TextureFormat::Bgra8Unorm);
        assert_eq!(raw.color_target.blend, Some(additive_blend()));
        assert_eq!(raw.color_target.write_mask, wgpu::ColorWrites::ALL);

        assert_eq!(raw.multisample.count, 1);
        assert_eq!(raw.multisample.mask, u64::MAX);
        assert!(!raw.multisample.alpha_to_coverage_enabled);
    }

    #[test]
    fn uniform_layout_is_vertex_visible_binding_zero() {
        let session = session();
        let pipeline = PipelineBuilder::new(QUAD_WGSL).build(&session).unwrap();

        let entries = &pipeline.raw().bind_group_entries;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].binding, 0);
        assert_eq!(entries[0].visibility, wgpu::ShaderStages::VERTEX);
        assert!(matches!(
            entries[0].ty,
            wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                ..
            }
        ));
    }

    #[test]
    fn shader_and_layouts_are_released_after_build() {
        let session = session();
        let ledger = session.backend().ledger();

        let _pipeline = PipelineBuilder::new(QUAD_WGSL).build(&session).unwrap();

        for kind in [
            HandleKind::ShaderModule,
            HandleKind::BindGroupLayout,
            HandleKind::PipelineLayout,
        ] {
            assert_eq!(ledger.created(kind), 1, "{kind:?}");
            assert_eq!(ledger.live(kind), 0, "{kind:?}");
        }
        assert_eq!(ledger.live(HandleKind::Pipeline), 1);
    }

    #[test]
    fn invalid_shader_creates_nothing() {
        let session = session();
        let ledger = session.backend().ledger();

        let result = PipelineBuilder::new("@vertex fn vs_main(").build(&session);

        assert!(result.is_err());
        assert_eq!(ledger.live_total(), 0);
        assert_eq!(ledger.created(HandleKind::Pipeline), 0);
    }
}
