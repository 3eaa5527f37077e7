use crate::device::{DeviceSession, RenderBackend};

use super::pipeline::{QuadPipeline, ROTATION_BINDING, ROTATION_GROUP};
use super::vertex::{QUAD_INDICES, QUAD_VERTICES, RotationUniform};

/// The persistent buffers of a scene and the bind group over the uniform.
///
/// Fields drop in declaration order: the bind group goes before the buffer it references.
pub struct ResourceStore<B: RenderBackend> {
    bind_group: B::BindGroup,
    uniform: B::Buffer,
    index: B::Buffer,
    vertex: B::Buffer,
}

impl<B: RenderBackend> ResourceStore<B> {
    /// Uploads the quad geometry and the initial rotation, then binds the uniform.
    pub fn create(
        session: &DeviceSession<B>,
        pipeline: &QuadPipeline<B>,
        initial_rotation: f32,
    ) -> Self {
        let vertex = Self::create_buffer(
            session,
            "spinquad vertex buffer",
            bytemuck::cast_slice(&QUAD_VERTICES),
            wgpu::BufferUsages::VERTEX,
        );
        let index = Self::create_buffer(
            session,
            "spinquad index buffer",
            bytemuck::cast_slice(&QUAD_INDICES),
            wgpu::BufferUsages::INDEX,
        );
        let uniform = Self::create_buffer(
            session,
            "spinquad rotation uniform",
            bytemuck::bytes_of(&RotationUniform {
                degrees: initial_rotation,
            }),
            wgpu::BufferUsages::UNIFORM,
        );
        let bind_group = Self::create_bind_group(session, pipeline, &uniform);

        log::debug!(
            "uploaded {} vertices, {} indices",
            QUAD_VERTICES.len(),
            QUAD_INDICES.len()
        );

        Self {
            bind_group,
            uniform,
            index,
            vertex,
        }
    }

    /// Allocates a buffer sized to `data` with `usage | COPY_DST` and queues the upload.
    pub fn create_buffer(
        session: &DeviceSession<B>,
        label: &str,
        data: &[u8],
        usage: wgpu::BufferUsages,
    ) -> B::Buffer {
        debug_assert!(data.len() as u64 % wgpu::COPY_BUFFER_ALIGNMENT == 0);

        let backend = session.backend();
        let buffer = backend.create_buffer(
            label,
            data.len() as u64,
            usage | wgpu::BufferUsages::COPY_DST,
        );
        backend.write_buffer(&buffer, 0, data);
        buffer
    }

    /// Binds `uniform` using the layout introspected from `pipeline`.
    pub fn create_bind_group(
        session: &DeviceSession<B>,
        pipeline: &QuadPipeline<B>,
        uniform: &B::Buffer,
    ) -> B::BindGroup {
        session.backend().create_bind_group(
            "spinquad rotation bind group",
            pipeline.raw(),
            ROTATION_GROUP,
            ROTATION_BINDING,
            uniform,
        )
    }

    /// Overwrites bytes `[0, 4)` of the uniform buffer.
    pub fn write_rotation(&self, session: &DeviceSession<B>, degrees: f32) {
        session.backend().write_buffer(
            &self.uniform,
            0,
            bytemuck::bytes_of(&RotationUniform { degrees }),
        );
    }

    #[inline]
    pub fn vertex_buffer(&self) -> &B::Buffer {
        &self.vertex
    }

    #[inline]
    pub fn index_buffer(&self) -> &B::Buffer {
        &self.index
    }

    #[inline]
    pub fn uniform_buffer(&self) -> &B::Buffer {
        &self.uniform
    }

    #[inline]
    pub fn bind_group(&self) -> &B::BindGroup {
        &self.bind_group
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::recording::{HandleKind, RecordingBackend};
    use crate::render::{PipelineBuilder, QUAD_WGSL};

    fn setup() -> (DeviceSession<RecordingBackend>, QuadPipeline<RecordingBackend>) {
        let session = DeviceSession::initialize(RecordingBackend::new()).unwrap();
        let pipeline = PipelineBuilder::new(QUAD_WGSL).build(&session).unwrap();
        (session, pipeline)
    }

    #[test]
    fn buffers_carry_copy_dst_and_their_usage() {
        let (session, pipeline) = setup();
        let store = ResourceStore::create(&session, &pipeline, 0.0);

        let copy = wgpu::BufferUsages::COPY_DST;
        assert_eq!(store.vertex_buffer().usage, wgpu::BufferUsages::VERTEX | copy);
        assert_eq!(store.index_buffer().usage, wgpu::BufferUsages::INDEX | copy);
        assert_eq!(store.uniform_buffer().usage, wgpu::BufferUsages::UNIFORM | copy);
    }

    #[test]
    fn initial_contents_are_uploaded_once() {
        let (session, pipeline) = setup();
        let store = ResourceStore::create(&session, &pipeline, 0.0);

        let vertex = store.vertex_buffer();
        assert_eq!(vertex.contents(), bytemuck::cast_slice::<_, u8>(&QUAD_VERTICES));
        assert_eq!(vertex.contents().len(), 80);
        assert_eq!(vertex.write_count(), 1);

        let index = store.index_buffer();
        assert_eq!(index.contents(), bytemuck::cast_slice::<_, u8>(&QUAD_INDICES));
        assert_eq!(index.write_count(), 1);

        assert_eq!(store.uniform_buffer().contents(), 0.0f32.to_ne_bytes());
    }

    #[test]
    fn bind_group_targets_uniform_at_slot_zero() {
        let (session, pipeline) = setup();
        let store = ResourceStore::create(&session, &pipeline, 0.0);

        let bind_group = store.bind_group();
        assert_eq!((bind_group.group, bind_group.binding), (0, 0));
        assert_eq!(bind_group.buffer, "spinquad rotation uniform");
        assert_eq!(bind_group.visibility, wgpu::ShaderStages::VERTEX);
    }

    #[test]
    fn write_rotation_overwrites_uniform() {
        let (session, pipeline) = setup();
        let store = ResourceStore::create(&session, &pipeline, 0.0);

        store.write_rotation(&session, 42.5);

        assert_eq!(store.uniform_buffer().contents(), 42.5f32.to_ne_bytes());
        assert_eq!(store.uniform_buffer().write_count(), 2);
    }

    #[test]
    fn dropping_store_releases_everything() {
        let (session, pipeline) = setup();
        let ledger = session.backend().ledger();

        let store = ResourceStore::create(&session, &pipeline, 0.0);
        assert_eq!(ledger.live(HandleKind::Buffer), 3);
        assert_eq!(ledger.live(HandleKind::BindGroup), 1);

        drop(store);
        assert_eq!(ledger.live(HandleKind::Buffer), 0);
        assert_eq!(ledger.live(HandleKind::BindGroup), 0);
    }
}
