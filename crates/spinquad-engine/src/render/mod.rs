//! GPU rendering subsystem.
//!
//! One pipeline, three persistent buffers and the per-frame draw.
//!
//! Convention:
//! - quad geometry is in clip space, rotated in the vertex shader
//! - the rotation uniform is a single f32 in degrees at group 0 / binding 0

mod frame_loop;
mod pipeline;
mod resources;
mod shader;
mod vertex;

pub use frame_loop::{FrameLoop, FramePhase};
pub use pipeline::{PipelineBuilder, QuadPipeline, ROTATION_BINDING, ROTATION_GROUP};
pub use resources::ResourceStore;
pub use shader::{FRAGMENT_ENTRY, QUAD_WGSL, VERTEX_ENTRY, validate_wgsl};
pub use vertex::{QUAD_INDEX_FORMAT, QUAD_INDICES, QUAD_VERTICES, QuadVertex, RotationUniform};
