//! Quad geometry and its GPU layout.

use bytemuck::{Pod, Zeroable};

// ── vertex ────────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    pub pos: [f32; 2],   // clip space
    pub color: [f32; 3], // linear rgb
}

impl QuadVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x2, // pos
        1 => Float32x3  // color
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

pub const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex { pos: [-0.5, -0.5], color: [1.0, 0.0, 0.0] }, // bottom-left
    QuadVertex { pos: [0.5, -0.5], color: [0.0, 1.0, 0.0] },  // bottom-right
    QuadVertex { pos: [0.5, 0.5], color: [0.0, 0.0, 1.0] },   // top-right
    QuadVertex { pos: [-0.5, 0.5], color: [1.0, 1.0, 0.0] },  // top-left
];

pub const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

pub const QUAD_INDEX_FORMAT: wgpu::IndexFormat = wgpu::IndexFormat::Uint16;

// ── uniform ───────────────────────────────────────────────────────────────

/// Rotation uniform. One f32, no padding.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct RotationUniform {
    pub degrees: f32,
}

pub(crate) const ROTATION_UNIFORM_SIZE: u64 = std::mem::size_of::<RotationUniform>() as u64;
