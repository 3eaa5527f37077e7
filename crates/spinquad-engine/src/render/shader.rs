use anyhow::{Result, anyhow};

/// Bundled quad shader.
pub const QUAD_WGSL: &str = include_str!("shaders/quad.wgsl");

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// Parses and validates WGSL, and checks that both entry points exist.
///
/// wgpu reports shader errors through its uncaptured-error handler; validating
/// up front turns a bad source into an ordinary setup error.
pub fn validate_wgsl(source: &str) -> Result<()> {
    let module = naga::front::wgsl::parse_str(source)
        .map_err(|e| anyhow!("failed to parse WGSL:\n{}", e.emit_to_string(source)))?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );
    validator
        .validate(&module)
        .map_err(|e| anyhow!("invalid WGSL:\n{}", e.emit_to_string(source)))?;

    for (name, stage) in [
        (VERTEX_ENTRY, naga::ShaderStage::Vertex),
        (FRAGMENT_ENTRY, naga::ShaderStage::Fragment),
    ] {
        anyhow::ensure!(
            module
                .entry_points
                .iter()
                .any(|ep| ep.name == name && ep.stage == stage),
            "shader has no {stage:?} entry point named `{name}`"
        );
    }

    Ok(())
}
