/// Render target identity and size.
///
/// Width and height are physical pixels. Only the resize handler mutates them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanvasInfo {
    pub name: String,
    pub width: u32,
    pub height: u32,
}

impl CanvasInfo {
    pub const DEFAULT_NAME: &'static str = "canvas";

    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
        }
    }

    /// Returns `true` when either dimension is zero. wgpu cannot configure such a surface.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Updates the size. Returns `true` if it changed.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        let changed = self.width != width || self.height != height;
        self.width = width;
        self.height = height;
        changed
    }
}
