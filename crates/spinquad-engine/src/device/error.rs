use std::fmt;

/// High-level response after a surface error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; rendering may resume next frame.
    Reconfigured,
    /// Transient error; skip the current frame.
    SkipFrame,
    /// Fatal error (commonly OOM); terminate gracefully.
    Fatal,
}

/// Reasons a frame could not be drawn.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameError {
    /// No live swapchain, e.g. the canvas currently has zero area.
    NoSwapchain,
    /// Acquiring the swapchain texture failed.
    Surface(SurfaceErrorAction),
}

impl FrameError {
    pub fn is_fatal(self) -> bool {
        self == FrameError::Surface(SurfaceErrorAction::Fatal)
    }
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::NoSwapchain => write!(f, "no live swapchain to draw into"),
            FrameError::Surface(action) => {
                write!(f, "failed to acquire swapchain texture ({action:?})")
            }
        }
    }
}

impl std::error::Error for FrameError {}
