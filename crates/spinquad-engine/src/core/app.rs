use crate::time::FrameTime;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// The two event sources the host drives.
///
/// The host never delivers these concurrently: a resize always completes before
/// the next frame starts, and vice versa.
pub trait App {
    /// Called when the canvas changes size, with its new physical size.
    fn on_resize(&mut self, width: u32, height: u32) -> AppControl;

    /// Called once per frame tick.
    fn on_frame(&mut self, time: FrameTime) -> AppControl;
}
