//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and the canvas window, and turns its events into
//! resize and frame calls on the scene.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
