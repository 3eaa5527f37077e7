//! Core engine-facing contracts.
//!
//! `App` is the interface between the runtime (platform loop) and the scene;
//! `Scene` is the explicit context object holding every piece of demo state.
//! Tests drive a `Scene` directly through `App` without a window.

mod app;
mod scene;

pub use app::{App, AppControl};
pub use scene::{Scene, SceneConfig};
