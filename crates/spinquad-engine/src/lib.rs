//! Spinquad engine crate.
//!
//! Device, swapchain, pipeline and frame-loop pieces for a rotating-quad demo,
//! plus the `winit` runtime that drives them.

pub mod core;
pub mod device;
pub mod logging;
pub mod render;
pub mod time;
pub mod window;
