//! Time subsystem.
//!
//! - `FrameClock` ticks once per redraw and stamps each frame
//! - `AnimationState` holds the per-frame rotation of the quad

mod animation;
mod frame_clock;

pub use animation::AnimationState;
pub use frame_clock::{FrameClock, FrameTime};
