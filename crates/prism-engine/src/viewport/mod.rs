//! Viewport tracking.
//!
//! Converts host window sizes into render-surface sizes (with a capped pixel
//! ratio) and notifies subscribers when the render size actually changes.

mod monitor;
mod size;

pub use monitor::{ViewportMonitor, DEFAULT_MAX_PIXEL_RATIO};
pub use size::{Viewport, ViewportSize};
