use anyhow::Result;

use crate::camera::PerspectiveCamera;
use crate::time::FrameTime;
use crate::viewport::ViewportSize;

/// Time-driven scene state.
pub trait Animate {
    /// Advances the scene by one tick.
    fn advance(&mut self, time: &FrameTime);
}

/// Rendering backend the compositor drives.
///
/// The backend owns the display surface and the offscreen composition buffers.
/// Only the compositor calls into it, and only from `on_tick` / `on_resize`.
pub trait Backend {
    /// Scene content the backend knows how to draw.
    type Scene: Animate;

    /// One acquired display frame (encoder + surface image for GPU backends).
    type Frame;

    /// Acquires the next display frame.
    ///
    /// `Ok(None)` means the frame should be skipped (transient surface loss).
    fn begin_frame(&mut self) -> Result<Option<Self::Frame>>;

    /// Submits and presents a frame obtained from [`Backend::begin_frame`].
    fn end_frame(&mut self, frame: Self::Frame) -> Result<()>;

    /// Renders the scene straight to the display surface, bypassing any chain.
    fn render(&mut self, scene: &Self::Scene, camera: &PerspectiveCamera) -> Result<()>;

    /// Verifies that every target can be allocated at `size`, without touching
    /// any of them. Called before a non-empty resize starts.
    fn check_resize(&self, size: ViewportSize) -> Result<()>;

    /// Resizes the main display surface.
    fn resize_surface(&mut self, size: ViewportSize) -> Result<()>;

    /// Resizes the offscreen composition buffers.
    ///
    /// Must be all-or-nothing: on failure the previous buffers remain valid.
    fn resize_buffers(&mut self, size: ViewportSize) -> Result<()>;

    /// Releases surface, offscreen buffers and any other GPU state.
    fn release(&mut self);
}
