//! Prism engine crate.
//!
//! A small frame-driven rendering core: a ticker and a viewport monitor feed a
//! compositor, which renders a scene either straight to the window or through
//! an ordered chain of post-processing passes.

pub mod app;
pub mod camera;
pub mod compose;
pub mod device;
pub mod events;
pub mod logging;
pub mod render;
pub mod time;
pub mod viewport;
pub mod window;
