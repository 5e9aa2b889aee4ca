//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and Window and drives one [`crate::app::Application`]
//! from window events.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
