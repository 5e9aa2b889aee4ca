//! Cameras.

mod perspective;

pub use perspective::PerspectiveCamera;
