//! Passes for the GPU backend.

mod fxaa;
mod scene;

pub use fxaa::FxaaPass;
pub use scene::ScenePass;
