//! wgpu rendering: the GPU backend, its passes and the demo scene.
//!
//! Every scene draw shares the backend's depth target, so composition buffers,
//! depth and display surface are kept at the same render size.

mod backend;
mod buffers;
mod mesh;
mod mesh_renderer;
pub mod passes;
mod setup;

pub use backend::GpuBackend;
pub use buffers::CompositionBuffers;
pub use mesh::{MeshData, MeshScene, MeshVertex};
pub use passes::{FxaaPass, ScenePass};
pub use setup::{antialias_enabled, create_application, standard_chain};
