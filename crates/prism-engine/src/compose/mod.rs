//! Pass chain composition.
//!
//! A [`PassChain`] is an ordered list of render passes. After the `enabled`
//! flags change, [`PassChain::resolve`] picks the one pass allowed to write the
//! display surface: the last enabled pass. Every earlier enabled pass writes an
//! intermediate buffer that the next one reads.
//!
//! The [`Compositor`] owns the chain together with the scene, camera and
//! [`Backend`], renders once per tick (through the chain or directly) and
//! propagates resizes to the camera, the surface and every resizable pass.

mod backend;
mod chain;
mod compositor;
mod error;
mod pass;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::{Animate, Backend};
pub use chain::{PassChain, PassEntry};
pub use compositor::{Compositor, CompositorOptions};
pub use error::ComposeError;
pub use pass::{BufferSlot, Pass, PassContext, PassId, PassKind, PassSource, PassTarget, ResizablePass};
