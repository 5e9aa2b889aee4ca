use std::fmt;

use anyhow::Result;

use crate::camera::PerspectiveCamera;
use crate::viewport::ViewportSize;

use super::Backend;

/// Position of a pass in its chain.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct PassId(pub(crate) usize);

impl PassId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for PassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One of the two ping-pong offscreen buffers owned by the backend.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BufferSlot {
    A,
    B,
}

impl BufferSlot {
    #[inline]
    pub fn other(self) -> Self {
        match self {
            BufferSlot::A => BufferSlot::B,
            BufferSlot::B => BufferSlot::A,
        }
    }
}

/// What a pass reads.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PassSource {
    /// The raw scene (first enabled pass of the chain).
    Scene,
    /// The buffer written by the previous enabled pass.
    Buffer(BufferSlot),
}

/// Where a pass writes.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PassTarget {
    /// The visible display surface. Only the resolved screen pass gets this.
    Screen,
    /// An intermediate buffer consumed by the next pass.
    Buffer(BufferSlot),
}

/// Everything a pass may touch while executing.
pub struct PassContext<'a, B: Backend> {
    pub backend: &'a mut B,
    pub frame: &'a mut B::Frame,
    pub scene: &'a B::Scene,
    pub camera: &'a PerspectiveCamera,
}

/// A unit of rendering work in a chain.
pub trait Pass<B: Backend> {
    fn name(&self) -> &str;

    /// Reads `source` and writes `target`.
    fn execute(
        &mut self,
        ctx: &mut PassContext<'_, B>,
        source: PassSource,
        target: PassTarget,
    ) -> Result<()>;
}

/// A pass whose resources depend on the viewport size.
pub trait ResizablePass<B: Backend>: Pass<B> {
    /// Called after the camera has been updated for the new size.
    fn resize(&mut self, size: ViewportSize, camera: &PerspectiveCamera) -> Result<()>;
}

/// A pass together with its resize capability, fixed when the pass is added.
pub enum PassKind<B: Backend> {
    Fixed(Box<dyn Pass<B>>),
    Resizable(Box<dyn ResizablePass<B>>),
}

impl<B: Backend> PassKind<B> {
    pub fn fixed(pass: impl Pass<B> + 'static) -> Self {
        PassKind::Fixed(Box::new(pass))
    }

    pub fn resizable(pass: impl ResizablePass<B> + 'static) -> Self {
        PassKind::Resizable(Box::new(pass))
    }

    pub fn name(&self) -> &str {
        match self {
            PassKind::Fixed(p) => p.name(),
            PassKind::Resizable(p) => p.name(),
        }
    }

    #[inline]
    pub fn is_resizable(&self) -> bool {
        matches!(self, PassKind::Resizable(_))
    }

    pub(crate) fn execute(
        &mut self,
        ctx: &mut PassContext<'_, B>,
        source: PassSource,
        target: PassTarget,
    ) -> Result<()> {
        match self {
            PassKind::Fixed(p) => p.execute(ctx, source, target),
            PassKind::Resizable(p) => p.execute(ctx, source, target),
        }
    }

    /// Resizes the pass if it has the capability. Returns whether it did.
    pub(crate) fn resize(
        &mut self,
        size: ViewportSize,
        camera: &PerspectiveCamera,
    ) -> Result<bool> {
        match self {
            PassKind::Fixed(_) => Ok(false),
            PassKind::Resizable(p) => p.resize(size, camera).map(|()| true),
        }
    }
}

impl<B: Backend> fmt::Debug for PassKind<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_resizable() { "Resizable" } else { "Fixed" };
        f.debug_tuple(kind).field(&self.name()).finish()
    }
}
