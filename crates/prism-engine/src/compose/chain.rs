use anyhow::{Context, Result};

use crate::camera::PerspectiveCamera;
use crate::viewport::ViewportSize;

use super::{Backend, BufferSlot, ComposeError, PassContext, PassId, PassKind, PassSource, PassTarget};

/// A pass plus the flags the chain manages for it.
pub struct PassEntry<B: Backend> {
    kind: PassKind<B>,
    enabled: bool,
    renders_to_screen: bool,
}

impl<B: Backend> PassEntry<B> {
    #[inline]
    pub fn name(&self) -> &str {
        self.kind.name()
    }

    #[inline]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Assigned by [`PassChain::resolve`]; never set directly.
    #[inline]
    pub fn renders_to_screen(&self) -> bool {
        self.renders_to_screen
    }

    #[inline]
    pub fn is_resizable(&self) -> bool {
        self.kind.is_resizable()
    }
}

/// Ordered sequence of passes.
///
/// Insertion order is execution order. After any change to the `enabled` flags
/// the chain is dirty until [`resolve`](PassChain::resolve) picks the single pass
/// that writes to the display surface: the last enabled one.
pub struct PassChain<B: Backend> {
    entries: Vec<PassEntry<B>>,
    dirty: bool,
}

impl<B: Backend> PassChain<B> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            dirty: false,
        }
    }

    /// Appends an enabled pass.
    pub fn add_pass(&mut self, kind: PassKind<B>) -> PassId {
        self.add_pass_with(kind, true)
    }

    /// Appends a pass with an initial `enabled` state.
    pub fn add_pass_with(&mut self, kind: PassKind<B>, enabled: bool) -> PassId {
        let id = PassId(self.entries.len());
        log::debug!(
            "chain: add pass {id} '{}' ({}, {})",
            kind.name(),
            if kind.is_resizable() { "resizable" } else { "fixed" },
            if enabled { "enabled" } else { "disabled" },
        );

        self.entries.push(PassEntry {
            kind,
            enabled,
            renders_to_screen: false,
        });
        self.dirty = true;
        id
    }

    /// Sets a pass's `enabled` flag and marks the chain dirty.
    pub fn set_enabled(&mut self, id: PassId, enabled: bool) -> Result<(), ComposeError> {
        let entry = self
            .entries
            .get_mut(id.0)
            .ok_or(ComposeError::UnknownPass(id))?;

        entry.enabled = enabled;
        self.dirty = true;
        Ok(())
    }

    /// Reassigns `renders_to_screen` for every pass.
    ///
    /// Scanning from the end, the first enabled pass becomes the screen pass and
    /// every other pass is cleared. Idempotent; O(n).
    pub fn resolve(&mut self) {
        let mut found = false;
        for entry in self.entries.iter_mut().rev() {
            if entry.enabled && !found {
                entry.renders_to_screen = true;
                found = true;
            } else {
                entry.renders_to_screen = false;
            }
        }
        self.dirty = false;

        match self.screen_pass() {
            Some(id) => log::debug!("chain: '{}' {id} renders to screen", self.entries[id.0].name()),
            None => log::debug!("chain: no enabled pass; pass-through"),
        }
    }

    /// Drops every pass and whatever resources it holds. Returns how many were
    /// dropped.
    pub fn clear(&mut self) -> usize {
        let dropped = self.entries.len();
        self.entries.clear();
        self.dirty = false;
        dropped
    }

    /// True when `enabled` flags changed since the last [`resolve`](Self::resolve).
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn enabled_count(&self) -> usize {
        self.entries.iter().filter(|e| e.enabled).count()
    }

    pub fn get(&self, id: PassId) -> Option<&PassEntry<B>> {
        self.entries.get(id.0)
    }

    pub fn is_enabled(&self, id: PassId) -> Option<bool> {
        self.get(id).map(PassEntry::enabled)
    }

    pub fn renders_to_screen(&self, id: PassId) -> Option<bool> {
        self.get(id).map(PassEntry::renders_to_screen)
    }

    /// The pass currently assigned to the display surface, if any.
    pub fn screen_pass(&self) -> Option<PassId> {
        self.entries
            .iter()
            .position(|e| e.renders_to_screen)
            .map(PassId)
    }

    /// Iterates passes in chain order.
    pub fn iter(&self) -> impl Iterator<Item = (PassId, &PassEntry<B>)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| (PassId(i), e))
    }

    /// Calls `resize` on every pass that has the capability, in chain order.
    ///
    /// Disabled passes are resized too so they are ready when re-enabled.
    /// Returns the number of passes resized.
    pub fn resize(&mut self, size: ViewportSize, camera: &PerspectiveCamera) -> Result<usize> {
        let mut resized = 0;
        for entry in &mut self.entries {
            if entry
                .kind
                .resize(size, camera)
                .with_context(|| format!("failed to resize pass '{}'", entry.kind.name()))?
            {
                resized += 1;
            }
        }
        Ok(resized)
    }

    /// Runs the enabled passes in order.
    ///
    /// The first enabled pass reads the scene; each later one reads what its
    /// predecessor wrote. Intermediate passes alternate between the two offscreen
    /// buffers; the screen pass writes the display surface.
    /// Returns the number of passes executed.
    pub fn execute(&mut self, ctx: &mut PassContext<'_, B>) -> Result<usize> {
        if self.dirty {
            log::debug!("chain: executing while dirty; resolving first");
            self.resolve();
        }

        let mut source = PassSource::Scene;
        let mut write = BufferSlot::A;
        let mut executed = 0;

        for entry in self.entries.iter_mut().filter(|e| e.enabled) {
            let target = if entry.renders_to_screen {
                PassTarget::Screen
            } else {
                PassTarget::Buffer(write)
            };

            entry
                .kind
                .execute(ctx, source, target)
                .with_context(|| format!("pass '{}' failed", entry.kind.name()))?;
            executed += 1;

            if entry.renders_to_screen {
                break;
            }

            source = PassSource::Buffer(write);
            write = write.other();
        }

        Ok(executed)
    }
}

impl<B: Backend> Default for PassChain<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> std::fmt::Debug for PassChain<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PassChain")
            .field("passes", &self.entries.iter().map(|e| &e.kind).collect::<Vec<_>>())
            .field("screen_pass", &self.screen_pass())
            .field("dirty", &self.dirty)
            .finish()
    }
}
