use anyhow::Result;

use crate::events::{EventRegistry, Subscription};

use super::{Viewport, ViewportSize};

/// Default cap applied to the host scale factor when sizing the render surface.
pub const DEFAULT_MAX_PIXEL_RATIO: f64 = 2.0;

/// Observes the host surface size and fans out [`ViewportMonitor::RESIZE`].
///
/// Notifications that produce the same render size as the current one are
/// dropped, so subscribers only see real changes.
#[derive(Debug)]
pub struct ViewportMonitor<'a> {
    viewport: Viewport,
    size: ViewportSize,
    max_pixel_ratio: f64,
    events: EventRegistry<'a, ViewportSize>,
}

impl<'a> ViewportMonitor<'a> {
    /// Event fired when the render size changes.
    pub const RESIZE: &'static str = "resize";

    /// Creates a monitor seeded with the initial host size. No event fires for it.
    pub fn new(physical_width: u32, physical_height: u32, scale_factor: f64) -> Self {
        Self::with_max_pixel_ratio(
            physical_width,
            physical_height,
            scale_factor,
            DEFAULT_MAX_PIXEL_RATIO,
        )
    }

    pub fn with_max_pixel_ratio(
        physical_width: u32,
        physical_height: u32,
        scale_factor: f64,
        max_pixel_ratio: f64,
    ) -> Self {
        let max_pixel_ratio = if max_pixel_ratio.is_finite() && max_pixel_ratio > 0.0 {
            max_pixel_ratio
        } else {
            DEFAULT_MAX_PIXEL_RATIO
        };
        let viewport = Viewport::from_physical(physical_width, physical_height, scale_factor);

        Self {
            viewport,
            size: viewport.render_size(max_pixel_ratio),
            max_pixel_ratio,
            events: EventRegistry::new(),
        }
    }

    pub fn on<F>(&mut self, name: impl Into<String>, callback: F) -> Subscription
    where
        F: FnMut(&ViewportSize) -> Result<()> + 'a,
    {
        self.events.on(name, callback)
    }

    /// Removes every subscription for `name`; returns how many were removed.
    pub fn off(&mut self, name: &str) -> usize {
        self.events.off(name)
    }

    /// Teardown: drops every subscription.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn subscriber_count(&self, name: &str) -> usize {
        self.events.len(name)
    }

    /// Current render size.
    pub fn size(&self) -> ViewportSize {
        self.size
    }

    /// Current logical viewport.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn scale_factor(&self) -> f64 {
        self.viewport.scale_factor
    }

    /// Effective pixel ratio used for the render surface.
    pub fn pixel_ratio(&self) -> f64 {
        self.viewport.pixel_ratio(self.max_pixel_ratio)
    }

    pub fn aspect(&self) -> Option<f32> {
        self.size.aspect()
    }

    /// Records a new host size.
    ///
    /// Returns `Ok(false)` when the render size did not change (no event fires).
    /// A subscriber error aborts delivery and restores the previous size, so the
    /// same notification is delivered again next time.
    pub fn notify(
        &mut self,
        physical_width: u32,
        physical_height: u32,
        scale_factor: f64,
    ) -> Result<bool> {
        let viewport = Viewport::from_physical(physical_width, physical_height, scale_factor);
        let size = viewport.render_size(self.max_pixel_ratio);
        let previous = (self.viewport, self.size);
        self.viewport = viewport;

        if size == self.size {
            log::trace!("viewport unchanged at {}x{}", size.width, size.height);
            return Ok(false);
        }

        log::debug!(
            "viewport resized {}x{} -> {}x{} (pixel ratio {:.2})",
            self.size.width,
            self.size.height,
            size.width,
            size.height,
            self.pixel_ratio(),
        );

        self.size = size;
        if let Err(err) = self.events.emit(Self::RESIZE, &size) {
            (self.viewport, self.size) = previous;
            return Err(err);
        }
        Ok(true)
    }
}
