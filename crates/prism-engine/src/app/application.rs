use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use anyhow::{Context, Result};

use crate::compose::{Backend, Compositor};
use crate::time::{FrameTime, Ticker};
use crate::viewport::{ViewportMonitor, ViewportSize};

/// The running application: event sources plus the compositor they drive.
///
/// The compositor is shared with the tick/resize subscriptions; disposing
/// removes those subscriptions before releasing the backend, so no event can
/// reach a disposed compositor.
pub struct Application<'a, B: Backend + 'a> {
    ticker: Ticker<'a>,
    viewport: ViewportMonitor<'a>,
    compositor: Rc<RefCell<Compositor<B>>>,
    disposed: bool,
}

impl<'a, B: Backend + 'a> Application<'a, B> {
    /// Subscribes `compositor` to both event sources and syncs it with the
    /// monitor's current size.
    pub fn new(
        compositor: Compositor<B>,
        mut ticker: Ticker<'a>,
        mut viewport: ViewportMonitor<'a>,
    ) -> Result<Self> {
        let compositor = Rc::new(RefCell::new(compositor));

        let initial = viewport.size();
        compositor
            .borrow_mut()
            .on_resize(initial)
            .context("initial resize failed")?;

        let on_tick = Rc::clone(&compositor);
        ticker.on(Ticker::TICK, move |ft: &FrameTime| {
            on_tick.borrow_mut().on_tick(ft)
        });

        let on_resize = Rc::clone(&compositor);
        viewport.on(ViewportMonitor::RESIZE, move |size: &ViewportSize| {
            on_resize.borrow_mut().on_resize(*size)
        });

        Ok(Self {
            ticker,
            viewport,
            compositor,
            disposed: false,
        })
    }

    /// Fires one frame tick.
    pub fn tick(&mut self) -> Result<FrameTime> {
        self.ticker.tick()
    }

    /// Forwards a host size change. Returns whether a resize event fired.
    pub fn resize(&mut self, physical_width: u32, physical_height: u32, scale_factor: f64) -> Result<bool> {
        self.viewport
            .notify(physical_width, physical_height, scale_factor)
    }

    /// Rebases the frame clock after a stall (window hidden, loop paused).
    pub fn reset_clock(&mut self) {
        self.ticker.reset();
    }

    pub fn ticker(&self) -> &Ticker<'a> {
        &self.ticker
    }

    pub fn viewport(&self) -> &ViewportMonitor<'a> {
        &self.viewport
    }

    pub fn compositor(&self) -> Ref<'_, Compositor<B>> {
        self.compositor.borrow()
    }

    pub fn compositor_mut(&self) -> RefMut<'_, Compositor<B>> {
        self.compositor.borrow_mut()
    }

    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Unsubscribes from the ticker and the viewport monitor, then disposes the
    /// compositor. Calling it again is a no-op.
    pub fn dispose(&mut self) -> Result<()> {
        if self.disposed {
            return Ok(());
        }

        self.ticker.off(Ticker::TICK);
        self.viewport.off(ViewportMonitor::RESIZE);
        self.disposed = true;

        self.compositor.borrow_mut().dispose()
    }
}
