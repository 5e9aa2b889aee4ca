use anyhow::Result;

use crate::events::{EventRegistry, Subscription};

use super::{FrameClock, FrameTime};

/// Periodic frame event source.
///
/// The host loop calls [`Ticker::tick`] once per display refresh; every subscriber
/// of [`Ticker::TICK`] then runs synchronously with the new [`FrameTime`] before
/// control returns to the loop, so successive frames never overlap.
#[derive(Debug, Default)]
pub struct Ticker<'a> {
    clock: FrameClock,
    events: EventRegistry<'a, FrameTime>,
}

impl<'a> Ticker<'a> {
    /// Event fired once per frame.
    pub const TICK: &'static str = "tick";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn on<F>(&mut self, name: impl Into<String>, callback: F) -> Subscription
    where
        F: FnMut(&FrameTime) -> Result<()> + 'a,
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

    /// Rebases the clock, e.g. after the window was hidden.
    pub fn reset(&mut self) {
        self.clock.reset();
    }

    /// Advances the clock and fires [`Ticker::TICK`].
    ///
    /// A subscriber error aborts delivery for this frame and is returned.
    pub fn tick(&mut self) -> Result<FrameTime> {
        let ft = self.clock.tick();
        self.events.emit(Self::TICK, &ft)?;
        Ok(ft)
    }
}
