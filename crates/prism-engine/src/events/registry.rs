use std::collections::HashMap;

use anyhow::{Context, Result};

/// Callback invoked with the event payload.
///
/// Returning an error stops delivery to the remaining subscribers of that event.
pub type Callback<'a, A> = Box<dyn FnMut(&A) -> Result<()> + 'a>;

/// Handle returned by [`EventRegistry::on`].
///
/// Removal is coarse-grained (by event name), so the handle is informational:
/// it identifies the subscription in logs and orders subscriptions globally.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Subscription(u64);

impl Subscription {
    #[inline]
    pub fn id(self) -> u64 {
        self.0
    }
}

struct Entry<'a, A> {
    subscription: Subscription,
    callback: Callback<'a, A>,
}

/// Observer registry keyed by event name.
///
/// Each name maps to callbacks kept in registration order. Delivery is a plain
/// synchronous iteration performed by the owner; there is no global dispatcher.
pub struct EventRegistry<'a, A> {
    subscribers: HashMap<String, Vec<Entry<'a, A>>>,
    next_id: u64,
}

impl<'a, A> EventRegistry<'a, A> {
    pub fn new() -> Self {
        Self {
            subscribers: HashMap::new(),
            next_id: 0,
        }
    }

    /// Registers `callback` for `name`. Later registrations run after earlier ones.
    pub fn on<F>(&mut self, name: impl Into<String>, callback: F) -> Subscription
    where
        F: FnMut(&A) -> Result<()> + 'a,
    {
        let subscription = Subscription(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);

        self.subscribers
            .entry(name.into())
            .or_default()
            .push(Entry {
                subscription,
                callback: Box::new(callback),
            });

        subscription
    }

    /// Removes every subscription registered for `name`.
    ///
    /// Returns the number of callbacks removed.
    pub fn off(&mut self, name: &str) -> usize {
        self.subscribers
            .remove(name)
            .map(|entries| entries.len())
            .unwrap_or(0)
    }

    /// Removes every subscription for every name.
    pub fn clear(&mut self) {
        self.subscribers.clear();
    }

    /// Number of callbacks registered for `name`.
    pub fn len(&self, name: &str) -> usize {
        self.subscribers.get(name).map(Vec::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.values().all(Vec::is_empty)
    }

    /// Delivers `payload` to every subscriber of `name`, in registration order.
    ///
    /// The first failing callback aborts delivery; its error is returned and the
    /// remaining subscribers are not invoked for this emission.
    /// Returns the number of callbacks that ran to completion.
    pub fn emit(&mut self, name: &str, payload: &A) -> Result<usize> {
        let Some(entries) = self.subscribers.get_mut(name) else {
            return Ok(0);
        };

        let mut delivered = 0;
        for entry in entries.iter_mut() {
            (entry.callback)(payload).with_context(|| {
                format!(
                    "subscriber #{} failed while handling '{name}'",
                    entry.subscription.id()
                )
            })?;
            delivered += 1;
        }

        Ok(delivered)
    }
}

impl<A> Default for EventRegistry<'_, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> std::fmt::Debug for EventRegistry<'_, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut counts: Vec<(&str, usize)> = self
            .subscribers
            .iter()
            .map(|(name, entries)| (name.as_str(), entries.len()))
            .collect();
        counts.sort_unstable();

        f.debug_struct("EventRegistry")
            .field("subscribers", &counts)
            .field("next_id", &self.next_id)
            .finish()
    }
}
