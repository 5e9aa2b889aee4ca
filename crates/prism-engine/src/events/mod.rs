//! Event fan-out.
//!
//! A small observer registry shared by the frame ticker and the viewport monitor.
//! Delivery is synchronous and single-threaded:
//! - subscribers run in registration order
//! - a failing subscriber stops delivery for that emission and the error propagates
//! - removal is per event name, not per handle

mod registry;

pub use registry::{Callback, EventRegistry, Subscription};
