//! Host-application wiring.
//!
//! Connects a [`Compositor`](crate::compose::Compositor) to the frame
//! [`Ticker`](crate::time::Ticker) and the
//! [`ViewportMonitor`](crate::viewport::ViewportMonitor), and tears the
//! connection down again on dispose.

mod application;
mod options;

pub use application::Application;
pub use options::ApplicationOptions;
