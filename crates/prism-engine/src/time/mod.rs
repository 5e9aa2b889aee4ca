//! Time subsystem.
//!
//! - `FrameClock` produces clamped `FrameTime` snapshots
//! - `Ticker` wraps a clock and fans each tick out to its subscribers

mod frame_clock;
mod ticker;

pub use frame_clock::{FrameClock, FrameTime};
pub use ticker::Ticker;
