use thiserror::Error;

use super::PassId;

/// Errors raised by the compose core.
///
/// Backends and passes report through `anyhow`; these variants are the ones
/// callers are expected to match on (via `downcast_ref` when wrapped).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ComposeError {
    /// Invalid or missing construction input. Nothing is retained.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// An offscreen buffer or surface could not be (re)allocated.
    /// The previously allocated resources stay in use.
    #[error("failed to allocate {what} at {width}x{height}: {reason}")]
    BufferAllocation {
        what: &'static str,
        width: u32,
        height: u32,
        reason: String,
    },

    /// The id does not belong to this chain.
    #[error("no pass with id {0} in chain")]
    UnknownPass(PassId),

    /// The compositor was already disposed.
    #[error("compositor has been disposed")]
    Disposed,
}
