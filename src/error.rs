//! Error taxonomy for the measurement core (spec.md §7).

use thiserror::Error;

/// The three error kinds the core can surface.
///
/// Per-sample failures inside the sweep orchestrator are *not* represented
/// here — those are recorded as a negative sentinel latency and handled by
/// [`crate::cache_detect`], which never raises.
#[derive(Debug, Error)]
pub enum MembenchError {
    /// Caller supplied a size below the kernel's minimum, or a degenerate
    /// node count. Surfaced before any allocation happens.
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    /// Page-committed allocation failed.
    #[error("allocation of {requested_bytes} bytes failed")]
    OutOfMemory { requested_bytes: usize },

    /// The monotonic timer could not be initialized at process start.
    #[error("platform timer initialization failed: {reason}")]
    PlatformInitFailure { reason: String },
}

pub type Result<T> = std::result::Result<T, MembenchError>;
