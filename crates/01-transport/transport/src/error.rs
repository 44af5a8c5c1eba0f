//! Error handling helpers for the transport crate.
//!
//! Sending is best-effort and reports drops through [`crate::SendOutcome`]
//! rather than errors. Only receiver bookkeeping can fail.

use thiserror::Error;

/// Convenience result alias for fallible transport operations.
pub type TransportResult<T, E = TransportError> = Result<T, E>;

/// Errors surfaced by broadcaster implementations.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Receivers must listen on a non-empty action.
    #[error("receiver filter must name a non-empty action")]
    EmptyAction,

    /// The broadcaster has been shut down and accepts no new receivers.
    #[error("broadcaster is closed")]
    Closed,

    /// The handle does not belong to a live receiver.
    #[error("unknown receiver handle {0}")]
    UnknownReceiver(u64),
}
