//! Session-level errors and outcomes.

use crate::codec::CodecError;
use std::io;
use thiserror::Error;

/// Terminal errors surfaced through [`Resp`](super::Resp) outcomes and
/// the event stream.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No response arrived within the request timeout.
    #[error("timeout wait for response")]
    Timeout,

    /// The session shut down while the request was unresolved.
    #[error("session closed")]
    Closed,

    /// The retry queue was full; the throttled response was delivered as
    /// the final outcome instead.
    #[error("queue of retries full")]
    RetryQueueFull,

    /// The speed controller failed for a reason other than throttling.
    #[error("speed controller: {0}")]
    Speed(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Codec(#[from] CodecError),
}
