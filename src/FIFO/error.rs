// Admission errors surfaced to packet producers

use thiserror::Error;

/// Why a packet was refused admission.
///
/// Both variants are recoverable on the caller's side: the packet was not
/// enqueued and no shard state changed. The discipline never retries or
/// blocks on the caller's behalf, so rejection is immediate, not latency.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    /// The discipline has been closed; no further packets are accepted.
    #[error("queueing discipline closed for send")]
    ClosedForSend,

    /// The target shard's queue is at capacity right now. Whether to retry,
    /// back off, or drop belongs to the caller.
    #[error("no buffer space on target shard")]
    NoBufferSpace,
}
