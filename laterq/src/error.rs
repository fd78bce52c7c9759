use thiserror::Error;

use crate::store::StoreError;

/// Errors surfaced by queue operations.
#[derive(Debug, Error)]
pub enum QueueError {
    /// A stored schedule or processing member failed decoding.
    ///
    /// Never skipped: whichever operation touched the member (claim or
    /// enumeration) aborts with the raw string attached.
    #[error("corrupt stored entry: {raw:?}")]
    CorruptEntry {
        /// The raw member string as read from the store.
        raw: String,
    },

    /// The caller-supplied processing handler reported failure.
    ///
    /// The item has already been rescheduled at its original ready time and
    /// its processing record removed by the time this is returned.
    #[error("handler failed: {0}")]
    Handler(String),

    /// A claim lost the optimistic race more times than the configured
    /// attempt cap allows.
    ///
    /// Only reachable when [`QueueConfig::max_claim_attempts`] is set; the
    /// default configuration retries without bound.
    ///
    /// [`QueueConfig::max_claim_attempts`]: crate::config::QueueConfig::max_claim_attempts
    #[error("claim still contended after {attempts} attempts")]
    Contended {
        /// Number of attempts made before giving up.
        attempts: u32,
    },

    /// A processing record could not be serialized.
    #[error("failed to encode processing record: {0}")]
    Encode(#[source] serde_json::Error),

    /// The backing store reported an error.
    #[error(transparent)]
    Store(#[from] StoreError),
}
