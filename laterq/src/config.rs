use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::codec::Mode;

/// Configuration for a queue handle.
///
/// Every handle operating against the same namespace must agree on
/// [`mode`](QueueConfig::mode); the entry encoding is fixed for the lifetime
/// of a namespace and mixing modes is undefined behavior at the data level.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Key prefix isolating this queue's state from others sharing the store.
    pub namespace: String,
    /// Entry encoding mode (sequenced or unique).
    pub mode: Mode,
    /// Whether [`each`](crate::DelayQueue::each) polls forever (`true`) or
    /// returns once nothing is ready (`false`).
    pub blocking: bool,
    /// Sleep between polls when blocking and nothing is ready.
    pub poll_interval: Duration,
    /// Sleep after a claim loses the optimistic race, before re-observing.
    pub claim_backoff: Duration,
    /// Cap on optimistic claim attempts. `None` retries without bound, which
    /// is the production default; a finite cap surfaces
    /// [`QueueError::Contended`](crate::QueueError::Contended) on exhaustion
    /// and exists for bounded-latency testing.
    pub max_claim_attempts: Option<u32>,
    /// Page size for the debug enumerator.
    pub page_size: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            namespace: "laterq".to_string(),
            mode: Mode::Sequenced,
            blocking: false,
            poll_interval: Duration::from_secs(1),
            claim_backoff: Duration::from_millis(500),
            max_claim_attempts: None,
            page_size: 50,
        }
    }
}

impl QueueConfig {
    /// Configuration with the given namespace and defaults elsewhere.
    pub fn with_namespace(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..Self::default()
        }
    }
}
