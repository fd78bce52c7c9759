use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Error from a store backend.
///
/// Backends wrap their native errors in [`anyhow::Error`]; callers that need
/// backend specifics can downcast.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct StoreError(#[from] anyhow::Error);

impl StoreError {
    /// Wrap any error type as a store error.
    pub fn new<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self(anyhow::Error::new(err))
    }
}

/// Persisted key layout for one namespace.
///
/// Three logical keys: the time-ordered schedule, the processing set, and
/// the sequence counter (used in sequenced mode only).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Keys {
    /// Sorted set of encoded entries, scored by ready time.
    pub schedule: String,
    /// Set of serialized processing records.
    pub processing: String,
    /// Monotonic counter backing sequence-id assignment.
    pub counter: String,
}

impl Keys {
    /// Derive the key layout for a namespace.
    pub fn new(namespace: &str) -> Self {
        Self {
            schedule: format!("{namespace}:schedule"),
            processing: format!("{namespace}:processing"),
            counter: format!("{namespace}:seq"),
        }
    }
}

/// Backend abstraction over a shared key-value/sorted-set store.
///
/// The store is the single source of truth and the serialization point for
/// all mutation: implementations hold no claim logic, only primitives. Keys
/// are passed explicitly so one store connection serves any number of
/// namespaces. All sorted-set order is (score ascending, member bytes
/// ascending within equal score).
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert `member` with `score`, or update the score of an existing
    /// member (upsert-by-score, the store's native sorted-set insert).
    async fn sorted_insert(&self, key: &str, member: &str, score: f64) -> Result<(), StoreError>;

    /// Number of members in the sorted set.
    async fn sorted_len(&self, key: &str) -> Result<u64, StoreError>;

    /// The single lowest-ordered member with score at or below `max_score`,
    /// with its score. Read-only.
    async fn sorted_first_at_or_below(
        &self,
        key: &str,
        max_score: f64,
    ) -> Result<Option<(String, f64)>, StoreError>;

    /// Members in rank order, `count` of them starting at rank `offset`.
    /// Not transactionally consistent across calls.
    async fn sorted_range(
        &self,
        key: &str,
        offset: u64,
        count: u64,
    ) -> Result<Vec<(String, f64)>, StoreError>;

    /// The conditional-transaction primitive behind claiming: atomically
    /// remove `member` from `schedule_key` and add `record` to
    /// `processing_key`, but only if `member` is still present at the
    /// observed `score`. Returns whether the commit happened; `false` means
    /// a concurrent mutation won the race and the caller must re-observe.
    async fn claim_commit(
        &self,
        schedule_key: &str,
        member: &str,
        score: f64,
        processing_key: &str,
        record: &str,
    ) -> Result<bool, StoreError>;

    /// Remove one member from a set. Idempotent; returns whether it was
    /// present.
    async fn set_remove(&self, key: &str, member: &str) -> Result<bool, StoreError>;

    /// Number of members in a set.
    async fn set_len(&self, key: &str) -> Result<u64, StoreError>;

    /// All members of a set, in no particular order.
    async fn set_members(&self, key: &str) -> Result<Vec<String>, StoreError>;

    /// Atomically increment a counter and return the new value. The counter
    /// starts at zero, so the first call yields 1.
    async fn counter_incr(&self, key: &str) -> Result<u64, StoreError>;

    /// Delete the given keys outright.
    async fn delete(&self, keys: &[&str]) -> Result<(), StoreError>;
}

/// Convert a timestamp to its sorted-set score (epoch seconds, fractional).
pub(crate) fn to_score(at: DateTime<Utc>) -> f64 {
    at.timestamp_micros() as f64 / 1_000_000.0
}

/// Convert a sorted-set score back to a timestamp.
pub(crate) fn from_score(score: f64) -> DateTime<Utc> {
    DateTime::from_timestamp_micros((score * 1_000_000.0).round() as i64)
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_layout() {
        let keys = Keys::new("jobs");
        assert_eq!(keys.schedule, "jobs:schedule");
        assert_eq!(keys.processing, "jobs:processing");
        assert_eq!(keys.counter, "jobs:seq");
    }

    #[test]
    fn score_round_trip_keeps_microseconds() {
        let at = DateTime::from_timestamp_micros(1_724_500_000_123_456).unwrap();
        assert_eq!(from_score(to_score(at)), at);
    }
}
