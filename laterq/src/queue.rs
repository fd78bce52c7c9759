use chrono::{DateTime, Utc};
use tracing::debug;

use crate::claim::Claim;
use crate::codec::Mode;
use crate::config::QueueConfig;
use crate::error::QueueError;
use crate::record::ProcessingRecord;
use crate::store::{to_score, Keys, Store};

/// Handle to one logical schedule in a shared store.
///
/// Holds no state beyond the store connection, configuration, and derived
/// key names: any number of handles (in any number of processes) may operate
/// against the same namespace concurrently, with all mutation safety
/// delegated to the store's conditional commit.
#[derive(Clone, Debug)]
pub struct DelayQueue<S> {
    pub(crate) store: S,
    pub(crate) config: QueueConfig,
    pub(crate) keys: Keys,
}

impl<S: Store> DelayQueue<S> {
    /// Create a handle over `store` with the given configuration.
    pub fn new(store: S, config: QueueConfig) -> Self {
        let keys = Keys::new(&config.namespace);
        Self {
            store,
            config,
            keys,
        }
    }

    /// The configuration this handle was built with.
    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// The persisted key layout for this handle's namespace.
    pub fn keys(&self) -> &Keys {
        &self.keys
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Register `item` to become ready at `ready_at`.
    ///
    /// Sequenced mode creates an independent entry per call, tagged with the
    /// next counter value. Unique mode upserts: a repeated item keeps a
    /// single entry whose ready time moves to the latest-given value.
    pub async fn schedule(&self, item: &str, ready_at: DateTime<Utc>) -> Result<(), QueueError> {
        let sequence = match self.config.mode {
            Mode::Sequenced => Some(self.store.counter_incr(&self.keys.counter).await?),
            Mode::Unique => None,
        };
        let member = self.config.mode.encode(item, sequence);
        self.store
            .sorted_insert(&self.keys.schedule, &member, to_score(ready_at))
            .await?;
        debug!(namespace = %self.config.namespace, item, %ready_at, "scheduled item");
        Ok(())
    }

    /// Number of pending entries.
    pub async fn len(&self) -> Result<u64, QueueError> {
        Ok(self.store.sorted_len(&self.keys.schedule).await?)
    }

    /// Whether the schedule holds no pending entries.
    pub async fn is_empty(&self) -> Result<bool, QueueError> {
        Ok(self.len().await? == 0)
    }

    /// Number of in-flight claims.
    pub async fn processing_len(&self) -> Result<u64, QueueError> {
        Ok(self.store.set_len(&self.keys.processing).await?)
    }

    /// Decode every processing record, for the external recovery sweep.
    ///
    /// A consumer that died mid-claim leaves its record here; the sweep
    /// inspects the descriptor and decides whether to re-[`schedule`] the
    /// item. A record that fails decoding aborts the call with
    /// [`QueueError::CorruptEntry`].
    ///
    /// [`schedule`]: DelayQueue::schedule
    pub async fn processing_items(&self) -> Result<Vec<ProcessingRecord>, QueueError> {
        self.store
            .set_members(&self.keys.processing)
            .await?
            .iter()
            .map(|raw| ProcessingRecord::from_member(raw))
            .collect()
    }

    /// Remove a claim's processing record after successful handling.
    ///
    /// Idempotent: releasing an already-released claim is a no-op.
    pub async fn release(&self, claim: &Claim) -> Result<(), QueueError> {
        self.store
            .set_remove(&self.keys.processing, claim.record_member())
            .await?;
        Ok(())
    }

    /// Put a failed claim's item back on the schedule at its *original*
    /// ready time, then remove the processing record.
    ///
    /// The record removal is attempted even if the re-insert fails, so a
    /// handled failure never strands a processing record.
    pub async fn release_failed(&self, claim: &Claim) -> Result<(), QueueError> {
        let reinsert = self
            .schedule(&claim.item, claim.ready_at)
            .await;
        let removed = self
            .store
            .set_remove(&self.keys.processing, claim.record_member())
            .await;
        reinsert?;
        removed?;
        Ok(())
    }

    /// Delete all state under this namespace: schedule, processing set, and
    /// counter. Idempotent.
    pub async fn reset(&self) -> Result<(), QueueError> {
        self.store
            .delete(&[
                self.keys.schedule.as_str(),
                self.keys.processing.as_str(),
                self.keys.counter.as_str(),
            ])
            .await?;
        Ok(())
    }
}
