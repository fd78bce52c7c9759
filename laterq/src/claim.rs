use chrono::{DateTime, Utc};
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::QueueError;
use crate::queue::DelayQueue;
use crate::record::ProcessingRecord;
use crate::store::{from_score, to_score, Store};

/// A successfully claimed entry.
///
/// Produced by the claim loop; its processing record stays in the store
/// until [`release`](DelayQueue::release) or
/// [`release_failed`](DelayQueue::release_failed) is called, so a claim
/// dropped by a dying process remains visible to the recovery sweep.
#[derive(Clone, Debug)]
pub struct Claim {
    /// The decoded item payload.
    pub item: String,
    /// The time the entry was originally scheduled to become ready.
    pub ready_at: DateTime<Utc>,
    record_member: String,
}

impl Claim {
    /// The serialized processing record, as stored in the processing set.
    pub fn record_member(&self) -> &str {
        &self.record_member
    }
}

/// Outcome of one optimistic attempt.
enum Attempt {
    Claimed(Claim),
    NothingReady,
    Lost,
}

impl<S: Store> DelayQueue<S> {
    /// Claim the earliest entry ready at the wall clock, retrying lost races
    /// per the configured backoff. Returns `None` when nothing is ready.
    pub async fn try_claim(
        &self,
        descriptor: Option<&serde_json::Value>,
    ) -> Result<Option<Claim>, QueueError> {
        self.claim_loop(None, descriptor).await
    }

    /// Like [`try_claim`](DelayQueue::try_claim) but with an explicit
    /// observation time, for deterministic tests and recovery tooling.
    pub async fn try_claim_at(
        &self,
        now: DateTime<Utc>,
        descriptor: Option<&serde_json::Value>,
    ) -> Result<Option<Claim>, QueueError> {
        self.claim_loop(Some(now), descriptor).await
    }

    /// The optimistic claim loop: observe the earliest ready entry, decode
    /// it, and ask the store to commit the move into the processing set. A
    /// rejected commit means another producer or consumer raced us; back off
    /// and re-observe. Liveness depends on eventually winning the race.
    async fn claim_loop(
        &self,
        fixed_now: Option<DateTime<Utc>>,
        descriptor: Option<&serde_json::Value>,
    ) -> Result<Option<Claim>, QueueError> {
        let mut attempts: u32 = 0;
        loop {
            let now = fixed_now.unwrap_or_else(Utc::now);
            match self.attempt_claim(now, descriptor).await? {
                Attempt::Claimed(claim) => return Ok(Some(claim)),
                Attempt::NothingReady => return Ok(None),
                Attempt::Lost => {
                    attempts += 1;
                    if let Some(max) = self.config.max_claim_attempts {
                        if attempts >= max {
                            return Err(QueueError::Contended { attempts });
                        }
                    }
                    debug!(
                        namespace = %self.config.namespace,
                        attempts,
                        backoff_ms = self.config.claim_backoff.as_millis() as u64,
                        "claim lost optimistic race, backing off"
                    );
                    sleep(self.config.claim_backoff).await;
                }
            }
        }
    }

    /// One round trip: read the earliest entry with score at or below `now`
    /// and conditionally commit its removal paired with the registry insert.
    async fn attempt_claim(
        &self,
        now: DateTime<Utc>,
        descriptor: Option<&serde_json::Value>,
    ) -> Result<Attempt, QueueError> {
        let observed = self
            .store
            .sorted_first_at_or_below(&self.keys.schedule, to_score(now))
            .await?;
        let Some((member, score)) = observed else {
            return Ok(Attempt::NothingReady);
        };

        // A decode failure aborts the whole call rather than skipping the
        // entry; the schedule is wedged until an operator removes it.
        let item = match self.config.mode.decode(&member) {
            Ok(item) => item.to_string(),
            Err(err) => {
                warn!(namespace = %self.config.namespace, member, "corrupt schedule entry");
                return Err(err);
            }
        };

        let record = ProcessingRecord::new(item.clone(), now, descriptor.cloned());
        let record_member = record.to_member()?;

        let committed = self
            .store
            .claim_commit(
                &self.keys.schedule,
                &member,
                score,
                &self.keys.processing,
                &record_member,
            )
            .await?;
        if !committed {
            return Ok(Attempt::Lost);
        }

        debug!(namespace = %self.config.namespace, item, "claimed entry");
        Ok(Attempt::Claimed(Claim {
            item,
            ready_at: from_score(score),
            record_member,
        }))
    }
}
