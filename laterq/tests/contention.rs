//! Concurrent-claim behavior: exactly one winner per entry, loser backoff,
//! and the configurable attempt cap.

use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use laterq::{DelayQueue, QueueConfig, QueueError, Store, StoreError};
use laterq_testkit::{MemoryStore, RecordingHandler};

fn contended_config() -> QueueConfig {
    QueueConfig {
        claim_backoff: StdDuration::from_millis(5),
        ..QueueConfig::default()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn single_ready_entry_has_exactly_one_winner() {
    let store = MemoryStore::new();
    let template = DelayQueue::new(store.clone(), contended_config());
    let now = Utc::now();
    template.schedule("prize", now - Duration::seconds(1)).await.unwrap();

    let mut tasks = Vec::new();
    for _ in 0..16 {
        let queue = DelayQueue::new(store.clone(), contended_config());
        tasks.push(tokio::spawn(async move {
            queue.try_claim_at(Utc::now(), None).await
        }));
    }

    let mut winners = 0;
    let mut empty = 0;
    for task in tasks {
        match task.await.unwrap().unwrap() {
            Some(claim) => {
                assert_eq!(claim.item, "prize");
                winners += 1;
            }
            None => empty += 1,
        }
    }
    assert_eq!(winners, 1, "exactly one claimant may receive the entry");
    assert_eq!(empty, 15);
    assert_eq!(template.len().await.unwrap(), 0);
    assert_eq!(template.processing_len().await.unwrap(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_drains_never_duplicate_an_item() {
    let store = MemoryStore::new();
    let producer = DelayQueue::new(store.clone(), contended_config());
    let now = Utc::now();
    for i in 0..50 {
        producer
            .schedule(&format!("job-{i}"), now - Duration::seconds(60 - i))
            .await
            .unwrap();
    }

    let handler = RecordingHandler::new();
    let mut workers = Vec::new();
    for _ in 0..8 {
        let queue = DelayQueue::new(store.clone(), contended_config());
        let h = handler.clone();
        workers.push(tokio::spawn(async move {
            queue
                .each(None, move |item, ready_at| {
                    let h = h.clone();
                    async move { h.call(item, ready_at) }
                })
                .await
        }));
    }
    for worker in workers {
        worker.await.unwrap().unwrap();
    }

    handler.assert_call_count_eq(50);
    let mut seen = handler.items();
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), 50, "every item delivered exactly once");
    assert_eq!(producer.len().await.unwrap(), 0);
    assert_eq!(producer.processing_len().await.unwrap(), 0);
}

/// Store wrapper whose claim commits always lose, to drive the attempt cap.
#[derive(Clone)]
struct AlwaysContended {
    inner: MemoryStore,
}

#[async_trait]
impl Store for AlwaysContended {
    async fn sorted_insert(&self, key: &str, member: &str, score: f64) -> Result<(), StoreError> {
        self.inner.sorted_insert(key, member, score).await
    }

    async fn sorted_len(&self, key: &str) -> Result<u64, StoreError> {
        self.inner.sorted_len(key).await
    }

    async fn sorted_first_at_or_below(
        &self,
        key: &str,
        max_score: f64,
    ) -> Result<Option<(String, f64)>, StoreError> {
        self.inner.sorted_first_at_or_below(key, max_score).await
    }

    async fn sorted_range(
        &self,
        key: &str,
        offset: u64,
        count: u64,
    ) -> Result<Vec<(String, f64)>, StoreError> {
        self.inner.sorted_range(key, offset, count).await
    }

    async fn claim_commit(
        &self,
        _schedule_key: &str,
        _member: &str,
        _score: f64,
        _processing_key: &str,
        _record: &str,
    ) -> Result<bool, StoreError> {
        Ok(false)
    }

    async fn set_remove(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        self.inner.set_remove(key, member).await
    }

    async fn set_len(&self, key: &str) -> Result<u64, StoreError> {
        self.inner.set_len(key).await
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>, StoreError> {
        self.inner.set_members(key).await
    }

    async fn counter_incr(&self, key: &str) -> Result<u64, StoreError> {
        self.inner.counter_incr(key).await
    }

    async fn delete(&self, keys: &[&str]) -> Result<(), StoreError> {
        self.inner.delete(keys).await
    }
}

#[tokio::test]
async fn attempt_cap_surfaces_contended_error() {
    let store = AlwaysContended {
        inner: MemoryStore::new(),
    };
    let config = QueueConfig {
        claim_backoff: StdDuration::from_millis(1),
        max_claim_attempts: Some(3),
        ..QueueConfig::default()
    };
    let queue = DelayQueue::new(store, config);
    queue.schedule("stuck", past()).await.unwrap();

    let err = queue.try_claim(None).await.unwrap_err();
    match err {
        QueueError::Contended { attempts } => assert_eq!(attempts, 3),
        other => panic!("expected Contended, got {other:?}"),
    }
    // The entry is still pending; nothing was committed.
    assert_eq!(queue.len().await.unwrap(), 1);
    assert_eq!(queue.processing_len().await.unwrap(), 0);
}

fn past() -> DateTime<Utc> {
    Utc::now() - Duration::seconds(10)
}
