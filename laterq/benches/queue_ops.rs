//! Benchmarks for core queue operations against the in-memory store:
//! - Scheduling a single item
//! - Claim + release round trip
//! - Full drain of a populated schedule

#![allow(missing_docs)]

use chrono::{Duration, Utc};
use criterion::{criterion_group, criterion_main, Criterion};
use laterq::{DelayQueue, QueueConfig};
use laterq_testkit::MemoryStore;
use tokio::runtime::Runtime;

fn create_runtime() -> Runtime {
    Runtime::new().expect("failed to create tokio runtime")
}

fn bench_schedule_single(c: &mut Criterion) {
    let rt = create_runtime();
    let mut group = c.benchmark_group("schedule_single");

    group.bench_function("in_memory", |b| {
        let queue = DelayQueue::new(MemoryStore::new(), QueueConfig::default());
        let ready_at = Utc::now() + Duration::seconds(60);

        b.to_async(&rt).iter(|| async {
            queue
                .schedule("bench-item", ready_at)
                .await
                .expect("schedule should succeed");
        });
    });

    group.finish();
}

fn bench_claim_release(c: &mut Criterion) {
    let rt = create_runtime();
    let mut group = c.benchmark_group("claim_release");

    group.bench_function("in_memory", |b| {
        let queue = DelayQueue::new(MemoryStore::new(), QueueConfig::default());

        b.to_async(&rt).iter(|| async {
            let now = Utc::now();
            queue
                .schedule("bench-item", now - Duration::seconds(1))
                .await
                .expect("schedule should succeed");
            let claim = queue
                .try_claim(None)
                .await
                .expect("claim should succeed")
                .expect("entry should be ready");
            queue.release(&claim).await.expect("release should succeed");
        });
    });

    group.finish();
}

fn bench_drain_100(c: &mut Criterion) {
    let rt = create_runtime();
    let mut group = c.benchmark_group("drain_100");
    group.sample_size(20);

    group.bench_function("in_memory", |b| {
        b.to_async(&rt).iter(|| async {
            let queue = DelayQueue::new(MemoryStore::new(), QueueConfig::default());
            let now = Utc::now();
            for i in 0..100 {
                queue
                    .schedule(&format!("bench-{i}"), now - Duration::seconds(200 - i))
                    .await
                    .expect("schedule should succeed");
            }
            queue
                .each(None, |_item, _ready_at| async { Ok::<(), String>(()) })
                .await
                .expect("drain should succeed");
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_schedule_single,
    bench_claim_release,
    bench_drain_100
);
criterion_main!(benches);
