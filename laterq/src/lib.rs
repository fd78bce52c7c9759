//! laterq - delayed-work scheduling over a shared sorted-set store.
//!
//! Producers register items to become ready at a future timestamp;
//! consumers repeatedly claim and process items whose ready time has
//! passed, with at-most-one-consumer-at-a-time semantics per item and
//! crash-recoverable redelivery for claimed-but-unfinished work. Delivery
//! is at-least-once; the backing store is the single source of truth and
//! the serialization point for every mutation.
//!
//! # Core Concepts
//!
//! - **Schedule**: a sorted set of encoded entries keyed by ready time,
//!   one per namespace. Producers add to it via
//!   [`DelayQueue::schedule`].
//!
//! - **Claim**: the atomic move of the earliest ready entry into the
//!   processing set, performed by an optimistic loop that retries lost
//!   races with a configurable backoff ([`DelayQueue::try_claim`]).
//!
//! - **Processing set**: in-flight [`ProcessingRecord`]s. Records survive
//!   consumer death; an external sweep reads them via
//!   [`DelayQueue::processing_items`] and decides, using the opaque
//!   descriptor, whether to re-schedule.
//!
//! - **Iteration driver**: [`DelayQueue::each`], the consumer loop -
//!   claim, invoke caller logic, clean up, with a blocking (poll-forever)
//!   and a non-blocking (drain-then-stop) mode.
//!
//! - **Store**: the [`Store`] trait abstracts the backend primitives
//!   (sorted-set ops, set ops, a counter, and the conditional claim
//!   commit). A Redis implementation lives behind the `redis` feature;
//!   `laterq-testkit` ships an in-memory one.
//!
//! # Feature Flags
//!
//! - `redis` - Redis backend via the `redis` crate
//!
//! # Example
//!
//! ```ignore
//! use laterq::{DelayQueue, QueueConfig};
//!
//! let queue = DelayQueue::new(store, QueueConfig::with_namespace("mail"));
//! queue.schedule("welcome:41", chrono::Utc::now()).await?;
//! queue
//!     .each(None, |item, _ready_at| async move {
//!         send(item).await.map_err(|e| e.to_string())
//!     })
//!     .await?;
//! ```

/// Optimistic claim loop and the [`Claim`] handle.
pub mod claim;

/// Entry member encoding: sequenced and unique modes.
pub mod codec;

/// Queue configuration.
pub mod config;

/// The consumer-facing iteration loop ([`DelayQueue::each`]).
pub mod driver;

/// Error taxonomy for queue operations.
pub mod error;

/// Paginated read-only schedule enumeration.
pub mod inspect;

/// The [`DelayQueue`] handle: scheduling, counters, release, reset.
pub mod queue;

/// Processing records and their wire form.
pub mod record;

/// The backend [`Store`] trait, key layout, and store errors.
pub mod store;

#[cfg(feature = "redis")]
/// Store backends. Currently Redis, behind the `redis` feature.
pub mod backend;

pub use claim::Claim;
pub use codec::Mode;
pub use config::QueueConfig;
pub use error::QueueError;
pub use inspect::{ScheduleScan, ScheduledItem};
pub use queue::DelayQueue;
pub use record::ProcessingRecord;
pub use store::{Keys, Store, StoreError};

#[cfg(feature = "redis")]
pub use backend::RedisStore;
