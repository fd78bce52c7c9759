//! Test utilities for laterq: an in-memory [`Store`] implementation and a
//! recording handler for driving [`DelayQueue::each`] in tests.
//!
//! [`Store`]: laterq::Store
//! [`DelayQueue::each`]: laterq::DelayQueue::each

pub mod handler;
pub mod store;

pub use handler::RecordingHandler;
pub use store::MemoryStore;
