//! Paginated, read-only traversal of the schedule.
//!
//! A diagnostic facility, not a consumption path: pages are independent
//! range reads, so concurrent claims or inserts can make a traversal skip
//! or repeat entries across page boundaries.

use chrono::{DateTime, Utc};

use crate::error::QueueError;
use crate::queue::DelayQueue;
use crate::store::{from_score, Store};

/// One pending entry as seen by the enumerator.
#[derive(Clone, Debug, PartialEq)]
pub struct ScheduledItem {
    /// The decoded item payload.
    pub item: String,
    /// When the entry becomes ready.
    pub ready_at: DateTime<Utc>,
}

impl<S: Store> DelayQueue<S> {
    /// Random-access range read: `count` entries starting at rank `offset`,
    /// in ready-time order. A member that fails decoding aborts the call.
    pub async fn range(&self, offset: u64, count: u64) -> Result<Vec<ScheduledItem>, QueueError> {
        let rows = self
            .store
            .sorted_range(&self.keys.schedule, offset, count)
            .await?;
        rows.into_iter()
            .map(|(member, score)| {
                Ok(ScheduledItem {
                    item: self.config.mode.decode(&member)?.to_string(),
                    ready_at: from_score(score),
                })
            })
            .collect()
    }

    /// Start a paginated scan over the whole schedule.
    pub fn scan(&self) -> ScheduleScan<'_, S> {
        ScheduleScan {
            queue: self,
            offset: 0,
            done: false,
        }
    }
}

/// Pager over the schedule, page size per the queue configuration.
#[derive(Debug)]
pub struct ScheduleScan<'a, S> {
    queue: &'a DelayQueue<S>,
    offset: u64,
    done: bool,
}

impl<S: Store> ScheduleScan<'_, S> {
    /// Fetch the next page, or `None` once the scan ran off the end.
    pub async fn next_page(&mut self) -> Result<Option<Vec<ScheduledItem>>, QueueError> {
        if self.done {
            return Ok(None);
        }
        let page = self
            .queue
            .range(self.offset, self.queue.config().page_size as u64)
            .await?;
        if page.is_empty() {
            self.done = true;
            return Ok(None);
        }
        self.offset += page.len() as u64;
        Ok(Some(page))
    }

    /// Drain the remaining pages into one vector.
    pub async fn collect_all(mut self) -> Result<Vec<ScheduledItem>, QueueError> {
        let mut all = Vec::new();
        while let Some(page) = self.next_page().await? {
            all.extend(page);
        }
        Ok(all)
    }
}
