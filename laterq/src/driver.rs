//! The consumer-facing iteration loop.

use std::future::Future;

use chrono::{DateTime, Utc};
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::QueueError;
use crate::queue::DelayQueue;
use crate::store::Store;

impl<S: Store> DelayQueue<S> {
    /// Repeatedly claim ready items and hand them to `handler`.
    ///
    /// The handler receives `(item, ready_at)` and reports success or
    /// failure explicitly. On success the claim's processing record is
    /// removed and the loop continues. On failure the item is re-inserted at
    /// its original ready time (not the failure time), the record is
    /// removed, and the failure surfaces as [`QueueError::Handler`],
    /// terminating the loop.
    ///
    /// In non-blocking configuration the loop returns `Ok(())` as soon as
    /// nothing is ready, even with entries still pending for the future. In
    /// blocking configuration it sleeps the poll interval and keeps going;
    /// it only stops when an error propagates or the surrounding task is
    /// cancelled.
    ///
    /// `descriptor` is attached verbatim to every processing record written
    /// during this invocation, for the external recovery sweep to interpret.
    ///
    /// Items lost to a process crash (as opposed to a reported failure) are
    /// out of this loop's hands: their records remain in the processing set
    /// until the sweep acts on them.
    pub async fn each<F, Fut>(
        &self,
        descriptor: Option<serde_json::Value>,
        mut handler: F,
    ) -> Result<(), QueueError>
    where
        F: FnMut(String, DateTime<Utc>) -> Fut + Send,
        Fut: Future<Output = Result<(), String>> + Send,
    {
        loop {
            let claim = match self.try_claim(descriptor.as_ref()).await? {
                Some(claim) => claim,
                None if self.config.blocking => {
                    sleep(self.config.poll_interval).await;
                    continue;
                }
                None => {
                    debug!(namespace = %self.config.namespace, "nothing ready, drain complete");
                    return Ok(());
                }
            };

            match handler(claim.item.clone(), claim.ready_at).await {
                Ok(()) => {
                    self.release(&claim).await?;
                }
                Err(reason) => {
                    warn!(
                        namespace = %self.config.namespace,
                        item = %claim.item,
                        reason,
                        "handler failed, rescheduling at original ready time"
                    );
                    self.release_failed(&claim).await?;
                    return Err(QueueError::Handler(reason));
                }
            }
        }
    }
}
