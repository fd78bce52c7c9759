use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

/// Records every handler invocation made by a driver loop, with scriptable
/// per-item failures.
///
/// Clone it into the closure passed to `each`; clones share state.
#[derive(Clone, Default)]
pub struct RecordingHandler {
    calls: Arc<Mutex<Vec<(String, DateTime<Utc>)>>>,
    failures: Arc<Mutex<HashMap<String, String>>>,
}

impl RecordingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every invocation for `item` report failure with `reason`.
    pub fn fail_on(&self, item: impl Into<String>, reason: impl Into<String>) {
        self.failures.lock().insert(item.into(), reason.into());
    }

    /// Record one invocation and report the scripted outcome.
    pub fn call(&self, item: String, ready_at: DateTime<Utc>) -> Result<(), String> {
        self.calls.lock().push((item.clone(), ready_at));
        match self.failures.lock().get(&item) {
            Some(reason) => Err(reason.clone()),
            None => Ok(()),
        }
    }

    /// All invocations so far, in order.
    pub fn calls(&self) -> Vec<(String, DateTime<Utc>)> {
        self.calls.lock().clone()
    }

    /// Just the item payloads, in invocation order.
    pub fn items(&self) -> Vec<String> {
        self.calls.lock().iter().map(|(item, _)| item.clone()).collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn assert_call_count_eq(&self, expected: usize) {
        let got = self.calls.lock().len();
        assert_eq!(got, expected, "expected {expected} handler calls, got {got}");
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}
