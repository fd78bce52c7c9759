use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use laterq::{Store, StoreError};
use parking_lot::Mutex;

/// In-memory [`Store`] with the same ordering and atomicity semantics as a
/// real sorted-set store: one mutex plays the role of the store's
/// serialization point, and [`claim_commit`](Store::claim_commit) checks
/// the observed score under that mutex.
///
/// Cloning shares state, so several queue handles (or tasks) can race
/// against one store the way separate processes would.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<State>>,
}

#[derive(Default)]
struct State {
    /// Sorted sets, kept ordered by (score, member bytes).
    sorted: HashMap<String, Vec<(String, f64)>>,
    sets: HashMap<String, BTreeSet<String>>,
    counters: HashMap<String, u64>,
}

impl State {
    fn sorted_upsert(&mut self, key: &str, member: &str, score: f64) {
        let entries = self.sorted.entry(key.to_string()).or_default();
        entries.retain(|(m, _)| m != member);
        let at = entries
            .iter()
            .position(|(m, s)| (*s, m.as_str()) > (score, member))
            .unwrap_or(entries.len());
        entries.insert(at, (member.to_string(), score));
    }
}

impl MemoryStore {
    /// Fresh empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw dump of a sorted set, for assertions on encoded members.
    pub fn sorted_dump(&self, key: &str) -> Vec<(String, f64)> {
        self.inner
            .lock()
            .sorted
            .get(key)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn sorted_insert(&self, key: &str, member: &str, score: f64) -> Result<(), StoreError> {
        self.inner.lock().sorted_upsert(key, member, score);
        Ok(())
    }

    async fn sorted_len(&self, key: &str) -> Result<u64, StoreError> {
        Ok(self
            .inner
            .lock()
            .sorted
            .get(key)
            .map_or(0, |entries| entries.len() as u64))
    }

    async fn sorted_first_at_or_below(
        &self,
        key: &str,
        max_score: f64,
    ) -> Result<Option<(String, f64)>, StoreError> {
        Ok(self
            .inner
            .lock()
            .sorted
            .get(key)
            .and_then(|entries| entries.first())
            .filter(|(_, score)| *score <= max_score)
            .cloned())
    }

    async fn sorted_range(
        &self,
        key: &str,
        offset: u64,
        count: u64,
    ) -> Result<Vec<(String, f64)>, StoreError> {
        Ok(self
            .inner
            .lock()
            .sorted
            .get(key)
            .map_or_else(Vec::new, |entries| {
                entries
                    .iter()
                    .skip(offset as usize)
                    .take(count as usize)
                    .cloned()
                    .collect()
            }))
    }

    async fn claim_commit(
        &self,
        schedule_key: &str,
        member: &str,
        score: f64,
        processing_key: &str,
        record: &str,
    ) -> Result<bool, StoreError> {
        let mut state = self.inner.lock();
        let still_there = state.sorted.get(schedule_key).is_some_and(|entries| {
            entries
                .iter()
                .any(|(m, s)| m == member && s.to_bits() == score.to_bits())
        });
        if !still_there {
            return Ok(false);
        }
        if let Some(entries) = state.sorted.get_mut(schedule_key) {
            entries.retain(|(m, _)| m != member);
        }
        state
            .sets
            .entry(processing_key.to_string())
            .or_default()
            .insert(record.to_string());
        Ok(true)
    }

    async fn set_remove(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        Ok(self
            .inner
            .lock()
            .sets
            .get_mut(key)
            .is_some_and(|set| set.remove(member)))
    }

    async fn set_len(&self, key: &str) -> Result<u64, StoreError> {
        Ok(self
            .inner
            .lock()
            .sets
            .get(key)
            .map_or(0, |set| set.len() as u64))
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .inner
            .lock()
            .sets
            .get(key)
            .map_or_else(Vec::new, |set| set.iter().cloned().collect()))
    }

    async fn counter_incr(&self, key: &str) -> Result<u64, StoreError> {
        let mut state = self.inner.lock();
        let counter = state.counters.entry(key.to_string()).or_insert(0);
        *counter += 1;
        Ok(*counter)
    }

    async fn delete(&self, keys: &[&str]) -> Result<(), StoreError> {
        let mut state = self.inner.lock();
        for key in keys {
            state.sorted.remove(*key);
            state.sets.remove(*key);
            state.counters.remove(*key);
        }
        Ok(())
    }
}
