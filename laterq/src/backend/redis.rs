use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Script};

use crate::store::{Store, StoreError};

/// Conditional claim commit as a single Lua script, the store-side
/// serialization point: remove the member only if it is still present at
/// the observed score, and insert the processing record in the same atomic
/// step. Returns 1 on commit, 0 when the caller lost the race.
const CLAIM_SCRIPT: &str = r#"
local score = redis.call('ZSCORE', KEYS[1], ARGV[1])
if score and tonumber(score) == tonumber(ARGV[2]) then
    redis.call('ZREM', KEYS[1], ARGV[1])
    redis.call('SADD', KEYS[2], ARGV[3])
    return 1
end
return 0
"#;

/// Redis-backed implementation of the [`Store`] trait.
///
/// Uses a [`ConnectionManager`] (cheap to clone, reconnects on failure);
/// every trait method is a single command or script invocation, so no
/// client-side locking is needed.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    claim_script: Script,
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore").finish_non_exhaustive()
    }
}

impl RedisStore {
    /// Connect to the Redis instance at `url` (e.g.
    /// `"redis://127.0.0.1:6379"`).
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(url).map_err(StoreError::new)?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(StoreError::new)?;
        Ok(Self::with_connection(conn))
    }

    /// Build a store over an existing managed connection.
    pub fn with_connection(conn: ConnectionManager) -> Self {
        Self {
            conn,
            claim_script: Script::new(CLAIM_SCRIPT),
        }
    }
}

#[async_trait]
impl Store for RedisStore {
    async fn sorted_insert(&self, key: &str, member: &str, score: f64) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        conn.zadd::<_, _, _, ()>(key, member, score)
            .await
            .map_err(StoreError::new)
    }

    async fn sorted_len(&self, key: &str) -> Result<u64, StoreError> {
        let mut conn = self.conn.clone();
        conn.zcard::<_, u64>(key).await.map_err(StoreError::new)
    }

    async fn sorted_first_at_or_below(
        &self,
        key: &str,
        max_score: f64,
    ) -> Result<Option<(String, f64)>, StoreError> {
        let mut conn = self.conn.clone();
        let mut rows: Vec<(String, f64)> = conn
            .zrangebyscore_limit_withscores(key, "-inf", max_score, 0, 1)
            .await
            .map_err(StoreError::new)?;
        Ok(rows.pop())
    }

    async fn sorted_range(
        &self,
        key: &str,
        offset: u64,
        count: u64,
    ) -> Result<Vec<(String, f64)>, StoreError> {
        if count == 0 {
            return Ok(Vec::new());
        }
        let mut conn = self.conn.clone();
        let start = offset as isize;
        let stop = (offset + count - 1) as isize;
        conn.zrange_withscores(key, start, stop)
            .await
            .map_err(StoreError::new)
    }

    async fn claim_commit(
        &self,
        schedule_key: &str,
        member: &str,
        score: f64,
        processing_key: &str,
        record: &str,
    ) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let committed: i64 = self
            .claim_script
            .key(schedule_key)
            .key(processing_key)
            .arg(member)
            .arg(score)
            .arg(record)
            .invoke_async(&mut conn)
            .await
            .map_err(StoreError::new)?;
        Ok(committed == 1)
    }

    async fn set_remove(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let removed: i64 = conn.srem(key, member).await.map_err(StoreError::new)?;
        Ok(removed > 0)
    }

    async fn set_len(&self, key: &str) -> Result<u64, StoreError> {
        let mut conn = self.conn.clone();
        conn.scard::<_, u64>(key).await.map_err(StoreError::new)
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>, StoreError> {
        let mut conn = self.conn.clone();
        conn.smembers::<_, Vec<String>>(key)
            .await
            .map_err(StoreError::new)
    }

    async fn counter_incr(&self, key: &str) -> Result<u64, StoreError> {
        let mut conn = self.conn.clone();
        conn.incr::<_, _, u64>(key, 1u64)
            .await
            .map_err(StoreError::new)
    }

    async fn delete(&self, keys: &[&str]) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(keys.to_vec())
            .await
            .map_err(StoreError::new)
    }
}
