use anyhow::{Context, Result};
use async_trait::async_trait;
use redis::AsyncCommands;
use std::time::Duration;
use tracing::warn;

/// Fixed key under which the feed pagination cursor is persisted (spec §6,
/// "Persisted state").
pub const CURSOR_KEY: &str = "surebot:cursor";

/// Short-TTL memory of sent picks, their opposite markets, and the feed
/// cursor (spec §4.3, component C4).
///
/// Implementations MUST provide read-then-write ordering from the caller's
/// perspective: `record` is synchronous from the pipeline's point of view,
/// never fire-and-forget (spec §4.3 contract).
#[async_trait]
pub trait DedupStore: Send + Sync {
    /// Batched membership query, one round trip for the whole key set.
    /// Returns a per-key presence vector in the same order as `keys` (spec
    /// §4.3, §4.4: "consult C4 with a single batched query" — the dedup link
    /// and the opposite-market link share this one call instead of issuing
    /// independent queries).
    async fn exists_each(&self, keys: &[String]) -> Result<Vec<bool>>;

    /// Convenience built on [`exists_each`](Self::exists_each): `true` if any
    /// key in the set is present (spec §4.3, `exists_any`).
    async fn exists_any(&self, keys: &[String]) -> Result<bool> {
        Ok(self.exists_each(keys).await?.into_iter().any(|present| present))
    }

    /// Writes `key` with the given TTL. Callers await the result before
    /// considering a pick "sent" (spec §4.3, `record`).
    async fn record(&self, key: &str, ttl_secs: i64) -> Result<()>;

    async fn save_cursor(&self, cursor: &str) -> Result<()>;

    async fn load_cursor(&self) -> Result<Option<String>>;
}

/// Redis-backed implementation: `EXISTS` for batched membership, `SET ... EX`
/// for TTL'd writes, plain `GET`/`SET` for the cursor (spec §6, "Dedup store
/// (TCP protocol) ... Operations required: exists many, set with TTL, get
/// string, set string. Authentication by password").
pub struct RedisDedupStore {
    manager: redis::aio::ConnectionManager,
    op_timeout: Duration,
}

impl RedisDedupStore {
    pub async fn connect(url: &str, op_timeout: Duration) -> Result<Self> {
        let client = redis::Client::open(url).context("invalid dedup store URL")?;
        let manager = client
            .get_connection_manager()
            .await
            .context("failed to connect to dedup store")?;
        Ok(Self {
            manager,
            op_timeout,
        })
    }

    async fn with_deadline<T>(
        &self,
        fut: impl std::future::Future<Output = redis::RedisResult<T>>,
    ) -> Result<T> {
        tokio::time::timeout(self.op_timeout, fut)
            .await
            .context("dedup store operation timed out")?
            .context("dedup store operation failed")
    }
}

#[async_trait]
impl DedupStore for RedisDedupStore {
    async fn exists_each(&self, keys: &[String]) -> Result<Vec<bool>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.manager.clone();
        let keys = keys.to_vec();
        self.with_deadline(async move { conn.exists(keys).await })
            .await
    }

    async fn record(&self, key: &str, ttl_secs: i64) -> Result<()> {
        let mut conn = self.manager.clone();
        let ttl = ttl_secs.max(1) as u64;
        let key = key.to_string();
        self.with_deadline(async move {
            conn.set_ex::<_, _, ()>(key, 1u8, ttl).await
        })
        .await
    }

    async fn save_cursor(&self, cursor: &str) -> Result<()> {
        let mut conn = self.manager.clone();
        let cursor = cursor.to_string();
        self.with_deadline(async move { conn.set::<_, _, ()>(CURSOR_KEY, cursor).await })
            .await
    }

    async fn load_cursor(&self) -> Result<Option<String>> {
        let mut conn = self.manager.clone();
        self.with_deadline(async move { conn.get(CURSOR_KEY).await })
            .await
    }
}

/// In-memory stand-in used by the orchestrator's fall-back path and by tests;
/// never used for production delivery (that would defeat the "externally
/// shared" contract of spec §5), but lets a `DedupStore` be constructed
/// without a live backing store in unit tests.
#[derive(Default)]
pub struct InMemoryDedupStore {
    inner: parking_lot::Mutex<std::collections::HashMap<String, std::time::Instant>>,
    cursor: parking_lot::Mutex<Option<String>>,
}

#[async_trait]
impl DedupStore for InMemoryDedupStore {
    async fn exists_each(&self, keys: &[String]) -> Result<Vec<bool>> {
        let mut guard = self.inner.lock();
        let now = std::time::Instant::now();
        Ok(keys
            .iter()
            .map(|k| match guard.get(k) {
                Some(expiry) if *expiry > now => true,
                Some(_) => {
                    guard.remove(k);
                    false
                }
                None => false,
            })
            .collect())
    }

    async fn record(&self, key: &str, ttl_secs: i64) -> Result<()> {
        let ttl = Duration::from_secs(ttl_secs.max(1) as u64);
        self.inner
            .lock()
            .insert(key.to_string(), std::time::Instant::now() + ttl);
        Ok(())
    }

    async fn save_cursor(&self, cursor: &str) -> Result<()> {
        *self.cursor.lock() = Some(cursor.to_string());
        Ok(())
    }

    async fn load_cursor(&self) -> Result<Option<String>> {
        Ok(self.cursor.lock().clone())
    }
}

/// Logs a warning and continues — the error policy for a failed post-send
/// write (spec §4.3: "If the post-send write fails, emit a warning and
/// continue").
pub fn warn_on_write_failure(key: &str, err: &anyhow::Error) {
    warn!(dedup_key = key, error = %err, "dedup store write failed; continuing");
}
