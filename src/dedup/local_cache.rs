use crate::dedup::store::DedupStore;
use anyhow::Result;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Process-local, TTL-bounded membership cache checked before the backing
/// store (spec §4.3: "process-local (unbounded by count, bounded by TTL,
/// capacity ~a few thousand) checked first, then the backing store").
struct LocalCache {
    entries: Mutex<HashMap<String, Instant>>,
}

impl LocalCache {
    fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::with_capacity(4096)),
        }
    }

    fn contains_each(&self, keys: &[String]) -> Vec<bool> {
        let mut guard = self.entries.lock();
        let now = Instant::now();
        keys.iter()
            .map(|k| match guard.get(k) {
                Some(expiry) if *expiry > now => true,
                Some(_) => {
                    guard.remove(k);
                    false
                }
                None => false,
            })
            .collect()
    }

    fn insert(&self, key: &str, ttl: Duration) {
        self.entries.lock().insert(key.to_string(), Instant::now() + ttl);
    }
}

/// Wraps a backing [`DedupStore`] with the local cache from spec §4.3. The
/// local level is purely an accelerator: a fresh key always reaches the
/// backing store ("The local level must never suppress a write to the
/// backing store for a fresh key").
pub struct CachedDedupStore<S: DedupStore> {
    local: LocalCache,
    backing: S,
}

impl<S: DedupStore> CachedDedupStore<S> {
    pub fn new(backing: S) -> Self {
        Self {
            local: LocalCache::new(),
            backing,
        }
    }
}

#[async_trait]
impl<S: DedupStore> DedupStore for CachedDedupStore<S> {
    async fn exists_each(&self, keys: &[String]) -> Result<Vec<bool>> {
        let local_hits = self.local.contains_each(keys);
        if local_hits.iter().all(|&hit| hit) {
            return Ok(local_hits);
        }
        let backing_hits = self.backing.exists_each(keys).await?;
        Ok(local_hits
            .into_iter()
            .zip(backing_hits)
            .map(|(local, backing)| local || backing)
            .collect())
    }

    async fn record(&self, key: &str, ttl_secs: i64) -> Result<()> {
        self.local
            .insert(key, Duration::from_secs(ttl_secs.max(1) as u64));
        // Always forwarded, even though the local cache was just populated:
        // the local level must never suppress a backing-store write.
        self.backing.record(key, ttl_secs).await
    }

    async fn save_cursor(&self, cursor: &str) -> Result<()> {
        self.backing.save_cursor(cursor).await
    }

    async fn load_cursor(&self) -> Result<Option<String>> {
        self.backing.load_cursor().await
    }
}
