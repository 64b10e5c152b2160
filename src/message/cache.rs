use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

struct Entry {
    body: String,
    expires_at: Instant,
}

/// TTL + bounded-capacity cache for the message builder's static parts (spec
/// §4.6: "cached with TTL (default 60s) and a bounded maximum entry count
/// (LRU eviction when full)").
///
/// Mirrors the dedup store's local cache shape (`parking_lot::Mutex` guarding
/// a `HashMap`), extended with an access-order queue for LRU eviction.
pub struct StaticPartCache {
    ttl: Duration,
    max_entries: usize,
    entries: Mutex<HashMap<String, Entry>>,
    order: Mutex<VecDeque<String>>,
}

impl StaticPartCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            ttl,
            max_entries,
            entries: Mutex::new(HashMap::new()),
            order: Mutex::new(VecDeque::new()),
        }
    }

    fn touch(&self, key: &str) {
        let mut order = self.order.lock();
        if let Some(pos) = order.iter().position(|k| k == key) {
            order.remove(pos);
        }
        order.push_back(key.to_string());
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if entry.expires_at > now => {
                let body = entry.body.clone();
                drop(entries);
                self.touch(key);
                Some(body)
            }
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, key: String, body: String) {
        let mut entries = self.entries.lock();
        if !entries.contains_key(&key) && entries.len() >= self.max_entries {
            let mut order = self.order.lock();
            while entries.len() >= self.max_entries {
                match order.pop_front() {
                    Some(evicted) => {
                        entries.remove(&evicted);
                    }
                    None => break,
                }
            }
        }
        entries.insert(
            key.clone(),
            Entry {
                body,
                expires_at: Instant::now() + self.ttl,
            },
        );
        drop(entries);
        self.touch(&key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_then_expiry() {
        let cache = StaticPartCache::new(Duration::from_millis(10), 8);
        cache.insert("k".to_string(), "v".to_string());
        assert_eq!(cache.get("k"), Some("v".to_string()));
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn evicts_least_recently_used_when_full() {
        let cache = StaticPartCache::new(Duration::from_secs(60), 2);
        cache.insert("a".to_string(), "va".to_string());
        cache.insert("b".to_string(), "vb".to_string());
        // touch "a" so "b" becomes the least-recently-used entry
        assert_eq!(cache.get("a"), Some("va".to_string()));
        cache.insert("c".to_string(), "vc".to_string());
        assert_eq!(cache.get("b"), None);
        assert_eq!(cache.get("a"), Some("va".to_string()));
        assert_eq!(cache.get("c"), Some("vc".to_string()));
    }
}
