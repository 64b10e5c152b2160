//! Short-TTL memory of sent picks, their opposite markets, and the feed
//! cursor (spec §4.3, component C4).

mod local_cache;
mod store;

pub use local_cache::CachedDedupStore;
pub use store::{warn_on_write_failure, DedupStore, InMemoryDedupStore, RedisDedupStore, CURSOR_KEY};
