use crate::types::Profit;
use parking_lot::Mutex;
use std::cmp::Reverse;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};

/// One queued delivery: a rendered body bound for a channel, ordered by
/// profit with a stable FIFO tie-break (spec §4.7, "Max-heap keyed on
/// `profit` (descending), with secondary key `enqueue_time` (ascending) for
/// stable tie-breaks").
#[derive(Debug, Clone)]
pub struct DispatchEntry {
    pub profit: Profit,
    pub channel_id: String,
    pub body: String,
    pub attempts: u32,
    seq: u64,
}

impl DispatchEntry {
    fn order_key(&self) -> (Profit, Reverse<u64>) {
        (self.profit, Reverse(self.seq))
    }
}

impl PartialEq for DispatchEntry {
    fn eq(&self, other: &Self) -> bool {
        self.order_key() == other.order_key()
    }
}
impl Eq for DispatchEntry {}
impl PartialOrd for DispatchEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for DispatchEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.order_key().cmp(&other.order_key())
    }
}

/// Bounded max-heap of [`DispatchEntry`] (spec §4.7, component C9 queue).
///
/// Implemented as a `BTreeSet` rather than `std::collections::BinaryHeap`
/// because the overflow admission policy needs the *minimum* entry, not just
/// the maximum; a `BTreeSet`'s `first()`/`last()` give both in O(log n)
/// without a second data structure.
pub struct DispatchHeap {
    capacity: usize,
    entries: Mutex<BTreeSet<DispatchEntry>>,
    next_seq: AtomicU64,
}

impl DispatchHeap {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Mutex::new(BTreeSet::new()),
            next_seq: AtomicU64::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Admits `profit`/`channel_id`/`body` if there is room, or if it strictly
    /// outranks the current minimum (spec §4.7: "compare incoming profit with
    /// the heap's minimum; if strictly greater, evict the minimum and
    /// insert; otherwise reject"). Returns `false` on rejection — the only
    /// sanctioned loss path.
    pub fn try_enqueue(&self, profit: Profit, channel_id: String, body: String) -> bool {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let entry = DispatchEntry {
            profit,
            channel_id,
            body,
            attempts: 0,
            seq,
        };
        let mut entries = self.entries.lock();
        if entries.len() < self.capacity {
            entries.insert(entry);
            return true;
        }
        let should_evict = matches!(entries.iter().next(), Some(min) if entry.profit > min.profit);
        if should_evict {
            let min = entries.iter().next().cloned().expect("checked above");
            entries.remove(&min);
            entries.insert(entry);
            true
        } else {
            false
        }
    }

    /// Re-admits an entry after a transient failure, preserving its original
    /// priority (spec §4.7: "re-enqueue with unchanged priority").
    pub fn requeue(&self, mut entry: DispatchEntry) {
        entry.attempts += 1;
        self.entries.lock().insert(entry);
    }

    /// Re-admits an entry after a 429 without counting it against the
    /// transient-failure retry budget — only the bot backed off, not the
    /// entry itself (spec §4.7, "yield the reported retry-after for that bot
    /// only").
    pub fn requeue_unchanged(&self, entry: DispatchEntry) {
        self.entries.lock().insert(entry);
    }

    /// Pops the highest-profit entry (earliest-enqueued on ties).
    pub fn pop_max(&self) -> Option<DispatchEntry> {
        let mut entries = self.entries.lock();
        let max = entries.iter().next_back().cloned()?;
        entries.remove(&max);
        Some(max)
    }
}
