//! Keyed listener registry with stable delivery order.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use dollar_value::Pipe;

struct Listener {
    seq: u64,
    pipe: Pipe,
}

/// Listeners fire in first-registration order. Re-registering a key keeps
/// its slot and swaps the pipe.
#[derive(Default)]
pub(crate) struct Listeners {
    entries: DashMap<String, Listener>,
    seq: AtomicU64,
}

impl Listeners {
    pub(crate) fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::Relaxed)
    }

    pub(crate) fn register(&self, key: String, pipe: Pipe) {
        match self.entries.entry(key) {
            Entry::Occupied(mut slot) => slot.get_mut().pipe = pipe,
            Entry::Vacant(slot) => {
                let seq = self.next_seq();
                slot.insert(Listener { seq, pipe });
            }
        }
    }

    pub(crate) fn remove(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Snapshot of every pipe in delivery order.
    pub(crate) fn ordered(&self) -> Vec<Pipe> {
        let mut pipes: Vec<(u64, Pipe)> = self
            .entries
            .iter()
            .map(|entry| (entry.seq, entry.pipe.clone()))
            .collect();
        pipes.sort_by_key(|(seq, _)| *seq);
        pipes.into_iter().map(|(_, pipe)| pipe).collect()
    }
}
