//! Lazily pruned min-heap of slot references.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Heap entry: a key plus the slot and sequence number of the item it
/// refers to. An entry is stale once its slot no longer holds that
/// sequence number.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Entry {
    pub key: f64,
    pub seq: u64,
    pub slot: usize,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        // (key, seq): equal keys leave in insertion order
        self.key
            .total_cmp(&other.key)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

/// Min-heap whose stale entries are dropped on demand.
#[derive(Debug, Clone, Default)]
pub(crate) struct LazyHeap {
    heap: BinaryHeap<Reverse<Entry>>,
}

impl LazyHeap {
    pub fn push(&mut self, entry: Entry) {
        self.heap.push(Reverse(entry));
    }

    pub fn peek(&self) -> Option<&Entry> {
        self.heap.peek().map(|Reverse(e)| e)
    }

    pub fn pop(&mut self) -> Option<Entry> {
        self.heap.pop().map(|Reverse(e)| e)
    }

    /// Pops stale entries until the top is live (or the heap is empty).
    pub fn settle<F: Fn(&Entry) -> bool>(&mut self, live: F) {
        while let Some(Reverse(top)) = self.heap.peek() {
            if live(top) {
                break;
            }
            self.heap.pop();
        }
    }

    /// Drops every stale entry.
    pub fn compact<F: Fn(&Entry) -> bool>(&mut self, live: F) {
        self.heap.retain(|Reverse(e)| live(e));
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }
}
