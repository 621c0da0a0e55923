//! Memoization cache for reply formatting
//!
//! Caches formatted segments keyed by a hash of the reply text, so a
//! transcript that is printed again does not re-run the regex passes.

use std::collections::{HashMap, VecDeque};
use std::hash::{DefaultHasher, Hash, Hasher};

use super::{format_message, Segment, FORMAT_CACHE_MAX_ENTRIES};

/// Memoized [`format_message`].
///
/// Evicts the oldest entry once `capacity` is reached.
pub struct FormatCache {
    entries: HashMap<u64, Vec<Segment>>,
    /// Insertion order for FIFO eviction (oldest first)
    insertion_order: VecDeque<u64>,
    capacity: usize,
    hits: u64,
    misses: u64,
}

impl Default for FormatCache {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatCache {
    pub fn new() -> Self {
        Self::with_capacity(FORMAT_CACHE_MAX_ENTRIES)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            insertion_order: VecDeque::new(),
            capacity: capacity.max(1),
            hits: 0,
            misses: 0,
        }
    }

    fn hash_content(content: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        content.hash(&mut hasher);
        hasher.finish()
    }

    /// Format with caching.
    pub fn format(&mut self, content: &str) -> Vec<Segment> {
        let hash = Self::hash_content(content);

        if let Some(cached) = self.entries.get(&hash) {
            self.hits += 1;
            return cached.clone();
        }

        self.misses += 1;
        let segments = format_message(content);

        while self.entries.len() >= self.capacity {
            let Some(oldest) = self.insertion_order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
        }

        self.entries.insert(hash, segments.clone());
        self.insertion_order.push_back(hash);
        segments
    }

    /// (hits, misses)
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all entries; stats are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.insertion_order.clear();
    }
}
