//! A byte-budget LRU cache of reconstructed object content, keyed by
//! content hash.
//!
//! Generalizes a count-based `lru::LruCache` wrapper to a byte-budget
//! policy: insertion tracks a running total and evicts least-recently-used
//! entries via `pop_lru` until the total is back under budget, rather than
//! capping the number of entries.

use git_hash::ObjectId;
use lru::LruCache;

/// Default byte budget: 96 MiB, matching the figure widely used for
/// decoded-object caches of this kind.
pub const DEFAULT_MAX_BYTES: usize = 96 * 1024 * 1024;

pub struct ObjectCache {
    inner: LruCache<ObjectId, Vec<u8>>,
    max_bytes: usize,
    current_bytes: usize,
}

impl ObjectCache {
    pub fn new(max_bytes: usize) -> Self {
        Self {
            // The cache is bounded by bytes, not entry count; an unbounded
            // entry count lets `pop_lru` alone enforce the byte budget.
            inner: LruCache::unbounded(),
            max_bytes,
            current_bytes: 0,
        }
    }

    /// Promotes `hash` to most-recently-used and returns its content, if present.
    pub fn get(&mut self, hash: &ObjectId) -> Option<&Vec<u8>> {
        self.inner.get(hash)
    }

    /// Inserts or updates `hash`'s content, evicting least-recently-used
    /// entries until the cache is back under budget. A single content
    /// larger than the whole budget is silently dropped (not cached, but
    /// not an error — the caller already has the bytes in hand).
    pub fn put(&mut self, hash: ObjectId, content: Vec<u8>) {
        let size = content.len();
        if size > self.max_bytes {
            return;
        }

        if let Some(old) = self.inner.put(hash, content) {
            self.current_bytes -= old.len();
        }
        self.current_bytes += size;

        while self.current_bytes > self.max_bytes {
            match self.inner.pop_lru() {
                Some((_, evicted)) => self.current_bytes -= evicted.len(),
                None => break,
            }
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Default for ObjectCache {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BYTES)
    }
}
