//! Uploaded source PDF cache
//!
//! Lets a client upload a PDF once (via `extract_toc` with `cache: true`)
//! and split it later by key. Bounded by entry count and total bytes.

use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// A cached upload
#[derive(Debug, Clone)]
pub struct CachedSource {
    pub data: Arc<Vec<u8>>,
    /// Display name given at upload time, if any
    pub name: Option<String>,
}

struct Entries {
    lru: LruCache<String, CachedSource>,
    total_bytes: usize,
}

impl Entries {
    fn evict_until_fits(&mut self, incoming: usize, max_bytes: usize) {
        while self.total_bytes + incoming > max_bytes {
            match self.lru.pop_lru() {
                Some((key, evicted)) => {
                    tracing::debug!(key = %key, bytes = evicted.data.len(), "evicted cached source");
                    self.total_bytes = self.total_bytes.saturating_sub(evicted.data.len());
                }
                None => break,
            }
        }
    }
}

/// LRU cache of source PDFs with an entry limit and a byte budget
pub struct CacheManager {
    entries: Mutex<Entries>,
    max_bytes: usize,
}

impl CacheManager {
    pub fn new(capacity: usize, max_bytes: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(Entries {
                lru: LruCache::new(capacity),
                total_bytes: 0,
            }),
            max_bytes,
        }
    }

    /// Store a source under a fresh key.
    ///
    /// Returns `None` when the PDF alone is larger than the byte budget.
    pub fn insert(&self, data: Arc<Vec<u8>>, name: Option<String>) -> Option<String> {
        let size = data.len();
        if size > self.max_bytes {
            tracing::warn!(bytes = size, max_bytes = self.max_bytes, "source too large to cache");
            return None;
        }

        let mut entries = self.entries.lock();
        let key = loop {
            let candidate = uuid::Uuid::new_v4().to_string();
            if !entries.lru.contains(&candidate) {
                break candidate;
            }
        };

        entries.evict_until_fits(size, self.max_bytes);
        // Capacity eviction happens inside `push`
        if let Some((_, replaced)) = entries.lru.push(key.clone(), CachedSource { data, name }) {
            entries.total_bytes = entries.total_bytes.saturating_sub(replaced.data.len());
        }
        entries.total_bytes += size;

        Some(key)
    }

    pub fn get(&self, key: &str) -> Option<CachedSource> {
        self.entries.lock().lru.get(key).cloned()
    }

    #[cfg(test)]
    fn contains(&self, key: &str) -> bool {
        self.entries.lock().lru.contains(key)
    }

    #[cfg(test)]
    fn remove(&self, key: &str) -> Option<CachedSource> {
        let mut entries = self.entries.lock();
        let removed = entries.lru.pop(key)?;
        entries.total_bytes = entries.total_bytes.saturating_sub(removed.data.len());
        Some(removed)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().lru.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().lru.is_empty()
    }

    pub fn total_bytes(&self) -> usize {
        self.entries.lock().total_bytes
    }
}
