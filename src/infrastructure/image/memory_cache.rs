//! In-memory cost-bounded image cache implementation.

use std::sync::atomic::{AtomicU64, Ordering};

use lru::LruCache;
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::domain::entities::RawImage;
use crate::domain::ports::{CacheError, CacheResult, ImageCachePort};

/// Default total payload budget (100 MB).
pub const DEFAULT_MAX_COST: u64 = 100_000_000;

/// Default maximum number of entries.
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

struct Inner {
    entries: LruCache<String, RawImage>,
    total_cost: u64,
}

/// In-memory LRU cache for raw image bytes.
///
/// The cost of an entry is its payload length. Writes are best-effort: an
/// entry larger than the whole budget is dropped, and older entries are
/// evicted until both the cost and entry bounds hold.
pub struct MemoryImageCache {
    inner: Mutex<Inner>,
    max_cost: u64,
    max_entries: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MemoryImageCache {
    /// Creates a new cache with the given bounds.
    #[must_use]
    pub fn new(max_cost: u64, max_entries: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: LruCache::unbounded(),
                total_cost: 0,
            }),
            max_cost,
            max_entries: max_entries.max(1),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Creates a new cache with the default bounds.
    #[must_use]
    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_MAX_COST, DEFAULT_MAX_ENTRIES)
    }

    /// Returns cache statistics.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        let inner = self.inner.lock();
        CacheStats {
            hits,
            misses,
            hit_rate,
            size: inner.entries.len(),
            cost: inner.total_cost,
        }
    }

    /// Returns the number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Returns true if the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the summed payload length of all entries.
    #[must_use]
    pub fn total_cost(&self) -> u64 {
        self.inner.lock().total_cost
    }

    /// Clears all entries.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.total_cost = 0;
        debug!("Cleared memory image cache");
    }

    fn evict_over_budget(&self, inner: &mut Inner) {
        while inner.total_cost > self.max_cost || inner.entries.len() > self.max_entries {
            let Some((key, evicted)) = inner.entries.pop_lru() else {
                break;
            };
            inner.total_cost -= evicted.len() as u64;
            trace!(key = %key, cost = evicted.len(), "Evicted image from memory cache");
        }
    }
}

impl Default for MemoryImageCache {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

/// Statistics about cache performance.
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Hit rate as a percentage.
    pub hit_rate: f64,
    /// Current number of cached images.
    pub size: usize,
    /// Current summed payload length.
    pub cost: u64,
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cache: {} images ({} bytes), {:.1}% hit rate ({} hits, {} misses)",
            self.size, self.cost, self.hit_rate, self.hits, self.misses
        )
    }
}

impl ImageCachePort for MemoryImageCache {
    fn set(&self, key: &str, value: &RawImage) -> CacheResult<()> {
        let cost = value.len() as u64;
        if cost > self.max_cost {
            debug!(key, cost, max_cost = self.max_cost, "Image exceeds memory cache budget, dropped");
            return Ok(());
        }

        let mut inner = self.inner.lock();
        if let Some(existing) = inner.entries.get(key)
            && existing.len() == value.len()
        {
            trace!(key, "Same-size update ignored");
            return Ok(());
        }

        if let Some(previous) = inner.entries.put(key.to_string(), value.clone()) {
            inner.total_cost -= previous.len() as u64;
        }
        inner.total_cost += cost;
        debug!(key, cost, "Storing image in memory cache");

        self.evict_over_budget(&mut inner);
        Ok(())
    }

    fn get(&self, key: &str) -> CacheResult<RawImage> {
        let mut inner = self.inner.lock();
        if let Some(raw) = inner.entries.get(key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(key, "Memory cache hit");
            Ok(raw.clone())
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            trace!(key, "Memory cache miss");
            Err(CacheError::Miss)
        }
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ImageFormat;

    fn raw(bytes: &[u8], format: ImageFormat) -> RawImage {
        RawImage::new(bytes.to_vec(), format)
    }

    #[test]
    fn test_cache_set_and_get() {
        let cache = MemoryImageCache::new(1024, 10);
        let value = raw(b"jpeg payload", ImageFormat::Jpeg);

        cache.set("https://x/a.jpg", &value).unwrap();

        assert_eq!(cache.get("https://x/a.jpg").unwrap(), value);
    }

    #[test]
    fn test_cache_miss() {
        let cache = MemoryImageCache::new(1024, 10);

        assert_eq!(cache.get("nonexistent"), Err(CacheError::Miss));
    }

    #[test]
    fn test_cost_based_eviction() {
        let cache = MemoryImageCache::new(10, 100);

        cache.set("a", &raw(b"1234", ImageFormat::Png)).unwrap();
        cache.set("b", &raw(b"1234", ImageFormat::Png)).unwrap();
        // promote "a" so "b" is the least recently used
        let _ = cache.get("a");
        cache.set("c", &raw(b"1234", ImageFormat::Png)).unwrap();

        assert!(cache.get("a").is_ok());
        assert_eq!(cache.get("b"), Err(CacheError::Miss));
        assert!(cache.get("c").is_ok());
        assert_eq!(cache.total_cost(), 8);
    }

    #[test]
    fn test_entry_bound_eviction() {
        let cache = MemoryImageCache::new(1024, 2);

        cache.set("a", &raw(b"1", ImageFormat::Png)).unwrap();
        cache.set("b", &raw(b"2", ImageFormat::Png)).unwrap();
        cache.set("c", &raw(b"3", ImageFormat::Png)).unwrap();

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a"), Err(CacheError::Miss));
    }

    #[test]
    fn test_oversized_entry_dropped() {
        let cache = MemoryImageCache::new(4, 10);

        assert!(cache.set("big", &raw(b"123456", ImageFormat::Png)).is_ok());

        assert_eq!(cache.get("big"), Err(CacheError::Miss));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_update_requires_length_change() {
        let cache = MemoryImageCache::new(1024, 10);

        cache.set("k", &raw(b"aaaa", ImageFormat::Png)).unwrap();
        cache.set("k", &raw(b"bbbb", ImageFormat::Jpeg)).unwrap();
        assert_eq!(cache.get("k").unwrap(), raw(b"aaaa", ImageFormat::Png));

        cache.set("k", &raw(b"cccccc", ImageFormat::Jpeg)).unwrap();
        assert_eq!(cache.get("k").unwrap(), raw(b"cccccc", ImageFormat::Jpeg));
        assert_eq!(cache.total_cost(), 6);
    }

    #[test]
    fn test_cache_stats() {
        let cache = MemoryImageCache::new(1024, 10);
        cache.set("k", &raw(b"data", ImageFormat::Bmp)).unwrap();

        let _ = cache.get("k");
        let _ = cache.get("missing");

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.size, 1);
        assert_eq!(stats.cost, 4);
    }

    #[test]
    fn test_clear() {
        let cache = MemoryImageCache::new(1024, 10);
        cache.set("k", &raw(b"data", ImageFormat::Bmp)).unwrap();

        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(cache.total_cost(), 0);
    }
}
