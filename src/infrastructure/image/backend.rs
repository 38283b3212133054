//! Startup selection of the cache backend.

use std::sync::Arc;

use tracing::info;

use super::disk_cache::DiskImageCache;
use super::memory_cache::MemoryImageCache;
use super::noop_cache::NoopImageCache;
use crate::domain::ports::{CacheResult, ImageCachePort};
use crate::infrastructure::config::{CacheBackend, CacheConfig};

/// Builds the cache named by `config`.
///
/// # Errors
/// Returns error if the filesystem backend cannot create its directory.
pub fn build_cache(config: &CacheConfig) -> CacheResult<Arc<dyn ImageCachePort>> {
    let cache: Arc<dyn ImageCachePort> = match config.backend {
        CacheBackend::Disabled => Arc::new(NoopImageCache),
        CacheBackend::Memory => Arc::new(MemoryImageCache::new(config.max_cost, config.max_entries)),
        CacheBackend::Filesystem => Arc::new(match &config.directory {
            Some(dir) => DiskImageCache::new(dir.clone())?,
            None => DiskImageCache::default_location()?,
        }),
    };
    info!(backend = cache.name(), "Image cache selected");
    Ok(cache)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{ImageFormat, RawImage};
    use tempfile::TempDir;

    fn config(backend: CacheBackend) -> CacheConfig {
        CacheConfig {
            backend,
            ..CacheConfig::default()
        }
    }

    #[test]
    fn test_disabled_never_hits() {
        let cache = build_cache(&config(CacheBackend::Disabled)).unwrap();
        cache.set("k", &RawImage::new(vec![1, 2], ImageFormat::Png)).unwrap();

        assert_eq!(cache.name(), "disabled");
        assert!(cache.get("k").unwrap_err().is_miss());
    }

    #[test]
    fn test_memory_backend_uses_bounds() {
        let mut cfg = config(CacheBackend::Memory);
        cfg.max_cost = 4;
        let cache = build_cache(&cfg).unwrap();

        cache.set("big", &RawImage::new(vec![0; 5], ImageFormat::Png)).unwrap();
        cache.set("small", &RawImage::new(vec![0; 3], ImageFormat::Png)).unwrap();

        assert_eq!(cache.name(), "memory");
        assert!(cache.get("big").unwrap_err().is_miss());
        assert_eq!(cache.get("small").unwrap().len(), 3);
    }

    #[test]
    fn test_filesystem_backend_uses_directory() {
        let dir = TempDir::new().unwrap();
        let mut cfg = config(CacheBackend::Filesystem);
        cfg.directory = Some(dir.path().join("images"));

        let cache = build_cache(&cfg).unwrap();
        cache.set("k", &RawImage::new(vec![7; 8], ImageFormat::Webp)).unwrap();

        assert_eq!(cache.name(), "filesystem");
        assert!(dir.path().join("images").is_dir());
        assert_eq!(cache.get("k").unwrap().format, ImageFormat::Webp);
    }
}
