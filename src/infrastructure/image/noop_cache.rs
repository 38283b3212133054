//! Cache backend used when caching is disabled.

use crate::domain::entities::RawImage;
use crate::domain::ports::{CacheError, CacheResult, ImageCachePort};

/// Stores nothing; every lookup misses.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopImageCache;

impl ImageCachePort for NoopImageCache {
    fn set(&self, _key: &str, _value: &RawImage) -> CacheResult<()> {
        Ok(())
    }

    fn get(&self, _key: &str) -> CacheResult<RawImage> {
        Err(CacheError::Miss)
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}
