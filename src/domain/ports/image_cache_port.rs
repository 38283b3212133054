//! Port definition for image caching.

use crate::domain::entities::RawImage;

/// Result type for cache operations.
pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Errors that can occur during cache operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    /// Key not present. Expected control flow, not a failure.
    #[error("cache miss")]
    Miss,
    /// Stored entry could not be decoded.
    #[error("invalid cache entry: {0}")]
    DecodeError(String),
    /// I/O error during cache operation.
    #[error("IO error: {0}")]
    IoError(String),
}

impl CacheError {
    /// Returns true for a plain miss.
    #[must_use]
    pub const fn is_miss(&self) -> bool {
        matches!(self, Self::Miss)
    }
}

/// Port for raw image caching keyed by URL.
///
/// Implementations must be thread-safe: `get` runs on the caller's thread
/// while `set` runs from fetch tasks.
pub trait ImageCachePort: Send + Sync {
    /// Stores an entry, replacing any previous entry under `key`.
    ///
    /// # Errors
    /// Returns error if the backend fails to persist the entry.
    fn set(&self, key: &str, value: &RawImage) -> CacheResult<()>;

    /// Looks up an entry.
    ///
    /// # Errors
    /// Returns [`CacheError::Miss`] if absent, other variants on failure.
    fn get(&self, key: &str) -> CacheResult<RawImage>;

    /// Short backend name for logs.
    fn name(&self) -> &'static str;
}

#[cfg(test)]
#[allow(dead_code)]
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Cache whose every operation fails with an I/O error.
    #[derive(Default)]
    pub struct FailingCache {
        pub sets: AtomicUsize,
    }

    impl ImageCachePort for FailingCache {
        fn set(&self, _key: &str, _value: &RawImage) -> CacheResult<()> {
            self.sets.fetch_add(1, Ordering::SeqCst);
            Err(CacheError::IoError("mock write failure".to_string()))
        }

        fn get(&self, _key: &str) -> CacheResult<RawImage> {
            Err(CacheError::IoError("mock read failure".to_string()))
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }
}
