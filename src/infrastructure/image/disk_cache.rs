//! Disk-based image cache for persistence across sessions.
//!
//! Each entry is one file named after a 128-bit hash of the URL. The file
//! starts with a fixed-width header holding the format code as a zig-zag
//! varint, zero padded, followed by the raw image bytes.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, trace, warn};

use super::varint::{self, MAX_VARINT_LEN};
use crate::domain::entities::{ImageFormat, RawImage};
use crate::domain::ports::{CacheError, CacheResult, ImageCachePort};

/// Width of the leading format field.
pub const HEADER_LEN: usize = MAX_VARINT_LEN;

/// File suffix for cache entries.
pub const CACHE_EXTENSION: &str = "cache";

/// Disk-based image cache that persists raw image bytes and their format.
///
/// No eviction and no cross-process locking: the last writer wins.
#[derive(Debug, Clone)]
pub struct DiskImageCache {
    cache_dir: PathBuf,
}

impl DiskImageCache {
    /// Creates a new disk cache in the specified directory.
    ///
    /// # Errors
    /// Returns error if cache directory cannot be created.
    pub fn new(cache_dir: PathBuf) -> CacheResult<Self> {
        fs::create_dir_all(&cache_dir)
            .map_err(|e| CacheError::IoError(format!("error creating cache base dir: {e}")))?;
        debug!(path = %cache_dir.display(), "Disk image cache ready");
        Ok(Self { cache_dir })
    }

    /// Creates a cache in the default per-user data location.
    ///
    /// # Errors
    /// Returns error if cache directory cannot be created.
    pub fn default_location() -> CacheResult<Self> {
        Self::new(default_cache_dir())
    }

    /// Returns the cache directory.
    #[must_use]
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Returns the path for a cached URL.
    #[must_use]
    pub fn cache_path(&self, key: &str) -> PathBuf {
        self.cache_dir
            .join(format!("{}.{CACHE_EXTENSION}", cache_file_stem(key)))
    }

    /// Checks if an entry exists for `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.cache_path(key).is_file()
    }

    /// Removes the entry for `key`, if any.
    ///
    /// # Errors
    /// Returns error if the file exists but cannot be removed.
    pub fn remove(&self, key: &str) -> CacheResult<()> {
        match fs::remove_file(self.cache_path(key)) {
            Ok(()) => {
                debug!(key, "Evicted from disk cache");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CacheError::IoError(format!("error removing cache entry: {e}"))),
        }
    }

    /// Removes every cache entry in the directory.
    ///
    /// # Errors
    /// Returns error if cache directory cannot be read.
    pub fn clear(&self) -> CacheResult<()> {
        let entries = fs::read_dir(&self.cache_dir)
            .map_err(|e| CacheError::IoError(format!("Failed to read cache dir: {e}")))?;

        for entry in entries {
            let entry = entry.map_err(|e| CacheError::IoError(format!("Failed to read entry: {e}")))?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == CACHE_EXTENSION)
                && let Err(e) = fs::remove_file(&path)
            {
                warn!(path = %path.display(), error = %e, "Failed to remove cache file");
            }
        }
        debug!("Cleared disk cache");
        Ok(())
    }
}

impl ImageCachePort for DiskImageCache {
    fn set(&self, key: &str, value: &RawImage) -> CacheResult<()> {
        let path = self.cache_path(key);
        let mut contents = vec![0u8; HEADER_LEN + value.len()];
        varint::encode(value.format.code(), &mut contents[..HEADER_LEN]);
        contents[HEADER_LEN..].copy_from_slice(&value.data);

        // Readers see the old entry or the whole new one, never a partial file.
        let mut temp_file = tempfile::NamedTempFile::new_in(&self.cache_dir)
            .map_err(|e| CacheError::IoError(format!("error creating cache temp file: {e}")))?;
        temp_file
            .write_all(&contents)
            .map_err(|e| CacheError::IoError(format!("error writing cache: {e}")))?;
        temp_file
            .persist(&path)
            .map_err(|e| CacheError::IoError(format!("error persisting cache entry: {e}")))?;

        debug!(key, path = %path.display(), size = value.len(), "Stored image in disk cache");
        Ok(())
    }

    fn get(&self, key: &str) -> CacheResult<RawImage> {
        let path = self.cache_path(key);
        let mut contents = match fs::read(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                trace!(key, "Disk cache miss");
                return Err(CacheError::Miss);
            }
            Err(e) => return Err(CacheError::IoError(format!("error reading cache: {e}"))),
        };

        if contents.len() < HEADER_LEN {
            return Err(CacheError::DecodeError(format!(
                "entry is {} bytes, shorter than its header",
                contents.len()
            )));
        }

        let (code, _) = varint::decode(&contents[..HEADER_LEN])
            .map_err(|e| CacheError::DecodeError(format!("unable to read format: {e}")))?;

        trace!(key, path = %path.display(), "Disk cache hit");
        let data = contents.split_off(HEADER_LEN);
        Ok(RawImage::new(data, ImageFormat::from_code(code)))
    }

    fn name(&self) -> &'static str {
        "filesystem"
    }
}

/// Lowercase hex of the first 128 bits of SHA-256 over the key.
#[must_use]
pub fn cache_file_stem(key: &str) -> String {
    let digest = Sha256::digest(key.as_bytes());
    hex::encode(&digest[..16])
}

/// Returns the default cache directory path.
fn default_cache_dir() -> PathBuf {
    directories::ProjectDirs::from("org", "remote-image", "remote-image").map_or_else(
        || std::env::temp_dir().join("remote-image").join("RemoteImages"),
        |dirs| dirs.data_dir().join("RemoteImages"),
    )
}
