//! Infrastructure layer with external service adapters.

/// Application configuration.
pub mod config;
/// Image handling (caching, fetching, decoding, loading).
pub mod image;

pub use config::{AppConfig, CacheBackend, CacheConfig, CliArgs, LogLevel, StorageManager};
pub use image::{
    CacheStats, DiskImageCache, DrainOutcome, HttpImageFetcher, ImageLoaderConfig,
    MemoryImageCache, NoopImageCache, RemoteImageLoader, build_cache, decode_image,
};
