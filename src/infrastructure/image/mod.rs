//! Image handling infrastructure.
//!
//! This module provides:
//! - Cache backends (disabled, cost-bounded memory, disk)
//! - HTTP fetching, TIFF transcoding and decoding
//! - The loader that ties them to a per-frame drain

pub mod backend;
pub mod decoder;
pub mod disk_cache;
pub mod http_fetcher;
pub mod loader;
pub mod memory_cache;
pub mod noop_cache;
pub mod pending;
pub mod transcoder;
mod varint;

pub use backend::build_cache;
pub use decoder::decode_image;
pub use disk_cache::DiskImageCache;
pub use http_fetcher::HttpImageFetcher;
pub use loader::{DrainOutcome, ImageLoaderConfig, RemoteImageLoader};
pub use memory_cache::{CacheStats, MemoryImageCache};
pub use noop_cache::NoopImageCache;
pub use pending::PendingResults;
pub use transcoder::{TranscodeError, tiff_to_jpeg};
