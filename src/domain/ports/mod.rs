mod image_cache_port;
mod image_consumer_port;
mod image_fetcher_port;

pub use image_cache_port::{CacheError, CacheResult, ImageCachePort};
pub use image_consumer_port::ImageConsumer;
pub use image_fetcher_port::{FetchResponse, ImageFetcherPort};
