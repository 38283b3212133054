//! Domain layer with core entities, errors, services and port definitions.

/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;
/// Pure domain services.
pub mod services;

pub use entities::{ImageFormat, ImageResult, ImageStatus, LoadTicket, RawImage};
pub use errors::LoadError;
pub use ports::{CacheError, CacheResult, FetchResponse, ImageCachePort, ImageConsumer, ImageFetcherPort};
pub use services::resolve_format;
