//! Remote image loading with pluggable caching.
//!
//! Images are requested by URL and answered with a ticket. Downloads run on
//! the tokio runtime; results are decoded and handed to their consumers when
//! the host calls [`RemoteImageLoader::process`] once per frame.
//!
//! [`RemoteImageLoader::process`]: infrastructure::RemoteImageLoader::process

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing caches, fetching, decoding and configuration.
pub mod infrastructure;
/// Presentation layer containing image consumers.
pub mod presentation;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "remote-image";
