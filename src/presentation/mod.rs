//! Presentation layer with image consumers.

/// Texture slot filled in by the loader.
pub mod remote_texture;

pub use remote_texture::{RemoteTexture, load_fallback};
