//! TIFF to JPEG transcoding.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use thiserror::Error;

use crate::domain::errors::LoadError;

/// Quality used for re-encoded JPEGs.
pub const JPEG_QUALITY: u8 = 75;

/// Transcoding failures.
#[derive(Debug, Error)]
pub enum TranscodeError {
    /// Source bytes are not a readable TIFF.
    #[error("error reading tiff: {0}")]
    Decode(String),
    /// Decoded pixels could not be written as JPEG.
    #[error("error encoding jpeg: {0}")]
    Encode(String),
}

impl From<TranscodeError> for LoadError {
    fn from(err: TranscodeError) -> Self {
        Self::decode(format!("error converting tiff: {err}"))
    }
}

/// Fully decodes a TIFF and re-encodes it as JPEG.
///
/// JPEG carries no alpha, so pixels are flattened to RGB8 first.
///
/// # Errors
/// Returns [`TranscodeError`] if decoding or encoding fails.
pub fn tiff_to_jpeg(tiff: &[u8]) -> Result<Vec<u8>, TranscodeError> {
    let decoded = image::load_from_memory_with_format(tiff, image::ImageFormat::Tiff)
        .map_err(|e| TranscodeError::Decode(e.to_string()))?;

    let mut jpeg = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY);
    image::DynamicImage::ImageRgb8(decoded.to_rgb8())
        .write_with_encoder(encoder)
        .map_err(|e| TranscodeError::Encode(e.to_string()))?;

    Ok(jpeg.into_inner())
}
