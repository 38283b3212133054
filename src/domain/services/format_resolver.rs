//! Classifies fetched images by content type or URL extension.

use tracing::trace;
use url::Url;

use crate::domain::entities::ImageFormat;

impl ImageFormat {
    /// Resolves a `Content-Type` header value.
    ///
    /// Matching is case-insensitive and exact; parameters such as
    /// `; charset=` are not stripped.
    #[must_use]
    pub fn from_content_type(content_type: &str) -> Self {
        match content_type.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" => Self::Jpeg,
            "image/png" => Self::Png,
            "image/bmp" => Self::Bmp,
            "image/webp" => Self::Webp,
            "image/tiff" => Self::Tiff,
            "image/svg+xml" | "image/svg" => Self::Svg,
            "image/x-tga" | "image/x-targa" => Self::Tga,
            _ => Self::Unknown,
        }
    }

    /// Resolves the file extension of a URL's path component.
    #[must_use]
    pub fn from_url_extension(url: &str) -> Self {
        let Ok(parsed) = Url::parse(url) else {
            trace!(url, "Unable to parse URL");
            return Self::Unknown;
        };

        let path = parsed.path();
        let Some(dot) = path.rfind('.') else {
            trace!(url, "No dot in path");
            return Self::Unknown;
        };

        match path[dot + 1..].to_ascii_lowercase().as_str() {
            "png" => Self::Png,
            "jpg" | "jpeg" => Self::Jpeg,
            "webp" => Self::Webp,
            "tif" | "tiff" => Self::Tiff,
            "bmp" => Self::Bmp,
            "svg" => Self::Svg,
            "tga" | "tpic" => Self::Tga,
            _ => Self::Unknown,
        }
    }
}

/// Resolves the format of a response: header first, extension as fallback.
#[must_use]
pub fn resolve_format(content_type: Option<&str>, url: &str) -> ImageFormat {
    let by_header = content_type.map_or(ImageFormat::Unknown, ImageFormat::from_content_type);
    if by_header.is_unknown() {
        ImageFormat::from_url_extension(url)
    } else {
        by_header
    }
}
