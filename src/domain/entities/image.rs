//! Domain types for remote image loading.

use bytes::Bytes;

use crate::domain::errors::LoadError;

/// Identifies one load request from request to delivery.
///
/// Tickets are issued in strictly increasing order by a single loader and
/// are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct LoadTicket(u64);

impl LoadTicket {
    /// Creates a ticket from its raw number.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw ticket number.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Returns the ticket that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for LoadTicket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Encoding of a fetched image, used to pick a decoder.
///
/// The discriminants are the codes persisted by the disk cache and must not
/// change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImageFormat {
    /// Could not classify.
    #[default]
    Unknown = 0,
    /// Portable Network Graphics.
    Png = 1,
    /// JPEG.
    Jpeg = 2,
    /// Windows bitmap.
    Bmp = 3,
    /// `WebP`.
    Webp = 4,
    /// TIFF. Never leaves the loader: transcoded to JPEG first.
    Tiff = 5,
    /// Scalable vector graphics.
    Svg = 6,
    /// Truevision TGA.
    Tga = 7,
}

impl ImageFormat {
    /// Every format tag, `Unknown` included.
    pub const ALL: [Self; 8] = [
        Self::Unknown,
        Self::Png,
        Self::Jpeg,
        Self::Bmp,
        Self::Webp,
        Self::Tiff,
        Self::Svg,
        Self::Tga,
    ];

    /// Returns the persisted numeric code.
    #[must_use]
    pub const fn code(self) -> i64 {
        self as i64
    }

    /// Maps a persisted code back to a format. Unrecognized codes are `Unknown`.
    #[must_use]
    pub const fn from_code(code: i64) -> Self {
        match code {
            1 => Self::Png,
            2 => Self::Jpeg,
            3 => Self::Bmp,
            4 => Self::Webp,
            5 => Self::Tiff,
            6 => Self::Svg,
            7 => Self::Tga,
            _ => Self::Unknown,
        }
    }

    /// Returns true if the format cannot be handed to the decoder as-is.
    #[must_use]
    pub const fn needs_transcode(self) -> bool {
        matches!(self, Self::Tiff)
    }

    /// Returns true for the `Unknown` sentinel.
    #[must_use]
    pub const fn is_unknown(self) -> bool {
        matches!(self, Self::Unknown)
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Unknown => "unknown",
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Bmp => "bmp",
            Self::Webp => "webp",
            Self::Tiff => "tiff",
            Self::Svg => "svg",
            Self::Tga => "tga",
        };
        f.write_str(name)
    }
}

/// Raw, still-encoded image bytes plus their format.
///
/// This is what the caches store and what a successful fetch produces.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawImage {
    /// Encoded image payload.
    pub data: Bytes,
    /// Encoding of `data`.
    pub format: ImageFormat,
}

impl RawImage {
    /// Creates a raw image from any byte container.
    #[must_use]
    pub fn new(data: impl Into<Bytes>, format: ImageFormat) -> Self {
        Self {
            data: data.into(),
            format,
        }
    }

    /// Payload length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Outcome of one load request, moved from the fetch task to the drain.
pub type ImageResult = Result<RawImage, LoadError>;

/// Status of an image slot in the loading pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ImageStatus {
    /// No URL requested yet.
    #[default]
    NotStarted,
    /// A ticket is in flight.
    Loading,
    /// The image has been decoded and assigned.
    Ready,
    /// Loading failed with an error message.
    Failed(String),
}

impl ImageStatus {
    /// Returns true if the image is ready for rendering.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Returns true if the image is currently being loaded.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Returns true if loading failed.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}
