//! Image holder that is filled in by the loader.

use std::path::Path;
use std::sync::Arc;

use image::DynamicImage;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::domain::entities::{ImageStatus, LoadTicket};
use crate::domain::errors::LoadError;
use crate::domain::ports::ImageConsumer;

#[derive(Debug, Default)]
struct TextureState {
    image: Option<Arc<DynamicImage>>,
    ticket: Option<LoadTicket>,
    status: ImageStatus,
    last_error: Option<LoadError>,
}

/// A remote image and its load state.
///
/// Shows the fallback until the loader delivers. On failure the current
/// image is kept and the error recorded. Deliveries for any ticket other
/// than the last one passed to [`set_loading`](Self::set_loading) are ignored.
pub struct RemoteTexture {
    url: String,
    state: Mutex<TextureState>,
}

impl RemoteTexture {
    /// Creates an empty texture for `url`.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            state: Mutex::new(TextureState::default()),
        }
    }

    /// Creates a texture showing `fallback` until loaded.
    #[must_use]
    pub fn with_fallback(url: impl Into<String>, fallback: Arc<DynamicImage>) -> Self {
        let texture = Self::new(url);
        texture.state.lock().image = Some(fallback);
        texture
    }

    /// Creates a texture whose fallback is decoded from `path`.
    ///
    /// # Errors
    /// Returns the decode or I/O error for the fallback file.
    pub fn with_fallback_path(
        url: impl Into<String>,
        path: &Path,
    ) -> Result<Self, image::ImageError> {
        let fallback = load_fallback(path)?;
        Ok(Self::with_fallback(url, fallback))
    }

    /// Requested URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Records the ticket issued for this texture's URL.
    pub fn set_loading(&self, ticket: LoadTicket) {
        let mut state = self.state.lock();
        state.ticket = Some(ticket);
        state.status = ImageStatus::Loading;
    }

    /// Ticket of the last request, if any.
    #[must_use]
    pub fn ticket(&self) -> Option<LoadTicket> {
        self.state.lock().ticket
    }

    /// Image to draw: the loaded one, else the fallback.
    #[must_use]
    pub fn current_image(&self) -> Option<Arc<DynamicImage>> {
        self.state.lock().image.clone()
    }

    /// Error from the last failed load.
    #[must_use]
    pub fn last_error(&self) -> Option<LoadError> {
        self.state.lock().last_error.clone()
    }

    /// Current load status.
    #[must_use]
    pub fn status(&self) -> ImageStatus {
        self.state.lock().status.clone()
    }

    /// True once the load finished either way.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        let state = self.state.lock();
        state.status.is_ready() || state.status.is_failed()
    }
}

impl TextureState {
    /// Only the most recently issued ticket may update the texture.
    fn accepts(&self, ticket: LoadTicket) -> bool {
        self.ticket == Some(ticket)
    }
}

impl ImageConsumer for RemoteTexture {
    fn on_image(&self, ticket: LoadTicket, image: DynamicImage) {
        let mut state = self.state.lock();
        if !state.accepts(ticket) {
            debug!(url = %self.url, %ticket, current = ?state.ticket, "Stale image ignored");
            return;
        }
        debug!(url = %self.url, %ticket, width = image.width(), height = image.height(), "Texture ready");
        state.image = Some(Arc::new(image));
        state.status = ImageStatus::Ready;
        state.last_error = None;
    }

    fn on_error(&self, ticket: LoadTicket, error: &LoadError) {
        let mut state = self.state.lock();
        if !state.accepts(ticket) {
            debug!(url = %self.url, %ticket, current = ?state.ticket, "Stale error ignored");
            return;
        }
        warn!(url = %self.url, %ticket, %error, "Texture failed to load");
        state.status = ImageStatus::Failed(error.to_string());
        state.last_error = Some(error.clone());
    }
}

impl std::fmt::Debug for RemoteTexture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("RemoteTexture")
            .field("url", &self.url)
            .field("ticket", &state.ticket)
            .field("has_image", &state.image.is_some())
            .field("status", &state.status)
            .finish_non_exhaustive()
    }
}

/// Decodes the fallback image once so textures can share it.
///
/// # Errors
/// Returns the decode or I/O error for `path`.
pub fn load_fallback(path: &Path) -> Result<Arc<DynamicImage>, image::ImageError> {
    image::open(path).map(Arc::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use tempfile::TempDir;

    fn solid(width: u32, color: [u8; 4]) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, 1, Rgba(color)))
    }

    #[test]
    fn test_starts_with_fallback() {
        let texture = RemoteTexture::with_fallback("https://x/a.png", Arc::new(solid(2, [0; 4])));

        assert_eq!(texture.status(), ImageStatus::NotStarted);
        assert_eq!(texture.current_image().unwrap().width(), 2);
        assert!(!texture.is_settled());
    }

    #[test]
    fn test_image_replaces_fallback() {
        let texture = RemoteTexture::with_fallback("https://x/a.png", Arc::new(solid(2, [0; 4])));
        texture.set_loading(LoadTicket::new(3));
        assert!(texture.status().is_loading());

        texture.on_image(LoadTicket::new(3), solid(7, [1, 2, 3, 255]));

        assert!(texture.status().is_ready());
        assert_eq!(texture.current_image().unwrap().width(), 7);
        assert_eq!(texture.ticket(), Some(LoadTicket::new(3)));
        assert!(texture.is_settled());
    }

    #[test]
    fn test_error_keeps_current_image() {
        let texture = RemoteTexture::with_fallback("https://x/a.png", Arc::new(solid(2, [0; 4])));
        texture.set_loading(LoadTicket::new(1));

        texture.on_error(LoadTicket::new(1), &LoadError::HttpStatus { status: 404 });

        assert_eq!(texture.current_image().unwrap().width(), 2);
        assert_eq!(texture.last_error(), Some(LoadError::HttpStatus { status: 404 }));
        assert!(matches!(texture.status(), ImageStatus::Failed(_)));
    }

    #[test]
    fn test_older_ticket_does_not_overwrite_newer() {
        let texture = RemoteTexture::new("https://x/a.png");
        texture.set_loading(LoadTicket::new(1));
        texture.set_loading(LoadTicket::new(2));

        texture.on_image(LoadTicket::new(2), solid(5, [1, 1, 1, 255]));
        texture.on_image(LoadTicket::new(1), solid(9, [2, 2, 2, 255]));
        texture.on_error(LoadTicket::new(1), &LoadError::EmptyBody);

        assert!(texture.status().is_ready());
        assert_eq!(texture.current_image().unwrap().width(), 5);
        assert!(texture.last_error().is_none());
    }

    #[test]
    fn test_unrequested_delivery_ignored() {
        let texture = RemoteTexture::new("https://x/a.png");

        texture.on_error(LoadTicket::new(4), &LoadError::UnknownFormat);

        assert_eq!(texture.status(), ImageStatus::NotStarted);
        assert!(!texture.is_settled());
    }

    #[test]
    fn test_failed_is_settled() {
        let texture = RemoteTexture::new("https://x/a.png");
        texture.set_loading(LoadTicket::new(0));

        texture.on_error(LoadTicket::new(0), &LoadError::EmptyBody);

        assert!(texture.status().is_failed());
        assert!(texture.is_settled());
    }

    #[test]
    fn test_fallback_from_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("download.png");
        solid(4, [9, 9, 9, 255]).save(&path).unwrap();

        let texture = RemoteTexture::with_fallback_path("https://x/a.png", &path).unwrap();

        assert_eq!(texture.current_image().unwrap().width(), 4);
    }

    #[test]
    fn test_missing_fallback_is_an_error() {
        let dir = TempDir::new().unwrap();

        assert!(RemoteTexture::with_fallback_path("u", &dir.path().join("nope.png")).is_err());
    }
}
