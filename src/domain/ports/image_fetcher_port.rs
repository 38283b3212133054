//! Port for downloading image bytes.

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::errors::LoadError;

/// Raw response of a completed GET request.
#[derive(Debug, Clone, Default)]
pub struct FetchResponse {
    /// HTTP status code.
    pub status: u16,
    /// `Content-Type` header, if present and valid UTF-8.
    pub content_type: Option<String>,
    /// Full response body.
    pub body: Bytes,
}

impl FetchResponse {
    /// Returns true for statuses in `[100, 300)`.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 100 && self.status < 300
    }
}

/// Port for fetching a URL.
///
/// Only transport failures are errors; status checks belong to the caller.
#[async_trait]
pub trait ImageFetcherPort: Send + Sync {
    /// Performs a GET request and reads the whole body.
    async fn fetch(&self, url: &str) -> Result<FetchResponse, LoadError>;
}

#[cfg(test)]
#[allow(dead_code)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use parking_lot::Mutex;

    /// Fetcher serving canned responses and counting requests.
    #[derive(Default)]
    pub struct MockImageFetcher {
        responses: Mutex<HashMap<String, Result<FetchResponse, LoadError>>>,
        delay: Mutex<Option<Duration>>,
        calls: AtomicUsize,
    }

    impl MockImageFetcher {
        /// Creates an empty mock. Unknown URLs answer 404.
        pub fn new() -> Self {
            Self::default()
        }

        /// Registers a response for `url`.
        pub fn respond(&self, url: &str, status: u16, content_type: Option<&str>, body: &[u8]) {
            self.responses.lock().insert(
                url.to_string(),
                Ok(FetchResponse {
                    status,
                    content_type: content_type.map(str::to_string),
                    body: Bytes::copy_from_slice(body),
                }),
            );
        }

        /// Registers a transport failure for `url`.
        pub fn fail(&self, url: &str, message: &str) {
            self.responses
                .lock()
                .insert(url.to_string(), Err(LoadError::network(message)));
        }

        /// Delays every response.
        pub fn set_delay(&self, delay: Duration) {
            *self.delay.lock() = Some(delay);
        }

        /// Number of fetches performed so far.
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ImageFetcherPort for MockImageFetcher {
        async fn fetch(&self, url: &str) -> Result<FetchResponse, LoadError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let delay = *self.delay.lock();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            self.responses.lock().get(url).cloned().unwrap_or(Ok(FetchResponse {
                status: 404,
                content_type: None,
                body: Bytes::new(),
            }))
        }
    }
}
