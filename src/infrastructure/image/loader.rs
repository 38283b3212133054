//! Remote image loading orchestrator.
//!
//! Requests are answered from the cache synchronously when possible;
//! otherwise a fetch task is spawned on the runtime. Every task ends by
//! recording its result in [`PendingResults`], and the host's per-frame
//! [`RemoteImageLoader::process`] call decodes and delivers what is ready.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tokio::sync::Semaphore;
use tokio::task::AbortHandle;
use tracing::{debug, trace, warn};

use super::decoder::decode_image;
use super::http_fetcher::DEFAULT_TIMEOUT_SECS;
use super::pending::{PendingResults, TakeOutcome};
use super::transcoder::tiff_to_jpeg;
use crate::domain::entities::{ImageFormat, ImageResult, LoadTicket, RawImage};
use crate::domain::errors::LoadError;
use crate::domain::ports::{CacheError, ImageCachePort, ImageConsumer, ImageFetcherPort};
use crate::domain::services::resolve_format;

/// Configuration for the image loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageLoaderConfig {
    /// Maximum concurrent downloads.
    pub max_concurrent_fetches: usize,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ImageLoaderConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: 8,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ImageLoaderConfig {
    /// Request timeout as a duration.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// What a call to [`RemoteImageLoader::process`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    /// Nothing was ready.
    Idle,
    /// A fetch task was mid-insert; retry next frame.
    Contended,
    /// Ready results were delivered.
    Drained {
        /// Images handed to their consumers.
        delivered: usize,
        /// Errors handed to their consumers.
        failed: usize,
    },
}

type InFlight = Arc<Mutex<HashMap<LoadTicket, AbortHandle>>>;

/// Fetches, caches and delivers remote images.
///
/// Owned by the thread that drives [`process`](Self::process); requests and
/// draining both take `&mut self`.
pub struct RemoteImageLoader {
    cache: Arc<dyn ImageCachePort>,
    fetcher: Arc<dyn ImageFetcherPort>,
    pending: Arc<PendingResults>,
    consumers: HashMap<LoadTicket, Arc<dyn ImageConsumer>>,
    in_flight: InFlight,
    semaphore: Arc<Semaphore>,
    runtime: Handle,
    next_ticket: LoadTicket,
}

impl std::fmt::Debug for RemoteImageLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteImageLoader")
            .field("cache", &self.cache.name())
            .field("next_ticket", &self.next_ticket)
            .field("registered", &self.consumers.len())
            .finish_non_exhaustive()
    }
}

impl RemoteImageLoader {
    /// Creates a loader spawning its fetch tasks on `runtime`.
    #[must_use]
    pub fn new(
        config: &ImageLoaderConfig,
        cache: Arc<dyn ImageCachePort>,
        fetcher: Arc<dyn ImageFetcherPort>,
        runtime: Handle,
    ) -> Self {
        debug!(cache = cache.name(), ?config, "Creating remote image loader");
        Self {
            cache,
            fetcher,
            pending: Arc::new(PendingResults::new()),
            consumers: HashMap::new(),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            semaphore: Arc::new(Semaphore::new(config.max_concurrent_fetches.max(1))),
            runtime,
            next_ticket: LoadTicket::default(),
        }
    }

    /// Requests `url` on behalf of `consumer` and returns its ticket.
    ///
    /// Never blocks on the network. The outcome reaches `consumer` during a
    /// later [`process`](Self::process) call.
    pub fn load_remote_image(&mut self, consumer: Arc<dyn ImageConsumer>, url: &str) -> LoadTicket {
        let ticket = self.next_ticket;
        self.next_ticket = ticket.next();
        self.consumers.insert(ticket, consumer);

        if url.trim().is_empty() {
            self.pending.insert(ticket, Err(LoadError::invalid_url(url)));
            return ticket;
        }

        match self.cache.get(url) {
            Ok(raw) => {
                trace!(ticket = %ticket, url, cache = self.cache.name(), "Cache hit");
                self.pending.insert(ticket, Ok(raw));
                return ticket;
            }
            Err(CacheError::Miss) => {}
            Err(e) => {
                warn!(ticket = %ticket, url, cache = self.cache.name(), error = %e, "cache error");
            }
        }

        self.spawn_fetch(ticket, url.to_string());
        ticket
    }

    /// Decodes every ready result and hands it to its consumer.
    ///
    /// Meant to be called once per host frame. Never blocks: if a fetch
    /// task is recording its result, nothing is touched until the next call.
    pub fn process(&mut self, delta: Duration) -> DrainOutcome {
        let results = match self.pending.try_take_all() {
            TakeOutcome::Empty => return DrainOutcome::Idle,
            TakeOutcome::Contended => {
                trace!("Pending results locked, retrying next frame");
                return DrainOutcome::Contended;
            }
            TakeOutcome::Ready(results) => results,
        };

        trace!(?delta, count = results.len(), "Draining loaded images");

        let mut delivered = 0;
        let mut failed = 0;
        for (ticket, result) in results {
            let Some(consumer) = self.consumers.remove(&ticket) else {
                debug!(ticket = %ticket, "No consumer for loaded image, dropped");
                continue;
            };

            match result.and_then(|raw| decode_image(&raw)) {
                Ok(image) => {
                    consumer.on_image(ticket, image);
                    delivered += 1;
                }
                Err(e) => {
                    debug!(ticket = %ticket, error = %e, "Image load failed");
                    consumer.on_error(ticket, &e);
                    failed += 1;
                }
            }
        }

        DrainOutcome::Drained { delivered, failed }
    }

    /// Aborts the fetch for `ticket` and forgets its consumer.
    ///
    /// Returns true if the ticket was still awaiting delivery.
    pub fn cancel(&mut self, ticket: LoadTicket) -> bool {
        if let Some(handle) = self.in_flight.lock().remove(&ticket) {
            handle.abort();
        }
        let was_registered = self.consumers.remove(&ticket).is_some();
        if was_registered {
            debug!(ticket = %ticket, "Cancelled image load");
        }
        was_registered
    }

    /// Aborts every in-flight fetch and forgets all consumers.
    pub fn cancel_all(&mut self) {
        let mut in_flight = self.in_flight.lock();
        let count = in_flight.len();
        for (_, handle) in in_flight.drain() {
            handle.abort();
        }
        self.consumers.clear();
        if count > 0 {
            debug!(count, "Cancelled all pending image loads");
        }
    }

    /// Number of fetch tasks that have not finished.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.lock().len()
    }

    /// Number of tickets still awaiting delivery.
    #[must_use]
    pub fn registered(&self) -> usize {
        self.consumers.len()
    }

    /// Returns the configured cache backend.
    #[must_use]
    pub fn cache(&self) -> &Arc<dyn ImageCachePort> {
        &self.cache
    }

    fn spawn_fetch(&self, ticket: LoadTicket, url: String) {
        let task = FetchTask {
            cache: self.cache.clone(),
            fetcher: self.fetcher.clone(),
            pending: self.pending.clone(),
            semaphore: self.semaphore.clone(),
            in_flight: self.in_flight.clone(),
        };

        // Held across spawn so the task cannot deregister before it is registered.
        let mut in_flight = self.in_flight.lock();
        let handle = self.runtime.spawn(task.run(ticket, url));
        in_flight.insert(ticket, handle.abort_handle());
    }
}

impl Drop for RemoteImageLoader {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

/// Everything a fetch task needs, detached from the loader.
struct FetchTask {
    cache: Arc<dyn ImageCachePort>,
    fetcher: Arc<dyn ImageFetcherPort>,
    pending: Arc<PendingResults>,
    semaphore: Arc<Semaphore>,
    in_flight: InFlight,
}

impl FetchTask {
    async fn run(self, ticket: LoadTicket, url: String) {
        debug!(ticket = %ticket, url = %url, "Downloading image");

        let result = self.fetch(&url).await;
        if let Err(e) = &result {
            debug!(ticket = %ticket, url = %url, error = %e, "Download failed");
        }

        self.pending.insert(ticket, result);
        self.in_flight.lock().remove(&ticket);
    }

    async fn fetch(&self, url: &str) -> ImageResult {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|e| LoadError::network(format!("loader closed: {e}")))?;

        let response = self.fetcher.fetch(url).await?;

        if !response.is_success() {
            return Err(LoadError::HttpStatus {
                status: response.status,
            });
        }
        if response.body.is_empty() {
            return Err(LoadError::EmptyBody);
        }

        let mut format = resolve_format(response.content_type.as_deref(), url);
        let mut data = response.body;

        if format.needs_transcode() {
            let tiff = data;
            let jpeg = tokio::task::spawn_blocking(move || tiff_to_jpeg(&tiff))
                .await
                .map_err(|e| LoadError::decode(format!("transcode task panicked: {e}")))??;
            data = jpeg.into();
            format = ImageFormat::Jpeg;
        }

        let raw = RawImage { data, format };
        self.write_through(url, &raw).await;
        Ok(raw)
    }

    async fn write_through(&self, url: &str, raw: &RawImage) {
        let cache = self.cache.clone();
        let key = url.to_string();
        let entry = raw.clone();

        match tokio::task::spawn_blocking(move || cache.set(&key, &entry)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(url, error = %e, "cache write error"),
            Err(e) => warn!(url, error = %e, "cache write task panicked"),
        }
    }
}
