//! HTTP implementation of the fetcher port.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, header};
use tracing::debug;

use crate::domain::errors::LoadError;
use crate::domain::ports::{FetchResponse, ImageFetcherPort};

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Plain GET fetcher backed by `reqwest`. Sends no custom headers.
#[derive(Debug, Clone)]
pub struct HttpImageFetcher {
    client: Client,
}

impl HttpImageFetcher {
    /// Creates a fetcher with the given request timeout.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn new(timeout: Duration) -> Result<Self, LoadError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LoadError::network(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ImageFetcherPort for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, LoadError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| LoadError::network(format!("request failed: {e}")))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let body = response
            .bytes()
            .await
            .map_err(|e| LoadError::network(format!("read error: {e}")))?;

        debug!(url, status, bytes = body.len(), "Fetched image");

        Ok(FetchResponse {
            status,
            content_type,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    async fn serve_once(response: &'static [u8]) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            socket.write_all(response).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        format!("http://{addr}/pic.png")
    }

    #[tokio::test]
    async fn test_fetch_reads_status_header_and_body() {
        let url = serve_once(
            b"HTTP/1.1 200 OK\r\nContent-Type: image/png\r\nContent-Length: 4\r\nConnection: close\r\n\r\nabcd",
        )
        .await;
        let fetcher = HttpImageFetcher::new(Duration::from_secs(5)).unwrap();

        let response = fetcher.fetch(&url).await.unwrap();

        assert_eq!(response.status, 200);
        assert!(response.is_success());
        assert_eq!(response.content_type.as_deref(), Some("image/png"));
        assert_eq!(&response.body[..], b"abcd");
    }

    #[tokio::test]
    async fn test_error_status_is_not_a_transport_error() {
        let url = serve_once(
            b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        )
        .await;
        let fetcher = HttpImageFetcher::new(Duration::from_secs(5)).unwrap();

        let response = fetcher.fetch(&url).await.unwrap();

        assert_eq!(response.status, 404);
        assert!(!response.is_success());
        assert!(response.content_type.is_none());
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let fetcher = HttpImageFetcher::new(Duration::from_secs(5)).unwrap();

        let err = fetcher.fetch(&format!("http://{addr}/x.png")).await.unwrap_err();

        assert!(matches!(err, LoadError::Network { .. }));
    }
}
