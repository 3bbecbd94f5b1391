//! HTTP transport.
//!
//! The client talks to the API through the [`Transport`] trait so tests and
//! embedders can substitute their own exchange. [`HttpTransport`] is the
//! production implementation on top of a pooled `reqwest` client.

use crate::config::RequestConfig;
use crate::error::{MozError, Result};
use crate::request::{ApiRequest, ApiResponse};
use async_trait::async_trait;
use reqwest::{Client, header};
use std::fmt;
use std::time::Duration;
use tracing::trace;

/// Performs one HTTP exchange.
///
/// Implementations return the raw status and body. Status handling and
/// decoding belong to the caller, so a transport only fails when no response
/// could be obtained at all.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// Send `request` and read the whole response body.
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse>;
}

/// `reqwest`-backed transport with connection pooling.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Build the underlying HTTP client from request settings.
    pub fn new(config: &RequestConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(config.max_in_flight.unwrap_or(16))
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .tcp_nodelay(true)
            .user_agent(concat!("seomoz/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(MozError::Transport)?;

        Ok(Self { client })
    }

    /// Wrap an existing `reqwest` client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        trace!(method = %request.method, path = request.url.path(), "Sending request");

        let mut builder = self.client.request(request.method, request.url);
        if let Some(body) = request.body {
            builder = builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        trace!(status, bytes = body.len(), "Received response");
        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    type Handler = dyn Fn(&ApiRequest) -> Result<ApiResponse> + Send + Sync;

    /// Transport answering from a closure and recording every request.
    pub(crate) struct MockTransport {
        handler: Box<Handler>,
        requests: Mutex<Vec<ApiRequest>>,
        delay: Duration,
        in_flight: AtomicUsize,
        peak_in_flight: AtomicUsize,
    }

    impl MockTransport {
        pub(crate) fn new(
            handler: impl Fn(&ApiRequest) -> Result<ApiResponse> + Send + Sync + 'static,
        ) -> Self {
            Self {
                handler: Box::new(handler),
                requests: Mutex::new(Vec::new()),
                delay: Duration::ZERO,
                in_flight: AtomicUsize::new(0),
                peak_in_flight: AtomicUsize::new(0),
            }
        }

        /// Always answer 200 with `body`.
        pub(crate) fn fixed(body: &'static str) -> Self {
            Self::new(move |_| Ok(ApiResponse::ok(body)))
        }

        /// Answer every batch with one record per requested URL, `uu` set to
        /// the URL itself.
        pub(crate) fn echo() -> Self {
            Self::new(|request| Ok(ApiResponse::ok(echo_body(request))))
        }

        pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        pub(crate) fn requests(&self) -> Vec<ApiRequest> {
            self.requests.lock().clone()
        }

        pub(crate) fn peak_in_flight(&self) -> usize {
            self.peak_in_flight.load(Ordering::SeqCst)
        }
    }

    pub(crate) fn echo_body(request: &ApiRequest) -> Vec<u8> {
        let records: Vec<serde_json::Value> = request
            .batch_urls()
            .unwrap_or_default()
            .into_iter()
            .map(|url| serde_json::json!({"upa": 21, "pda": 42, "uid": 5, "uu": url}))
            .collect();
        serde_json::to_vec(&records).unwrap()
    }

    impl fmt::Debug for MockTransport {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("MockTransport")
                .field("requests", &self.requests.lock().len())
                .finish()
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_in_flight.fetch_max(current, Ordering::SeqCst);

            self.requests.lock().push(request.clone());
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            let response = (self.handler)(&request);

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            response
        }
    }
}
