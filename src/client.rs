//! Mozscape API client.
//!
//! [`MozClient`] signs every call afresh, sends it through the configured
//! [`Transport`] and reconciles the response. Bulk queries over any number of
//! URLs live in [`crate::bulk`].

use crate::config::Config;
use crate::endpoint::ApiEndpoint;
use crate::error::{MozError, Result};
use crate::metrics::{Cols, MetricsMap, UrlMetrics};
use crate::request::{ApiRequest, QueryParams};
use crate::response;
use crate::signer::Credentials;
use crate::transport::{HttpTransport, Transport};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument};

/// Client for the url-metrics API.
///
/// Cheap to clone; clones share credentials and the transport.
#[derive(Debug, Clone)]
pub struct MozClient {
    credentials: Arc<Credentials>,
    endpoint: ApiEndpoint,
    transport: Arc<dyn Transport>,
    max_batch_urls: usize,
    max_in_flight: Option<usize>,
}

impl MozClient {
    /// Create a client that talks HTTP through `reqwest`.
    pub fn new(config: Config) -> Result<Self> {
        let transport = HttpTransport::new(&config.request)?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a client on top of a custom transport.
    pub fn with_transport(config: Config, transport: Arc<dyn Transport>) -> Result<Self> {
        config.validate()?;
        let endpoint = config.api_endpoint()?;

        Ok(Self {
            credentials: Arc::new(config.credentials),
            endpoint,
            transport,
            max_batch_urls: config.request.max_batch_urls,
            max_in_flight: config.request.max_in_flight,
        })
    }

    /// Create a client from `SEOMOZ_ACCESS_ID` and `SEOMOZ_SECRET_KEY`.
    pub fn from_env() -> Result<Self> {
        Self::new(Config::from_env()?)
    }

    /// The access id this client signs with.
    pub fn access_id(&self) -> &str {
        &self.credentials.access_id
    }

    /// Endpoint requests are sent to.
    pub fn endpoint(&self) -> &ApiEndpoint {
        &self.endpoint
    }

    /// Most URLs sent in one batch call.
    pub fn max_batch_urls(&self) -> usize {
        self.max_batch_urls
    }

    /// Bound on concurrent batch calls during a bulk query.
    pub fn max_in_flight(&self) -> Option<usize> {
        self.max_in_flight
    }

    /// Fetch the metrics of a single URL with a GET call.
    #[instrument(skip(self))]
    pub async fn url_metrics(&self, link: &str, cols: Cols) -> Result<UrlMetrics> {
        let params = QueryParams::signed(&self.credentials, cols);
        let request = ApiRequest::single(&self.endpoint, link, &params);

        let start = Instant::now();
        let response = self.transport.send(request).await?.error_for_status()?;
        debug!(latency_ms = start.elapsed().as_millis() as u64, "Single query complete");

        response::parse_single(&response.body)
    }

    /// Fetch the metrics of at most [`max_batch_urls`](Self::max_batch_urls)
    /// URLs with one POST call.
    ///
    /// The result holds one entry per distinct requested URL, keyed by the URL
    /// as given. Any failure, including a response that does not carry one
    /// record per URL, fails the whole batch.
    #[instrument(skip(self, urls), fields(urls = urls.len()))]
    pub async fn batch_url_metrics(&self, urls: &[String], cols: Cols) -> Result<MetricsMap> {
        if urls.len() > self.max_batch_urls {
            return Err(MozError::BatchTooLarge {
                size: urls.len(),
                max: self.max_batch_urls,
            });
        }
        if urls.is_empty() {
            return Ok(HashMap::new());
        }

        let params = QueryParams::signed(&self.credentials, cols);
        let request = ApiRequest::batch(&self.endpoint, urls, &params)?;

        let start = Instant::now();
        let response = self.transport.send(request).await?.error_for_status()?;
        debug!(latency_ms = start.elapsed().as_millis() as u64, "Batch query complete");

        response::reconcile_batch(urls, &response.body)
    }
}
