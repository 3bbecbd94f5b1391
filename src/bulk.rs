//! Bulk queries over any number of URLs.
//!
//! The URL list is cut into contiguous chunks of at most `max_batch_urls`
//! and every chunk becomes its own task. Tasks report through a channel to a
//! single collector that owns the merged map and the first error, and the
//! collector waits for every task before deciding. The outcome is all or
//! nothing: one failed chunk discards every other chunk's results.
//!
//! Without `max_in_flight` all chunks are sent at once, so a list of N URLs
//! opens up to ⌈N/K⌉ connections simultaneously.

use crate::client::MozClient;
use crate::error::{MozError, Result};
use crate::metrics::{Cols, MetricsMap};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Semaphore, mpsc};
use tracing::{debug, info, instrument};

/// What a chunk task reports back to the collector.
#[derive(Debug)]
struct ChunkOutcome {
    index: usize,
    result: Result<MetricsMap>,
}

/// Split `urls` into contiguous chunks of at most `size` URLs, in input order.
///
/// # Panics
///
/// Panics if `size` is zero.
pub fn partition(urls: &[String], size: usize) -> Vec<Vec<String>> {
    urls.chunks(size).map(<[String]>::to_vec).collect()
}

impl MozClient {
    /// Fetch the metrics of every URL in `urls`, batching as needed.
    ///
    /// Chunks run concurrently, bounded by the client's `max_in_flight` when
    /// set. Returns the first error observed if any chunk fails, in which
    /// case no results are returned at all. An empty list yields an empty map
    /// without any call.
    #[instrument(skip(self, urls), fields(urls = urls.len()))]
    pub async fn bulk_url_metrics(&self, urls: &[String], cols: Cols) -> Result<MetricsMap> {
        if urls.is_empty() {
            return Ok(HashMap::new());
        }

        let chunks = partition(urls, self.max_batch_urls());
        let expected = chunks.len();
        let limiter = self.max_in_flight().map(|n| Arc::new(Semaphore::new(n)));

        info!(
            chunks = expected,
            max_in_flight = ?self.max_in_flight(),
            "Dispatching bulk query"
        );

        let (tx, rx) = mpsc::channel(expected);
        for (index, chunk) in chunks.into_iter().enumerate() {
            let client = self.clone();
            let tx = tx.clone();
            let limiter = limiter.clone();

            tokio::spawn(async move {
                let _permit = match limiter {
                    Some(semaphore) => semaphore.acquire_owned().await.ok(),
                    None => None,
                };

                let result = client.batch_url_metrics(&chunk, cols).await;
                // The collector outlives every sender.
                let _ = tx.send(ChunkOutcome { index, result }).await;
            });
        }
        drop(tx);

        collect(rx, expected).await
    }
}

/// Drain every chunk outcome, then merge or report the first error.
async fn collect(mut rx: mpsc::Receiver<ChunkOutcome>, expected: usize) -> Result<MetricsMap> {
    let mut merged = HashMap::new();
    let mut first_error: Option<MozError> = None;
    let mut received = 0;

    while let Some(ChunkOutcome { index, result }) = rx.recv().await {
        received += 1;
        debug!(chunk = index, ok = result.is_ok(), received, expected, "Chunk finished");

        match result {
            Ok(batch) if first_error.is_none() => merged.extend(batch),
            Ok(_) => {}
            Err(e) => {
                if first_error.is_none() {
                    first_error = Some(e);
                    merged.clear();
                }
            }
        }
    }

    if let Some(e) = first_error {
        return Err(e);
    }
    if received != expected {
        return Err(MozError::ChunkLost { expected, received });
    }

    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::request::{ApiRequest, ApiResponse};
    use crate::signer::Credentials;
    use crate::transport::mock::{MockTransport, echo_body};
    use std::time::Duration;
    use tokio_test::{assert_err, assert_ok};

    fn client_with(
        transport: Arc<MockTransport>,
        batch: usize,
        in_flight: Option<usize>,
    ) -> MozClient {
        let mut config = Config::new(Credentials::new("my_id", "my_secret"));
        config.request.max_batch_urls = batch;
        config.request.max_in_flight = in_flight;
        MozClient::with_transport(config, transport).unwrap()
    }

    fn sites(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("https://site{i}.test/")).collect()
    }

    #[test]
    fn test_partition() {
        let urls = sites(23);
        let chunks = partition(&urls, 10);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 10);
        assert_eq!(chunks[1].len(), 10);
        assert_eq!(chunks[2].len(), 3);
        assert_eq!(chunks.concat(), urls);
    }

    #[test]
    fn test_partition_exact_and_small() {
        assert_eq!(partition(&sites(20), 10).len(), 2);
        assert_eq!(partition(&sites(1), 10).len(), 1);
        assert!(partition(&[], 10).is_empty());
    }

    #[tokio::test]
    async fn test_bulk_issues_ceil_n_over_k_batches() {
        for (n, k) in [(1, 1), (7, 3), (9, 3), (25, 10), (30, 10), (11, 4)] {
            let transport = Arc::new(MockTransport::echo());
            let client = client_with(Arc::clone(&transport), k, None);
            let urls = sites(n);

            let results = assert_ok!(client.bulk_url_metrics(&urls, Cols::DEFAULT).await);
            assert_eq!(results.len(), n);

            let mut batches: Vec<Vec<String>> = transport
                .requests()
                .iter()
                .map(|r| r.batch_urls().unwrap())
                .collect();
            assert_eq!(batches.len(), n.div_ceil(k), "n={n} k={k}");
            assert!(batches.iter().all(|b| !b.is_empty() && b.len() <= k));

            // Contiguous and disjoint once put back in input order.
            batches.sort_by_key(|b| urls.iter().position(|u| u == &b[0]));
            assert_eq!(batches.concat(), urls);
        }
    }

    #[tokio::test]
    async fn test_bulk_merges_all_chunks() {
        let client = client_with(Arc::new(MockTransport::echo()), 10, None);
        let urls = sites(25);

        let results = assert_ok!(client.bulk_url_metrics(&urls, Cols::DEFAULT).await);
        for url in &urls {
            assert_eq!(&results[url].url, url);
            assert_eq!(results[url].domain_authority, 42.0);
        }
    }

    #[tokio::test]
    async fn test_bulk_is_atomic_on_failure() {
        let urls = sites(40);
        let poisoned = urls[25].clone();
        let transport = Arc::new(MockTransport::new(move |request: &ApiRequest| {
            let batch = request.batch_urls().unwrap_or_default();
            if batch.contains(&poisoned) {
                Ok(ApiResponse::ok("[]"))
            } else {
                Ok(ApiResponse::ok(echo_body(request)))
            }
        }));
        let client = client_with(Arc::clone(&transport), 10, None);

        let err = assert_err!(client.bulk_url_metrics(&urls, Cols::DEFAULT).await);
        assert!(matches!(
            err,
            MozError::CountMismatch {
                requested: 10,
                received: 0
            }
        ));
        // Every chunk still ran to completion.
        assert_eq!(transport.requests().len(), 4);
    }

    #[tokio::test]
    async fn test_bulk_reports_one_of_several_errors() {
        let transport = Arc::new(MockTransport::new(|request: &ApiRequest| {
            let batch = request.batch_urls().unwrap_or_default();
            if batch.iter().any(|u| u.contains("site0.") || u.contains("site20.")) {
                Ok(ApiResponse::with_status(500, "boom"))
            } else {
                Ok(ApiResponse::ok(echo_body(request)))
            }
        }));
        let client = client_with(transport, 10, None);

        let err = assert_err!(client.bulk_url_metrics(&sites(30), Cols::DEFAULT).await);
        assert!(matches!(err, MozError::Api { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_bulk_empty_input() {
        let transport = Arc::new(MockTransport::echo());
        let client = client_with(Arc::clone(&transport), 10, None);

        let results = assert_ok!(client.bulk_url_metrics(&[], Cols::DEFAULT).await);
        assert!(results.is_empty());
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_bulk_duplicates_across_chunks() {
        let client = client_with(Arc::new(MockTransport::echo()), 2, None);
        let urls: Vec<String> = ["a.test", "b.test", "a.test", "c.test"]
            .iter()
            .map(|s| (*s).to_string())
            .collect();

        let results = assert_ok!(client.bulk_url_metrics(&urls, Cols::DEFAULT).await);
        assert_eq!(results.len(), 3);
        assert_eq!(results["a.test"].url, "a.test");
    }

    #[tokio::test]
    async fn test_bulk_unbounded_fan_out() {
        let transport = Arc::new(MockTransport::echo().with_delay(Duration::from_millis(50)));
        let client = client_with(Arc::clone(&transport), 10, None);

        assert_ok!(client.bulk_url_metrics(&sites(50), Cols::DEFAULT).await);
        assert_eq!(transport.requests().len(), 5);
        assert_eq!(transport.peak_in_flight(), 5);
    }

    #[tokio::test]
    async fn test_bulk_respects_in_flight_bound() {
        let transport = Arc::new(MockTransport::echo().with_delay(Duration::from_millis(20)));
        let client = client_with(Arc::clone(&transport), 10, Some(2));

        let results = assert_ok!(client.bulk_url_metrics(&sites(60), Cols::DEFAULT).await);
        assert_eq!(results.len(), 60);
        assert_eq!(transport.requests().len(), 6);
        assert!(transport.peak_in_flight() <= 2);
    }

    #[test]
    fn test_oversized_in_flight_bound_rejected_at_construction() {
        let mut config = Config::new(Credentials::new("my_id", "my_secret"));
        config.request.max_in_flight = Some(usize::MAX);

        let err = assert_err!(MozClient::with_transport(
            config,
            Arc::new(MockTransport::echo())
        ));
        assert!(matches!(err, MozError::InvalidConfig(_)));
    }
}
