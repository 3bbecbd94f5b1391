//! # seomoz
//!
//! Async client for the Mozscape URL metrics API.
//!
//! Requests are signed with the account's access id and secret key
//! (HMAC-SHA1, valid for five minutes). A single URL is fetched with a GET
//! call, up to ten URLs with one batch POST, and any number of URLs with a
//! bulk query that splits them into batches and runs those concurrently.
//!
//! ## Features
//!
//! - **Signed requests**: a fresh signature for every call
//! - **Batch reconciliation**: positional responses mapped back onto the
//!   requested URLs, with count checks and URL repair
//! - **Concurrent bulk queries**: all-or-nothing results, optional in-flight bound
//! - **Pluggable transport**: swap the HTTP layer for tests or custom stacks
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use seomoz::{Cols, Config, Credentials, MozClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = MozClient::new(Config::new(Credentials::new("member-xxxx", "secret")))?;
//!
//!     let urls = vec!["https://moz.com".to_string(), "example.com".to_string()];
//!     let metrics = client.bulk_url_metrics(&urls, Cols::DEFAULT).await?;
//!
//!     for (url, m) in &metrics {
//!         println!("{url}: PA {:.0} DA {:.0}", m.page_authority, m.domain_authority);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! The client can be configured via:
//! - Command-line arguments
//! - Environment variables (`SEOMOZ_ACCESS_ID`, `SEOMOZ_SECRET_KEY`, ...)
//! - JSON configuration files
//!
//! See [`Config`] for all available options.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod bulk;
pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod metrics;
pub mod request;
pub mod response;
pub mod signer;
pub mod transport;

// Re-exports for convenience
pub use client::MozClient;
pub use config::{Args, Config, MAX_BATCH_URLS, RequestConfig};
pub use endpoint::{ApiEndpoint, DEFAULT_API_URL};
pub use error::{MozError, Result};
pub use metrics::{Cols, MetricsMap, UrlMetrics};
pub use request::{ApiRequest, ApiResponse, QueryParams};
pub use signer::{Credentials, Signature, sign};
pub use transport::{HttpTransport, Transport};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
