//! Error types for the Mozscape client.
//!
//! Every failure is returned to the immediate caller. Nothing in this crate
//! retries, so the variants keep enough context for the caller to decide.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while configuring the client or querying the API.
#[derive(Error, Debug)]
pub enum MozError {
    /// Connection, TLS or body-read failure reported by the HTTP stack.
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body is not valid JSON for the expected shape.
    #[error("failed to decode API response: {0}")]
    Decode(#[source] serde_json::Error),

    /// A batch response did not carry one record per requested URL.
    #[error(
        "invalid response: mismatch between number of urls requested ({requested}) and data received ({received})"
    )]
    CountMismatch {
        /// Number of URLs sent in the batch.
        requested: usize,
        /// Number of records in the response array.
        received: usize,
    },

    /// The API answered with a non-success HTTP status.
    #[error("API returned error status {status}: {body}")]
    Api {
        /// HTTP status code returned.
        status: u16,
        /// Response body content, truncated.
        body: String,
    },

    /// More URLs were passed to a single batch call than the API accepts.
    #[error("batch of {size} urls exceeds the limit of {max} per call")]
    BatchTooLarge {
        /// Number of URLs passed.
        size: usize,
        /// Configured batch limit.
        max: usize,
    },

    /// Failed to encode a request body.
    #[error("failed to serialize request body: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The configured API endpoint cannot be used.
    #[error("invalid API endpoint '{url}': {reason}")]
    InvalidEndpoint {
        /// The endpoint as configured.
        url: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A required credential is missing or empty.
    #[error("missing credential: {0} is not set")]
    MissingCredentials(&'static str),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failed to read the configuration file.
    #[error("failed to read config file '{path}': {source}")]
    ConfigFileRead {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the configuration file.
    #[error("failed to parse config file '{path}': {source}")]
    ConfigParse {
        /// Path to the file that could not be parsed.
        path: PathBuf,
        /// The underlying JSON parsing error.
        #[source]
        source: serde_json::Error,
    },

    /// A bulk chunk task ended without reporting a result.
    #[error("bulk query lost {} of {expected} batch results", .expected - .received)]
    ChunkLost {
        /// Number of chunks dispatched.
        expected: usize,
        /// Number of chunk results collected.
        received: usize,
    },
}

impl MozError {
    /// Whether this error is an integrity violation of a batch response.
    pub fn is_count_mismatch(&self) -> bool {
        matches!(self, Self::CountMismatch { .. })
    }
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, MozError>;
