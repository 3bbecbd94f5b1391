//! Configuration management for the Mozscape client.
//!
//! Supports configuration via CLI arguments, environment variables,
//! and a JSON configuration file with sensible defaults.

use crate::endpoint::{ApiEndpoint, DEFAULT_API_URL};
use crate::error::{MozError, Result};
use crate::metrics::Cols;
use crate::signer::{ACCESS_ID_ENV, Credentials, SECRET_KEY_ENV};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::Semaphore;

/// Most URLs the API accepts in one batch call.
pub const MAX_BATCH_URLS: usize = 10;

/// CLI arguments for the `seomoz` binary.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "seomoz",
    version,
    about = "Analyze URLs using the Mozscape URL metrics API",
    long_about = "Fetches page authority, domain authority and link counts for one or more URLs.\n\n\
                  Several URLs are split into batches of at most ten and queried concurrently.\n\
                  Credentials are read from SEOMOZ_ACCESS_ID and SEOMOZ_SECRET_KEY (a .env file\n\
                  in the working directory is honored).",
    after_help = "EXAMPLES:\n    \
        seomoz https://moz.com\n    \
        seomoz --cols 34359738368 example.com example.org\n    \
        seomoz --json --max-in-flight 4 $(cat urls.txt)"
)]
pub struct Args {
    /// URLs to analyze
    #[arg(required = true, value_name = "URL")]
    pub urls: Vec<String>,

    /// Column mask selecting the metrics to fetch
    #[arg(short, long, default_value_t = Cols::DEFAULT.bits(), env = "SEOMOZ_COLS")]
    pub cols: u64,

    /// Mozscape access id
    #[arg(long, env = ACCESS_ID_ENV, hide_env_values = true)]
    pub access_id: Option<String>,

    /// Mozscape secret key
    #[arg(long, env = SECRET_KEY_ENV, hide_env_values = true)]
    pub secret_key: Option<String>,

    /// API endpoint
    #[arg(long, env = "SEOMOZ_ENDPOINT")]
    pub endpoint: Option<String>,

    /// URLs per batch call (1-10)
    #[arg(short, long, env = "SEOMOZ_BATCH_SIZE")]
    pub batch_size: Option<usize>,

    /// Maximum batch calls in flight at once (unbounded when omitted)
    #[arg(short, long, env = "SEOMOZ_MAX_IN_FLIGHT")]
    pub max_in_flight: Option<usize>,

    /// Request timeout in seconds
    #[arg(short, long, env = "SEOMOZ_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Path to a JSON configuration file
    #[arg(long, env = "SEOMOZ_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print results as a JSON object keyed by URL
    #[arg(long)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(short, long, env = "SEOMOZ_VERBOSE")]
    pub verbose: bool,

    /// Output logs as JSON
    #[arg(long, env = "SEOMOZ_JSON_LOGS")]
    pub json_logs: bool,

    /// Disable the progress spinner
    #[arg(long, env = "SEOMOZ_NO_PROGRESS")]
    pub no_progress: bool,

    /// Validate configuration without sending requests
    #[arg(long)]
    pub dry_run: bool,
}

impl Args {
    /// Parse CLI arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Column mask selected on the command line.
    pub fn cols(&self) -> Cols {
        Cols(self.cols)
    }
}

/// Full client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Access id and secret key. May be left out of a file and supplied
    /// through the command line or environment instead.
    #[serde(default)]
    pub credentials: Credentials,

    /// API endpoint URL.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Request settings.
    #[serde(default)]
    pub request: RequestConfig,
}

fn default_endpoint() -> String {
    DEFAULT_API_URL.to_string()
}

/// Request-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestConfig {
    /// Request timeout.
    #[serde(with = "humantime_serde", default = "default_timeout")]
    pub timeout: Duration,

    /// URLs per batch call.
    #[serde(default = "default_max_batch_urls")]
    pub max_batch_urls: usize,

    /// Bound on concurrent batch calls during a bulk query; `None` sends every
    /// batch at once.
    #[serde(default)]
    pub max_in_flight: Option<usize>,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            max_batch_urls: default_max_batch_urls(),
            max_in_flight: None,
        }
    }
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_max_batch_urls() -> usize {
    MAX_BATCH_URLS
}

impl Config {
    /// Configuration with default settings for the given credentials.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            endpoint: default_endpoint(),
            request: RequestConfig::default(),
        }
    }

    /// Configuration from `SEOMOZ_ACCESS_ID` and `SEOMOZ_SECRET_KEY`.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(Credentials::from_env()?))
    }

    /// Load configuration from a file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| MozError::ConfigFileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        serde_json::from_str(&content).map_err(|e| MozError::ConfigParse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Create configuration from CLI arguments.
    ///
    /// Values given on the command line (or through their environment
    /// variables) override the configuration file.
    pub fn from_args(args: &Args) -> Result<Self> {
        let mut config = if let Some(config_path) = &args.config {
            Self::from_file(config_path)?
        } else {
            Self::new(Credentials::default())
        };

        if let Some(access_id) = &args.access_id {
            config.credentials.access_id.clone_from(access_id);
        }
        if let Some(secret_key) = &args.secret_key {
            config.credentials.secret_key.clone_from(secret_key);
        }
        if let Some(endpoint) = &args.endpoint {
            config.endpoint.clone_from(endpoint);
        }
        if let Some(batch_size) = args.batch_size {
            config.request.max_batch_urls = batch_size;
        }
        if args.max_in_flight.is_some() {
            config.request.max_in_flight = args.max_in_flight;
        }
        if let Some(timeout) = args.timeout {
            config.request.timeout = Duration::from_secs(timeout);
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        self.credentials.validate()?;
        ApiEndpoint::parse(&self.endpoint)?;

        if !(1..=MAX_BATCH_URLS).contains(&self.request.max_batch_urls) {
            return Err(MozError::InvalidConfig(format!(
                "batch size must be between 1 and {MAX_BATCH_URLS}"
            )));
        }

        match self.request.max_in_flight {
            Some(0) => {
                return Err(MozError::InvalidConfig(
                    "max in-flight batches must be greater than 0".to_string(),
                ));
            }
            Some(n) if n > Semaphore::MAX_PERMITS => {
                return Err(MozError::InvalidConfig(format!(
                    "max in-flight batches must be at most {}",
                    Semaphore::MAX_PERMITS
                )));
            }
            _ => {}
        }

        if self.request.timeout.is_zero() {
            return Err(MozError::InvalidConfig(
                "timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// The validated endpoint.
    pub fn api_endpoint(&self) -> Result<ApiEndpoint> {
        ApiEndpoint::parse(&self.endpoint)
    }
}

/// Custom serde module for humantime Duration parsing.
mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{}s", duration.as_secs()))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        // "30s", "100ms", or plain seconds
        if let Some(ms) = s.strip_suffix("ms") {
            ms.parse::<u64>()
                .map(Duration::from_millis)
                .map_err(serde::de::Error::custom)
        } else if let Some(secs) = s.strip_suffix('s') {
            secs.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(serde::de::Error::custom)
        } else {
            s.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(serde::de::Error::custom)
        }
    }
}
