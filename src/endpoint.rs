//! The API base endpoint.
//!
//! Parsed and checked once when the client is built, so a bad endpoint is a
//! configuration error instead of a per-call failure.

use crate::error::{MozError, Result};
use url::Url;

/// Default Mozscape URL metrics endpoint.
pub const DEFAULT_API_URL: &str = "http://lsapi.seomoz.com/linkscape/url-metrics/";

/// Validated base URL of the url-metrics API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoint {
    base: Url,
}

impl ApiEndpoint {
    /// Parse and validate an endpoint.
    ///
    /// The endpoint must be an absolute `http` or `https` URL without query or
    /// fragment. A trailing `/` is added to the path when missing so the
    /// target URL can be appended to it.
    pub fn parse(endpoint: &str) -> Result<Self> {
        let invalid = |reason: &str| MozError::InvalidEndpoint {
            url: endpoint.to_string(),
            reason: reason.to_string(),
        };

        let mut base = Url::parse(endpoint).map_err(|e| invalid(&e.to_string()))?;

        if !matches!(base.scheme(), "http" | "https") {
            return Err(invalid("scheme must be http or https"));
        }
        if base.host_str().is_none_or(str::is_empty) {
            return Err(invalid("missing host"));
        }
        if base.query().is_some() || base.fragment().is_some() {
            return Err(invalid("query and fragment are not allowed"));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self { base })
    }

    /// Base URL, always ending in `/`.
    pub fn url(&self) -> &Url {
        &self.base
    }

    /// Target of a single-URL GET: the base followed by the percent-encoded
    /// `link`.
    pub fn single_url(&self, link: &str) -> Url {
        let mut url = self.base.clone();
        let path = format!("{}{}", self.base.path(), urlencoding::encode(link));
        url.set_path(&path);
        url
    }

    /// Target of a batch POST: the base itself.
    pub fn batch_url(&self) -> Url {
        self.base.clone()
    }
}

impl Default for ApiEndpoint {
    fn default() -> Self {
        Self {
            base: Url::parse(DEFAULT_API_URL).expect("default endpoint is a valid URL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoint() {
        let endpoint = ApiEndpoint::default();
        assert_eq!(endpoint.url().as_str(), DEFAULT_API_URL);
        assert_eq!(ApiEndpoint::parse(DEFAULT_API_URL).unwrap(), endpoint);
    }

    #[test]
    fn test_single_url_is_percent_encoded() {
        let endpoint = ApiEndpoint::default();
        let url = endpoint.single_url("https://www.example.com");
        assert_eq!(
            url.as_str(),
            "http://lsapi.seomoz.com/linkscape/url-metrics/https%3A%2F%2Fwww.example.com"
        );
    }

    #[test]
    fn test_single_url_escapes_query_characters() {
        let endpoint = ApiEndpoint::default();
        let url = endpoint.single_url("example.com/a b?x=1&y=2#top");
        assert_eq!(
            url.path(),
            "/linkscape/url-metrics/example.com%2Fa%20b%3Fx%3D1%26y%3D2%23top"
        );
        assert!(url.query().is_none());
        assert!(url.fragment().is_none());
    }

    #[test]
    fn test_batch_url_is_base() {
        let endpoint = ApiEndpoint::default();
        assert_eq!(endpoint.batch_url().as_str(), DEFAULT_API_URL);
    }

    #[test]
    fn test_trailing_slash_added() {
        let endpoint = ApiEndpoint::parse("https://api.test/v1/url-metrics").unwrap();
        assert_eq!(endpoint.url().as_str(), "https://api.test/v1/url-metrics/");
    }

    #[test]
    fn test_rejects_malformed_endpoints() {
        for bad in [
            "not a url",
            "ftp://lsapi.seomoz.com/",
            "http://lsapi.seomoz.com/?debug=1",
            "http://lsapi.seomoz.com/#frag",
            "lsapi.seomoz.com/linkscape",
        ] {
            assert!(
                matches!(ApiEndpoint::parse(bad), Err(MozError::InvalidEndpoint { .. })),
                "{bad} should be rejected"
            );
        }
    }
}
