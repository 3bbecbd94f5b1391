//! Request and response values exchanged with the transport.
//!
//! Requests are plain data built here and executed by a
//! [`Transport`](crate::transport::Transport), so building and signing can be
//! checked without any network.

use crate::endpoint::ApiEndpoint;
use crate::error::{MozError, Result};
use crate::metrics::Cols;
use crate::signer::{Credentials, Signature};
use reqwest::Method;
use url::Url;

/// Mandatory query parameters of every API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParams {
    /// Access identifier.
    pub access_id: String,
    /// Signature expiry, Unix seconds.
    pub expires: i64,
    /// Base64 HMAC signature.
    pub signature: String,
    /// Column mask.
    pub cols: Cols,
}

impl QueryParams {
    /// Sign freshly for `cols`.
    pub fn signed(credentials: &Credentials, cols: Cols) -> Self {
        Self::from_signature(credentials, credentials.sign_now(), cols)
    }

    /// Build from an already computed signature.
    pub fn from_signature(credentials: &Credentials, signature: Signature, cols: Cols) -> Self {
        Self {
            access_id: credentials.access_id.clone(),
            expires: signature.expires,
            signature: signature.value,
            cols,
        }
    }

    /// Replace the query string of `url` with these parameters, keys sorted.
    pub fn apply(&self, url: &mut Url) {
        url.query_pairs_mut()
            .clear()
            .append_pair("AccessID", &self.access_id)
            .append_pair("Cols", &self.cols.to_string())
            .append_pair("Expires", &self.expires.to_string())
            .append_pair("Signature", &self.signature);
    }
}

/// An HTTP request ready to be sent.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: Method,
    /// Full target including the signed query string.
    pub url: Url,
    /// JSON body, if any.
    pub body: Option<Vec<u8>>,
}

impl ApiRequest {
    /// GET for the metrics of one URL.
    pub fn single(endpoint: &ApiEndpoint, link: &str, params: &QueryParams) -> Self {
        let mut url = endpoint.single_url(link);
        params.apply(&mut url);
        Self {
            method: Method::GET,
            url,
            body: None,
        }
    }

    /// POST for the metrics of several URLs. The body is the JSON array of the
    /// URLs as given, not percent-encoded.
    pub fn batch(endpoint: &ApiEndpoint, urls: &[String], params: &QueryParams) -> Result<Self> {
        let body = serde_json::to_vec(urls).map_err(MozError::Serialize)?;
        let mut url = endpoint.batch_url();
        params.apply(&mut url);
        Ok(Self {
            method: Method::POST,
            url,
            body: Some(body),
        })
    }

    /// Value of a query parameter.
    pub fn query_param(&self, key: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    /// The URLs carried by a batch body.
    pub fn batch_urls(&self) -> Option<Vec<String>> {
        self.body
            .as_deref()
            .and_then(|body| serde_json::from_slice(body).ok())
    }
}

/// Raw response returned by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body bytes.
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// A 200 response with the given body.
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    /// Create a response with an explicit status.
    pub fn with_status(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Fail with [`MozError::Api`] unless the status is 2xx.
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }

        let body = String::from_utf8_lossy(&self.body);
        let truncated = if body.chars().count() > 500 {
            format!("{}...", body.chars().take(500).collect::<String>())
        } else {
            body.into_owned()
        };

        Err(MozError::Api {
            status: self.status,
            body: truncated,
        })
    }
}
