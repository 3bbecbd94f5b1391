//! Decoding and reconciliation of API responses.
//!
//! Batch responses are positional: record `i` describes the `i`-th requested
//! URL. Reconciliation checks the count, repairs records that came back
//! without a URL, and keys the result by the URL exactly as it was requested.

use crate::error::{MozError, Result};
use crate::metrics::{MetricsMap, UrlMetrics};
use std::collections::HashMap;
use url::Url;

/// Decode the body of a single-URL response.
pub fn parse_single(body: &[u8]) -> Result<UrlMetrics> {
    serde_json::from_slice(body).map_err(MozError::Decode)
}

/// Decode a batch response and map it back onto `urls`.
///
/// Fails with [`MozError::Decode`] when the body is not a JSON array of
/// records, and with [`MozError::CountMismatch`] when the array length differs
/// from `urls.len()`. Duplicate entries in `urls` collapse into one key, the
/// last record winning.
pub fn reconcile_batch(urls: &[String], body: &[u8]) -> Result<MetricsMap> {
    let records: Vec<UrlMetrics> = serde_json::from_slice(body).map_err(MozError::Decode)?;

    if records.len() != urls.len() {
        return Err(MozError::CountMismatch {
            requested: urls.len(),
            received: records.len(),
        });
    }

    let mut out = HashMap::with_capacity(urls.len());
    for (requested, mut record) in urls.iter().zip(records) {
        if record.url.is_empty() {
            record.url = synthesize_url(requested);
        }
        out.insert(requested.clone(), record);
    }

    Ok(out)
}

/// URL to report for a record the API returned without one.
///
/// A parseable request becomes `host[:port]` followed by its path and query,
/// without scheme or fragment. Anything that does not parse, including a
/// malformed `%` escape, is returned verbatim.
pub fn synthesize_url(requested: &str) -> String {
    if !has_valid_escapes(requested) {
        return requested.to_string();
    }

    let Ok(url) = Url::parse(requested) else {
        return requested.to_string();
    };

    let mut out = String::with_capacity(requested.len());
    if let Some(host) = url.host_str() {
        out.push_str(host);
        if let Some(port) = url.port() {
            out.push(':');
            out.push_str(&port.to_string());
        }
    }

    let path = url.path();
    out.push_str(if path.is_empty() { "/" } else { path });

    if let Some(query) = url.query() {
        out.push('?');
        out.push_str(query);
    }

    out
}

/// Every `%` must start a two-digit hex escape.
fn has_valid_escapes(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes
                .get(i + 1..i + 3)
                .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
            if !valid {
                return false;
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    true
}
