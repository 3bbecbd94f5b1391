//! Request signing for the Mozscape API.
//!
//! Every call carries `AccessID`, `Expires` and `Signature` query parameters.
//! The signature is `base64(HMAC-SHA1(secret, "{access_id}\n{expires}"))` and
//! the API rejects it once `expires` has passed.

use crate::error::{MozError, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use std::fmt;

type HmacSha1 = Hmac<Sha1>;

/// Lifetime of a signature, in seconds.
pub const SIGNATURE_TTL_SECS: i64 = 300;

/// Environment variable holding the access id.
pub const ACCESS_ID_ENV: &str = "SEOMOZ_ACCESS_ID";

/// Environment variable holding the secret key.
pub const SECRET_KEY_ENV: &str = "SEOMOZ_SECRET_KEY";

/// Base64-encoded HMAC-SHA1 of `message` keyed with `secret`.
pub fn compute_hmac(message: &str, secret: &str) -> String {
    let mut mac =
        HmacSha1::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(message.as_bytes());
    STANDARD.encode(mac.finalize().into_bytes())
}

/// Signature for `access_id` valid until the Unix timestamp `expires`.
pub fn sign(access_id: &str, secret_key: &str, expires: i64) -> String {
    compute_hmac(&format!("{access_id}\n{expires}"), secret_key)
}

/// A signature together with the expiry it was computed for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// Unix timestamp after which the API rejects the signature.
    pub expires: i64,
    /// Base64 HMAC value.
    pub value: String,
}

/// Access id and secret key issued by Moz.
///
/// The secret never shows up in `Debug` output and is skipped on
/// serialization.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    /// Public access identifier.
    #[serde(default)]
    pub access_id: String,

    /// Shared secret used as the HMAC key.
    #[serde(default, skip_serializing)]
    pub secret_key: String,
}

impl Credentials {
    /// Create credentials from an access id and secret key.
    pub fn new(access_id: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_id: access_id.into(),
            secret_key: secret_key.into(),
        }
    }

    /// Read credentials from `SEOMOZ_ACCESS_ID` and `SEOMOZ_SECRET_KEY`.
    pub fn from_env() -> Result<Self> {
        let access_id = std::env::var(ACCESS_ID_ENV).unwrap_or_default();
        let secret_key = std::env::var(SECRET_KEY_ENV).unwrap_or_default();
        let credentials = Self::new(access_id, secret_key);
        credentials.validate()?;
        Ok(credentials)
    }

    /// Reject empty values.
    pub fn validate(&self) -> Result<()> {
        if self.access_id.trim().is_empty() {
            return Err(MozError::MissingCredentials(ACCESS_ID_ENV));
        }
        if self.secret_key.is_empty() {
            return Err(MozError::MissingCredentials(SECRET_KEY_ENV));
        }
        Ok(())
    }

    /// Sign with an explicit expiry timestamp.
    pub fn signature(&self, expires: i64) -> String {
        sign(&self.access_id, &self.secret_key, expires)
    }

    /// Signature valid for [`SIGNATURE_TTL_SECS`] after `now`.
    pub fn sign_at(&self, now: DateTime<Utc>) -> Signature {
        let expires = now.timestamp() + SIGNATURE_TTL_SECS;
        Signature {
            expires,
            value: self.signature(expires),
        }
    }

    /// Fresh signature valid for the next five minutes.
    pub fn sign_now(&self) -> Signature {
        self.sign_at(Utc::now())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_id", &self.access_id)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}
