//! Metrics records and the column mask that selects them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Mapping from a requested URL, verbatim, to its metrics.
pub type MetricsMap = HashMap<String, UrlMetrics>;

/// Bitmask telling the API which metrics to populate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cols(pub u64);

impl Cols {
    /// Page title (`ut`).
    pub const TITLE: Self = Self(1);
    /// Canonical URL (`uu`).
    pub const CANONICAL_URL: Self = Self(4);
    /// Subdomain (`ufq`).
    pub const SUBDOMAIN: Self = Self(8);
    /// Root domain (`upl`).
    pub const ROOT_DOMAIN: Self = Self(16);
    /// External equity links (`ueid`).
    pub const EXTERNAL_EQUITY_LINKS: Self = Self(32);
    /// Subdomain external links (`feid`).
    pub const SUBDOMAIN_EXTERNAL_LINKS: Self = Self(64);
    /// Root domain external links (`peid`).
    pub const ROOT_DOMAIN_EXTERNAL_LINKS: Self = Self(128);
    /// Equity links (`ujid`).
    pub const EQUITY_LINKS: Self = Self(256);
    /// Subdomains linking (`uifq`).
    pub const SUBDOMAINS_LINKING: Self = Self(512);
    /// Root domains linking (`uipl`).
    pub const ROOT_DOMAINS_LINKING: Self = Self(1024);
    /// Links (`uid`).
    pub const LINKS: Self = Self(2048);
    /// Subdomain, subdomains linking (`fid`).
    pub const SUBDOMAIN_SUBDOMAINS_LINKING: Self = Self(4096);
    /// Root domain, root domains linking (`pid`).
    pub const ROOT_DOMAIN_ROOT_DOMAINS_LINKING: Self = Self(8192);
    /// MozRank of the URL (`umrp`, `umrr`).
    pub const MOZ_RANK: Self = Self(16_384);
    /// MozRank of the subdomain (`fmrp`, `fmrr`).
    pub const SUBDOMAIN_MOZ_RANK: Self = Self(32_768);
    /// MozRank of the root domain (`pmrp`, `pmrr`).
    pub const ROOT_DOMAIN_MOZ_RANK: Self = Self(65_536);
    /// MozTrust of the URL (`utrp`, `utrr`).
    pub const MOZ_TRUST: Self = Self(131_072);
    /// MozTrust of the subdomain (`ftrp`, `ftrr`).
    pub const SUBDOMAIN_MOZ_TRUST: Self = Self(262_144);
    /// MozTrust of the root domain (`ptrp`, `ptrr`).
    pub const ROOT_DOMAIN_MOZ_TRUST: Self = Self(524_288);
    /// External equity MozRank (`uemrp`, `uemrr`).
    pub const EXTERNAL_MOZ_RANK: Self = Self(1_048_576);
    /// Subdomain external equity MozRank (`fejp`, `fejr`).
    pub const SUBDOMAIN_EXTERNAL_MOZ_RANK: Self = Self(2_097_152);
    /// Root domain external equity MozRank (`pejp`, `pejr`).
    pub const ROOT_DOMAIN_EXTERNAL_MOZ_RANK: Self = Self(4_194_304);
    /// Subdomain combined MozRank (`pjp`, `pjr`).
    pub const SUBDOMAIN_COMBINED_MOZ_RANK: Self = Self(8_388_608);
    /// Root domain combined MozRank (`fjp`, `fjr`).
    pub const ROOT_DOMAIN_COMBINED_MOZ_RANK: Self = Self(16_777_216);
    /// HTTP status code seen by the crawler (`us`).
    pub const HTTP_STATUS_CODE: Self = Self(536_870_912);
    /// Links to the subdomain (`fuid`).
    pub const LINKS_TO_SUBDOMAIN: Self = Self(4_294_967_296);
    /// Links to the root domain (`puid`).
    pub const LINKS_TO_ROOT_DOMAIN: Self = Self(8_589_934_592);
    /// Root domains linking to the subdomain (`fipl`).
    pub const ROOT_DOMAINS_LINKING_TO_SUBDOMAIN: Self = Self(17_179_869_184);
    /// Page authority (`upa`).
    pub const PAGE_AUTHORITY: Self = Self(34_359_738_368);
    /// Domain authority (`pda`).
    pub const DOMAIN_AUTHORITY: Self = Self(68_719_476_736);
    /// Time the URL was last crawled (`ulc`).
    pub const LAST_CRAWLED: Self = Self(144_115_188_075_855_872);

    /// Canonical URL, links, page authority and domain authority.
    pub const DEFAULT: Self = Self(
        Self::CANONICAL_URL.0 | Self::LINKS.0 | Self::PAGE_AUTHORITY.0 | Self::DOMAIN_AUTHORITY.0,
    );

    /// Raw mask value as sent in the `Cols` parameter.
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Whether every bit of `other` is set.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl Default for Cols {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<u64> for Cols {
    fn from(bits: u64) -> Self {
        Self(bits)
    }
}

impl BitOr for Cols {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Cols {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for Cols {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Metrics the API reports for one URL.
///
/// The four core fields are always present (zero or empty when the API
/// omitted them). The rest of the schema is optional and only populated when
/// the matching [`Cols`] bit was requested. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct UrlMetrics {
    /// Page authority.
    #[serde(rename = "upa")]
    pub page_authority: f64,
    /// Domain authority.
    #[serde(rename = "pda")]
    pub domain_authority: f64,
    /// Number of links to the URL.
    #[serde(rename = "uid")]
    pub links: f64,
    /// Canonical URL as reported by the API.
    #[serde(rename = "uu")]
    pub url: String,

    #[serde(rename = "ut", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "ufq", skip_serializing_if = "Option::is_none")]
    pub subdomain: Option<String>,
    #[serde(rename = "upl", skip_serializing_if = "Option::is_none")]
    pub root_domain: Option<String>,
    #[serde(rename = "ueid", skip_serializing_if = "Option::is_none")]
    pub external_equity_links: Option<f64>,
    #[serde(rename = "feid", skip_serializing_if = "Option::is_none")]
    pub subdomain_external_links: Option<f64>,
    #[serde(rename = "peid", skip_serializing_if = "Option::is_none")]
    pub root_domain_external_links: Option<f64>,
    #[serde(rename = "ujid", skip_serializing_if = "Option::is_none")]
    pub equity_links: Option<f64>,
    #[serde(rename = "uifq", skip_serializing_if = "Option::is_none")]
    pub subdomains_linking: Option<f64>,
    #[serde(rename = "uipl", skip_serializing_if = "Option::is_none")]
    pub root_domains_linking: Option<f64>,
    #[serde(rename = "fid", skip_serializing_if = "Option::is_none")]
    pub subdomain_subdomains_linking: Option<f64>,
    #[serde(rename = "pid", skip_serializing_if = "Option::is_none")]
    pub root_domain_root_domains_linking: Option<f64>,
    #[serde(rename = "umrp", skip_serializing_if = "Option::is_none")]
    pub moz_rank: Option<f64>,
    #[serde(rename = "umrr", skip_serializing_if = "Option::is_none")]
    pub moz_rank_raw: Option<f64>,
    #[serde(rename = "fmrp", skip_serializing_if = "Option::is_none")]
    pub subdomain_moz_rank: Option<f64>,
    #[serde(rename = "fmrr", skip_serializing_if = "Option::is_none")]
    pub subdomain_moz_rank_raw: Option<f64>,
    #[serde(rename = "pmrp", skip_serializing_if = "Option::is_none")]
    pub root_domain_moz_rank: Option<f64>,
    #[serde(rename = "pmrr", skip_serializing_if = "Option::is_none")]
    pub root_domain_moz_rank_raw: Option<f64>,
    #[serde(rename = "utrp", skip_serializing_if = "Option::is_none")]
    pub moz_trust: Option<f64>,
    #[serde(rename = "utrr", skip_serializing_if = "Option::is_none")]
    pub moz_trust_raw: Option<f64>,
    #[serde(rename = "ftrp", skip_serializing_if = "Option::is_none")]
    pub subdomain_moz_trust: Option<f64>,
    #[serde(rename = "ftrr", skip_serializing_if = "Option::is_none")]
    pub subdomain_moz_trust_raw: Option<f64>,
    #[serde(rename = "ptrp", skip_serializing_if = "Option::is_none")]
    pub root_domain_moz_trust: Option<f64>,
    #[serde(rename = "ptrr", skip_serializing_if = "Option::is_none")]
    pub root_domain_moz_trust_raw: Option<f64>,
    #[serde(rename = "uemrp", skip_serializing_if = "Option::is_none")]
    pub external_moz_rank: Option<f64>,
    #[serde(rename = "uemrr", skip_serializing_if = "Option::is_none")]
    pub external_moz_rank_raw: Option<f64>,
    #[serde(rename = "fejp", skip_serializing_if = "Option::is_none")]
    pub subdomain_external_moz_rank: Option<f64>,
    #[serde(rename = "fejr", skip_serializing_if = "Option::is_none")]
    pub subdomain_external_moz_rank_raw: Option<f64>,
    #[serde(rename = "pejp", skip_serializing_if = "Option::is_none")]
    pub root_domain_external_moz_rank: Option<f64>,
    #[serde(rename = "pejr", skip_serializing_if = "Option::is_none")]
    pub root_domain_external_moz_rank_raw: Option<f64>,
    #[serde(rename = "pjp", skip_serializing_if = "Option::is_none")]
    pub subdomain_combined_moz_rank: Option<f64>,
    #[serde(rename = "pjr", skip_serializing_if = "Option::is_none")]
    pub subdomain_combined_moz_rank_raw: Option<f64>,
    #[serde(rename = "fjp", skip_serializing_if = "Option::is_none")]
    pub root_domain_combined_moz_rank: Option<f64>,
    #[serde(rename = "fjr", skip_serializing_if = "Option::is_none")]
    pub root_domain_combined_moz_rank_raw: Option<f64>,
    #[serde(rename = "us", skip_serializing_if = "Option::is_none")]
    pub http_status_code: Option<f64>,
    #[serde(rename = "fuid", skip_serializing_if = "Option::is_none")]
    pub links_to_subdomain: Option<f64>,
    #[serde(rename = "puid", skip_serializing_if = "Option::is_none")]
    pub links_to_root_domain: Option<f64>,
    #[serde(rename = "fipl", skip_serializing_if = "Option::is_none")]
    pub root_domains_linking_to_subdomain: Option<f64>,
    /// Unix timestamp of the last crawl.
    #[serde(rename = "ulc", skip_serializing_if = "Option::is_none")]
    pub last_crawled: Option<f64>,
}
