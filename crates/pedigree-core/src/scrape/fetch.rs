//! Server-side document fetch with a strict pre-network gate.
//!
//! Only `https` URLs on an explicit host allow-list may be fetched. The gate
//! runs deterministically before any network call, for valid-looking and
//! malformed URLs alike. A fetch is a single bounded-timeout operation and
//! is never retried automatically; the caller decides whether to retry.

use std::time::Duration;

use sha2::{Digest, Sha256};
use tracing::debug;
use url::Url;

use crate::errors::FetchError;
use crate::guards::{DEFAULT_ALLOWED_HOSTS, FETCH_TIMEOUT_MS};

/// Fetch policy: which hosts may be contacted and for how long.
#[derive(Clone, Debug)]
pub struct FetchConfig {
    pub allowed_hosts: Vec<String>,
    pub timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            allowed_hosts: DEFAULT_ALLOWED_HOSTS.iter().map(|h| h.to_string()).collect(),
            timeout: Duration::from_millis(FETCH_TIMEOUT_MS),
        }
    }
}

/// A successfully fetched document plus provenance fields.
#[derive(Clone, Debug)]
pub struct FetchedDocument {
    pub final_url: String,
    pub status: u16,
    pub body: String,
    /// SHA-256 hex digest of the body, recorded with import provenance.
    pub content_hash: String,
}

/// Validate a URL against the fetch policy without touching the network.
pub fn check_url(raw: &str, config: &FetchConfig) -> Result<Url, FetchError> {
    let url = Url::parse(raw.trim()).map_err(|_| FetchError::InvalidUrl(raw.to_string()))?;
    if url.scheme() != "https" {
        return Err(FetchError::BlockedScheme(url.scheme().to_string()));
    }
    let host = url
        .host_str()
        .ok_or_else(|| FetchError::InvalidUrl(raw.to_string()))?;
    let host_lower = host.to_lowercase();
    if !config
        .allowed_hosts
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(&host_lower))
    {
        return Err(FetchError::BlockedHost(host_lower));
    }
    Ok(url)
}

fn transport_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Network(e.to_string())
    }
}

/// Fetch a remote pedigree document.
///
/// Non-2xx responses are reported as [`FetchError::UpstreamStatus`]; the
/// body is only read for successful responses.
pub fn fetch_document(raw_url: &str, config: &FetchConfig) -> Result<FetchedDocument, FetchError> {
    let url = check_url(raw_url, config)?;

    let client = reqwest::blocking::Client::builder()
        .timeout(config.timeout)
        .build()
        .map_err(|e| FetchError::Network(e.to_string()))?;

    let response = client.get(url).send().map_err(transport_error)?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::UpstreamStatus(status.as_u16()));
    }
    let final_url = response.url().to_string();
    let body = response.text().map_err(transport_error)?;

    let mut hasher = Sha256::new();
    hasher.update(body.as_bytes());
    let content_hash = format!("{:x}", hasher.finalize());

    debug!(
        "fetched {} ({} bytes, sha256 {})",
        final_url,
        body.len(),
        &content_hash[..12]
    );

    Ok(FetchedDocument {
        final_url,
        status: status.as_u16(),
        body,
        content_hash,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
