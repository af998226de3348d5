//! Image relay indirection.
//!
//! Scraped image references are never embedded directly: the scraper emits a
//! relative `/image-proxy?u=<url-encoded original>` reference and the proxy
//! endpoint enforces the response policy here before streaming bytes back.

use url::form_urlencoded;
use url::Url;

use crate::errors::FetchError;
use crate::guards::MAX_RELAY_BYTES;
use crate::scrape::fetch::{check_url, FetchConfig};

/// Path of the internal image-proxy endpoint.
pub const RELAY_PATH: &str = "/image-proxy";

/// Why a relay target or relayed response was refused. The proxy maps these
/// to 4xx responses.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error(transparent)]
    Blocked(#[from] FetchError),

    #[error("Relayed response is not an image: {0}")]
    NotAnImage(String),

    #[error("Relayed response too large: {0} bytes")]
    TooLarge(u64),
}

/// The relative relay reference for an external image URL.
pub fn relay_url(original: &Url) -> String {
    let encoded: String = form_urlencoded::byte_serialize(original.as_str().as_bytes()).collect();
    format!("{RELAY_PATH}?u={encoded}")
}

/// Resolve a scraped `src` attribute (possibly relative) against the source
/// page and wrap it in a relay reference. `None` only when no absolute URL
/// can be formed.
pub fn relay_for(src: &str, base: Option<&Url>) -> Option<String> {
    let absolute = match Url::parse(src) {
        Ok(url) => url,
        Err(_) => base?.join(src).ok()?,
    };
    Some(relay_url(&absolute))
}

/// Decode the original image URL from a relay query string
/// (`u=<encoded>`, as produced by [`relay_url`]).
pub fn relay_target(query: &str) -> Option<String> {
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "u")
        .map(|(_, value)| value.into_owned())
}

/// Validate a decoded relay target against the fetch policy. Same gate as
/// document fetches: https only, allow-listed host, checked pre-network.
pub fn check_relay_target(raw: &str, config: &FetchConfig) -> Result<Url, RelayError> {
    Ok(check_url(raw, config)?)
}

/// Proxy-side response policy: content type must be an image and the size
/// must stay within [`MAX_RELAY_BYTES`]. An unknown length is allowed; the
/// proxy enforces the cap again while streaming.
pub fn check_relay_response(
    content_type: &str,
    content_length: Option<u64>,
) -> Result<(), RelayError> {
    if !content_type.trim().to_lowercase().starts_with("image/") {
        return Err(RelayError::NotAnImage(content_type.to_string()));
    }
    if let Some(length) = content_length {
        if length > MAX_RELAY_BYTES {
            return Err(RelayError::TooLarge(length));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
