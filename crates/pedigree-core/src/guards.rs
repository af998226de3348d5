//! Shared guardrails for generation depth, fetch bounds, and query limits.

/// Default number of generations produced by the internal tree builder
/// (generation 0 is the subject itself).
pub const DEFAULT_GENERATIONS: usize = 5;

/// Hard ceiling on generation depth for any tree build or lineage walk.
pub const MAX_GENERATIONS: usize = 8;

/// Generations produced by the external scraper: the root plus three
/// ancestor generations (1 + 2 + 4 cards per branch row).
pub const SCRAPE_GENERATIONS: usize = 4;

/// Upper bound on concurrent record lookups within one generation.
pub const MAX_LOOKUP_WORKERS: usize = 8;

/// Generations the write-time cycle guard walks upward before giving up.
/// Far deeper than any real stored lineage.
pub const MAX_LINEAGE_WALK: usize = 64;

/// Timeout for a single fetch against the external pedigree site. The fetch
/// is not retried automatically; the caller decides whether to retry.
pub const FETCH_TIMEOUT_MS: u64 = 12_000;

/// Maximum size of a relayed image response.
pub const MAX_RELAY_BYTES: u64 = 10 * 1024 * 1024;

/// Maximum rows returned by a substring search over dog records.
pub const MAX_SEARCH_LIMIT: i64 = 100;

/// Hosts the server-side fetcher is allowed to contact.
pub const DEFAULT_ALLOWED_HOSTS: &[&str] = &["www.bullypedia.net", "bullypedia.net"];

pub fn clamp_int(value: i64, minimum: i64, maximum: i64) -> i64 {
    value.max(minimum).min(maximum)
}

/// Clamp a requested generation count to `1..=MAX_GENERATIONS`.
pub fn clamp_generations(value: usize) -> usize {
    value.clamp(1, MAX_GENERATIONS)
}

pub fn clamp_limit(value: i64, maximum: i64) -> i64 {
    clamp_int(value, 1, maximum)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
