//! External pedigree import: fetch gate, positional card extraction, slot
//! assembly, and the image relay.

pub mod assemble;
pub mod cards;
pub mod fetch;
pub mod relay;

pub use assemble::parse_pedigree;
pub use fetch::{check_url, fetch_document, FetchConfig, FetchedDocument};
pub use relay::{check_relay_response, check_relay_target, relay_target, relay_url, RelayError, RELAY_PATH};
