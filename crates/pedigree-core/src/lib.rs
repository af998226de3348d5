//! Pedigree core library.
//!
//! Record storage, depth-bounded ancestry tree construction, display-name
//! decomposition, and the external pedigree importer (fetch gate, positional
//! scraper, image relay). The ancestry tree is a strict binary structure:
//! generation `k` holds `2^k` slots, and a slot's binary index spells the
//! father/mother path from the root. Everything downstream — layout, export,
//! the scraper's positional assembly — leans on that law instead of walking
//! pointers.

pub mod errors;
pub mod guards;
pub mod models;
pub mod names;
pub mod scrape;
pub mod store;
pub mod tree;

pub use errors::{FetchError, PedigreeError, PedigreeResult};
pub use models::{
    AncestorNode, GenerationList, ImportWarning, KennelRef, ParsedPedigree, PedigreeEntity, Sex,
};
pub use names::{split_name, NameParts};
pub use scrape::{fetch_document, parse_pedigree, FetchConfig};
pub use store::{Database, NewDog};
pub use tree::{build_generations, creates_cycle, RecordResolver};
