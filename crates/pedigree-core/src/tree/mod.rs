//! Ancestry tree construction: slot indexing, the breadth-first builder,
//! and the write-time lineage cycle guard.

pub mod builder;
pub mod lineage;
pub mod slots;

pub use builder::{build_generations, RecordResolver};
pub use lineage::creates_cycle;
