//! Breadth-first ancestry tree construction over a record-lookup capability.
//!
//! The builder walks the flat father/mother relation one generation at a
//! time: generation `k` is resolved entirely from generation `k-1`'s ids, in
//! slot order, before generation `k+1` begins. Lookups within a generation
//! are mutually independent and run on a bounded Rayon pool. Every failure
//! degrades to "unknown ancestor" — the builder itself never errors; a root
//! that fails to resolve is the caller's precondition to report.

use rayon::prelude::*;
use tracing::warn;

use crate::errors::PedigreeResult;
use crate::guards::{clamp_generations, MAX_LOOKUP_WORKERS};
use crate::models::{AncestorNode, GenerationList, PedigreeEntity};

/// Capability to resolve a record id to an entity.
///
/// Implementations must not error for "not found" — that is `Ok(None)`.
/// Transient store failures may surface as `Err`; the builder treats both
/// identically, so one bad record never aborts a whole tree.
pub trait RecordResolver: Sync {
    fn resolve_by_id(&self, id: i64) -> PedigreeResult<Option<PedigreeEntity>>;
}

fn lookup<R: RecordResolver + ?Sized>(resolver: &R, id: i64) -> Option<PedigreeEntity> {
    match resolver.resolve_by_id(id) {
        Ok(found) => found,
        Err(e) => {
            warn!("ancestor lookup failed for id {id}: {e}");
            None
        }
    }
}

/// Resolve one generation's parent ids, preserving slot order. `None` ids
/// (unknown parent) short-circuit without a lookup.
fn resolve_generation<R: RecordResolver + ?Sized>(
    resolver: &R,
    parent_ids: &[Option<i64>],
) -> Vec<Option<PedigreeEntity>> {
    let pending = parent_ids.iter().filter(|id| id.is_some()).count();
    if pending <= 1 {
        return parent_ids
            .iter()
            .map(|id| id.and_then(|id| lookup(resolver, id)))
            .collect();
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(pending.min(MAX_LOOKUP_WORKERS))
        .build();

    match pool {
        Ok(pool) => pool.install(|| {
            parent_ids
                .par_iter()
                .map(|id| id.and_then(|id| lookup(resolver, id)))
                .collect()
        }),
        Err(_) => {
            // Fallback to sequential
            parent_ids
                .iter()
                .map(|id| id.and_then(|id| lookup(resolver, id)))
                .collect()
        }
    }
}

/// Build a depth-bounded generation list rooted at `root`.
///
/// Generation 0 is `[root]`; generation `k` holds the fathers and mothers of
/// generation `k-1` in slot order (father at `2i`, mother at `2i+1`).
pub fn build_generations<R: RecordResolver>(
    root: PedigreeEntity,
    max_generations: usize,
    resolver: &R,
) -> GenerationList {
    let depth = clamp_generations(max_generations);
    let mut entity_rows: Vec<Vec<Option<PedigreeEntity>>> = Vec::with_capacity(depth);
    let mut current = vec![Some(root)];

    for _ in 1..depth {
        let parent_ids: Vec<Option<i64>> = current
            .iter()
            .flat_map(|slot| match slot {
                Some(entity) => [entity.father_id, entity.mother_id],
                None => [None, None],
            })
            .collect();
        let next = resolve_generation(resolver, &parent_ids);
        entity_rows.push(current);
        current = next;
    }
    entity_rows.push(current);

    GenerationList::from_rows(
        entity_rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|slot| slot.map(|entity| AncestorNode::from_entity(&entity)))
                    .collect()
            })
            .collect(),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
