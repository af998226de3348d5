//! Write-time cycle guard over the father/mother relation.
//!
//! A dog must never be its own ancestor. The store calls this before
//! persisting a parent assignment; the tree builder itself trusts the stored
//! relation and simply stops at its depth bound.

use std::collections::HashSet;

use tracing::warn;

use crate::tree::builder::RecordResolver;

/// Whether assigning `candidate_parent_id` as a parent of `dog_id` would
/// create a cycle: true when `dog_id` is reachable from the candidate by
/// following father/mother edges, within `max_depth` generations.
///
/// Iterative breadth-first walk; lookup failures end that branch quietly, so
/// the guard errs towards allowing the write rather than blocking on a
/// transient store fault.
pub fn creates_cycle<R: RecordResolver>(
    resolver: &R,
    dog_id: i64,
    candidate_parent_id: i64,
    max_depth: usize,
) -> bool {
    if dog_id == candidate_parent_id {
        return true;
    }

    let mut visited: HashSet<i64> = HashSet::new();
    let mut frontier = vec![candidate_parent_id];

    for _ in 0..max_depth {
        if frontier.is_empty() {
            break;
        }
        let mut next = Vec::new();
        for id in frontier {
            if !visited.insert(id) {
                continue;
            }
            let entity = match resolver.resolve_by_id(id) {
                Ok(found) => found,
                Err(e) => {
                    warn!("lineage walk failed for id {id}: {e}");
                    None
                }
            };
            let Some(entity) = entity else { continue };
            for parent in [entity.father_id, entity.mother_id].into_iter().flatten() {
                if parent == dog_id {
                    return true;
                }
                next.push(parent);
            }
        }
        frontier = next;
    }

    false
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
