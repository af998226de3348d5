//! Generation/slot indexing for the binary ancestry tree.
//!
//! Generation `k` holds a dense, ordered sequence of `2^k` slots. The path
//! from the root to slot `i` (0-indexed, `i < 2^k`) is the binary
//! representation of `i` read across `k` bits, most significant bit first:
//! 0 = take father, 1 = take mother. Both the recursive-lookup builder and
//! the positional scraper place nodes through this single mapping, and the
//! grid layout consumes it unchanged.

use serde::{Deserialize, Serialize};

/// One step along an ancestor path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParentStep {
    Father,
    Mother,
}

/// Number of slots in generation `k`.
pub fn slots_in_generation(k: usize) -> usize {
    1usize << k
}

/// The ancestor path from the root to slot `i` at generation `k`.
///
/// Returns `None` when `i` is out of range for the generation.
pub fn path_to_slot(k: usize, i: usize) -> Option<Vec<ParentStep>> {
    if i >= slots_in_generation(k) {
        return None;
    }
    let mut path = Vec::with_capacity(k);
    for bit in (0..k).rev() {
        if (i >> bit) & 1 == 0 {
            path.push(ParentStep::Father);
        } else {
            path.push(ParentStep::Mother);
        }
    }
    Some(path)
}

/// The slot at generation `k-1` whose father or mother occupies slot `i`
/// at generation `k`.
pub fn parent_slot(i: usize) -> usize {
    i / 2
}

/// Whether slot `i` is a father slot (even) or a mother slot (odd) relative
/// to its child at the previous generation.
pub fn step_from_parent(i: usize) -> ParentStep {
    if i % 2 == 0 {
        ParentStep::Father
    } else {
        ParentStep::Mother
    }
}

/// The two slots at generation `k+1` holding the parents of slot `i`.
pub fn child_slots(i: usize) -> (usize, usize) {
    (i * 2, i * 2 + 1)
}

// ---------------------------------------------------------------------------
// Grid layout
// ---------------------------------------------------------------------------

/// A cell in the fixed visual grid: one generation per column, the deepest
/// generation defining the row count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridCell {
    pub column: usize,
    pub row_start: usize,
    pub row_span: usize,
}

/// Map slot `(k, i)` into a grid with `total_generations` columns and
/// `2^(total_generations - 1)` rows. A node spans the rows its deepest
/// descendants would occupy, so every generation column fills the full grid
/// height. Returns `None` for out-of-range coordinates.
pub fn grid_cell(k: usize, i: usize, total_generations: usize) -> Option<GridCell> {
    if total_generations == 0 || k >= total_generations || i >= slots_in_generation(k) {
        return None;
    }
    let span = 1usize << (total_generations - 1 - k);
    Some(GridCell {
        column: k,
        row_start: i * span,
        row_span: span,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
