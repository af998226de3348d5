//! Shared typed models used across the tree builder, scraper, and store.

use serde::{Deserialize, Serialize};

use crate::guards::clamp_generations;

// ---------------------------------------------------------------------------
// Sex
// ---------------------------------------------------------------------------

/// Sex marker for an individual.
///
/// Kept tri-state on purpose: the store and the builder can represent a
/// record with no recorded sex, even though the external scraper collapses
/// "no marker" to `Female` for compatibility with the source site.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
    #[default]
    Unknown,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
            Sex::Unknown => "unknown",
        }
    }

    /// Parse a stored sex marker. Anything unrecognised maps to `Unknown`.
    pub fn parse(value: &str) -> Sex {
        match value.trim().to_lowercase().as_str() {
            "male" => Sex::Male,
            "female" => Sex::Female,
            _ => Sex::Unknown,
        }
    }
}

// ---------------------------------------------------------------------------
// KennelRef
// ---------------------------------------------------------------------------

/// A kennel affiliation, resolved once at the store boundary.
///
/// Scraped individuals carry a kennel name with no id; stored records carry
/// both. This is always a concrete value, never a union inspected downstream.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KennelRef {
    pub id: Option<i64>,
    pub name: String,
}

// ---------------------------------------------------------------------------
// PedigreeEntity
// ---------------------------------------------------------------------------

/// A dog record as the store resolves it: identity, display fields, and the
/// flat father/mother relation the tree builder walks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PedigreeEntity {
    pub id: i64,
    pub name: String,
    pub sex: Sex,
    pub image_url: Option<String>,
    pub profile_url: Option<String>,
    pub father_id: Option<i64>,
    pub mother_id: Option<i64>,
    pub kennel: Option<KennelRef>,
}

// ---------------------------------------------------------------------------
// AncestorNode
// ---------------------------------------------------------------------------

/// One individual at one position in an ancestry tree.
///
/// `father` and `mother` are owned exclusively by this node: the tree is a
/// strict binary tree, never a graph. Two branches that are biologically the
/// same individual still get independent nodes. Instances are ephemeral
/// render/export projections, constructed fresh on every build or parse and
/// never persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AncestorNode {
    /// Stable store identifier; absent for scraped/external individuals.
    pub id: Option<i64>,
    pub name: String,
    pub sex: Sex,
    /// Image reference. Scraped images are relayed through the internal
    /// image-proxy endpoint rather than linked directly.
    pub image: Option<String>,
    /// Source/profile reference for external individuals.
    pub profile_url: Option<String>,
    pub father: Option<Box<AncestorNode>>,
    pub mother: Option<Box<AncestorNode>>,
}

impl AncestorNode {
    pub fn named(name: impl Into<String>, sex: Sex) -> Self {
        Self {
            id: None,
            name: name.into(),
            sex,
            image: None,
            profile_url: None,
            father: None,
            mother: None,
        }
    }

    /// Projection of a stored record, with no parent links attached.
    pub fn from_entity(entity: &PedigreeEntity) -> Self {
        Self {
            id: Some(entity.id),
            name: entity.name.clone(),
            sex: entity.sex,
            image: entity.image_url.clone(),
            profile_url: entity.profile_url.clone(),
            father: None,
            mother: None,
        }
    }

    /// Copy of this node with parent links stripped, for slot storage in a
    /// [`GenerationList`] where position already encodes the relation.
    pub fn slot_projection(&self) -> Self {
        Self {
            id: self.id,
            name: self.name.clone(),
            sex: self.sex,
            image: self.image.clone(),
            profile_url: self.profile_url.clone(),
            father: None,
            mother: None,
        }
    }
}

// ---------------------------------------------------------------------------
// ImportWarning
// ---------------------------------------------------------------------------

/// A non-fatal anomaly encountered while scraping. Warnings accompany the
/// result; they never abort an import.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImportWarning {
    pub code: String,
    pub message: String,
}

impl ImportWarning {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// ParsedPedigree
// ---------------------------------------------------------------------------

/// Best-effort result of scraping an external pedigree document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParsedPedigree {
    pub root: AncestorNode,
    pub warnings: Vec<ImportWarning>,
}

// ---------------------------------------------------------------------------
// GenerationList
// ---------------------------------------------------------------------------

/// A depth-bounded ancestry tree laid out as dense generation rows.
///
/// Generation `k` holds exactly `2^k` slots. The slot at `(k, i)` is reached
/// from the root by reading the binary representation of `i` across `k`
/// bits, most significant first, where 0 = father and 1 = mother. Layout and
/// export collaborators index this directly without further tree-walking.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationList {
    generations: Vec<Vec<Option<AncestorNode>>>,
}

impl GenerationList {
    /// Assemble from pre-built generation rows. Each row is padded or
    /// truncated to its dense `2^k` width so the indexing invariant holds
    /// regardless of what the producer supplied.
    pub fn from_rows(rows: Vec<Vec<Option<AncestorNode>>>) -> Self {
        let generations = rows
            .into_iter()
            .enumerate()
            .map(|(k, mut row)| {
                row.resize(1usize << k, None);
                row
            })
            .collect();
        Self { generations }
    }

    /// Flatten an owned ancestry tree into generation rows, level by level.
    pub fn from_root(root: &AncestorNode, max_generations: usize) -> Self {
        let depth = clamp_generations(max_generations);
        let mut generations = Vec::with_capacity(depth);
        let mut current: Vec<Option<&AncestorNode>> = vec![Some(root)];
        for _ in 0..depth {
            generations.push(
                current
                    .iter()
                    .map(|slot| slot.map(AncestorNode::slot_projection))
                    .collect(),
            );
            let mut next = Vec::with_capacity(current.len() * 2);
            for slot in &current {
                match slot {
                    Some(node) => {
                        next.push(node.father.as_deref());
                        next.push(node.mother.as_deref());
                    }
                    None => {
                        next.push(None);
                        next.push(None);
                    }
                }
            }
            current = next;
        }
        Self { generations }
    }

    /// Number of generations, including generation 0.
    pub fn depth(&self) -> usize {
        self.generations.len()
    }

    pub fn generation(&self, k: usize) -> Option<&[Option<AncestorNode>]> {
        self.generations.get(k).map(|row| row.as_slice())
    }

    /// The node at generation `k`, slot `i`, if known.
    pub fn get(&self, k: usize, i: usize) -> Option<&AncestorNode> {
        self.generations.get(k)?.get(i)?.as_ref()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vec<Option<AncestorNode>>> {
        self.generations.iter()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
