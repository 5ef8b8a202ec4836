//! Bulk loading of categories with known ids.
//!
//! Rows may arrive in any order; they are inserted parents-first so each row
//! can copy its parent's ancestor chain. A row whose parent is neither the
//! root, another row of the batch, nor an existing category is rejected, as
//! is a batch whose parent links form a cycle.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{TreeError, TreeResult};
use crate::model::{Attributes, CategoryId, ROOT_ID};

/// One category to import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedRow {
    pub id: CategoryId,
    pub parent: CategoryId,
    pub attributes: Attributes,
}

impl SeedRow {
    pub fn new(id: CategoryId, parent: CategoryId, name: impl Into<String>) -> Self {
        Self {
            id,
            parent,
            attributes: Attributes::new(name),
        }
    }
}

/// The reference dataset: 13 categories named `Name_<id>` below the root.
///
/// ```text
///             0
///           /   \
///          1     11
///          |    /  \
///          2   12   13
///        / | \
///       3  4  5
///            /  \
///           6    7
///          /    /  \
///         8    9    10
/// ```
pub fn fixture() -> Vec<SeedRow> {
    const LINKS: [(CategoryId, CategoryId); 13] = [
        (1, 0),
        (2, 1),
        (3, 2),
        (4, 2),
        (5, 2),
        (6, 5),
        (7, 5),
        (8, 6),
        (9, 7),
        (10, 7),
        (11, 0),
        (12, 11),
        (13, 11),
    ];
    LINKS
        .iter()
        .map(|&(id, parent)| SeedRow::new(id, parent, format!("Name_{}", id)))
        .collect()
}

/// Orders `rows` so that every row comes after the batch row that is its
/// parent. `exists` answers for parents outside the batch.
pub(crate) fn parents_first<'r>(
    rows: &'r [SeedRow],
    mut exists: impl FnMut(CategoryId) -> TreeResult<bool>,
) -> TreeResult<Vec<&'r SeedRow>> {
    let mut by_id: HashMap<CategoryId, &SeedRow> = HashMap::with_capacity(rows.len());
    for row in rows {
        if row.id <= ROOT_ID {
            return Err(TreeError::InvalidArgument(format!(
                "imported id must be positive, got {}",
                row.id
            )));
        }
        if by_id.insert(row.id, row).is_some() {
            return Err(TreeError::InvalidArgument(format!(
                "duplicate id {} in import batch",
                row.id
            )));
        }
    }

    let mut placed: HashSet<CategoryId> = HashSet::with_capacity(rows.len());
    let mut ordered = Vec::with_capacity(rows.len());

    for row in rows {
        // Walk up until reaching something already placed or outside the batch,
        // then emit the chain top-down.
        let mut chain = Vec::new();
        let mut current = row;
        loop {
            if placed.contains(&current.id) {
                break;
            }
            if chain.len() > rows.len() {
                return Err(TreeError::InvalidArgument(format!(
                    "parent links of {} form a cycle",
                    row.id
                )));
            }
            chain.push(current);
            match by_id.get(&current.parent) {
                Some(&parent) => current = parent,
                _ => {
                    if current.parent != ROOT_ID && !exists(current.parent)? {
                        return Err(TreeError::InvalidArgument(format!(
                            "parent category {} of {} does not exist",
                            current.parent, current.id
                        )));
                    }
                    break;
                }
            }
        }
        for row in chain.into_iter().rev() {
            if placed.insert(row.id) {
                ordered.push(row);
            }
        }
    }

    Ok(ordered)
}
