//! Consistency check of the closure relation against the attribute relation.
//!
//! The distance-1 edges define the tree; every other edge must be derivable
//! from them. [`check`] reports each deviation instead of stopping at the
//! first one.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use serde::Serialize;

use crate::model::{CategoryId, ClosureEdge, ROOT_ID};

/// One way in which the two relations disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Violation {
    /// A live category has no `(id, id, 0)` edge.
    MissingSelfLink(CategoryId),
    /// A non-root category has no distance-1 edge ending at it.
    Orphan(CategoryId),
    /// A category has more than one distance-1 edge ending at it.
    MultipleParents { id: CategoryId, parents: Vec<CategoryId> },
    /// The root has a parent.
    RootHasParent(CategoryId),
    /// An edge references a category that is not in the attribute relation.
    DanglingEdge(ClosureEdge),
    /// Following parents from this category never reaches the root.
    Cycle(CategoryId),
    /// An edge implied by the parent links is absent.
    MissingEdge(ClosureEdge),
    /// An edge is present that the parent links do not imply.
    UnexpectedEdge(ClosureEdge),
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::MissingSelfLink(id) => write!(f, "category {} has no self-link", id),
            Violation::Orphan(id) => write!(f, "category {} has no parent", id),
            Violation::MultipleParents { id, parents } => {
                write!(f, "category {} has several parents: {:?}", id, parents)
            }
            Violation::RootHasParent(parent) => write!(f, "root has parent {}", parent),
            Violation::DanglingEdge(e) => write!(
                f,
                "edge ({}, {}, {}) references a missing category",
                e.ancestor, e.descendant, e.distance
            ),
            Violation::Cycle(id) => write!(f, "parent chain of {} never reaches the root", id),
            Violation::MissingEdge(e) => write!(
                f,
                "edge ({}, {}, {}) is missing",
                e.ancestor, e.descendant, e.distance
            ),
            Violation::UnexpectedEdge(e) => write!(
                f,
                "edge ({}, {}, {}) is not implied by the tree",
                e.ancestor, e.descendant, e.distance
            ),
        }
    }
}

/// Compares `edges` with the closure implied by their own distance-1 subset.
pub fn check(nodes: &[CategoryId], edges: &[ClosureEdge]) -> Vec<Violation> {
    let live: HashSet<CategoryId> = nodes.iter().copied().collect();
    let mut violations = Vec::new();

    for edge in edges {
        if !live.contains(&edge.ancestor) || !live.contains(&edge.descendant) {
            violations.push(Violation::DanglingEdge(*edge));
        }
    }

    let mut parents: HashMap<CategoryId, Vec<CategoryId>> = HashMap::new();
    for edge in edges.iter().filter(|e| e.distance == 1) {
        parents.entry(edge.descendant).or_default().push(edge.ancestor);
    }

    // Resolve a unique parent per node; nodes with zero or several parents are
    // reported here and skipped by the completeness check below.
    let mut parent_of: HashMap<CategoryId, CategoryId> = HashMap::new();
    for &id in nodes {
        match parents.get(&id).map(Vec::as_slice) {
            None | Some([]) => {
                if id != ROOT_ID {
                    violations.push(Violation::Orphan(id));
                }
            }
            Some([parent]) => {
                if id == ROOT_ID {
                    violations.push(Violation::RootHasParent(*parent));
                } else {
                    parent_of.insert(id, *parent);
                }
            }
            Some(many) => {
                let mut parents = many.to_vec();
                parents.sort_unstable();
                violations.push(Violation::MultipleParents { id, parents });
            }
        }
    }

    let actual: BTreeSet<ClosureEdge> = edges.iter().copied().collect();
    let mut expected: BTreeSet<ClosureEdge> = BTreeSet::new();
    // Nodes whose full chain could be derived; only their edges are compared.
    let mut derivable: HashSet<CategoryId> = HashSet::new();

    for &id in nodes {
        let self_link = ClosureEdge { ancestor: id, descendant: id, distance: 0 };
        if !actual.contains(&self_link) {
            violations.push(Violation::MissingSelfLink(id));
        }
        expected.insert(self_link);

        if id == ROOT_ID {
            derivable.insert(id);
            continue;
        }
        if !parent_of.contains_key(&id) {
            continue;
        }
        let mut chain = Vec::new();
        let mut current = id;
        let mut complete = true;
        while current != ROOT_ID {
            match parent_of.get(&current) {
                Some(&parent) if chain.len() <= nodes.len() => {
                    chain.push(parent);
                    current = parent;
                }
                Some(_) => {
                    violations.push(Violation::Cycle(id));
                    complete = false;
                    break;
                }
                // Broken further up; already reported for that node.
                None => {
                    complete = false;
                    break;
                }
            }
        }
        if !complete {
            continue;
        }
        derivable.insert(id);
        for (i, &ancestor) in chain.iter().enumerate() {
            expected.insert(ClosureEdge {
                ancestor,
                descendant: id,
                distance: i as i64 + 1,
            });
        }
    }

    for edge in expected.difference(&actual) {
        if edge.distance > 0 && derivable.contains(&edge.descendant) {
            violations.push(Violation::MissingEdge(*edge));
        }
    }
    for edge in actual.difference(&expected) {
        if derivable.contains(&edge.descendant) && edge.distance != 1 {
            violations.push(Violation::UnexpectedEdge(*edge));
        }
    }

    violations
}
