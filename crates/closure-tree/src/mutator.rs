//! Structural mutations.
//!
//! A [`TreeMutator`] always runs against the connection of an open
//! transaction; [`crate::TreeStore`] commits after the operation returns `Ok`
//! and rolls back otherwise. Every precondition is checked before the first
//! write.
//!
//! Two internal primitives carry all of the closure maintenance:
//!
//! ```text
//! relink(id, parent)        drop every edge ending at id, copy parent's chain
//!                           one level deeper, re-add the self-link
//! rebuild_subtree(id, base) relink each child of id under base, then rebuild
//!                           that child's own children under the child
//! ```
//!
//! `rebuild_subtree(id, id)` recomputes the chains of a subtree whose root has
//! just been relinked; `rebuild_subtree(id, parent)` lifts the children of
//! `id` one level up.

use crate::attributes::AttributeRelation;
use crate::closure::ClosureRelation;
use crate::error::{check_not_negative, check_positive, TreeError, TreeResult};
use crate::exec::Executor;
use crate::model::{Attributes, CategoryId, ROOT_ID};

pub(crate) struct TreeMutator<'c> {
    attributes: AttributeRelation<'c>,
    closure: ClosureRelation<'c>,
}

impl<'c> TreeMutator<'c> {
    pub(crate) fn new(exec: Executor<'c>) -> Self {
        Self {
            attributes: AttributeRelation::new(exec),
            closure: ClosureRelation::new(exec),
        }
    }

    // ── Preconditions ──────────────────────────────

    fn require_exists(&self, id: CategoryId) -> TreeResult<()> {
        if !self.attributes.contains(id)? {
            return Err(TreeError::NotFound(id));
        }
        Ok(())
    }

    /// `id` must name a live, non-root category.
    fn require_movable(&self, id: CategoryId) -> TreeResult<()> {
        check_positive(id, "id")?;
        self.require_exists(id)
    }

    /// `target` must be the root or a live category.
    fn require_target(&self, target: CategoryId) -> TreeResult<()> {
        check_not_negative(target, "target")?;
        if target != ROOT_ID {
            self.require_exists(target)?;
        }
        Ok(())
    }

    fn parent_of(&self, id: CategoryId) -> TreeResult<CategoryId> {
        Ok(self.closure.select_ancestor(id, 1)?.unwrap_or(ROOT_ID))
    }

    // ── Operations ─────────────────────────────────

    pub(crate) fn insert(&self, attrs: &Attributes, parent: CategoryId) -> TreeResult<CategoryId> {
        check_not_negative(parent, "parent")?;
        if parent != ROOT_ID && !self.attributes.contains(parent)? {
            return Err(TreeError::InvalidArgument(format!(
                "parent category {} does not exist",
                parent
            )));
        }

        let id = self.attributes.insert(attrs)?;
        self.closure.insert_path(id, parent)?;
        self.closure.insert_self_link(id)?;
        Ok(id)
    }

    /// Inserts a category under a caller-chosen id. The parent must already be
    /// in the tree.
    pub(crate) fn insert_with_id(
        &self,
        id: CategoryId,
        attrs: &Attributes,
        parent: CategoryId,
    ) -> TreeResult<()> {
        check_positive(id, "id")?;
        self.require_target(parent)?;
        self.attributes.insert_with_id(id, attrs)?;
        self.closure.insert_path(id, parent)?;
        self.closure.insert_self_link(id)?;
        Ok(())
    }

    /// Attribute-only write. Existence is decided by the affected-row count.
    pub(crate) fn update(&self, id: CategoryId, attrs: &Attributes) -> TreeResult<()> {
        check_not_negative(id, "id")?;
        if id == ROOT_ID {
            return Err(TreeError::UnsupportedOperation(
                "the root category cannot be renamed".into(),
            ));
        }
        if self.attributes.update(id, attrs)? == 0 {
            return Err(TreeError::NotFound(id));
        }
        Ok(())
    }

    /// Removes `id`; its children move up to its former parent.
    pub(crate) fn delete(&self, id: CategoryId) -> TreeResult<()> {
        self.require_movable(id)?;
        let parent = self.parent_of(id)?;
        self.rebuild_subtree(id, parent)?;
        self.delete_both(id)
    }

    /// Removes `id` and everything below it. Returns the number of categories
    /// removed.
    pub(crate) fn delete_tree(&self, id: CategoryId) -> TreeResult<usize> {
        self.require_movable(id)?;
        let descendants = self.closure.select_descendant_ids(id)?;
        self.delete_both(id)?;
        for descendant in &descendants {
            self.delete_both(*descendant)?;
        }
        Ok(descendants.len() + 1)
    }

    /// Moves the single node `id` under `target`. Its children first float up
    /// to its old parent, even when `target` is that parent.
    pub(crate) fn move_node(&self, id: CategoryId, target: CategoryId) -> TreeResult<()> {
        if id == target {
            return Err(TreeError::InvalidArgument(
                "a category cannot be moved under itself".into(),
            ));
        }
        self.require_target(target)?;
        self.require_movable(id)?;

        let parent = self.parent_of(id)?;
        self.rebuild_subtree(id, parent)?;
        self.relink(id, target)
    }

    /// Moves `id` together with its subtree under `target`. When `target` lies
    /// inside that subtree it is first lifted, with its own subtree, into the
    /// place `id` is leaving.
    pub(crate) fn move_tree(&self, id: CategoryId, target: CategoryId) -> TreeResult<()> {
        self.require_target(target)?;
        self.require_movable(id)?;

        match self.closure.select_distance(id, target)? {
            None => {}
            Some(0) => {
                return Err(TreeError::InvalidArgument(
                    "a category cannot be moved under itself".into(),
                ))
            }
            Some(_) => {
                let parent = self.parent_of(id)?;
                self.relink(target, parent)?;
                self.rebuild_subtree(target, target)?;
            }
        }

        self.relink(id, target)?;
        self.rebuild_subtree(id, id)
    }

    // ── Primitives ─────────────────────────────────

    /// Makes `parent` the sole direct parent of `id` without touching the
    /// edges from `id` down to its own descendants.
    fn relink(&self, id: CategoryId, parent: CategoryId) -> TreeResult<()> {
        self.closure.delete_path(id)?;
        self.closure.insert_path(id, parent)?;
        self.closure.insert_self_link(id)
    }

    /// Relinks every child of `id` under `base`, then recomputes the chains of
    /// everything below those children. Each node is relinked before any of
    /// its descendants, so a child always copies an already-correct chain.
    fn rebuild_subtree(&self, id: CategoryId, base: CategoryId) -> TreeResult<()> {
        let mut pending = vec![(id, base)];
        while let Some((node, base)) = pending.pop() {
            for child in self.closure.select_child_ids(node)? {
                self.relink(child, base)?;
                pending.push((child, child));
            }
        }
        Ok(())
    }

    fn delete_both(&self, id: CategoryId) -> TreeResult<()> {
        self.attributes.delete(id)?;
        self.closure.delete_all(id)?;
        Ok(())
    }
}
