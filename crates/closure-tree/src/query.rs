//! Read-only algorithms over the two relations.
//!
//! Absent results are reported as `None` or an empty list; only precondition
//! violations (negative ids, non-positive distances) are errors.

use crate::attributes::AttributeRelation;
use crate::closure::ClosureRelation;
use crate::error::{check_not_negative, check_positive, TreeError, TreeResult};
use crate::exec::Executor;
use crate::model::{Category, CategoryId, CategoryRow, ClosureEdge, ROOT_ID};

#[derive(Clone, Copy)]
pub(crate) struct QueryEngine<'c> {
    attributes: AttributeRelation<'c>,
    closure: ClosureRelation<'c>,
}

impl<'c> QueryEngine<'c> {
    pub(crate) fn new(exec: Executor<'c>) -> Self {
        Self {
            attributes: AttributeRelation::new(exec),
            closure: ClosureRelation::new(exec),
        }
    }

    pub(crate) fn find(&self, id: CategoryId) -> TreeResult<Option<Category>> {
        check_not_negative(id, "id")?;
        self.attributes.select(id)
    }

    pub(crate) fn exists(&self, id: CategoryId) -> TreeResult<bool> {
        if id < 0 {
            return Ok(false);
        }
        self.attributes.contains(id)
    }

    /// Number of categories, root excluded.
    pub(crate) fn count(&self) -> TreeResult<i64> {
        Ok((self.attributes.count()? - 1).max(0))
    }

    pub(crate) fn count_at_level(&self, level: i64) -> TreeResult<i64> {
        check_positive(level, "level")?;
        self.closure.count_at_level(level)
    }

    pub(crate) fn ancestor_id(&self, id: CategoryId, n: i64) -> TreeResult<Option<CategoryId>> {
        check_not_negative(id, "id")?;
        check_positive(n, "distance")?;
        self.closure.select_ancestor(id, n)
    }

    pub(crate) fn ancestor(&self, id: CategoryId, n: i64) -> TreeResult<Option<Category>> {
        match self.ancestor_id(id, n)? {
            Some(ancestor) => self.attributes.select(ancestor),
            None => Ok(None),
        }
    }

    pub(crate) fn distance(&self, from: CategoryId, to: CategoryId) -> TreeResult<Option<i64>> {
        check_not_negative(from, "from")?;
        check_not_negative(to, "to")?;
        self.closure.select_distance(from, to)
    }

    /// Distance from the root; fails with `NotFound` for ids not in the tree.
    pub(crate) fn level(&self, id: CategoryId) -> TreeResult<i64> {
        self.distance(ROOT_ID, id)?.ok_or(TreeError::NotFound(id))
    }

    pub(crate) fn children(&self, id: CategoryId) -> TreeResult<Vec<Category>> {
        self.sub_layer(id, 1)
    }

    pub(crate) fn sub_layer(&self, id: CategoryId, depth: i64) -> TreeResult<Vec<Category>> {
        check_not_negative(id, "id")?;
        check_positive(depth, "depth")?;
        self.closure.select_sub_layer(id, depth)
    }

    /// Everything strictly below `id`.
    pub(crate) fn descendants(&self, id: CategoryId) -> TreeResult<Vec<Category>> {
        check_not_negative(id, "id")?;
        self.closure.select_descendants(id, 1)
    }

    /// `id` followed by everything below it.
    pub(crate) fn subtree(&self, id: CategoryId) -> TreeResult<Vec<Category>> {
        check_not_negative(id, "id")?;
        self.closure.select_descendants(id, 0)
    }

    pub(crate) fn descendant_ids(&self, id: CategoryId) -> TreeResult<Vec<CategoryId>> {
        check_not_negative(id, "id")?;
        self.closure.select_descendant_ids(id)
    }

    pub(crate) fn path(&self, id: CategoryId) -> TreeResult<Vec<Category>> {
        check_not_negative(id, "id")?;
        self.closure.select_path_to_root(id)
    }

    pub(crate) fn path_between(
        &self,
        id: CategoryId,
        ancestor: CategoryId,
    ) -> TreeResult<Vec<Category>> {
        check_not_negative(id, "id")?;
        check_not_negative(ancestor, "ancestor")?;
        self.closure.select_path_to_ancestor(id, ancestor)
    }

    pub(crate) fn list_all(&self) -> TreeResult<Vec<CategoryRow>> {
        self.attributes.select_with_parent()
    }

    pub(crate) fn edges(&self) -> TreeResult<Vec<ClosureEdge>> {
        self.closure.select_all()
    }

    pub(crate) fn node_ids(&self) -> TreeResult<Vec<CategoryId>> {
        self.attributes.select_ids()
    }
}
