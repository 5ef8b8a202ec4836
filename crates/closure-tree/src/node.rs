//! A category handle that reads and writes through its [`TreeStore`].
//!
//! The handle keeps only the id and the row it was loaded with; every call
//! goes back to the store, so a handle never serves stale tree structure.
//! The root handle rejects structural changes outright.

use crate::error::{TreeError, TreeResult};
use crate::model::{Attributes, Category, CategoryId, ROOT_ID};
use crate::store::TreeStore;

#[derive(Clone)]
pub struct CategoryNode<'s> {
    store: &'s TreeStore,
    id: CategoryId,
    loaded: Option<Category>,
}

impl std::fmt::Debug for CategoryNode<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CategoryNode")
            .field("id", &self.id)
            .field("loaded", &self.loaded)
            .finish()
    }
}

impl<'s> CategoryNode<'s> {
    pub(crate) fn loaded(store: &'s TreeStore, category: Category) -> Self {
        Self {
            store,
            id: category.id,
            loaded: Some(category),
        }
    }

    pub(crate) fn root(store: &'s TreeStore) -> Self {
        Self {
            store,
            id: ROOT_ID,
            loaded: None,
        }
    }

    pub fn id(&self) -> CategoryId {
        self.id
    }

    pub fn is_root(&self) -> bool {
        self.id == ROOT_ID
    }

    /// The row as it was when this handle was created.
    pub fn loaded_attributes(&self) -> Option<&Category> {
        self.loaded.as_ref()
    }

    /// The row as it is now.
    pub fn attributes(&self) -> TreeResult<Option<Category>> {
        self.store.find(self.id)
    }

    fn reject_root(&self, op: &str) -> TreeResult<()> {
        if self.is_root() {
            return Err(TreeError::UnsupportedOperation(format!(
                "cannot {} the root category",
                op
            )));
        }
        Ok(())
    }

    // ── Reads ──────────────────────────────────────

    /// The parent row; top-level categories report the root. `None` only for
    /// the root itself.
    pub fn parent(&self) -> TreeResult<Option<Category>> {
        if self.is_root() {
            return Ok(None);
        }
        self.store.parent(self.id)
    }

    pub fn ancestor(&self, n: i64) -> TreeResult<Option<Category>> {
        self.store.ancestor(self.id, n)
    }

    pub fn children(&self) -> TreeResult<Vec<Category>> {
        self.store.children(self.id)
    }

    pub fn sub_layer(&self, depth: i64) -> TreeResult<Vec<Category>> {
        self.store.sub_layer(self.id, depth)
    }

    pub fn descendants(&self) -> TreeResult<Vec<Category>> {
        self.store.descendants(self.id)
    }

    /// This category followed by everything below it.
    pub fn tree(&self) -> TreeResult<Vec<Category>> {
        self.store.subtree(self.id)
    }

    pub fn path(&self) -> TreeResult<Vec<Category>> {
        self.store.path(self.id)
    }

    pub fn path_relative_to(&self, ancestor: CategoryId) -> TreeResult<Vec<Category>> {
        self.store.path_between(self.id, ancestor)
    }

    pub fn level(&self) -> TreeResult<i64> {
        self.store.level(self.id)
    }

    // ── Writes ─────────────────────────────────────

    pub fn move_to(&self, target: CategoryId) -> TreeResult<()> {
        self.reject_root("move")?;
        self.store.move_node(self.id, target)
    }

    pub fn move_tree_to(&self, target: CategoryId) -> TreeResult<()> {
        self.reject_root("move")?;
        self.store.move_tree(self.id, target)
    }

    pub fn rename(&self, attrs: &Attributes) -> TreeResult<()> {
        self.reject_root("rename")?;
        self.store.update(self.id, attrs)
    }

    /// Adds a child under this category and returns a handle to it.
    pub fn add_child(&self, attrs: &Attributes) -> TreeResult<CategoryNode<'s>> {
        let id = self.store.insert(attrs, self.id)?;
        Ok(Self {
            store: self.store,
            id,
            loaded: None,
        })
    }

    pub fn delete(self) -> TreeResult<()> {
        self.reject_root("delete")?;
        self.store.delete(self.id)
    }

    pub fn delete_tree(self) -> TreeResult<usize> {
        self.reject_root("delete")?;
        self.store.delete_tree(self.id)
    }
}
