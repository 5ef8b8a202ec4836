use std::sync::Arc;
use std::time::Duration;

use rusqlite::{Connection, Transaction, TransactionBehavior};
use tracing::{debug, instrument};

use crate::error::TreeResult;
use crate::exec::Executor;
use crate::hook::StatementHook;
use crate::import::{parents_first, SeedRow};
use crate::model::{Attributes, Category, CategoryId, CategoryRow, ClosureEdge};
use crate::mutator::TreeMutator;
use crate::node::CategoryNode;
use crate::query::QueryEngine;
use crate::schema;
use crate::verify::{self, Violation};

/// A category tree stored as a closure table in SQLite.
///
/// Reads run directly on the connection and always see the current state.
/// Every structural mutation runs in its own `IMMEDIATE` transaction: it
/// either commits completely or is rolled back, so readers never observe a
/// half-relinked subtree. The store does not serialize writers itself; a
/// second writer on the same database file fails immediately with
/// `SQLITE_BUSY` instead of waiting or interleaving. Callers that prefer to
/// wait can raise the limit with [`TreeStore::set_busy_timeout`].
pub struct TreeStore {
    conn: Connection,
    hook: Option<Arc<dyn StatementHook>>,
}

impl TreeStore {
    /// Opens (or creates) a SQLite database at the given file path.
    #[instrument(skip_all, fields(path = %path))]
    pub fn open(path: &str) -> TreeResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        conn.busy_timeout(Duration::ZERO)?;
        debug!("Opened TreeStore at {}", path);
        Ok(Self { conn, hook: None })
    }

    /// Opens an in-memory SQLite database (useful for testing).
    pub fn open_memory() -> TreeResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        debug!("Opened in-memory TreeStore");
        Ok(Self { conn, hook: None })
    }

    /// Reports every statement the store executes to `hook`.
    pub fn with_hook(mut self, hook: Arc<dyn StatementHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    /// How long a write waits for another connection's write lock before
    /// failing. Zero unless changed here.
    pub fn set_busy_timeout(&self, timeout: Duration) -> TreeResult<()> {
        self.conn.busy_timeout(timeout)?;
        Ok(())
    }

    /// Creates the attribute and closure relations and the root row.
    pub fn create_tables(&self) -> TreeResult<()> {
        schema::create_tables(&self.conn)
    }

    pub fn drop_tables(&self) -> TreeResult<()> {
        schema::drop_tables(&self.conn)
    }

    pub fn is_initialized(&self) -> TreeResult<bool> {
        schema::is_initialized(&self.conn)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// The category with the given id, root included.
    pub fn find(&self, id: CategoryId) -> TreeResult<Option<Category>> {
        self.read().find(id)
    }

    /// A handle bound to the category `id`, or `None` if it does not exist.
    pub fn node(&self, id: CategoryId) -> TreeResult<Option<CategoryNode<'_>>> {
        Ok(self
            .find(id)?
            .map(|category| CategoryNode::loaded(self, category)))
    }

    /// A handle bound to the root category.
    pub fn root(&self) -> CategoryNode<'_> {
        CategoryNode::root(self)
    }

    pub fn exists(&self, id: CategoryId) -> TreeResult<bool> {
        self.read().exists(id)
    }

    /// Number of categories, not counting the root.
    pub fn count(&self) -> TreeResult<i64> {
        self.read().count()
    }

    /// Number of categories exactly `level` steps below the root.
    pub fn count_at_level(&self, level: i64) -> TreeResult<i64> {
        self.read().count_at_level(level)
    }

    /// Id of the ancestor `n` levels above `id` (`n >= 1`).
    pub fn ancestor_id(&self, id: CategoryId, n: i64) -> TreeResult<Option<CategoryId>> {
        self.read().ancestor_id(id, n)
    }

    pub fn ancestor(&self, id: CategoryId, n: i64) -> TreeResult<Option<Category>> {
        self.read().ancestor(id, n)
    }

    /// The direct parent; `None` for the root or an unknown id.
    pub fn parent(&self, id: CategoryId) -> TreeResult<Option<Category>> {
        self.read().ancestor(id, 1)
    }

    /// How many levels `to` is below `from`; `None` if `from` is not an
    /// ancestor of `to` (and `Some(0)` when they are equal).
    pub fn distance(&self, from: CategoryId, to: CategoryId) -> TreeResult<Option<i64>> {
        self.read().distance(from, to)
    }

    /// Distance from the root. Fails with `NotFound` for unknown ids.
    pub fn level(&self, id: CategoryId) -> TreeResult<i64> {
        self.read().level(id)
    }

    pub fn children(&self, id: CategoryId) -> TreeResult<Vec<Category>> {
        self.read().children(id)
    }

    /// Categories exactly `depth` levels below `id` (`depth >= 1`).
    pub fn sub_layer(&self, id: CategoryId, depth: i64) -> TreeResult<Vec<Category>> {
        self.read().sub_layer(id, depth)
    }

    /// Every category strictly below `id`.
    pub fn descendants(&self, id: CategoryId) -> TreeResult<Vec<Category>> {
        self.read().descendants(id)
    }

    /// `id` itself followed by every category below it.
    pub fn subtree(&self, id: CategoryId) -> TreeResult<Vec<Category>> {
        self.read().subtree(id)
    }

    pub fn descendant_ids(&self, id: CategoryId) -> TreeResult<Vec<CategoryId>> {
        self.read().descendant_ids(id)
    }

    /// From the top-level category down to `id` inclusive; the root is left
    /// out. Empty for unknown ids.
    pub fn path(&self, id: CategoryId) -> TreeResult<Vec<Category>> {
        self.read().path(id)
    }

    /// From just below `ancestor` down to `id` inclusive. Empty unless
    /// `ancestor` is a proper ancestor of `id`.
    pub fn path_between(&self, id: CategoryId, ancestor: CategoryId) -> TreeResult<Vec<Category>> {
        self.read().path_between(id, ancestor)
    }

    /// Every non-root category with its parent id, ordered by id.
    pub fn list_all(&self) -> TreeResult<Vec<CategoryRow>> {
        self.read().list_all()
    }

    /// The whole closure relation, ordered by descendant then distance.
    pub fn edges(&self) -> TreeResult<Vec<ClosureEdge>> {
        self.read().edges()
    }

    /// Checks the closure relation against the tree its distance-1 edges
    /// describe. An empty result means the store is consistent.
    ///
    /// Both relations are read from one snapshot, so a write committed by
    /// another connection in between cannot show up as a violation.
    #[instrument(skip_all)]
    pub fn verify(&self) -> TreeResult<Vec<Violation>> {
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Deferred)?;
        let query = QueryEngine::new(Executor::new(&tx, self.hook.as_deref()));
        let nodes = query.node_ids()?;
        let edges = query.edges()?;
        tx.commit()?;
        let violations = verify::check(&nodes, &edges);
        debug!(
            nodes = nodes.len(),
            edges = edges.len(),
            violations = violations.len(),
            "Verified closure table"
        );
        Ok(violations)
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Inserts a category under `parent` (0 = top level) and returns its id.
    #[instrument(skip_all, fields(parent = parent))]
    pub fn insert(&self, attrs: &Attributes, parent: CategoryId) -> TreeResult<CategoryId> {
        let id = self.write(|m| m.insert(attrs, parent))?;
        debug!("Inserted category {} under {}", id, parent);
        Ok(id)
    }

    /// Replaces the attributes of `id`. The tree shape is untouched.
    #[instrument(skip_all, fields(id = id))]
    pub fn update(&self, id: CategoryId, attrs: &Attributes) -> TreeResult<()> {
        self.write(|m| m.update(id, attrs))?;
        debug!("Updated category {}", id);
        Ok(())
    }

    /// Deletes `id`; its children become children of its former parent.
    #[instrument(skip_all, fields(id = id))]
    pub fn delete(&self, id: CategoryId) -> TreeResult<()> {
        self.write(|m| m.delete(id))?;
        debug!("Deleted category {}", id);
        Ok(())
    }

    /// Deletes `id` and its whole subtree. Returns how many categories were
    /// removed.
    #[instrument(skip_all, fields(id = id))]
    pub fn delete_tree(&self, id: CategoryId) -> TreeResult<usize> {
        let removed = self.write(|m| m.delete_tree(id))?;
        debug!("Deleted subtree of {} ({} categories)", id, removed);
        Ok(removed)
    }

    /// Moves the single category `id` under `target`; its children take its
    /// former place.
    ///
    /// ```text
    ///       1                                    1
    ///       |                                  / | \
    ///       2                                 3  4  5
    ///     / | \        move_node(2, 7)             / \
    ///    3  4  5      ----------------->          6   7
    ///         / \                                /  / | \
    ///       6    7                              8  9  10 2
    ///      /    /  \
    ///     8    9    10
    /// ```
    #[instrument(skip_all, fields(id = id, target = target))]
    pub fn move_node(&self, id: CategoryId, target: CategoryId) -> TreeResult<()> {
        self.write(|m| m.move_node(id, target))?;
        debug!("Moved category {} under {}", id, target);
        Ok(())
    }

    /// Moves `id` with its whole subtree under `target`. If `target` is inside
    /// that subtree it is first lifted into the place `id` leaves.
    ///
    /// ```text
    ///       1                                      1
    ///       |                                      |
    ///       2                                      7
    ///     / | \        move_tree(2, 7)           / | \
    ///    3  4  5      -------------------->     9  10  2
    ///         / \                                    / | \
    ///       6    7                                  3  4  5
    ///      /    /  \                                      |
    ///     8    9    10                                    6
    ///                                                     |
    ///                                                     8
    /// ```
    #[instrument(skip_all, fields(id = id, target = target))]
    pub fn move_tree(&self, id: CategoryId, target: CategoryId) -> TreeResult<()> {
        self.write(|m| m.move_tree(id, target))?;
        debug!("Moved subtree of {} under {}", id, target);
        Ok(())
    }

    /// Inserts categories with caller-chosen ids in one transaction.
    #[instrument(skip_all, fields(rows = rows.len()))]
    pub fn import_rows(&self, rows: &[SeedRow]) -> TreeResult<usize> {
        let imported = self.write(|m| {
            let query = self.read();
            let ordered = parents_first(rows, |id| query.exists(id))?;
            for row in &ordered {
                m.insert_with_id(row.id, &row.attributes, row.parent)?;
            }
            Ok(ordered.len())
        })?;
        debug!("Imported {} categories", imported);
        Ok(imported)
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    #[cfg(test)]
    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }

    fn executor(&self) -> Executor<'_> {
        Executor::new(&self.conn, self.hook.as_deref())
    }

    fn read(&self) -> QueryEngine<'_> {
        QueryEngine::new(self.executor())
    }

    /// Runs `op` inside an `IMMEDIATE` transaction. The transaction commits
    /// only if `op` succeeds; on any error it is dropped, which rolls it back.
    fn write<T>(&self, op: impl FnOnce(&TreeMutator<'_>) -> TreeResult<T>) -> TreeResult<T> {
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;
        let value = op(&TreeMutator::new(Executor::new(&tx, self.hook.as_deref())))?;
        tx.commit()?;
        Ok(value)
    }
}
