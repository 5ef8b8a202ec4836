//! The closure relation: every `(ancestor, descendant, distance)` triple.
//!
//! Lookups by `descendant` serve ancestor, path and distance queries; lookups
//! by `ancestor` serve children, sub-layer and subtree queries. Queries that
//! return whole categories join back to the attribute relation.

use rusqlite::params;

use crate::attributes::{decode_all, raw_category};
use crate::error::TreeResult;
use crate::exec::Executor;
use crate::model::{Category, CategoryId, ClosureEdge};

#[derive(Clone, Copy)]
pub(crate) struct ClosureRelation<'c> {
    exec: Executor<'c>,
}

impl<'c> ClosureRelation<'c> {
    pub(crate) fn new(exec: Executor<'c>) -> Self {
        Self { exec }
    }

    // ── Reads ──────────────────────────────────────

    /// The ancestor of `id` at distance `n` (0 = itself, 1 = parent).
    pub(crate) fn select_ancestor(&self, id: CategoryId, n: i64) -> TreeResult<Option<CategoryId>> {
        self.exec.query_opt(
            "SELECT ancestor FROM category_tree WHERE descendant = ?1 AND distance = ?2",
            params![id, n],
            |row| row.get(0),
        )
    }

    /// Distance from `ancestor` down to `id`, if `ancestor` is one of its ancestors.
    pub(crate) fn select_distance(
        &self,
        ancestor: CategoryId,
        id: CategoryId,
    ) -> TreeResult<Option<i64>> {
        self.exec.query_opt(
            "SELECT distance FROM category_tree WHERE descendant = ?1 AND ancestor = ?2",
            params![id, ancestor],
            |row| row.get(0),
        )
    }

    pub(crate) fn select_child_ids(&self, parent: CategoryId) -> TreeResult<Vec<CategoryId>> {
        self.exec.query_all(
            "SELECT descendant FROM category_tree WHERE ancestor = ?1 AND distance = 1",
            params![parent],
            |row| row.get(0),
        )
    }

    /// Ids of every node strictly below `ancestor`.
    pub(crate) fn select_descendant_ids(&self, ancestor: CategoryId) -> TreeResult<Vec<CategoryId>> {
        self.exec.query_all(
            "SELECT descendant FROM category_tree WHERE ancestor = ?1 AND distance > 0",
            params![ancestor],
            |row| row.get(0),
        )
    }

    /// Categories exactly `n` levels below `ancestor`.
    pub(crate) fn select_sub_layer(&self, ancestor: CategoryId, n: i64) -> TreeResult<Vec<Category>> {
        let raw = self.exec.query_all(
            "SELECT B.id, B.name, B.extra FROM category_tree AS A \
             JOIN category AS B ON A.descendant = B.id \
             WHERE A.ancestor = ?1 AND A.distance = ?2",
            params![ancestor, n],
            raw_category,
        )?;
        decode_all(raw)
    }

    /// Categories at least `min_distance` levels below `ancestor`, nearest first.
    pub(crate) fn select_descendants(
        &self,
        ancestor: CategoryId,
        min_distance: i64,
    ) -> TreeResult<Vec<Category>> {
        let raw = self.exec.query_all(
            "SELECT B.id, B.name, B.extra FROM category_tree AS A \
             JOIN category AS B ON A.descendant = B.id \
             WHERE A.ancestor = ?1 AND A.distance >= ?2 \
             ORDER BY A.distance, B.id",
            params![ancestor, min_distance],
            raw_category,
        )?;
        decode_all(raw)
    }

    /// From the top-level ancestor down to `id` itself, root excluded.
    pub(crate) fn select_path_to_root(&self, id: CategoryId) -> TreeResult<Vec<Category>> {
        let raw = self.exec.query_all(
            "SELECT B.id, B.name, B.extra FROM category_tree AS A \
             JOIN category AS B ON A.ancestor = B.id \
             WHERE A.descendant = ?1 AND A.ancestor <> 0 \
             ORDER BY A.distance DESC",
            params![id],
            raw_category,
        )?;
        decode_all(raw)
    }

    /// From just below `ancestor` down to `id`. Empty when `ancestor` is not a
    /// proper ancestor of `id`: the sub-select then yields NULL or 0 and no
    /// distance compares below it.
    pub(crate) fn select_path_to_ancestor(
        &self,
        id: CategoryId,
        ancestor: CategoryId,
    ) -> TreeResult<Vec<Category>> {
        let raw = self.exec.query_all(
            "SELECT B.id, B.name, B.extra FROM category_tree AS A \
             JOIN category AS B ON A.ancestor = B.id \
             WHERE A.descendant = ?1 AND A.distance < \
               (SELECT distance FROM category_tree WHERE descendant = ?1 AND ancestor = ?2) \
             ORDER BY A.distance DESC",
            params![id, ancestor],
            raw_category,
        )?;
        decode_all(raw)
    }

    pub(crate) fn count_at_level(&self, level: i64) -> TreeResult<i64> {
        let count = self.exec.query_opt(
            "SELECT COUNT(*) FROM category_tree WHERE ancestor = 0 AND distance = ?1",
            params![level],
            |row| row.get(0),
        )?;
        Ok(count.unwrap_or(0))
    }

    pub(crate) fn select_all(&self) -> TreeResult<Vec<ClosureEdge>> {
        self.exec.query_all(
            "SELECT ancestor, descendant, distance FROM category_tree \
             ORDER BY descendant, distance",
            [],
            |row| {
                Ok(ClosureEdge {
                    ancestor: row.get(0)?,
                    descendant: row.get(1)?,
                    distance: row.get(2)?,
                })
            },
        )
    }

    // ── Writes ─────────────────────────────────────

    /// Copies the ancestor chain of `parent` onto `id`, one level deeper:
    /// `(a, parent, d)` becomes `(a, id, d + 1)`. A single batched statement.
    pub(crate) fn insert_path(&self, id: CategoryId, parent: CategoryId) -> TreeResult<usize> {
        self.exec.execute(
            "INSERT INTO category_tree (ancestor, descendant, distance) \
             SELECT ancestor, ?1, distance + 1 FROM category_tree WHERE descendant = ?2",
            params![id, parent],
        )
    }

    pub(crate) fn insert_self_link(&self, id: CategoryId) -> TreeResult<()> {
        self.exec.execute(
            "INSERT INTO category_tree (ancestor, descendant, distance) VALUES (?1, ?1, 0)",
            params![id],
        )?;
        Ok(())
    }

    /// Drops every edge ending at `id`, self-link included. The edges from
    /// `id` down to its own descendants are left alone.
    pub(crate) fn delete_path(&self, id: CategoryId) -> TreeResult<usize> {
        self.exec.execute(
            "DELETE FROM category_tree WHERE descendant = ?1",
            params![id],
        )
    }

    /// Drops every edge touching `id`, as ancestor or as descendant.
    pub(crate) fn delete_all(&self, id: CategoryId) -> TreeResult<usize> {
        self.exec.execute(
            "DELETE FROM category_tree WHERE descendant = ?1 OR ancestor = ?1",
            params![id],
        )
    }
}
