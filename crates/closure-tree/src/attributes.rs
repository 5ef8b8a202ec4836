//! The attribute relation: one row per category holding its payload.

use rusqlite::{params, Row};
use serde_json::{Map, Value};

use crate::error::TreeResult;
use crate::exec::Executor;
use crate::model::{Attributes, Category, CategoryId, CategoryRow};

/// A category row before its `extra` column is parsed.
pub(crate) type RawCategory = (CategoryId, String, String);

/// Maps the `id, name, extra` column triple of a result row.
pub(crate) fn raw_category(row: &Row<'_>) -> rusqlite::Result<RawCategory> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?))
}

pub(crate) fn decode(raw: RawCategory) -> TreeResult<Category> {
    let (id, name, extra) = raw;
    let extra: Map<String, Value> = serde_json::from_str(&extra)?;
    Ok(Category { id, name, extra })
}

pub(crate) fn decode_all(raw: Vec<RawCategory>) -> TreeResult<Vec<Category>> {
    raw.into_iter().map(decode).collect()
}

fn encode_extra(attrs: &Attributes) -> TreeResult<String> {
    Ok(serde_json::to_string(&attrs.extra)?)
}

#[derive(Clone, Copy)]
pub(crate) struct AttributeRelation<'c> {
    exec: Executor<'c>,
}

impl<'c> AttributeRelation<'c> {
    pub(crate) fn new(exec: Executor<'c>) -> Self {
        Self { exec }
    }

    pub(crate) fn select(&self, id: CategoryId) -> TreeResult<Option<Category>> {
        self.exec
            .query_opt(
                "SELECT id, name, extra FROM category WHERE id = ?1",
                params![id],
                raw_category,
            )?
            .map(decode)
            .transpose()
    }

    pub(crate) fn contains(&self, id: CategoryId) -> TreeResult<bool> {
        let found = self.exec.query_opt(
            "SELECT 1 FROM category WHERE id = ?1",
            params![id],
            |row| row.get::<_, i64>(0),
        )?;
        Ok(found.is_some())
    }

    /// Number of rows, root included.
    pub(crate) fn count(&self) -> TreeResult<i64> {
        let count = self
            .exec
            .query_opt("SELECT COUNT(*) FROM category", [], |row| row.get(0))?;
        Ok(count.unwrap_or(0))
    }

    pub(crate) fn select_ids(&self) -> TreeResult<Vec<CategoryId>> {
        self.exec
            .query_all("SELECT id FROM category ORDER BY id", [], |row| row.get(0))
    }

    /// Every non-root category with the id of its direct parent.
    pub(crate) fn select_with_parent(&self) -> TreeResult<Vec<CategoryRow>> {
        self.exec.query_all(
            "SELECT C.id, T.ancestor, C.name FROM category AS C \
             LEFT JOIN category_tree AS T ON T.descendant = C.id AND T.distance = 1 \
             WHERE C.id <> 0 ORDER BY C.id",
            [],
            |row| {
                Ok(CategoryRow {
                    id: row.get(0)?,
                    parent_id: row.get(1)?,
                    name: row.get(2)?,
                })
            },
        )
    }

    /// Inserts a row and returns the id the store generated for it.
    pub(crate) fn insert(&self, attrs: &Attributes) -> TreeResult<CategoryId> {
        self.exec.execute(
            "INSERT INTO category (name, extra) VALUES (?1, ?2)",
            params![attrs.name, encode_extra(attrs)?],
        )?;
        Ok(self.exec.last_insert_rowid())
    }

    /// Inserts a row under a caller-chosen id (bulk import).
    pub(crate) fn insert_with_id(&self, id: CategoryId, attrs: &Attributes) -> TreeResult<()> {
        self.exec.execute(
            "INSERT INTO category (id, name, extra) VALUES (?1, ?2, ?3)",
            params![id, attrs.name, encode_extra(attrs)?],
        )?;
        Ok(())
    }

    /// Returns the number of rows changed (0 when `id` does not exist).
    pub(crate) fn update(&self, id: CategoryId, attrs: &Attributes) -> TreeResult<usize> {
        self.exec.execute(
            "UPDATE category SET name = ?1, extra = ?2 WHERE id = ?3",
            params![attrs.name, encode_extra(attrs)?, id],
        )
    }

    pub(crate) fn delete(&self, id: CategoryId) -> TreeResult<usize> {
        self.exec
            .execute("DELETE FROM category WHERE id = ?1", params![id])
    }
}
