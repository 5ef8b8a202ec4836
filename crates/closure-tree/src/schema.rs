//! Creation and teardown of the two backing relations.
//!
//! | Relation        | Columns                                   | Indexes                    |
//! |-----------------|-------------------------------------------|----------------------------|
//! | `category`      | `id` (autoincrement), `name`, `extra`     | primary key                |
//! | `category_tree` | `ancestor`, `descendant`, `distance`      | `(descendant, distance)`, `(ancestor, distance)` |
//!
//! `extra` is a JSON object holding the opaque additional attributes.
//! The root row `(0, "root")` and its self-link are created together with the
//! tables.

use rusqlite::{params, Connection};
use tracing::debug;

use crate::error::TreeResult;
use crate::model::ROOT_ID;

/// Name of the attribute relation.
pub const CATEGORY_TABLE: &str = "category";

/// Name of the closure relation.
pub const CLOSURE_TABLE: &str = "category_tree";

/// Name given to the root row on bootstrap.
pub const ROOT_NAME: &str = "root";

const CREATE_SQL: &str = "
    CREATE TABLE IF NOT EXISTS category (
        id    INTEGER PRIMARY KEY AUTOINCREMENT,
        name  TEXT    NOT NULL,
        extra TEXT    NOT NULL DEFAULT '{}'
    );
    CREATE TABLE IF NOT EXISTS category_tree (
        ancestor   INTEGER NOT NULL,
        descendant INTEGER NOT NULL,
        distance   INTEGER NOT NULL,
        PRIMARY KEY (ancestor, descendant)
    );
    CREATE INDEX IF NOT EXISTS idx_category_tree_descendant
        ON category_tree (descendant, distance);
    CREATE INDEX IF NOT EXISTS idx_category_tree_ancestor
        ON category_tree (ancestor, distance);
";

/// Creates both relations and the root row. Safe to call on an already
/// initialized database.
pub fn create_tables(conn: &Connection) -> TreeResult<()> {
    conn.execute_batch(CREATE_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO category (id, name, extra) VALUES (?1, ?2, '{}')",
        params![ROOT_ID, ROOT_NAME],
    )?;
    conn.execute(
        "INSERT OR IGNORE INTO category_tree (ancestor, descendant, distance) VALUES (?1, ?1, 0)",
        params![ROOT_ID],
    )?;
    debug!("Created closure tree tables");
    Ok(())
}

/// Drops both relations. Missing tables are ignored.
pub fn drop_tables(conn: &Connection) -> TreeResult<()> {
    conn.execute_batch(
        "DROP TABLE IF EXISTS category_tree;
         DROP TABLE IF EXISTS category;",
    )?;
    debug!("Dropped closure tree tables");
    Ok(())
}

/// True when both relations exist.
pub fn is_initialized(conn: &Connection) -> TreeResult<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN (?1, ?2)",
        params![CATEGORY_TABLE, CLOSURE_TABLE],
        |row| row.get(0),
    )?;
    Ok(count == 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_is_idempotent_and_drop_removes_tables() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(!is_initialized(&conn).unwrap());

        create_tables(&conn).unwrap();
        create_tables(&conn).unwrap();
        assert!(is_initialized(&conn).unwrap());

        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM category", [], |r| r.get(0))
            .unwrap();
        assert_eq!(rows, 1);
        let links: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM category_tree WHERE ancestor = 0 AND descendant = 0 AND distance = 0",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(links, 1);

        drop_tables(&conn).unwrap();
        assert!(!is_initialized(&conn).unwrap());
    }

    #[test]
    fn first_generated_id_follows_root() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        conn.execute("INSERT INTO category (name) VALUES ('first')", [])
            .unwrap();
        assert_eq!(conn.last_insert_rowid(), 1);
    }
}
