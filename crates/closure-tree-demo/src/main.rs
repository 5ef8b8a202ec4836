//! Closure-tree demo.
//!
//! Reads configuration from environment variables (see [`config::Config`]),
//! opens the store, creates the tables, loads the reference dataset into an
//! empty tree, then prints the tree and the result of the consistency check.
//!
//! ## Quick start
//!
//! ```bash
//! # In-memory, reference dataset
//! cargo run --bin closure-tree-demo
//!
//! # Persistent file, show every statement
//! CLOSURE_TREE_DB=/tmp/tree.db \
//! CLOSURE_TREE_TRACK_SQL=1 \
//! CLOSURE_TREE_LOG_LEVEL=closure_tree=debug,info \
//!   cargo run --bin closure-tree-demo
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use closure_tree::{fixture, CategoryId, CategoryRow, StatementRecorder, TreeStore, ROOT_ID};

mod config;
use config::Config;

fn main() -> anyhow::Result<()> {
    // ── Tracing ───────────────────────────────────────────────────────────────
    let config = Config::from_env();

    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .compact()
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        db      = %config.db_path,
        "closure-tree demo starting"
    );

    // ── Open store ────────────────────────────────────────────────────────────
    let opened = if config.in_memory() {
        TreeStore::open_memory()
    } else {
        TreeStore::open(&config.db_path)
    };
    let store = opened
        .map_err(|e| anyhow::anyhow!("failed to open store at {}: {e}", config.db_path))?;

    let recorder = Arc::new(StatementRecorder::new());
    let store = if config.track_sql {
        store.with_hook(recorder.clone())
    } else {
        store
    };

    store.create_tables()?;

    if config.seed && store.count()? == 0 {
        let imported = store.import_rows(&fixture())?;
        info!(categories = imported, "reference dataset loaded");
    }

    // ── Report ────────────────────────────────────────────────────────────────
    let rows = store.list_all()?;
    info!(categories = rows.len(), "tree loaded");
    print!("{}", render(&rows));

    let violations = store.verify()?;
    if violations.is_empty() {
        info!("closure table is consistent");
    } else {
        for violation in &violations {
            warn!(%violation, "closure table inconsistency");
        }
    }

    if config.track_sql {
        println!();
        for sql in recorder.take() {
            println!("{sql}");
        }
    }

    if config.drop_on_exit {
        store.drop_tables()?;
        info!("tables dropped");
    }

    Ok(())
}

/// Draws the tree one category per line, indented by depth.
fn render(rows: &[CategoryRow]) -> String {
    let mut children: BTreeMap<CategoryId, Vec<&CategoryRow>> = BTreeMap::new();
    for row in rows {
        children.entry(row.parent_id.unwrap_or(ROOT_ID)).or_default().push(row);
    }

    let mut out = String::from("root\n");
    let mut pending: Vec<(&CategoryRow, usize)> = children
        .get(&ROOT_ID)
        .map(|top| top.iter().rev().map(|r| (*r, 1)).collect())
        .unwrap_or_default();

    while let Some((row, depth)) = pending.pop() {
        out.push_str(&format!("{}{} [{}]\n", "  ".repeat(depth), row.name, row.id));
        if let Some(kids) = children.get(&row.id) {
            pending.extend(kids.iter().rev().map(|r| (*r, depth + 1)));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: CategoryId, parent: CategoryId) -> CategoryRow {
        CategoryRow {
            id,
            parent_id: Some(parent),
            name: format!("n{id}"),
        }
    }

    #[test]
    fn render_indents_by_depth() {
        let rows = vec![row(1, 0), row(2, 1), row(3, 0)];
        assert_eq!(render(&rows), "root\n  n1 [1]\n    n2 [2]\n  n3 [3]\n");
    }
}
