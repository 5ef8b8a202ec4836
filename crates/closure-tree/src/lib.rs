//! # closure-tree
//!
//! A single-rooted category tree stored in SQLite as a **closure table**.
//!
//! Two relations back the tree: `category` holds each node's attributes and
//! `category_tree` holds every `(ancestor, descendant, distance)` pair, so
//! ancestor, path, subtree and level queries are single non-recursive
//! statements. Structural mutations (insert, delete, move, move-subtree)
//! rewrite the affected closure rows inside one transaction.
//!
//! Category `0` is the implicit root. It always exists and cannot be renamed,
//! moved or deleted.
//!
//! ## Quick start
//!
//! ```no_run
//! use closure_tree::{Attributes, TreeStore, ROOT_ID};
//!
//! let store = TreeStore::open_memory().unwrap();
//! store.create_tables().unwrap();
//!
//! let books = store.insert(&Attributes::new("Books"), ROOT_ID).unwrap();
//! let poetry = store.insert(&Attributes::new("Poetry"), books).unwrap();
//!
//! assert_eq!(store.level(poetry).unwrap(), 2);
//! store.move_tree(poetry, ROOT_ID).unwrap();
//! ```

mod attributes;
mod closure;
pub mod error;
mod exec;
pub mod hook;
pub mod import;
pub mod model;
mod mutator;
pub mod node;
mod query;
pub mod schema;
pub mod store;
pub mod verify;

// Re-exports for convenience.
pub use error::{ErrorKind, TreeError, TreeResult};
pub use hook::{StatementHook, StatementRecorder};
pub use import::{fixture, SeedRow};
pub use model::{Attributes, Category, CategoryId, CategoryRow, ClosureEdge, ROOT_ID};
pub use node::CategoryNode;
pub use store::TreeStore;
pub use verify::Violation;
