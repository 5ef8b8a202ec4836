//! Demo configuration loaded from environment variables.
//!
//! | Variable                    | Default    | Description                                   |
//! |-----------------------------|------------|-----------------------------------------------|
//! | `CLOSURE_TREE_DB`           | `:memory:` | SQLite file path, or `:memory:`               |
//! | `CLOSURE_TREE_LOG_LEVEL`    | `info`     | tracing filter (e.g. `closure_tree=debug`)    |
//! | `CLOSURE_TREE_SEED`         | `true`     | Load the reference dataset into an empty tree |
//! | `CLOSURE_TREE_TRACK_SQL`    | `false`    | Record and print every executed statement     |
//! | `CLOSURE_TREE_DROP_ON_EXIT` | `false`    | Drop both tables before exiting               |

/// In-memory database sentinel.
pub const MEMORY_DB: &str = ":memory:";

#[derive(Debug)]
pub struct Config {
    /// SQLite file path, or [`MEMORY_DB`].
    pub db_path: String,

    /// Tracing filter string.
    pub log_level: String,

    /// Import the reference dataset when the tree is empty.
    pub seed: bool,

    /// Print every statement the store executed.
    pub track_sql: bool,

    /// Drop the tables before exiting.
    pub drop_on_exit: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            db_path:      env_str("CLOSURE_TREE_DB", MEMORY_DB),
            log_level:    env_str("CLOSURE_TREE_LOG_LEVEL", "info"),
            seed:         env_bool("CLOSURE_TREE_SEED", true),
            track_sql:    env_bool("CLOSURE_TREE_TRACK_SQL", false),
            drop_on_exit: env_bool("CLOSURE_TREE_DROP_ON_EXIT", false),
        }
    }

    pub fn in_memory(&self) -> bool {
        self.db_path == MEMORY_DB
    }
}

fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}

fn env_str(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
