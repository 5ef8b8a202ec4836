use rusqlite::{Connection, OptionalExtension, Params, Row, Statement};
use tracing::{trace, Level};

use crate::error::TreeResult;
use crate::hook::StatementHook;

/// Thin wrapper that every relation issues its statements through.
///
/// The connection may be a plain [`Connection`] (reads) or the connection
/// behind an open [`rusqlite::Transaction`] (mutations); the relations do not
/// care which. Statements are prepared through the connection's statement
/// cache, since the engine runs the same handful of queries over and over.
#[derive(Clone, Copy)]
pub(crate) struct Executor<'c> {
    conn: &'c Connection,
    hook: Option<&'c dyn StatementHook>,
}

impl<'c> Executor<'c> {
    pub(crate) fn new(conn: &'c Connection, hook: Option<&'c dyn StatementHook>) -> Self {
        Self { conn, hook }
    }

    /// Runs a statement that returns no rows and reports the affected row count.
    pub(crate) fn execute<P: Params>(&self, sql: &str, params: P) -> TreeResult<usize> {
        let mut stmt = self.conn.prepare_cached(sql)?;
        let changed = stmt.execute(params);
        self.record(&stmt);
        Ok(changed?)
    }

    /// Runs a query expected to return at most one row.
    pub(crate) fn query_opt<T, P, F>(&self, sql: &str, params: P, map: F) -> TreeResult<Option<T>>
    where
        P: Params,
        F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
    {
        let mut stmt = self.conn.prepare_cached(sql)?;
        let value = stmt.query_row(params, map).optional();
        self.record(&stmt);
        Ok(value?)
    }

    /// Runs a query and collects every row.
    pub(crate) fn query_all<T, P, F>(&self, sql: &str, params: P, map: F) -> TreeResult<Vec<T>>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let mut stmt = self.conn.prepare_cached(sql)?;
        let rows = stmt
            .query_map(params, map)
            .and_then(|rows| rows.collect::<Result<Vec<_>, _>>());
        self.record(&stmt);
        Ok(rows?)
    }

    pub(crate) fn last_insert_rowid(&self) -> i64 {
        self.conn.last_insert_rowid()
    }

    /// True when someone will look at the statement text.
    fn wants_sql(&self) -> bool {
        self.hook.is_some() || tracing::enabled!(target: "closure_tree::sql", Level::TRACE)
    }

    /// Reports a statement whether or not it succeeded, so a failing
    /// statement still shows up last in the trail.
    fn record(&self, stmt: &Statement<'_>) {
        if !self.wants_sql() {
            return;
        }
        let Some(sql) = stmt.expanded_sql() else {
            return;
        };
        trace!(target: "closure_tree::sql", "{}", sql);
        if let Some(hook) = self.hook {
            hook.on_statement(&sql);
        }
    }
}

#[cfg(test)]
mod tests {
    use rusqlite::params;

    use super::*;
    use crate::hook::StatementRecorder;

    fn scratch() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY, v TEXT NOT NULL)")
            .unwrap();
        conn
    }

    #[test]
    fn statement_text_is_skipped_without_a_listener() {
        let conn = scratch();
        assert!(!Executor::new(&conn, None).wants_sql());

        let recorder = StatementRecorder::new();
        assert!(Executor::new(&conn, Some(&recorder)).wants_sql());
    }

    #[test]
    fn failing_statement_is_still_recorded() {
        let conn = scratch();
        let recorder = StatementRecorder::new();
        let exec = Executor::new(&conn, Some(&recorder));

        exec.execute("INSERT INTO t (id, v) VALUES (?1, ?2)", params![1, "a"])
            .unwrap();
        assert!(exec
            .execute("INSERT INTO t (id, v) VALUES (?1, ?2)", params![1, "b"])
            .is_err());

        let executed = recorder.executed();
        assert_eq!(executed.len(), 2);
        assert_eq!(executed[1], "INSERT INTO t (id, v) VALUES (1, 'b')");
    }
}
