//! Test database utilities.
//!
//! [`TestDatabase`] wraps an in-memory SQLite connection behind an
//! `Arc<Mutex<..>>` so it can be cloned into an application wrapper and still
//! be inspected by the test after teardown. It carries a query counter and the
//! table-lifecycle helpers the database fixture drives: schema creation, row
//! purging, and dropping all tables.
//!
//! Each `TestDatabase::memory()` call opens a fresh in-memory database,
//! providing complete isolation between application instances.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

use crate::error::FixtureResult;

/// An in-memory SQLite database for testing.
///
/// Cloning shares the underlying connection and query counter.
#[derive(Clone)]
pub struct TestDatabase {
    conn: Arc<Mutex<Connection>>,
    query_count: Arc<AtomicUsize>,
}

impl TestDatabase {
    /// Opens a new in-memory database with foreign keys enabled.
    pub fn memory() -> FixtureResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            query_count: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Executes a SQL statement with no parameters.
    ///
    /// Returns the number of rows changed.
    pub fn execute(&self, sql: &str) -> FixtureResult<usize> {
        self.query_count.fetch_add(1, Ordering::Relaxed);
        Ok(self.lock().execute(sql, [])?)
    }

    /// Executes a SQL statement with positional parameters.
    pub fn execute_with(&self, sql: &str, params: &[&dyn rusqlite::ToSql]) -> FixtureResult<usize> {
        self.query_count.fetch_add(1, Ordering::Relaxed);
        Ok(self.lock().execute(sql, params)?)
    }

    /// Runs a query expected to produce a single value, e.g. a `COUNT(*)`.
    pub fn query_value<T: rusqlite::types::FromSql>(&self, sql: &str) -> FixtureResult<T> {
        self.query_count.fetch_add(1, Ordering::Relaxed);
        Ok(self.lock().query_row(sql, [], |row| row.get(0))?)
    }

    /// Returns the names of all user-created tables.
    pub fn table_names(&self) -> FixtureResult<Vec<String>> {
        self.query_count.fetch_add(1, Ordering::Relaxed);
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    /// Deletes all rows from all user-created tables.
    ///
    /// Tables are purged in reverse creation order so child rows go before
    /// the rows they reference.
    pub fn delete_all_rows(&self) -> FixtureResult<()> {
        for table in self.table_names()?.into_iter().rev() {
            self.execute(&format!("DELETE FROM \"{table}\""))?;
        }
        Ok(())
    }

    /// Drops all user-created tables.
    pub fn drop_all_tables(&self) -> FixtureResult<()> {
        for table in self.table_names()?.into_iter().rev() {
            self.execute(&format!("DROP TABLE IF EXISTS \"{table}\""))?;
        }
        Ok(())
    }

    /// Returns the number of statements executed so far.
    pub fn query_count(&self) -> usize {
        self.query_count.load(Ordering::Relaxed)
    }

    /// Resets the query counter to zero.
    pub fn reset_query_count(&self) {
        self.query_count.store(0, Ordering::Relaxed);
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database lock poisoned")
    }
}
