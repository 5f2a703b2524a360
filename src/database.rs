//! SQLite connection wrapper: raw execution, fetching and schema introspection.

use crate::config::resolve_database_path;
use crate::otel::{db_span, record_rows, DbOperation};
use crate::schema::{introspect, SchemaMap};
use crate::types::{DatabaseError, Result};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::path::{Path, PathBuf};

/// One result row as ordered scalar values.
pub type Row = Vec<Value>;

/// Fetched rows. `None` marks the absent row of a [`FetchMode::One`] fetch.
pub type ResultSet = Vec<Option<Row>>;

/// How many rows to fetch after running a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchMode {
    /// Every remaining row.
    #[default]
    All,
    /// Run the statement, return a single empty row.
    None,
    /// Exactly one slot, `None` when there is no row.
    One,
    /// At most `n` rows.
    Many(usize),
}

impl FetchMode {
    /// Map a row count: negative is all, `0` runs without fetching, `1` is one row.
    pub fn from_count(count: i64) -> Self {
        match count {
            c if c < 0 => Self::All,
            0 => Self::None,
            1 => Self::One,
            c => Self::Many(c as usize),
        }
    }
}

/// Result returned when nothing is fetched: one empty row.
pub fn empty_result() -> ResultSet {
    vec![Some(Vec::new())]
}

/// Rows actually read from the statement. The placeholder row of a
/// [`FetchMode::None`] fetch and the absent row of a [`FetchMode::One`] fetch
/// do not count.
fn returned_rows(mode: FetchMode, result: &ResultSet) -> usize {
    match mode {
        FetchMode::None => 0,
        _ => result.iter().filter(|row| row.is_some()).count(),
    }
}

/// SQLite database handle.
///
/// Owns at most one connection. Not meant to be shared between threads
/// running pipelines concurrently.
pub struct Database {
    path: PathBuf,
    conn: Option<Connection>,
}

impl Database {
    /// Open a database by name or path.
    ///
    /// # Arguments
    ///
    /// * `name` - Database name; `.db` is appended when missing
    /// * `autoconnect` - Connect immediately
    pub fn open(name: &str, autoconnect: bool) -> Result<Self> {
        let path = resolve_database_path(name)?;
        Self::at_path(path, autoconnect)
    }

    /// Open a database at an exact path.
    pub fn at_path(path: impl Into<PathBuf>, autoconnect: bool) -> Result<Self> {
        let mut db = Self {
            path: path.into(),
            conn: None,
        };
        if autoconnect {
            db.connect()?;
        }
        Ok(db)
    }

    /// Connected private in-memory database.
    pub fn in_memory() -> Result<Self> {
        Self::at_path(":memory:", true)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    /// Connect, replacing any existing connection.
    pub fn connect(&mut self) -> Result<()> {
        let _guard = db_span(DbOperation::Connect, self.path.to_str()).entered();
        let conn = Connection::open(&self.path)?;
        tracing::debug!(path = %self.path.display(), "Connected");
        self.conn = Some(conn);
        Ok(())
    }

    /// Close the connection. Closing twice is a no-op.
    pub fn close(&mut self) -> Result<()> {
        if let Some(conn) = self.conn.take() {
            conn.close().map_err(|(_, e)| DatabaseError::from(e))?;
            tracing::debug!(path = %self.path.display(), "Closed");
        }
        Ok(())
    }

    fn conn(&self) -> Result<&Connection> {
        self.conn.as_ref().ok_or_else(|| {
            DatabaseError::DataAccessError(format!("Database '{}' is not connected", self.path.display()))
        })
    }

    /// Execute one statement, returning the number of changed rows.
    pub fn execute(&self, sql: &str, params: &[Value]) -> Result<usize> {
        let _guard = db_span(DbOperation::Execute, self.path.to_str()).entered();
        let changed = self.conn()?.execute(sql, params_from_iter(params.iter()))?;
        Ok(changed)
    }

    /// Execute a semicolon-separated script without parameters.
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        let _guard = db_span(DbOperation::Execute, self.path.to_str()).entered();
        self.conn()?.execute_batch(sql)?;
        Ok(())
    }

    /// Run a statement and fetch rows according to `mode`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::DataAccessError` if not connected or the statement fails
    pub fn execute_and_fetch(&self, sql: &str, params: &[Value], mode: FetchMode) -> Result<ResultSet> {
        let _guard = db_span(DbOperation::Query, self.path.to_str()).entered();

        let mut stmt = self.conn()?.prepare(sql)?;
        let column_count = stmt.column_count();
        let mut rows = stmt.query(params_from_iter(params.iter()))?;

        let read_row = |row: &rusqlite::Row<'_>| -> rusqlite::Result<Row> {
            (0..column_count).map(|i| row.get::<_, Value>(i)).collect()
        };

        let result = match mode {
            FetchMode::All => {
                let mut out = Vec::new();
                while let Some(row) = rows.next()? {
                    out.push(Some(read_row(row)?));
                }
                out
            }
            FetchMode::None => {
                // step once so the statement actually runs
                rows.next()?;
                empty_result()
            }
            FetchMode::One => {
                let row = rows.next()?.map(read_row).transpose()?;
                vec![row]
            }
            FetchMode::Many(n) => {
                let mut out = Vec::with_capacity(n.min(1024));
                while out.len() < n {
                    match rows.next()? {
                        Some(row) => out.push(Some(read_row(row)?)),
                        None => break,
                    }
                }
                out
            }
        };

        record_rows(returned_rows(mode, &result));
        Ok(result)
    }

    /// Tables and their columns, excluding `sqlite_sequence`.
    ///
    /// # Arguments
    ///
    /// * `include_types` - Return `{column_name, data_type}` records instead of bare names
    pub fn schema(&self, include_types: bool) -> Result<SchemaMap> {
        introspect(self.conn()?, include_types)
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!(error = %e, "Failed to close database");
        }
    }
}

/// Convert a SQLite value to JSON. Blobs become arrays of bytes.
pub fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Integer(i) => serde_json::Value::from(*i),
        Value::Real(f) => serde_json::Value::from(*f),
        Value::Text(s) => serde_json::Value::from(s.as_str()),
        Value::Blob(b) => serde_json::Value::from(b.clone()),
    }
}

/// Convert a fetched slot to JSON: a row array, or `null` for an absent row.
pub fn row_to_json(row: &Option<Row>) -> serde_json::Value {
    match row {
        Some(values) => serde_json::Value::Array(values.iter().map(value_to_json).collect()),
        None => serde_json::Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn users_db() -> Database {
        let db = Database::in_memory().unwrap();
        db.execute_batch(
            "CREATE TABLE users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                email TEXT NOT NULL UNIQUE
            );",
        )
        .unwrap();
        for (name, email) in [("a", "a@x.com"), ("b", "b@x.com"), ("c", "c@x.com")] {
            db.execute(
                "INSERT INTO users (username, email) VALUES (?, ?)",
                &[Value::Text(name.to_string()), Value::Text(email.to_string())],
            )
            .unwrap();
        }
        db
    }

    #[test]
    fn test_fetch_mode_from_count() {
        assert_eq!(FetchMode::from_count(-1), FetchMode::All);
        assert_eq!(FetchMode::from_count(0), FetchMode::None);
        assert_eq!(FetchMode::from_count(1), FetchMode::One);
        assert_eq!(FetchMode::from_count(50), FetchMode::Many(50));
    }

    #[test]
    fn test_fetch_all() {
        let db = users_db();
        let rows = db
            .execute_and_fetch("SELECT username FROM users ORDER BY id", &[], FetchMode::All)
            .unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2], Some(vec![Value::Text("c".to_string())]));
    }

    #[test]
    fn test_fetch_many_caps_at_available_rows() {
        let db = users_db();
        let two = db.execute_and_fetch("SELECT id FROM users", &[], FetchMode::Many(2)).unwrap();
        assert_eq!(two.len(), 2);
        let all = db.execute_and_fetch("SELECT id FROM users", &[], FetchMode::Many(50)).unwrap();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_fetch_one_always_one_slot() {
        let db = users_db();
        let found = db
            .execute_and_fetch(
                "SELECT id FROM users WHERE username = ?",
                &[Value::Text("b".to_string())],
                FetchMode::One,
            )
            .unwrap();
        assert_eq!(found, vec![Some(vec![Value::Integer(2)])]);

        let missing = db
            .execute_and_fetch("SELECT id FROM users WHERE username = 'zz'", &[], FetchMode::One)
            .unwrap();
        assert_eq!(missing, vec![None]);
    }

    #[test]
    fn test_fetch_none_still_runs_statement() {
        let db = users_db();
        let result = db
            .execute_and_fetch("DELETE FROM users WHERE username = 'a'", &[], FetchMode::None)
            .unwrap();
        assert_eq!(result, empty_result());

        let remaining = db.execute_and_fetch("SELECT COUNT(*) FROM users", &[], FetchMode::One).unwrap();
        assert_eq!(remaining, vec![Some(vec![Value::Integer(2)])]);
    }

    #[test]
    fn test_returned_rows_ignores_placeholders() {
        assert_eq!(returned_rows(FetchMode::None, &empty_result()), 0);
        assert_eq!(returned_rows(FetchMode::One, &vec![None]), 0);
        assert_eq!(returned_rows(FetchMode::One, &vec![Some(vec![Value::Integer(1)])]), 1);

        let db = users_db();
        let all = db.execute_and_fetch("SELECT id FROM users", &[], FetchMode::All).unwrap();
        assert_eq!(returned_rows(FetchMode::All, &all), 3);
    }

    #[test]
    fn test_closed_database_is_data_access_error() {
        let mut db = users_db();
        db.close().unwrap();
        assert!(!db.is_connected());
        assert!(matches!(db.schema(false), Err(DatabaseError::DataAccessError(_))));
        assert!(matches!(
            db.execute_and_fetch("SELECT 1", &[], FetchMode::All),
            Err(DatabaseError::DataAccessError(_))
        ));
        // closing again is fine
        db.close().unwrap();
    }

    #[test]
    fn test_bad_sql_is_data_access_error() {
        let db = users_db();
        let err = db.execute_and_fetch("SELEC nonsense", &[], FetchMode::All).unwrap_err();
        assert!(matches!(err, DatabaseError::DataAccessError(_)));
    }

    #[test]
    fn test_open_appends_suffix_and_persists() {
        let dir = tempdir().unwrap();
        let name = dir.path().join("test2");

        {
            let db = Database::open(name.to_str().unwrap(), true).unwrap();
            assert_eq!(db.path(), dir.path().join("test2.db"));
            db.execute_batch("CREATE TABLE t (x); INSERT INTO t VALUES (1);").unwrap();
        }

        let mut db = Database::open(name.to_str().unwrap(), false).unwrap();
        assert!(!db.is_connected());
        db.connect().unwrap();
        let rows = db.execute_and_fetch("SELECT x FROM t", &[], FetchMode::All).unwrap();
        assert_eq!(rows, vec![Some(vec![Value::Integer(1)])]);
    }

    #[test]
    fn test_schema_via_database() {
        let db = users_db();
        let schema = db.schema(false).unwrap();
        assert_eq!(
            serde_json::to_value(&schema).unwrap(),
            json!({"users": ["id", "username", "email"]})
        );
    }

    #[test]
    fn test_row_to_json() {
        let row = Some(vec![
            Value::Integer(1),
            Value::Real(1.5),
            Value::Text("x".to_string()),
            Value::Null,
            Value::Blob(vec![1, 2]),
        ]);
        assert_eq!(row_to_json(&row), json!([1, 1.5, "x", null, [1, 2]]));
        assert_eq!(row_to_json(&None), json!(null));
    }
}
