//! Catalog introspection for SQLite.

use crate::otel::{db_span, DbOperation};
use crate::schema::map::{ColumnDescriptor, SchemaMap};
use crate::types::Result;
use rusqlite::Connection;

/// Internal AUTOINCREMENT bookkeeping table, never reported.
pub const SEQUENCE_TABLE: &str = "sqlite_sequence";

const TABLES_QUERY: &str =
    "SELECT name FROM sqlite_master WHERE type = 'table' AND name != ?1";

const COLUMNS_QUERY: &str = "SELECT cid, name, type FROM pragma_table_info(?1) ORDER BY cid";

/// Read the table list and each table's columns.
///
/// # Arguments
///
/// * `conn` - Open SQLite connection
/// * `include_types` - Return `{column_name, data_type}` records instead of bare names
///
/// # Errors
///
/// Returns `DatabaseError::DataAccessError` if a catalog query fails
pub fn introspect(conn: &Connection, include_types: bool) -> Result<SchemaMap> {
    let _guard = db_span(DbOperation::Introspect, None).entered();

    let mut stmt = conn.prepare(TABLES_QUERY)?;
    let tables = stmt
        .query_map([SEQUENCE_TABLE], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut columns_stmt = conn.prepare(COLUMNS_QUERY)?;
    let mut schema = SchemaMap::new();

    for table in tables {
        let columns = columns_stmt
            .query_map([&table], |row| {
                let name: String = row.get(1)?;
                if include_types {
                    // empty string when no type was declared
                    let data_type: Option<String> = row.get(2)?;
                    Ok(ColumnDescriptor::Typed {
                        column_name: name,
                        data_type: data_type.unwrap_or_default(),
                    })
                } else {
                    Ok(ColumnDescriptor::Name(name))
                }
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        tracing::debug!(table = %table, columns = columns.len(), "Introspected table");
        schema.insert(table, columns);
    }

    Ok(schema)
}
