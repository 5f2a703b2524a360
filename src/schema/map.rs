//! Schema map: table name to ordered column descriptors.

use serde::{Serialize, Serializer};
use serde::ser::SerializeMap;
use std::fmt;

/// A single column as reported by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ColumnDescriptor {
    /// Bare column name.
    Name(String),
    /// Column name with its declared type (may be empty in SQLite).
    Typed {
        column_name: String,
        data_type: String,
    },
}

impl ColumnDescriptor {
    /// Column name regardless of variant.
    pub fn name(&self) -> &str {
        match self {
            Self::Name(name) => name,
            Self::Typed { column_name, .. } => column_name,
        }
    }

    /// Declared type, if type detail was requested.
    pub fn data_type(&self) -> Option<&str> {
        match self {
            Self::Name(_) => None,
            Self::Typed { data_type, .. } => Some(data_type),
        }
    }
}

/// One table and its columns in catalog order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<ColumnDescriptor>,
}

/// Mapping from table name to columns, kept in discovery order.
///
/// Built fresh on every introspection; table names never repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaMap {
    tables: Vec<TableSchema>,
}

impl SchemaMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a table, replacing the columns of an existing entry with the same name.
    pub fn insert(&mut self, name: impl Into<String>, columns: Vec<ColumnDescriptor>) {
        let name = name.into();
        match self.tables.iter_mut().find(|t| t.name == name) {
            Some(existing) => existing.columns = columns,
            None => self.tables.push(TableSchema { name, columns }),
        }
    }

    pub fn get(&self, table: &str) -> Option<&[ColumnDescriptor]> {
        self.tables
            .iter()
            .find(|t| t.name == table)
            .map(|t| t.columns.as_slice())
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|t| t.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl Serialize for SchemaMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.tables.len()))?;
        for table in &self.tables {
            map.serialize_entry(&table.name, &table.columns)?;
        }
        map.end()
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("'")?;
    for c in s.chars() {
        match c {
            '\'' => f.write_str("\\'")?,
            '\\' => f.write_str("\\\\")?,
            _ => write!(f, "{}", c)?,
        }
    }
    f.write_str("'")
}

impl fmt::Display for ColumnDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => write_quoted(f, name),
            Self::Typed { column_name, data_type } => {
                f.write_str("{'column_name': ")?;
                write_quoted(f, column_name)?;
                f.write_str(", 'data_type': ")?;
                write_quoted(f, data_type)?;
                f.write_str("}")
            }
        }
    }
}

/// Mapping-literal rendering used inside the model prompt,
/// e.g. `{'users': ['id', 'username', 'email']}`.
impl fmt::Display for SchemaMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, table) in self.tables.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write_quoted(f, &table.name)?;
            f.write_str(": [")?;
            for (j, column) in table.columns.iter().enumerate() {
                if j > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", column)?;
            }
            f.write_str("]")?;
        }
        f.write_str("}")
    }
}
