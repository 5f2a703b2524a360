//! aisqlite - SQLite with natural-language-to-SQL generation.
//!
//! Pipeline for one request: normalize the text, introspect the schema,
//! build the prompt, call the completion service, sanitize the reply,
//! gate it with the modification guard, and execute it if approved.

pub mod assistant;
pub mod config;
pub mod database;
pub mod llm;
pub mod otel;
pub mod schema;
mod types;

pub use assistant::{ExecutionOutcome, SqlAssistant};
pub use config::Config;
pub use database::{row_to_json, Database, FetchMode, ResultSet, Row};
pub use schema::{ColumnDescriptor, SchemaMap};
pub use types::{DatabaseError, Result};
