//! Tracing instrumentation for aisqlite.
//!
//! Span fields follow OpenTelemetry semantic conventions so the output
//! lines up with any collector configured downstream of `tracing`:
//! - https://opentelemetry.io/docs/specs/semconv/database/database-spans/
//! - https://opentelemetry.io/docs/specs/semconv/gen-ai/
//!
//! **Database spans**: `db.system.name` is always `"sqlite"`, plus
//! `db.operation.name`, `db.namespace` (the database file path, when known)
//! and `db.response.returned_rows` for fetches.
//!
//! **LLM spans**: `gen_ai.operation.name = "chat"` and `gen_ai.request.model`.
//!
//! # Example
//!
//! ```rust,ignore
//! use aisqlite::otel::{db_span, DbOperation};
//!
//! let span = db_span(DbOperation::Query, Some("shop.db"));
//! let _guard = span.entered();
//! ```

pub mod db;
pub mod init;

pub use db::{db_span, llm_span, record_rows, DbOperation};
pub use init::{init_logging, LogFormat};
