//! Database and LLM span helpers.

use tracing::field::Empty;
use tracing::{span, Level, Span};

/// Database operation types (maps to `db.operation.name`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbOperation {
    /// Open connection
    Connect,
    /// Catalog scan for tables and columns
    Introspect,
    /// Statement without a result set
    Execute,
    /// Statement with fetched rows
    Query,
}

impl DbOperation {
    /// Get operation name as string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Introspect => "introspect",
            Self::Execute => "execute",
            Self::Query => "query",
        }
    }
}

/// Create database operation span with semantic conventions.
///
/// # Arguments
///
/// * `operation` - Database operation type
/// * `namespace` - Database file name (optional)
///
/// # Returns
///
/// Tracing span; row counts can be attached later with [`record_rows`]
pub fn db_span(operation: DbOperation, namespace: Option<&str>) -> Span {
    let span = span!(
        Level::DEBUG,
        "db",
        otel.kind = "client",
        db.system.name = "sqlite",
        db.operation.name = operation.as_str(),
        db.namespace = Empty,
        db.response.returned_rows = Empty,
    );

    if let Some(ns) = namespace {
        span.record("db.namespace", ns);
    }

    span
}

/// Create a span around one chat completion call.
pub fn llm_span(model: &str) -> Span {
    span!(
        Level::INFO,
        "llm",
        otel.kind = "client",
        gen_ai.operation.name = "chat",
        gen_ai.request.model = model,
    )
}

/// Record the number of rows returned on the current span.
pub fn record_rows(rows_returned: usize) {
    Span::current().record("db.response.returned_rows", rows_returned);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_operation_names() {
        assert_eq!(DbOperation::Connect.as_str(), "connect");
        assert_eq!(DbOperation::Introspect.as_str(), "introspect");
        assert_eq!(DbOperation::Execute.as_str(), "execute");
        assert_eq!(DbOperation::Query.as_str(), "query");
    }

    #[test]
    fn test_db_span_declares_documented_fields() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_writer(std::io::sink)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let span = db_span(DbOperation::Query, Some("shop.db"));
            let fields = span.metadata().unwrap().fields();
            for name in [
                "db.system.name",
                "db.operation.name",
                "db.namespace",
                "db.response.returned_rows",
            ] {
                assert!(fields.field(name).is_some(), "missing {}", name);
            }
            assert!(fields.field("db.collection.name").is_none());
        });
    }
}
