//! Natural-language query pipeline over a [`Database`].

use crate::config::Config;
use crate::database::{empty_result, Database, FetchMode, ResultSet};
use crate::llm::{self, Credential, GuardVerdict, LlmClient, OpenAiClient};
use crate::types::{DatabaseError, Result};
use std::sync::Arc;

/// Result of a generate-and-execute run.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionOutcome {
    /// The candidate passed the guard and was executed.
    Executed { sql: String, rows: ResultSet },
    /// The candidate contained a modification keyword; nothing was executed.
    Blocked { sql: String, keyword: &'static str },
}

impl ExecutionOutcome {
    pub fn sql(&self) -> &str {
        match self {
            Self::Executed { sql, .. } | Self::Blocked { sql, .. } => sql,
        }
    }

    /// Rows to hand back to the caller; a blocked run yields one empty row.
    pub fn into_rows(self) -> ResultSet {
        match self {
            Self::Executed { rows, .. } => rows,
            Self::Blocked { .. } => empty_result(),
        }
    }
}

/// Database plus optional completion client.
///
/// Without a client the assistant still runs raw SQL and introspection;
/// generation fails with `DatabaseError::AuthenticationError` before any
/// network call.
pub struct SqlAssistant {
    db: Database,
    llm: Option<Arc<dyn LlmClient>>,
}

impl SqlAssistant {
    /// Build from configuration. An unconfigured credential gives SQL-only mode.
    pub fn new(db: Database, config: &Config) -> Result<Self> {
        let llm: Option<Arc<dyn LlmClient>> = match config.credential() {
            Credential::Unconfigured => {
                tracing::info!("No API key configured; SQL generation disabled");
                None
            }
            credential => Some(Arc::new(OpenAiClient::new(
                credential,
                &config.base_url,
                config.request_timeout(),
            )?)),
        };

        Ok(Self { db, llm })
    }

    /// Use a specific completion client.
    pub fn with_client(db: Database, client: Arc<dyn LlmClient>) -> Self {
        Self { db, llm: Some(client) }
    }

    /// SQL-only assistant.
    pub fn without_client(db: Database) -> Self {
        Self { db, llm: None }
    }

    pub fn can_generate(&self) -> bool {
        self.llm.is_some()
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn database_mut(&mut self) -> &mut Database {
        &mut self.db
    }

    /// Turn a natural-language request into a lowercase candidate query.
    ///
    /// # Errors
    ///
    /// - `DatabaseError::AuthenticationError` if no client is configured
    /// - `DatabaseError::DataAccessError` if schema introspection fails
    /// - `DatabaseError::ServiceError` if the completion call fails
    pub async fn generate_query(&self, text: &str, model: &str) -> Result<String> {
        let client = self.llm.as_ref().ok_or_else(|| {
            DatabaseError::AuthenticationError(
                "No API key passed in; cannot generate SQL".to_string(),
            )
        })?;

        let normalized = llm::normalize(text);
        let schema = self.db.schema(false)?;
        let prompt = llm::build_prompt(&schema, &normalized);

        tracing::debug!(query = %normalized, tables = schema.len(), "Requesting SQL");
        let raw = client.complete(&prompt, model).await?;
        let sql = llm::sanitize(&raw);
        tracing::info!(sql = %sql, "Generated SQL");

        Ok(sql)
    }

    /// Generate a query, gate it, and execute it when approved.
    pub async fn run(
        &self,
        text: &str,
        model: &str,
        mode: FetchMode,
        allow_modify: bool,
    ) -> Result<ExecutionOutcome> {
        let sql = self.generate_query(text, model).await?;

        match llm::check(&sql, allow_modify) {
            GuardVerdict::Blocked { keyword } => {
                tracing::warn!(
                    keyword,
                    sql = %sql,
                    "Query BLOCKED: will modify the database. Pass allow_modify=true if this is your intention"
                );
                Ok(ExecutionOutcome::Blocked { sql, keyword })
            }
            GuardVerdict::Approved => {
                let rows = self.db.execute_and_fetch(&sql, &[], mode)?;
                Ok(ExecutionOutcome::Executed { sql, rows })
            }
        }
    }

    /// Generate, gate and execute, returning only rows.
    ///
    /// A blocked query returns one empty row and logs a notice naming the keyword.
    pub async fn generate_and_execute(
        &self,
        text: &str,
        model: &str,
        mode: FetchMode,
        allow_modify: bool,
    ) -> Result<ResultSet> {
        Ok(self.run(text, model, mode, allow_modify).await?.into_rows())
    }
}
