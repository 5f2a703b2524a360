//! Prompt construction for SQL generation.

use crate::schema::SchemaMap;
use serde::{Deserialize, Serialize};

/// Version of [`SYSTEM_PROMPT`]. Bump whenever the wording changes.
pub const SYSTEM_PROMPT_VERSION: u32 = 1;

/// Fixed instruction sent as the system message.
///
/// The response sanitizer and the modification guard both rely on the model
/// following it: one statement, no prose, `LIKE` for value comparisons.
pub const SYSTEM_PROMPT: &str = "You are a SQL generating service. \
You will receive a sqlite3 database schema in the form {table_name: list_of_column_names}. \
You will also receive a natural language query about the data. \
Your job is to turn that natural language query into a SQL query to get the relevant data. \
Do not respond to this prompt, and only output the SQL you generate. \
When checking fields, always use the 'like' keyword. \
Only output one query, as you can only execute one at once. \
The schema and query are as follows:";

pub const SCHEMA_LABEL: &str = "Schema: ";
pub const QUERY_LABEL: &str = "Query: ";

/// Message role tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// Role-tagged chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

/// Ordered (system, user) message pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: Message,
    pub user: Message,
}

impl Prompt {
    /// Messages in send order.
    pub fn messages(&self) -> [&Message; 2] {
        [&self.system, &self.user]
    }
}

/// Render the user message: schema first, then the query, separated by a blank line.
pub fn user_content(schema: &SchemaMap, normalized_query: &str) -> String {
    format!("{}{}\n\n{}{}", SCHEMA_LABEL, schema, QUERY_LABEL, normalized_query)
}

/// Build the two-message prompt for one generation request.
pub fn build_prompt(schema: &SchemaMap, normalized_query: &str) -> Prompt {
    Prompt {
        system: Message {
            role: Role::System,
            content: SYSTEM_PROMPT.to_string(),
        },
        user: Message {
            role: Role::User,
            content: user_content(schema, normalized_query),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnDescriptor;

    fn orders_schema() -> SchemaMap {
        let mut schema = SchemaMap::new();
        schema.insert(
            "orders",
            ["id", "customer", "status"]
                .iter()
                .map(|c| ColumnDescriptor::Name(c.to_string()))
                .collect(),
        );
        schema
    }

    #[test]
    fn test_user_content_layout() {
        let prompt = build_prompt(&orders_schema(), "show me all order that are pend");
        assert_eq!(
            prompt.user.content,
            "Schema: {'orders': ['id', 'customer', 'status']}\n\nQuery: show me all order that are pend"
        );
    }

    #[test]
    fn test_message_order_and_roles() {
        let prompt = build_prompt(&SchemaMap::new(), "x");
        let [first, second] = prompt.messages();
        assert_eq!(first.role, Role::System);
        assert_eq!(first.content, SYSTEM_PROMPT);
        assert_eq!(second.role, Role::User);
        assert!(second.content.starts_with("Schema: {}"));
    }

    #[test]
    fn test_system_prompt_contract() {
        let lower = SYSTEM_PROMPT.to_lowercase();
        assert!(lower.contains("'like'"));
        assert!(lower.contains("only output one query"));
        assert!(lower.contains("do not respond"));
    }

    #[test]
    fn test_roles_serialize_lowercase() {
        let msg = Message {
            role: Role::System,
            content: "hi".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            serde_json::json!({"role": "system", "content": "hi"})
        );
    }
}
