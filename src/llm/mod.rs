//! Natural language to SQL: normalization, prompting, completion, cleanup and gating.

pub mod client;
pub mod guard;
pub mod normalize;
pub mod prompt;
pub mod sanitize;

pub use client::{ApiKey, Credential, LlmClient, OpenAiClient, DEFAULT_BASE_URL};
pub use guard::{check, GuardVerdict, MODIFY_KEYWORDS};
pub use normalize::{normalize, SUFFIXES};
pub use prompt::{build_prompt, Message, Prompt, Role, SYSTEM_PROMPT, SYSTEM_PROMPT_VERSION};
pub use sanitize::sanitize;
