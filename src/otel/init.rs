//! Subscriber setup for the command-line binary.

use crate::types::{DatabaseError, Result};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = DatabaseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(DatabaseError::ConfigError(format!(
                "Unknown log format '{}' (expected text or json)",
                other
            ))),
        }
    }
}

/// Install a global fmt subscriber filtered by `RUST_LOG` (default `info`).
///
/// Logs go to stderr so query output on stdout stays machine-readable.
///
/// # Errors
///
/// Returns `DatabaseError::ConfigError` if a global subscriber is already set
pub fn init_logging(format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    installed.map_err(|e| DatabaseError::ConfigError(format!("Failed to install logger: {}", e)))
}
