//! Configuration: database location, credential, model and transport settings.

use crate::llm::{Credential, DEFAULT_BASE_URL};
use crate::otel::LogFormat;
use crate::types::{DatabaseError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_DATABASE: &str = "aisqlite.db";
pub const DEFAULT_MODEL: &str = "gpt-4-0125-preview";

/// Runtime configuration.
///
/// Precedence: defaults, then the config file, then environment variables,
/// then command-line flags (applied by the binary).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Database name or path. `.db` is appended when missing.
    pub database: String,
    /// Completion service API key. Absent means SQL-only mode.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Model identifier passed through to the service unchecked.
    pub model: String,
    /// API root for the completion service.
    pub base_url: String,
    /// Transport timeout for completion calls.
    pub request_timeout_secs: Option<u64>,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DEFAULT_DATABASE.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: None,
            log_format: LogFormat::Text,
        }
    }
}

impl Config {
    /// Load configuration from a YAML or JSON file (by extension).
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        if is_json {
            serde_json::from_str(&content)
                .map_err(|e| DatabaseError::ConfigError(format!("Invalid config {}: {}", path.display(), e)))
        } else {
            serde_yaml::from_str(&content)
                .map_err(|e| DatabaseError::ConfigError(format!("Invalid config {}: {}", path.display(), e)))
        }
    }

    /// Defaults with environment overrides applied.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Override fields from `AISQLITE_*` and `OPENAI_API_KEY` variables.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_vars(|name| std::env::var(name).ok())
    }

    fn apply_vars(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(database) = var("AISQLITE_DATABASE") {
            self.database = database;
        }
        if let Some(key) = var("OPENAI_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(model) = var("AISQLITE_MODEL") {
            self.model = model;
        }
        if let Some(url) = var("AISQLITE_BASE_URL") {
            self.base_url = url;
        }
        if let Some(secs) = var("AISQLITE_TIMEOUT_SECS") {
            let secs = secs.parse::<u64>().map_err(|_| {
                DatabaseError::ConfigError(format!("AISQLITE_TIMEOUT_SECS must be an integer, got '{}'", secs))
            })?;
            self.request_timeout_secs = Some(secs);
        }
        if let Some(format) = var("AISQLITE_LOG_FORMAT") {
            self.log_format = format.parse()?;
        }
        Ok(())
    }

    /// Capability flag for query generation.
    pub fn credential(&self) -> Credential {
        Credential::from_option(self.api_key.clone())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Resolve the database file path.
    ///
    /// Expands `~` and `$VAR`, and appends `.db` unless the name already ends with it.
    /// `:memory:` is passed through untouched.
    pub fn database_path(&self) -> Result<PathBuf> {
        resolve_database_path(&self.database)
    }
}

/// Resolve a database name to a file path (see [`Config::database_path`]).
pub fn resolve_database_path(name: &str) -> Result<PathBuf> {
    if name == ":memory:" {
        return Ok(PathBuf::from(name));
    }

    let expanded = shellexpand::full(name)
        .map_err(|e| DatabaseError::ConfigError(format!("Cannot expand database path '{}': {}", name, e)))?;

    let path = if expanded.ends_with(".db") {
        expanded.into_owned()
    } else {
        format!("{}.db", expanded)
    };

    Ok(PathBuf::from(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_db_suffix_appended() {
        assert_eq!(resolve_database_path("test2").unwrap(), PathBuf::from("test2.db"));
        assert_eq!(resolve_database_path("test2.db").unwrap(), PathBuf::from("test2.db"));
        assert_eq!(resolve_database_path(":memory:").unwrap(), PathBuf::from(":memory:"));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("AISQLITE_DATABASE", "shop"),
            ("OPENAI_API_KEY", "sk-env"),
            ("AISQLITE_MODEL", "gpt-4o"),
            ("AISQLITE_TIMEOUT_SECS", "30"),
            ("AISQLITE_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_vars(|name| vars.get(name).map(|v| v.to_string())).unwrap();

        assert_eq!(config.database, "shop");
        assert!(config.credential().is_configured());
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_from_env_matches_defaults_plus_env() {
        let mut expected = Config::default();
        expected.apply_env().unwrap();
        assert_eq!(Config::from_env().unwrap(), expected);
    }

    #[test]
    fn test_database_path_from_config() {
        let config = Config {
            database: "shop".to_string(),
            ..Config::default()
        };
        assert_eq!(config.database_path().unwrap(), PathBuf::from("shop.db"));

        let config = Config {
            database: ":memory:".to_string(),
            ..Config::default()
        };
        assert_eq!(config.database_path().unwrap(), PathBuf::from(":memory:"));
    }

    #[test]
    fn test_bad_timeout_rejected() {
        let mut config = Config::default();
        let result = config.apply_vars(|name| {
            (name == "AISQLITE_TIMEOUT_SECS").then(|| "soon".to_string())
        });
        assert!(matches!(result, Err(DatabaseError::ConfigError(_))));
    }

    #[test]
    fn test_default_is_unconfigured() {
        let config = Config::default();
        assert!(!config.credential().is_configured());
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn test_load_yaml_and_json() {
        let dir = tempdir().unwrap();

        let yaml = dir.path().join("aisqlite.yaml");
        fs::write(&yaml, "database: shop\nmodel: gpt-4o\nrequest_timeout_secs: 10\n").unwrap();
        let config = Config::load(&yaml).unwrap();
        assert_eq!(config.database, "shop");
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.request_timeout_secs, Some(10));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);

        let json = dir.path().join("aisqlite.json");
        fs::write(&json, r#"{"database": "inventory", "log_format": "json"}"#).unwrap();
        let config = Config::load(&json).unwrap();
        assert_eq!(config.database, "inventory");
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_load_invalid_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(Config::load(&path), Err(DatabaseError::ConfigError(_))));
    }

    #[test]
    fn test_api_key_not_serialized() {
        let config = Config {
            api_key: Some("sk-secret".to_string()),
            ..Config::default()
        };
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(!yaml.contains("sk-secret"));
    }
}
