//! # Settings
//!
//! JSON settings file (default `appsettings.json`) with environment and
//! command-line overrides.
//!
//! ```json
//! {
//!   "OpenAI":  { "ApiKey": "sk-...", "Model": "gpt-4o", "BaseUrl": "https://api.openai.com/v1" },
//!   "Store":   { "ConnectionString": "file://./data", "Database": "DesignStandard_DB" },
//!   "Logging": { "Level": "warn" }
//! }
//! ```
//!
//! `"MongoDB"` is accepted in place of `"Store"`.
//!
//! Priority: CLI flags > environment > settings file > defaults.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use capacity_core::store::document::DEFAULT_DATABASE;
use capacity_core::{DesignError, DesignResult};
use serde::Deserialize;

use crate::cli::Cli;

/// Settings file read when `--config` is not given
pub const DEFAULT_SETTINGS_FILE: &str = "appsettings.json";

pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_STORE: &str = "CAPACITY_STORE";
pub const ENV_DATABASE: &str = "CAPACITY_DATABASE";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(rename = "OpenAI")]
    pub openai: OpenAiSettings,

    #[serde(rename = "Store", alias = "MongoDB")]
    pub store: StoreSettings,

    #[serde(rename = "Logging")]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OpenAiSettings {
    #[serde(rename = "ApiKey")]
    pub api_key: Option<String>,

    #[serde(rename = "Model")]
    pub model: String,

    #[serde(rename = "BaseUrl")]
    pub base_url: String,
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gpt-4o".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    #[serde(rename = "ConnectionString")]
    pub connection_string: String,

    #[serde(rename = "Database")]
    pub database: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            connection_string: "file://./data".to_string(),
            database: DEFAULT_DATABASE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    #[serde(rename = "Level")]
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from a file.
    ///
    /// An explicit path must exist. The default file is optional; when it is
    /// absent the defaults apply.
    pub fn load(explicit: Option<&Path>) -> DesignResult<Settings> {
        let path = explicit.unwrap_or_else(|| Path::new(DEFAULT_SETTINGS_FILE));
        let source_name = path.display().to_string();

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound && explicit.is_none() => {
                return Ok(Settings::default())
            }
            Err(e) => return Err(DesignError::invalid_config(source_name, e.to_string())),
        };

        Self::from_json(&contents).map_err(|e| match e {
            DesignError::InvalidConfig { reason, .. } => DesignError::invalid_config(source_name, reason),
            other => other,
        })
    }

    /// Parse settings JSON
    pub fn from_json(contents: &str) -> DesignResult<Settings> {
        serde_json::from_str(contents).map_err(|e| DesignError::invalid_config("<inline>", e.to_string()))
    }

    /// Apply environment overrides through a variable lookup.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(ENV_API_KEY).filter(|k| !k.trim().is_empty()) {
            self.openai.api_key = Some(key);
        }
        if let Some(store) = lookup(ENV_STORE) {
            self.store.connection_string = store;
        }
        if let Some(database) = lookup(ENV_DATABASE) {
            self.store.database = database;
        }
    }

    /// Apply command-line overrides
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(store) = &cli.store {
            self.store.connection_string = store.clone();
        }
        if let Some(database) = &cli.database {
            self.store.database = database.clone();
        }
        if let Some(level) = &cli.log {
            self.logging.level = level.clone();
        }
        if cli.offline {
            self.openai.api_key = None;
        }
    }

    /// API key, if chat completion is configured
    pub fn api_key(&self) -> Option<&str> {
        self.openai
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_defaults() {
        let settings = Settings::from_json("{}").unwrap();
        assert_eq!(settings.openai.model, "gpt-4o");
        assert_eq!(settings.store.database, "DesignStandard_DB");
        assert_eq!(settings.logging.level, "warn");
        assert!(settings.api_key().is_none());
    }

    #[test]
    fn test_mongodb_section_alias() {
        let settings = Settings::from_json(
            r#"{ "OpenAI": { "ApiKey": "sk-test" }, "MongoDB": { "ConnectionString": "file:///srv/db" } }"#,
        )
        .unwrap();
        assert_eq!(settings.store.connection_string, "file:///srv/db");
        assert_eq!(settings.store.database, "DesignStandard_DB");
        assert_eq!(settings.api_key(), Some("sk-test"));
    }

    #[test]
    fn test_malformed_file_is_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("appsettings.json");
        fs::write(&path, "{ \"OpenAI\": ").unwrap();
        let err = Settings::load(Some(&path)).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
        assert!(err.to_string().contains("appsettings.json"));
    }

    #[test]
    fn test_explicit_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Settings::load(Some(&dir.path().join("missing.json"))).is_err());
    }

    #[test]
    fn test_override_priority() {
        let mut settings = Settings::from_json(r#"{ "Store": { "Database": "FromFile" } }"#).unwrap();
        settings.apply_env(|key| match key {
            ENV_DATABASE => Some("FromEnv".to_string()),
            ENV_API_KEY => Some("sk-env".to_string()),
            _ => None,
        });
        assert_eq!(settings.store.database, "FromEnv");

        let cli = Cli::parse_from(["capacity", "--database", "FromCli", "--offline"]);
        settings.apply_cli(&cli);
        assert_eq!(settings.store.database, "FromCli");
        assert!(settings.api_key().is_none());
    }
}
