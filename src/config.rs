//! Configuration module
//!
//! Process settings come from environment variables (and `.env`); the split
//! opt-in itself is read from the context options handed to the scaffolder.

use crate::error::{SnapshotError, SnapshotResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Context option key enabling split snapshots
pub const SPLIT_SNAPSHOT_OPTION: &str = "Schemaflow:SplitSnapshot";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load environment variables: {0}")]
    EnvLoad(#[from] dotenvy::Error),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Options attached to a database context, readable by key
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextOptions {
    #[serde(flatten)]
    values: BTreeMap<String, serde_json::Value>,
}

impl ContextOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.values.get(key)
    }

    /// Read a boolean option. Absent means `false`; booleans and the strings
    /// "true"/"false" (any case) are accepted, anything else is a read failure.
    pub fn flag(&self, key: &str) -> SnapshotResult<bool> {
        match self.values.get(key) {
            None | Some(serde_json::Value::Null) => Ok(false),
            Some(serde_json::Value::Bool(value)) => Ok(*value),
            Some(serde_json::Value::String(value)) => parse_bool(value).ok_or_else(|| {
                SnapshotError::ConfigurationRead(format!("{} = {:?} is not a boolean", key, value))
            }),
            Some(other) => Err(SnapshotError::ConfigurationRead(format!(
                "{} = {} is not a boolean",
                key, other
            ))),
        }
    }

    /// Whether split snapshots are switched on for this context
    pub fn split_snapshot(&self) -> SnapshotResult<bool> {
        self.flag(SPLIT_SNAPSHOT_OPTION)
    }
}

/// Snapshot generation settings
#[derive(Debug, Clone)]
pub struct SnapshotSettings {
    /// Raw value of `SCHEMAFLOW_SPLIT_SNAPSHOT`; interpreted by the scaffolder
    pub split_snapshot: Option<String>,
    pub prune_stale_units: bool,
    pub source_extension: String,
    pub runtime_path: Option<String>,
}

impl Default for SnapshotSettings {
    fn default() -> Self {
        Self {
            split_snapshot: None,
            prune_stale_units: true,
            source_extension: "rs".to_string(),
            runtime_path: None,
        }
    }
}

/// Complete application settings
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub snapshot: SnapshotSettings,
}

impl Settings {
    /// Load settings from environment variables
    pub fn load() -> Result<Self, ConfigError> {
        // A missing .env file is fine; a malformed one is not
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(ConfigError::EnvLoad(e));
            }
        }

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = SnapshotSettings::default();

        let prune_stale_units = match lookup("SCHEMAFLOW_PRUNE_STALE_UNITS") {
            Some(value) => parse_bool(&value).ok_or_else(|| {
                ConfigError::InvalidValue(format!(
                    "SCHEMAFLOW_PRUNE_STALE_UNITS must be true or false, got {:?}",
                    value
                ))
            })?,
            None => defaults.prune_stale_units,
        };

        let source_extension = match lookup("SCHEMAFLOW_SOURCE_EXTENSION") {
            Some(value) => {
                let extension = value.trim().trim_start_matches('.').to_string();
                if extension.is_empty() {
                    return Err(ConfigError::InvalidValue(
                        "SCHEMAFLOW_SOURCE_EXTENSION must not be empty".to_string(),
                    ));
                }
                extension
            }
            None => defaults.source_extension,
        };

        Ok(Self {
            snapshot: SnapshotSettings {
                split_snapshot: lookup("SCHEMAFLOW_SPLIT_SNAPSHOT"),
                prune_stale_units,
                source_extension,
                runtime_path: lookup("SCHEMAFLOW_RUNTIME_PATH").filter(|v| !v.trim().is_empty()),
            },
        })
    }

    /// Context options carrying the split opt-in from the environment
    pub fn context_options(&self) -> ContextOptions {
        let mut options = ContextOptions::new();
        if let Some(value) = &self.snapshot.split_snapshot {
            options.set(SPLIT_SNAPSHOT_OPTION, value.clone());
        }
        options
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings.snapshot.source_extension, "rs");
        assert!(settings.snapshot.prune_stale_units);
        assert!(settings.snapshot.split_snapshot.is_none());
        assert!(!settings.context_options().split_snapshot().unwrap());
    }

    #[test]
    fn test_settings_from_environment() {
        let settings = Settings::from_lookup(lookup(&[
            ("SCHEMAFLOW_SPLIT_SNAPSHOT", "true"),
            ("SCHEMAFLOW_PRUNE_STALE_UNITS", "off"),
            ("SCHEMAFLOW_SOURCE_EXTENSION", ".rs"),
        ]))
        .unwrap();

        assert!(!settings.snapshot.prune_stale_units);
        assert_eq!(settings.snapshot.source_extension, "rs");
        assert!(settings.context_options().split_snapshot().unwrap());
    }

    #[test]
    fn test_runtime_path_from_environment() {
        let settings =
            Settings::from_lookup(lookup(&[("SCHEMAFLOW_RUNTIME_PATH", "crate::rt")])).unwrap();
        assert_eq!(settings.snapshot.runtime_path.as_deref(), Some("crate::rt"));

        let blank = Settings::from_lookup(lookup(&[("SCHEMAFLOW_RUNTIME_PATH", " ")])).unwrap();
        assert!(blank.snapshot.runtime_path.is_none());
    }

    #[test]
    fn test_invalid_prune_flag() {
        let result = Settings::from_lookup(lookup(&[("SCHEMAFLOW_PRUNE_STALE_UNITS", "maybe")]));
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_context_flag_values() {
        let options = ContextOptions::new()
            .with("a", true)
            .with("b", "FALSE")
            .with("c", "sometimes")
            .with("d", 3);

        assert!(options.flag("a").unwrap());
        assert!(!options.flag("b").unwrap());
        assert!(!options.flag("missing").unwrap());
        assert!(matches!(
            options.flag("c"),
            Err(SnapshotError::ConfigurationRead(_))
        ));
        assert!(options.flag("d").is_err());
    }
}
