//! Configuration management for pmstore
//!
//! Loads the TOML configuration, applies `PMSTORE_*` environment overrides
//! and validates the result before anything touches an agent store.

use crate::error::{PmError, Result};
use crate::tags::{CIS_MARKER, PCI_DSS_MARKER};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod validator;

pub use validator::ConfigValidator;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "_meta")]
    pub meta: MetaConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub tags: TagsConfig,
}

/// Metadata about the configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaConfig {
    pub schema_version: String,
    #[serde(default = "current_timestamp")]
    pub created_at: String,
    #[serde(default = "current_timestamp")]
    pub last_modified: String,
}

fn current_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Agent store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one `NNN-name.db` file per agent
    pub agents_dir: PathBuf,
    /// SQLite busy timeout in milliseconds
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

/// Inline compliance marker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagsConfig {
    pub pci_dss_marker: String,
    pub cis_marker: String,
}

impl Default for TagsConfig {
    fn default() -> Self {
        Self {
            pci_dss_marker: PCI_DSS_MARKER.to_string(),
            cis_marker: CIS_MARKER.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PmError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| PmError::Io {
            source: e,
            context: format!("Failed to read config file: {:?}", path),
        })?;

        Self::from_toml(&content)
    }

    /// Parse, override from the environment and validate
    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)?;

        config.apply_env_overrides();

        ConfigValidator::validate(&config)?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| PmError::Io {
            source: e,
            context: format!("Failed to write config file: {:?}", path),
        })?;
        Ok(())
    }

    /// Apply environment variable overrides
    /// Environment variables in format: PMSTORE_SECTION__KEY=value
    pub fn apply_env_overrides(&mut self) {
        for (key, value) in std::env::vars() {
            if let Some(config_key) = key.strip_prefix("PMSTORE_") {
                if let Err(e) = self.set_value_from_env(config_key, &value) {
                    tracing::warn!("Failed to apply env override {}: {}", key, e);
                }
            }
        }
    }

    fn set_value_from_env(&mut self, path: &str, value: &str) -> Result<()> {
        match path {
            "STORAGE__AGENTS_DIR" => {
                self.storage.agents_dir = PathBuf::from(value);
            }
            "STORAGE__BUSY_TIMEOUT_MS" => {
                self.storage.busy_timeout_ms =
                    value.parse().map_err(|_| PmError::InvalidConfigValue {
                        path: path.to_string(),
                        message: format!("Cannot parse '{}' as integer", value),
                    })?;
            }
            _ => {
                tracing::debug!("Unknown env config key: {}", path);
            }
        }
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| PmError::Config("Cannot determine config directory".to_string()))?;

        Ok(config_dir.join("pmstore").join("config.toml"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            meta: MetaConfig {
                schema_version: "1.0.0".to_string(),
                created_at: current_timestamp(),
                last_modified: current_timestamp(),
            },
            storage: StorageConfig {
                agents_dir: PathBuf::from("~/.pmstore/agents"),
                busy_timeout_ms: default_busy_timeout_ms(),
            },
            tags: TagsConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_roundtrips_through_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");

        Config::default().save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();

        assert_eq!(loaded.meta.schema_version, "1.0.0");
        assert_eq!(loaded.tags.pci_dss_marker, PCI_DSS_MARKER);
        assert_eq!(loaded.tags.cis_marker, CIS_MARKER);
    }

    #[test]
    fn test_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = Config::load(&temp_dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, PmError::ConfigNotFound { .. }));
    }

    #[test]
    fn test_optional_sections_default() {
        let config = Config::from_toml(
            r#"
            [_meta]
            schema_version = "1.0.0"

            [storage]
            agents_dir = "/var/lib/pmstore/agents"
            "#,
        )
        .unwrap();

        assert_eq!(config.storage.busy_timeout_ms, 5000);
        assert_eq!(config.tags.cis_marker, CIS_MARKER);
    }

    #[test]
    fn test_invalid_toml() {
        let err = Config::from_toml("[storage\nagents_dir = 1").unwrap_err();
        assert!(matches!(err, PmError::Toml(_)));
    }

    #[test]
    fn test_env_value_parsing() {
        let mut config = Config::default();
        config
            .set_value_from_env("STORAGE__BUSY_TIMEOUT_MS", "250")
            .unwrap();
        assert_eq!(config.storage.busy_timeout_ms, 250);

        let err = config
            .set_value_from_env("STORAGE__BUSY_TIMEOUT_MS", "soon")
            .unwrap_err();
        assert!(matches!(err, PmError::InvalidConfigValue { .. }));

        // Unknown keys are ignored
        config.set_value_from_env("NOPE__NOPE", "x").unwrap();
    }
}
