use crate::config::Config;
use crate::error::{PmError, Result, ValidationError};

const MAX_BUSY_TIMEOUT_MS: u64 = 60_000;

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration
    pub fn validate(config: &Config) -> Result<()> {
        let mut errors = Vec::new();

        Self::validate_schema_version(config, &mut errors);
        Self::validate_storage(config, &mut errors);
        Self::validate_tags(config, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(PmError::ConfigValidation { errors })
        }
    }

    fn validate_schema_version(config: &Config, errors: &mut Vec<ValidationError>) {
        let version = &config.meta.schema_version;
        if version != "1.0.0" {
            errors.push(ValidationError::new(
                "_meta.schema_version",
                format!("Unsupported schema version: {}", version),
            ));
        }
    }

    fn validate_storage(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.storage.agents_dir.as_os_str().is_empty() {
            errors.push(ValidationError::new(
                "storage.agents_dir",
                "Agents directory cannot be empty",
            ));
        }

        let timeout = config.storage.busy_timeout_ms;
        if timeout == 0 || timeout > MAX_BUSY_TIMEOUT_MS {
            errors.push(ValidationError::new(
                "storage.busy_timeout_ms",
                format!(
                    "Busy timeout must be between 1 and {} ms, got {}",
                    MAX_BUSY_TIMEOUT_MS, timeout
                ),
            ));
        }
    }

    fn validate_tags(config: &Config, errors: &mut Vec<ValidationError>) {
        let markers = [
            ("tags.pci_dss_marker", &config.tags.pci_dss_marker),
            ("tags.cis_marker", &config.tags.cis_marker),
        ];

        for (path, marker) in markers {
            if marker.is_empty() {
                errors.push(ValidationError::new(path, "Marker cannot be empty"));
            } else if marker.contains('}') {
                // The closing brace terminates the value, so it cannot be part of the marker
                errors.push(ValidationError::new(
                    path,
                    format!("Marker must not contain '}}': {:?}", marker),
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_valid_config() {
        let config = Config::default();
        assert!(ConfigValidator::validate(&config).is_ok());
    }

    #[test]
    fn test_empty_agents_dir() {
        let mut config = Config::default();
        config.storage.agents_dir = PathBuf::new();
        assert!(ConfigValidator::validate(&config).is_err());
    }

    #[test]
    fn test_busy_timeout_bounds() {
        let mut config = Config::default();
        config.storage.busy_timeout_ms = 0;
        assert!(ConfigValidator::validate(&config).is_err());

        config.storage.busy_timeout_ms = 60_001;
        assert!(ConfigValidator::validate(&config).is_err());

        config.storage.busy_timeout_ms = 60_000;
        assert!(ConfigValidator::validate(&config).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = Config::default();
        config.meta.schema_version = "2.0.0".to_string();
        config.tags.pci_dss_marker = String::new();
        config.tags.cis_marker = "{CIS}".to_string();

        match ConfigValidator::validate(&config) {
            Err(PmError::ConfigValidation { errors }) => {
                let paths: Vec<&str> = errors.iter().map(|e| e.path.as_str()).collect();
                assert_eq!(
                    paths,
                    vec!["_meta.schema_version", "tags.pci_dss_marker", "tags.cis_marker"]
                );
            }
            other => panic!("expected validation failure, got {:?}", other),
        }
    }
}
