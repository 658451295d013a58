//! Anonymization configuration

use crate::anonymization::identity::DEFAULT_NAME_SENTINEL;
use crate::anonymization::pseudonym::PersonName;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Anonymization settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnonymizationConfig {
    /// Only files ending in this suffix are processed
    #[serde(default = "default_file_extension")]
    pub file_extension: String,

    /// Pack each patient's output into `<pseudonym>.tar.gz`
    #[serde(default)]
    pub compress: bool,

    /// Person name substituted when a record's name is unusable
    #[serde(default = "default_name_sentinel")]
    pub name_sentinel: String,

    /// Audit logging configuration
    #[serde(default)]
    pub audit: AuditConfig,
}

fn default_file_extension() -> String {
    ".dcm".to_string()
}

fn default_name_sentinel() -> String {
    DEFAULT_NAME_SENTINEL.to_string()
}

impl Default for AnonymizationConfig {
    fn default() -> Self {
        Self {
            file_extension: default_file_extension(),
            compress: false,
            name_sentinel: default_name_sentinel(),
            audit: AuditConfig::default(),
        }
    }
}

impl AnonymizationConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.file_extension.trim().is_empty() {
            anyhow::bail!("file_extension cannot be empty");
        }

        let sentinel = PersonName::parse(&self.name_sentinel)
            .with_context(|| format!("name_sentinel '{}' is not a person name", self.name_sentinel))?;
        if sentinel.family_initial().is_none() {
            anyhow::bail!(
                "name_sentinel '{}' must have a family name component",
                self.name_sentinel
            );
        }

        self.audit
            .validate()
            .context("Invalid audit configuration")?;

        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("LINKAGE_ANONYMIZATION_FILE_EXTENSION") {
            self.file_extension = val;
        }

        if let Ok(val) = std::env::var("LINKAGE_ANONYMIZATION_COMPRESS") {
            self.compress = val
                .parse()
                .context("Invalid LINKAGE_ANONYMIZATION_COMPRESS value")?;
        }

        if let Ok(val) = std::env::var("LINKAGE_ANONYMIZATION_NAME_SENTINEL") {
            self.name_sentinel = val;
        }

        self.audit.apply_env_overrides()?;

        Ok(())
    }
}

/// Audit logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Enable audit logging
    #[serde(default)]
    pub enabled: bool,

    /// Audit log file path
    #[serde(default = "default_audit_log_path")]
    pub log_path: PathBuf,

    /// Use JSON format for audit logs
    #[serde(default = "default_audit_json_format")]
    pub json_format: bool,

    /// Secret keying the patient identifier hashes
    #[serde(default)]
    pub hash_key: String,
}

fn default_audit_log_path() -> PathBuf {
    PathBuf::from("./audit/linkage.log")
}

fn default_audit_json_format() -> bool {
    true
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_path: default_audit_log_path(),
            json_format: default_audit_json_format(),
            hash_key: String::new(),
        }
    }
}

impl AuditConfig {
    /// Validate audit configuration
    pub fn validate(&self) -> Result<()> {
        if self.enabled && self.log_path.as_os_str().is_empty() {
            anyhow::bail!("log_path cannot be empty when audit logging is enabled");
        }
        if self.enabled && self.hash_key.trim().is_empty() {
            anyhow::bail!("hash_key must be set when audit logging is enabled");
        }
        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("LINKAGE_ANONYMIZATION_AUDIT_ENABLED") {
            self.enabled = val
                .parse()
                .context("Invalid LINKAGE_ANONYMIZATION_AUDIT_ENABLED value")?;
        }

        if let Ok(val) = std::env::var("LINKAGE_ANONYMIZATION_AUDIT_LOG_PATH") {
            self.log_path = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var("LINKAGE_ANONYMIZATION_AUDIT_JSON_FORMAT") {
            self.json_format = val
                .parse()
                .context("Invalid LINKAGE_ANONYMIZATION_AUDIT_JSON_FORMAT value")?;
        }

        if let Ok(val) = std::env::var("LINKAGE_ANONYMIZATION_AUDIT_HASH_KEY") {
            self.hash_key = val;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_default_config() {
        let config = AnonymizationConfig::default();
        assert_eq!(config.file_extension, ".dcm");
        assert_eq!(config.name_sentinel, "Z^Z");
        assert!(!config.compress);
        assert!(!config.audit.enabled);
        assert!(config.audit.json_format);
        assert!(config.validate().is_ok());
    }

    #[test_case("" ; "empty")]
    #[test_case("^Given" ; "no family component")]
    fn test_invalid_sentinel(sentinel: &str) {
        let config = AnonymizationConfig {
            name_sentinel: sentinel.to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_extension_is_invalid() {
        let config = AnonymizationConfig {
            file_extension: " ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_enabled_audit_needs_path() {
        let audit = AuditConfig {
            enabled: true,
            log_path: PathBuf::new(),
            json_format: true,
            hash_key: "site-key".to_string(),
        };
        assert!(audit.validate().is_err());
    }

    #[test]
    fn test_enabled_audit_needs_hash_key() {
        let mut audit = AuditConfig {
            enabled: true,
            ..Default::default()
        };
        assert!(audit.validate().is_err());

        audit.hash_key = "site-key".to_string();
        assert!(audit.validate().is_ok());
    }
}
