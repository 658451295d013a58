//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::LinkageConfig;
use crate::domain::errors::LinkageError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into LinkageConfig
/// 4. Applies environment variable overrides (LINKAGE_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`LinkageError::Configuration`] if:
/// - File cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use linkage::config::loader::load_config;
///
/// let config = load_config("linkage.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<LinkageConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(LinkageError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        LinkageError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: LinkageConfig = toml::from_str(&contents)?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        LinkageError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| LinkageError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        let trimmed = line.trim_start();

        if trimmed.starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(LinkageError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| LinkageError::Configuration(format!("Invalid {name} value '{value}'")))
}

/// Applies environment variable overrides using LINKAGE_* prefix
///
/// Environment variables follow the pattern: LINKAGE_<SECTION>_<KEY>
/// For example: LINKAGE_PATHS_SOURCE, LINKAGE_RETRY_READ_ATTEMPTS
fn apply_env_overrides(config: &mut LinkageConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("LINKAGE_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("LINKAGE_APPLICATION_DRY_RUN") {
        config.application.dry_run = parse_env("LINKAGE_APPLICATION_DRY_RUN", &val)?;
    }

    // Path overrides
    if let Ok(val) = std::env::var("LINKAGE_PATHS_SOURCE") {
        config.paths.source = PathBuf::from(val);
    }
    if let Ok(val) = std::env::var("LINKAGE_PATHS_TARGET") {
        config.paths.target = PathBuf::from(val);
    }
    if let Ok(val) = std::env::var("LINKAGE_PATHS_LEDGER") {
        config.paths.ledger = PathBuf::from(val);
    }

    // Anonymization overrides
    config
        .anonymization
        .apply_env_overrides()
        .map_err(|e| LinkageError::Configuration(format!("{e:#}")))?;

    // Retry overrides
    let retry = &mut config.retry;
    for (name, slot) in [
        ("LINKAGE_RETRY_READ_ATTEMPTS", &mut retry.read_attempts),
        ("LINKAGE_RETRY_WRITE_ATTEMPTS", &mut retry.write_attempts),
        ("LINKAGE_RETRY_LIST_ATTEMPTS", &mut retry.list_attempts),
        ("LINKAGE_RETRY_LIST_INNER_ATTEMPTS", &mut retry.list_inner_attempts),
        ("LINKAGE_RETRY_PROBE_ATTEMPTS", &mut retry.probe_attempts),
        ("LINKAGE_RETRY_SERIALIZE_ATTEMPTS", &mut retry.serialize_attempts),
    ] {
        if let Ok(val) = std::env::var(name) {
            *slot = parse_env(name, &val)?;
        }
    }

    // Logging overrides
    if let Ok(val) = std::env::var("LINKAGE_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_env("LINKAGE_LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Ok(val) = std::env::var("LINKAGE_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Ok(val) = std::env::var("LINKAGE_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}
