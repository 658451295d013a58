//! Integration tests for configuration loading and validation
//!
//! Tests that modify environment variables hold `ENV_MUTEX`.

use linkage::config::load_config;
use linkage::core::retry::RetryPolicy;
use linkage::domain::LinkageError;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::NamedTempFile;

static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn cleanup_env_vars() {
    for var in [
        "LINKAGE_APPLICATION_LOG_LEVEL",
        "LINKAGE_APPLICATION_DRY_RUN",
        "LINKAGE_PATHS_TARGET",
        "LINKAGE_RETRY_PROBE_ATTEMPTS",
        "LINKAGE_ANONYMIZATION_COMPRESS",
        "LINKAGE_ANONYMIZATION_AUDIT_HASH_KEY",
        "TEST_LINKAGE_SHARE",
    ] {
        std::env::remove_var(var);
    }
}

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const MINIMAL: &str = r#"
[paths]
source = "/data/mri_export"
target = "/data/anonymised"
"#;

#[test]
fn test_minimal_config_gets_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let config = load_config(write_config(MINIMAL).path()).unwrap();

    assert_eq!(config.application.log_level, "info");
    assert!(!config.application.dry_run);
    assert_eq!(config.paths.ledger, PathBuf::from("record_linkage.json"));
    assert_eq!(config.anonymization.file_extension, ".dcm");
    assert_eq!(config.anonymization.name_sentinel, "Z^Z");
    assert!(!config.anonymization.compress);
    assert!(!config.anonymization.audit.enabled);
    assert_eq!(config.retry.policy(), RetryPolicy::default());
    assert!(!config.logging.local_enabled);
}

#[test]
fn test_env_substitution_and_overrides() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("TEST_LINKAGE_SHARE", "/mnt/share");
    std::env::set_var("LINKAGE_APPLICATION_DRY_RUN", "true");
    std::env::set_var("LINKAGE_PATHS_TARGET", "/data/override");
    std::env::set_var("LINKAGE_RETRY_PROBE_ATTEMPTS", "7");
    std::env::set_var("LINKAGE_ANONYMIZATION_COMPRESS", "true");

    let file = write_config(
        r#"
[paths]
# source = "${UNSET_VARIABLE_IN_COMMENT}"
source = "${TEST_LINKAGE_SHARE}/mri_export"
target = "/data/anonymised"
"#,
    );
    let config = load_config(file.path());
    cleanup_env_vars();
    let config = config.unwrap();

    assert_eq!(config.paths.source, PathBuf::from("/mnt/share/mri_export"));
    assert_eq!(config.paths.target, PathBuf::from("/data/override"));
    assert!(config.application.dry_run);
    assert!(config.anonymization.compress);
    assert_eq!(config.retry.probe_attempts, 7);
}

#[test]
fn test_missing_paths_section_is_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let err = load_config(write_config("[application]\nlog_level = \"info\"\n").path()).unwrap_err();
    assert!(matches!(err, LinkageError::Configuration(_)));
}

#[test]
fn test_zero_retry_budget_is_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config(&format!("{MINIMAL}\n[retry]\nread_attempts = 0\n"));
    let err = load_config(file.path()).unwrap_err();

    assert_eq!(err.exit_code(), 2);
    assert!(err.to_string().contains("read_attempts"));
}

#[test]
fn test_unusable_name_sentinel_is_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config(&format!("{MINIMAL}\n[anonymization]\nname_sentinel = \"^Z\"\n"));
    assert!(load_config(file.path()).is_err());
}

#[test]
fn test_enabled_audit_requires_hash_key() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config(&format!(
        "{MINIMAL}\n[anonymization.audit]\nenabled = true\nlog_path = \"./audit/linkage.log\"\n"
    ));
    let err = load_config(file.path()).unwrap_err();
    assert_eq!(err.exit_code(), 2);
    assert!(err.to_string().contains("hash_key"));

    std::env::set_var("LINKAGE_ANONYMIZATION_AUDIT_HASH_KEY", "site-secret");
    let config = load_config(file.path());
    cleanup_env_vars();
    let config = config.unwrap();

    assert!(config.anonymization.audit.enabled);
    assert_eq!(config.anonymization.audit.hash_key, "site-secret");
}
