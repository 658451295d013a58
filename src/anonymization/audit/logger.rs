//! Audit logger for newly recorded encounters

use crate::anonymization::identity::Resolution;
use crate::domain::{LinkageError, Result};
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

type HmacSha256 = Hmac<Sha256>;

/// Audit log entry
#[derive(Debug, Serialize)]
struct AuditLogEntry<'a> {
    timestamp: String,
    /// Keyed HMAC-SHA256 of the real patient identifier (never log plaintext)
    patient_hash: String,
    pseudonym: &'a str,
    index: u64,
    patient_folder: &'a str,
    source_folder: &'a str,
}

/// Append-only audit trail of issued pseudonyms
pub struct AuditLogger {
    log_path: PathBuf,
    hash_key: Vec<u8>,
    json_format: bool,
    enabled: bool,
}

impl AuditLogger {
    /// Create a new audit logger
    ///
    /// `hash_key` keys the identifier hashes; without it a short MRN could be
    /// recovered by hashing every candidate. An enabled logger needs a
    /// non-empty key.
    pub fn new(
        log_path: PathBuf,
        hash_key: impl Into<Vec<u8>>,
        json_format: bool,
        enabled: bool,
    ) -> Result<Self> {
        let hash_key = hash_key.into();
        if enabled {
            if hash_key.is_empty() {
                return Err(LinkageError::Configuration(
                    "audit hash_key must be set when audit logging is enabled".to_string(),
                ));
            }
            if let Some(parent) = log_path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| {
                    LinkageError::Io(format!(
                        "Failed to create audit log directory {}: {e}",
                        parent.display()
                    ))
                })?;
            }
        }

        Ok(Self {
            log_path,
            hash_key,
            json_format,
            enabled,
        })
    }

    /// A logger that records nothing
    pub fn disabled() -> Self {
        Self {
            log_path: PathBuf::new(),
            hash_key: Vec::new(),
            json_format: true,
            enabled: false,
        }
    }

    /// Whether entries are written
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Log a newly recorded encounter
    pub fn log_encounter(
        &self,
        resolution: &Resolution,
        patient_folder: &str,
        source_folder: &str,
    ) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let entry = AuditLogEntry {
            timestamp: Utc::now().to_rfc3339(),
            patient_hash: hash_identifier(&self.hash_key, resolution.patient_id.as_str())?,
            pseudonym: resolution.pseudonym.as_str(),
            index: resolution.index,
            patient_folder,
            source_folder,
        };

        self.write_entry(&entry)
    }

    fn write_entry(&self, entry: &AuditLogEntry<'_>) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| {
                LinkageError::Io(format!(
                    "Failed to open audit log {}: {e}",
                    self.log_path.display()
                ))
            })?;

        if self.json_format {
            let json_line = serde_json::to_string(entry)?;
            writeln!(file, "{json_line}")?;
        } else {
            writeln!(
                file,
                "[{}] Patient: {} | Pseudonym: {} | Index: {} | Folder: {}",
                entry.timestamp, entry.patient_hash, entry.pseudonym, entry.index, entry.patient_folder
            )?;
        }

        Ok(())
    }
}

/// Hash an identifier with HMAC-SHA256 under `key`
fn hash_identifier(key: &[u8], value: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| LinkageError::Other(format!("Invalid audit hash key: {e}")))?;
    mac.update(value.as_bytes());
    let digest = mac.finalize().into_bytes();
    Ok(format!("{digest:x}"))
}
