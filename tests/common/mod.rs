//! Shared fixtures for integration tests

#![allow(dead_code)]

use linkage::anonymization::tags::{ACCESSION_NUMBER, PATIENT_ID, PATIENT_NAME, STUDY_DATE};
use linkage::core::ledger::MappingLedger;
use linkage::core::pipeline::{AnonymizationPipeline, PipelineOptions};
use linkage::core::retry::{RetryPolicy, RetryableOps};
use linkage::domain::{MemoryRecord, RecordStore};
use std::cell::Cell;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Record store persisting [`MemoryRecord`]s as JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonStore;

impl RecordStore for JsonStore {
    type Record = MemoryRecord;

    fn read(&self, path: &Path) -> io::Result<MemoryRecord> {
        let bytes = std::fs::read(path)?;
        serde_json::from_slice(&bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    fn write(&self, record: &MemoryRecord, path: &Path) -> io::Result<()> {
        let json = serde_json::to_vec(record).map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        std::fs::write(path, json)
    }
}

/// JSON store whose reads fail below one patient directory while armed
#[derive(Debug, Default)]
pub struct FailingStore {
    pub fail_under: String,
    pub armed: Cell<bool>,
}

impl FailingStore {
    pub fn new(fail_under: &str) -> Self {
        Self {
            fail_under: fail_under.to_string(),
            armed: Cell::new(true),
        }
    }
}

impl RecordStore for FailingStore {
    type Record = MemoryRecord;

    fn read(&self, path: &Path) -> io::Result<MemoryRecord> {
        let hit = path
            .components()
            .any(|c| c.as_os_str().to_string_lossy() == self.fail_under);
        if self.armed.get() && hit {
            return Err(io::Error::new(io::ErrorKind::Other, "share went away"));
        }
        JsonStore.read(path)
    }

    fn write(&self, record: &MemoryRecord, path: &Path) -> io::Result<()> {
        JsonStore.write(record, path)
    }
}

/// Source tree, target tree and ledger under one temp directory
pub struct Workspace {
    pub dir: TempDir,
    pub options: PipelineOptions,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let options = PipelineOptions {
            source: dir.path().join("mri_export"),
            target: dir.path().join("anonymised"),
            ledger_path: dir.path().join("record_linkage.json"),
            file_extension: ".dcm".to_string(),
            compress: false,
            dry_run: false,
            name_sentinel: "Z^Z".to_string(),
        };
        std::fs::create_dir_all(&options.source).unwrap();
        Self { dir, options }
    }

    pub fn add(&self, patient: &str, sequence: &str, file: &str, record: &MemoryRecord) -> PathBuf {
        let dir = self.options.source.join(patient).join(sequence);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(file);
        JsonStore.write(record, &path).unwrap();
        path
    }

    pub fn pipeline(&self) -> AnonymizationPipeline<JsonStore> {
        self.pipeline_with(JsonStore)
    }

    pub fn pipeline_with<S: RecordStore>(&self, store: S) -> AnonymizationPipeline<S> {
        AnonymizationPipeline::new(store, ops(), self.options.clone())
    }

    pub fn ledger(&self) -> MappingLedger {
        MappingLedger::load(&self.options.ledger_path, &ops()).unwrap()
    }

    pub fn output(&self, pseudonym: &str, name: &str) -> PathBuf {
        self.options.target.join(pseudonym).join(name)
    }
}

pub fn ops() -> RetryableOps {
    RetryableOps::local(RetryPolicy::single_attempt())
}

pub fn record(id: &str, name: &str, accession: &str, date: &str) -> MemoryRecord {
    MemoryRecord::new()
        .with(&PATIENT_ID, id)
        .with(&PATIENT_NAME, name)
        .with(&ACCESSION_NUMBER, accession)
        .with(&STUDY_DATE, date)
}
