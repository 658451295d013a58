//! Anonymisation coordinator - main orchestrator for a run
//!
//! This module walks `source/<patient>/<sequence>/<file>`, resolves every
//! record against the ledger, scrubs it, and writes it to
//! `target/<pseudonym>/<sequence>_<file>`. The ledger is persisted after each
//! patient directory, which is the crash-resume granularity.

use crate::anonymization::audit::AuditLogger;
use crate::anonymization::{IdentityResolver, TagScrubber};
use crate::config::LinkageConfig;
use crate::core::ledger::MappingLedger;
use crate::core::pipeline::archive::archive_pseudonym_dir;
use crate::core::pipeline::summary::{RunError, RunSummary};
use crate::core::retry::{FileSystem, LocalFileSystem, RetryableOps};
use crate::domain::ids::Pseudonym;
use crate::domain::record::RecordStore;
use crate::domain::Result;
use crate::{log_error_with_context, log_patient_complete, log_patient_start};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::sync::watch;

/// Run parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Root holding one directory per patient
    pub source: PathBuf,
    /// Root receiving one directory (or archive) per pseudonym
    pub target: PathBuf,
    /// Ledger file
    pub ledger_path: PathBuf,
    /// Only files with this suffix are processed
    pub file_extension: String,
    /// Archive each pseudonym directory once its patient completes
    pub compress: bool,
    /// Resolve and scrub without writing output or ledger
    pub dry_run: bool,
    /// Person name used when a record's name is unusable
    pub name_sentinel: String,
}

impl PipelineOptions {
    /// Extracts run parameters from the configuration
    pub fn from_config(config: &LinkageConfig) -> Self {
        Self {
            source: config.paths.source.clone(),
            target: config.paths.target.clone(),
            ledger_path: config.paths.ledger.clone(),
            file_extension: config.anonymization.file_extension.clone(),
            compress: config.anonymization.compress,
            dry_run: config.application.dry_run,
            name_sentinel: config.anonymization.name_sentinel.clone(),
        }
    }

    /// Base name of the source root, recorded with each encounter
    pub fn source_folder(&self) -> String {
        self.source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source.display().to_string())
    }
}

/// Per-patient counters folded into the run summary
#[derive(Debug, Default)]
struct PatientOutcome {
    files_processed: usize,
    files_written: usize,
    new_encounters: usize,
    reused_encounters: usize,
    unremovable_private_fields: usize,
    pseudonyms: BTreeSet<Pseudonym>,
}

/// Anonymisation pipeline
///
/// Strictly sequential: the ledger is single shared mutable state and index
/// assignment depends on processing order.
pub struct AnonymizationPipeline<S: RecordStore, F: FileSystem = LocalFileSystem> {
    store: S,
    ops: RetryableOps<F>,
    options: PipelineOptions,
    resolver: IdentityResolver,
    scrubber: TagScrubber,
    source_folder: String,
    audit: AuditLogger,
    shutdown_signal: Option<watch::Receiver<bool>>,
}

impl<S: RecordStore, F: FileSystem> AnonymizationPipeline<S, F> {
    /// Create a new pipeline
    pub fn new(store: S, ops: RetryableOps<F>, options: PipelineOptions) -> Self {
        let source_folder = options.source_folder();
        let resolver = IdentityResolver::new(options.name_sentinel.clone(), source_folder.clone());
        Self {
            store,
            ops,
            options,
            resolver,
            scrubber: TagScrubber::new(),
            source_folder,
            audit: AuditLogger::disabled(),
            shutdown_signal: None,
        }
    }

    /// Record every new encounter in `audit`
    pub fn with_audit(mut self, audit: AuditLogger) -> Self {
        self.audit = audit;
        self
    }

    /// Stop at the next patient boundary once `signal` turns true
    pub fn with_shutdown_signal(mut self, signal: watch::Receiver<bool>) -> Self {
        self.shutdown_signal = Some(signal);
        self
    }

    /// Run parameters in force
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Loads the ledger, processes the source tree and returns the summary
    ///
    /// # Errors
    ///
    /// Fails before any patient is touched if the ledger is corrupt or the
    /// source root cannot be listed. Failures inside a patient directory stop
    /// the run and are reported through [`RunSummary::failure`].
    pub fn execute(&self) -> Result<RunSummary> {
        let mut ledger = MappingLedger::load(&self.options.ledger_path, &self.ops)?;
        self.run(&mut ledger)
    }

    /// Processes the source tree against an already loaded ledger
    pub fn run(&self, ledger: &mut MappingLedger) -> Result<RunSummary> {
        let start_time = Instant::now();
        let mut summary = RunSummary {
            dry_run: self.options.dry_run,
            ..RunSummary::new()
        };

        tracing::info!(
            source = %self.options.source.display(),
            target = %self.options.target.display(),
            dry_run = self.options.dry_run,
            compress = self.options.compress,
            "Starting anonymisation run"
        );

        let patients = self.subdirectories(&self.options.source)?;
        summary.total_patients = patients.len();

        for (name, path) in patients {
            if self.is_shutdown_requested() {
                tracing::warn!(
                    completed = summary.patients_completed,
                    remaining = summary.total_patients - summary.patients_completed,
                    "Shutdown requested, stopping at patient boundary"
                );
                summary.interrupted = true;
                break;
            }

            match self.process_patient(&name, &path, ledger) {
                Ok(outcome) => {
                    summary.patients_completed += 1;
                    summary.files_processed += outcome.files_processed;
                    summary.files_written += outcome.files_written;
                    summary.new_encounters += outcome.new_encounters;
                    summary.reused_encounters += outcome.reused_encounters;
                    summary.unremovable_private_fields += outcome.unremovable_private_fields;
                    if self.options.compress && !self.options.dry_run {
                        summary.archives_created += outcome.pseudonyms.len();
                    }
                    log_patient_complete!(name, outcome.files_processed, outcome.pseudonyms.len());
                }
                Err(e) => {
                    log_error_with_context!(&e, "Patient failed, stopping run");
                    tracing::error!(patient_folder = %name, "Run stopped");
                    summary.failure = Some(RunError::from_error(&e, name));
                    break;
                }
            }
        }

        let summary = summary.with_duration(start_time.elapsed());
        summary.log_summary();
        Ok(summary)
    }

    fn process_patient(
        &self,
        patient_folder: &str,
        patient_path: &Path,
        ledger: &mut MappingLedger,
    ) -> Result<PatientOutcome> {
        let mut outcome = PatientOutcome::default();
        let mut new_encounters = Vec::new();
        let sequences = self.subdirectories(patient_path)?;
        log_patient_start!(patient_folder, sequences.len());

        for (sequence, sequence_path) in sequences {
            for (file_name, file_path) in self.record_files(&sequence_path)? {
                tracing::debug!(sequence = %sequence, file = %file_name, "Processing file");

                let mut record = self.ops.read_record(&self.store, &file_path)?;
                let resolution = self.resolver.resolve(&mut record, ledger)?;
                if resolution.is_new {
                    outcome.new_encounters += 1;
                    new_encounters.push(resolution.clone());
                } else {
                    outcome.reused_encounters += 1;
                }

                let report = self.scrubber.apply(&mut record, &resolution.pseudonym);
                outcome.unremovable_private_fields += report.private_failed.len();
                outcome.files_processed += 1;

                if !self.options.dry_run {
                    let output_dir = self.options.target.join(resolution.pseudonym.as_str());
                    if !outcome.pseudonyms.contains(&resolution.pseudonym) {
                        self.ops.create_dir_all(&output_dir)?;
                    }
                    let output = output_dir.join(format!("{sequence}_{file_name}"));
                    self.ops.write_record(&self.store, &record, &output)?;
                    outcome.files_written += 1;
                    tracing::debug!(pseudonym = %resolution.pseudonym, output = %output.display(), "Wrote record");
                }
                outcome.pseudonyms.insert(resolution.pseudonym);
            }
        }

        if self.options.dry_run {
            return Ok(outcome);
        }

        ledger.save(&self.options.ledger_path, &self.ops)?;

        // Audit only what the saved ledger holds
        for resolution in &new_encounters {
            self.audit
                .log_encounter(resolution, patient_folder, &self.source_folder)?;
        }

        if self.options.compress {
            for pseudonym in &outcome.pseudonyms {
                archive_pseudonym_dir(&self.ops, &self.options.target, pseudonym)?;
            }
        }

        Ok(outcome)
    }

    /// Sub-directories of `path` as (name, full path), in listing order
    fn subdirectories(&self, path: &Path) -> Result<Vec<(String, PathBuf)>> {
        Ok(self
            .ops
            .list_directory(path)?
            .into_iter()
            .map(|name| {
                let full = path.join(&name);
                (name, full)
            })
            .filter(|(_, full)| self.ops.path_is_dir(full))
            .collect())
    }

    /// Record files in a sequence directory
    fn record_files(&self, path: &Path) -> Result<Vec<(String, PathBuf)>> {
        Ok(self
            .ops
            .list_directory(path)?
            .into_iter()
            .filter(|name| name.ends_with(&self.options.file_extension))
            .map(|name| {
                let full = path.join(&name);
                (name, full)
            })
            .filter(|(_, full)| self.ops.path_is_file(full))
            .collect())
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_signal
            .as_ref()
            .map(|rx| *rx.borrow())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymization::tags::{ACCESSION_NUMBER, PATIENT_ID, PATIENT_NAME, STUDY_DATE};
    use crate::core::retry::RetryPolicy;
    use crate::domain::record::{MemoryRecord, Record};
    use std::io;
    use tempfile::TempDir;

    /// Record store persisting [`MemoryRecord`]s as JSON
    struct JsonStore;

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

    struct Fixture {
        _dir: TempDir,
        options: PipelineOptions,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let options = PipelineOptions {
                source: dir.path().join("export"),
                target: dir.path().join("anonymised"),
                ledger_path: dir.path().join("state").join("record_linkage.json"),
                file_extension: ".dcm".to_string(),
                compress: false,
                dry_run: false,
                name_sentinel: "Z^Z".to_string(),
            };
            Self { _dir: dir, options }
        }

        fn add(&self, patient: &str, sequence: &str, file: &str, record: &MemoryRecord) {
            let dir = self.options.source.join(patient).join(sequence);
            std::fs::create_dir_all(&dir).unwrap();
            JsonStore.write(record, &dir.join(file)).unwrap();
        }

        fn pipeline(&self) -> AnonymizationPipeline<JsonStore> {
            AnonymizationPipeline::new(
                JsonStore,
                RetryableOps::local(RetryPolicy::single_attempt()),
                self.options.clone(),
            )
        }
    }

    fn record(id: &str, name: &str, accession: &str, date: &str) -> MemoryRecord {
        MemoryRecord::new()
            .with(&PATIENT_ID, id)
            .with(&PATIENT_NAME, name)
            .with(&ACCESSION_NUMBER, accession)
            .with(&STUDY_DATE, date)
    }

    #[test]
    fn test_run_writes_scrubbed_output_and_ledger() {
        let fixture = Fixture::new();
        fixture.add("patient_a", "T1", "0001.dcm", &record("P1", "Smith^John", "A1", "20200101"));
        fixture.add("patient_a", "T1", "notes.txt", &record("P1", "Smith^John", "A1", "20200101"));

        let summary = fixture.pipeline().execute().unwrap();

        assert!(summary.is_successful());
        assert_eq!(summary.files_written, 1);
        let output = fixture.options.target.join("JS0_20200101").join("T1_0001.dcm");
        let written = JsonStore.read(&output).unwrap();
        assert_eq!(written.text(&PATIENT_NAME), Some("JS0_20200101".to_string()));
        assert_eq!(written.text(&PATIENT_ID), Some("anonymised".to_string()));
        assert!(fixture.options.ledger_path.exists());
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let mut fixture = Fixture::new();
        fixture.options.dry_run = true;
        fixture.add("patient_a", "T1", "0001.dcm", &record("P1", "Smith^John", "A1", "20200101"));

        let mut ledger = MappingLedger::new();
        let summary = fixture.pipeline().run(&mut ledger).unwrap();

        assert_eq!(summary.files_processed, 1);
        assert_eq!(summary.files_written, 0);
        assert_eq!(ledger.encounter_count(), 1);
        assert!(!fixture.options.target.exists());
        assert!(!fixture.options.ledger_path.exists());
    }

    #[test]
    fn test_shutdown_signal_stops_before_next_patient() {
        let fixture = Fixture::new();
        fixture.add("patient_a", "T1", "0001.dcm", &record("P1", "Smith^John", "A1", "20200101"));

        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();
        let summary = fixture.pipeline().with_shutdown_signal(rx).execute().unwrap();

        assert!(summary.interrupted);
        assert_eq!(summary.patients_completed, 0);
        assert_eq!(summary.exit_code(), 130);
    }

    #[test]
    fn test_data_quality_failure_stops_run() {
        let fixture = Fixture::new();
        fixture.add("patient_a", "T1", "0001.dcm", &record("P1", "Smith^John", "A1", "20200101"));
        fixture.add(
            "patient_b",
            "T1",
            "0001.dcm",
            &MemoryRecord::new().with(&PATIENT_NAME, "Doe^Jane"),
        );
        fixture.add("patient_c", "T1", "0001.dcm", &record("P3", "Roe^Rick", "C1", "20200303"));

        let summary = fixture.pipeline().execute().unwrap();

        assert_eq!(summary.patients_completed, 1);
        let failure = summary.failure.as_ref().unwrap();
        assert_eq!(failure.patient_folder, "patient_b");
        assert_eq!(summary.exit_code(), 3);

        let saved = MappingLedger::load(
            &fixture.options.ledger_path,
            &RetryableOps::local(RetryPolicy::single_attempt()),
        )
        .unwrap();
        assert_eq!(saved.len(), 1);
    }

    #[test]
    fn test_source_folder_is_base_name() {
        let fixture = Fixture::new();
        assert_eq!(fixture.options.source_folder(), "export");
    }
}
