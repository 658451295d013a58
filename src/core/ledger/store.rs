//! Persisted patient-to-pseudonym mapping
//!
//! The ledger is loaded once at start-up, mutated in memory while patients are
//! processed, and saved after each patient directory completes. Entries and
//! encounters are only ever added.

use crate::core::ledger::entry::{Encounter, LedgerEntry};
use crate::core::ledger::wire::WireEntry;
use crate::core::retry::{FileSystem, RetryableOps};
use crate::domain::ids::{PatientId, StudyDate};
use crate::domain::{LinkageError, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Real patient identifier to [`LedgerEntry`] table
///
/// # Examples
///
/// ```
/// use linkage::core::ledger::{Encounter, MappingLedger};
/// use linkage::domain::{PatientId, Pseudonym, StudyDate};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut ledger = MappingLedger::new();
/// let patient = PatientId::new("P1")?;
/// let date = StudyDate::new("20200101")?;
///
/// assert_eq!(ledger.index_for(&patient), 0);
/// ledger.append_encounter(&patient, Encounter {
///     name: "Smith^John".into(),
///     pseudonym: Pseudonym::new("JS0_20200101")?,
///     accession: "A1".into(),
///     study_date: date.clone(),
///     source_folder: "export".into(),
/// })?;
/// assert!(ledger.has_encounter(&patient, "A1", &date));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingLedger {
    entries: BTreeMap<PatientId, LedgerEntry>,
}

impl MappingLedger {
    /// Creates an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the ledger at `path`, or an empty one if no file exists
    ///
    /// # Errors
    ///
    /// Returns [`LinkageError::CorruptLedger`] if the file exists but cannot
    /// be parsed or breaks the entry format, and [`LinkageError::TransientIo`]
    /// if it exists but cannot be read within the read budget.
    pub fn load<F: FileSystem>(path: &Path, ops: &RetryableOps<F>) -> Result<Self> {
        if !ops.path_is_file(path) {
            tracing::info!(path = %path.display(), "No ledger found, starting empty");
            return Ok(Self::new());
        }

        let bytes = ops.read_file(path)?;
        let ledger = Self::from_json_slice(&bytes)
            .map_err(|reason| LinkageError::corrupt_ledger(path, reason))?;

        tracing::info!(
            path = %path.display(),
            patients = ledger.len(),
            "Ledger loaded"
        );
        Ok(ledger)
    }

    /// Writes the whole ledger to `path`, creating parent directories
    ///
    /// The file is replaced atomically within the serialize budget.
    pub fn save<F: FileSystem>(&self, path: &Path, ops: &RetryableOps<F>) -> Result<()> {
        let json = self.to_json_pretty()?;
        ops.write_atomic(path, json.as_bytes())?;
        tracing::debug!(path = %path.display(), patients = self.len(), "Ledger saved");
        Ok(())
    }

    /// Parses the persisted JSON form
    pub fn from_json_slice(bytes: &[u8]) -> std::result::Result<Self, String> {
        let wire: BTreeMap<String, WireEntry> =
            serde_json::from_slice(bytes).map_err(|e| e.to_string())?;

        let mut entries = BTreeMap::new();
        let mut indices = BTreeSet::new();
        for (key, wire_entry) in wire {
            let patient = PatientId::new(key.clone())
                .map_err(|e| format!("invalid patient key '{key}': {e}"))?;
            let entry = LedgerEntry::try_from(wire_entry)
                .map_err(|e| format!("entry for patient #{}: {e}", entries.len()))?;
            if let Some(index) = entry.index {
                if !indices.insert(index) {
                    return Err(format!("index {index} is assigned to more than one patient"));
                }
            }
            entries.insert(patient, entry);
        }
        Ok(Self { entries })
    }

    /// Renders the persisted JSON form
    pub fn to_json_pretty(&self) -> Result<String> {
        let wire: BTreeMap<&str, WireEntry> = self
            .entries
            .iter()
            .map(|(id, entry)| (id.as_str(), WireEntry::from(entry)))
            .collect();
        Ok(serde_json::to_string_pretty(&wire)?)
    }

    /// Creates a zero-state entry for `patient` if none exists
    pub fn ensure_entry(&mut self, patient: &PatientId) -> &LedgerEntry {
        self.entries.entry(patient.clone()).or_default()
    }

    /// Whether (patient, accession, study date) is already recorded
    pub fn has_encounter(&self, patient: &PatientId, accession: &str, study_date: &StudyDate) -> bool {
        self.find_encounter(patient, accession, study_date).is_some()
    }

    /// The recorded encounter for (patient, accession, study date)
    pub fn find_encounter(
        &self,
        patient: &PatientId,
        accession: &str,
        study_date: &StudyDate,
    ) -> Option<&Encounter> {
        self.entries.get(patient)?.find(accession, study_date)
    }

    /// The patient's fixed index, or the index it would receive next
    ///
    /// A candidate index is not reserved until an encounter is appended.
    pub fn index_for(&self, patient: &PatientId) -> u64 {
        self.entries
            .get(patient)
            .and_then(LedgerEntry::index)
            .unwrap_or_else(|| self.next_index())
    }

    /// The index the next new patient receives
    ///
    /// One past the highest index ever assigned, so indices are never reused.
    pub fn next_index(&self) -> u64 {
        self.entries
            .values()
            .filter_map(LedgerEntry::index)
            .max()
            .map_or(0, |max| max + 1)
    }

    /// Records a new encounter, fixing the patient's index on first use
    ///
    /// Returns the patient's index.
    ///
    /// # Errors
    ///
    /// Returns [`LinkageError::Ledger`] if the (accession, study date) pair is
    /// already recorded for this patient.
    pub fn append_encounter(&mut self, patient: &PatientId, encounter: Encounter) -> Result<u64> {
        if self.has_encounter(patient, &encounter.accession, &encounter.study_date) {
            return Err(LinkageError::Ledger(format!(
                "encounter for study {} is already recorded",
                encounter.study_date
            )));
        }

        let next = self.next_index();
        let entry = self.entries.entry(patient.clone()).or_default();
        let index = *entry.index.get_or_insert(next);
        entry.encounters.push(encounter);
        Ok(index)
    }

    /// Entry for `patient`, if present
    pub fn get(&self, patient: &PatientId) -> Option<&LedgerEntry> {
        self.entries.get(patient)
    }

    /// All entries, ordered by patient identifier
    pub fn entries(&self) -> impl Iterator<Item = (&PatientId, &LedgerEntry)> {
        self.entries.iter()
    }

    /// Number of patients
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the ledger has no patients
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total encounters across all patients
    pub fn encounter_count(&self) -> usize {
        self.entries.values().map(|e| e.encounters.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::retry::RetryPolicy;
    use crate::domain::ids::Pseudonym;
    use tempfile::TempDir;

    fn patient(id: &str) -> PatientId {
        PatientId::new(id).unwrap()
    }

    fn date(d: &str) -> StudyDate {
        StudyDate::new(d).unwrap()
    }

    fn encounter(accession: &str, study_date: &str, pseudonym: &str) -> Encounter {
        Encounter {
            name: "Smith^John".to_string(),
            pseudonym: Pseudonym::new(pseudonym).unwrap(),
            accession: accession.to_string(),
            study_date: date(study_date),
            source_folder: "export".to_string(),
        }
    }

    fn ops() -> RetryableOps {
        RetryableOps::local(RetryPolicy::single_attempt())
    }

    #[test]
    fn test_index_for_is_candidate_until_appended() {
        let mut ledger = MappingLedger::new();
        let p1 = patient("P1");
        ledger.ensure_entry(&p1);

        assert_eq!(ledger.index_for(&p1), 0);
        assert_eq!(ledger.get(&p1).unwrap().index(), None);

        assert_eq!(ledger.append_encounter(&p1, encounter("A1", "20200101", "JS0_20200101")).unwrap(), 0);
        assert_eq!(ledger.get(&p1).unwrap().index(), Some(0));
    }

    #[test]
    fn test_indices_are_sequential_and_stable() {
        let mut ledger = MappingLedger::new();
        let p1 = patient("P1");
        let p2 = patient("P2");

        ledger.append_encounter(&p1, encounter("A1", "20200101", "JS0_20200101")).unwrap();
        ledger.append_encounter(&p2, encounter("B1", "20200105", "AB1_20200105")).unwrap();
        let again = ledger
            .append_encounter(&p1, encounter("A2", "20200102", "JS0_20200102"))
            .unwrap();

        assert_eq!(again, 0);
        assert_eq!(ledger.index_for(&p2), 1);
        assert_eq!(ledger.next_index(), 2);
        assert_eq!(ledger.encounter_count(), 3);
    }

    #[test]
    fn test_append_duplicate_encounter_is_rejected() {
        let mut ledger = MappingLedger::new();
        let p1 = patient("P1");
        ledger.append_encounter(&p1, encounter("A1", "20200101", "JS0_20200101")).unwrap();

        let err = ledger
            .append_encounter(&p1, encounter("A1", "20200101", "JS0_20200101"))
            .unwrap_err();
        assert!(matches!(err, LinkageError::Ledger(_)));
        assert_eq!(ledger.get(&p1).unwrap().encounters().len(), 1);
    }

    #[test]
    fn test_has_encounter_matches_both_values() {
        let mut ledger = MappingLedger::new();
        let p1 = patient("P1");
        ledger.append_encounter(&p1, encounter("A1", "20200101", "JS0_20200101")).unwrap();

        assert!(ledger.has_encounter(&p1, "A1", &date("20200101")));
        assert!(!ledger.has_encounter(&p1, "A1", &date("20200102")));
        assert!(!ledger.has_encounter(&patient("P2"), "A1", &date("20200101")));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("state").join("record_linkage.json");

        let mut ledger = MappingLedger::new();
        ledger.append_encounter(&patient("P1"), encounter("A1", "20200101", "JS0_20200101")).unwrap();
        ledger.append_encounter(&patient("P1"), encounter("A2", "20200102", "JS0_20200102")).unwrap();
        ledger.ensure_entry(&patient("P9"));

        ledger.save(&path, &ops()).unwrap();
        let loaded = MappingLedger::load(&path, &ops()).unwrap();

        assert_eq!(loaded, ledger);
        assert!(!path.with_file_name("record_linkage.json.tmp").exists());
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let ledger = MappingLedger::load(&temp_dir.path().join("absent.json"), &ops()).unwrap();
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_load_unparsable_file_is_corrupt() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("record_linkage.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = MappingLedger::load(&path, &ops()).unwrap_err();
        assert!(matches!(err, LinkageError::CorruptLedger { .. }));
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn test_unequal_arrays_are_corrupt() {
        let json = r#"{"P1": {"index": 0, "PatientName": ["A^B", "A^B"],
            "NewPatientName": ["BA0_20200101"], "AccessionNumber": ["A1"],
            "StudyDate": ["20200101"], "OriginalBaseFolder": ["x"]}}"#;
        let err = MappingLedger::from_json_slice(json.as_bytes()).unwrap_err();
        assert!(err.contains("unequal lengths"));
    }

    #[test]
    fn test_duplicate_index_is_corrupt() {
        let json = r#"{
            "P1": {"index": 0, "PatientName": [], "NewPatientName": [], "AccessionNumber": [], "StudyDate": [], "OriginalBaseFolder": []},
            "P2": {"index": 0, "PatientName": [], "NewPatientName": [], "AccessionNumber": [], "StudyDate": [], "OriginalBaseFolder": []}
        }"#;
        assert!(MappingLedger::from_json_slice(json.as_bytes()).is_err());
    }

    #[test]
    fn test_legacy_index_key_and_numeric_scalars() {
        let json = r#"{"P1": {"PatientIndex": 1, "PatientName": ["Smith^John"],
            "NewPatientName": ["JS1_20200101"], "AccessionNumber": [12345],
            "StudyDate": [20200101], "OriginalBaseFolder": ["export"]}}"#;
        let ledger = MappingLedger::from_json_slice(json.as_bytes()).unwrap();

        let p1 = patient("P1");
        assert_eq!(ledger.index_for(&p1), 1);
        assert!(ledger.has_encounter(&p1, "12345", &date("20200101")));
        assert_eq!(ledger.next_index(), 2);

        let rendered = ledger.to_json_pretty().unwrap();
        assert!(rendered.contains("\"index\": 1"));
        assert!(!rendered.contains("PatientIndex"));
    }
}
