//! Ledger entry model
//!
//! One [`LedgerEntry`] exists per real patient identifier. Its history is a
//! single ordered list of [`Encounter`]s, so the per-encounter values cannot
//! drift out of step with each other.

use crate::domain::ids::{Pseudonym, StudyDate};

/// One (patient, accession, study date) occurrence and what it was mapped to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encounter {
    /// Person name as found in the source record (or the sentinel)
    pub name: String,
    /// Pseudonym issued for this encounter
    pub pseudonym: Pseudonym,
    /// Accession number of the study
    pub accession: String,
    /// Study date
    pub study_date: StudyDate,
    /// Base name of the source root the record came from
    pub source_folder: String,
}

impl Encounter {
    /// Whether this encounter is the given (accession, study date) pair
    pub fn matches(&self, accession: &str, study_date: &StudyDate) -> bool {
        self.accession == accession && &self.study_date == study_date
    }
}

/// Linkage state for one real patient
///
/// # Examples
///
/// ```
/// use linkage::core::ledger::LedgerEntry;
///
/// let entry = LedgerEntry::default();
/// assert!(entry.index().is_none());
/// assert!(entry.encounters().is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerEntry {
    pub(crate) index: Option<u64>,
    pub(crate) encounters: Vec<Encounter>,
}

impl LedgerEntry {
    /// The patient's fixed index, once assigned
    pub fn index(&self) -> Option<u64> {
        self.index
    }

    /// Encounters in the order they were first seen
    pub fn encounters(&self) -> &[Encounter] {
        &self.encounters
    }

    /// The recorded encounter for (accession, study date), if any
    pub fn find(&self, accession: &str, study_date: &StudyDate) -> Option<&Encounter> {
        self.encounters
            .iter()
            .find(|e| e.matches(accession, study_date))
    }

    /// Distinct pseudonyms issued to this patient, in first-issued order
    pub fn pseudonyms(&self) -> Vec<&Pseudonym> {
        let mut seen: Vec<&Pseudonym> = Vec::new();
        for encounter in &self.encounters {
            if !seen.contains(&&encounter.pseudonym) {
                seen.push(&encounter.pseudonym);
            }
        }
        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encounter(accession: &str, date: &str, pseudonym: &str) -> Encounter {
        Encounter {
            name: "Smith^John".to_string(),
            pseudonym: Pseudonym::new(pseudonym).unwrap(),
            accession: accession.to_string(),
            study_date: StudyDate::new(date).unwrap(),
            source_folder: "export".to_string(),
        }
    }

    #[test]
    fn test_find_requires_both_accession_and_date() {
        let entry = LedgerEntry {
            index: Some(0),
            encounters: vec![encounter("A1", "20200101", "JS0_20200101")],
        };

        let date = StudyDate::new("20200101").unwrap();
        let other_date = StudyDate::new("20200102").unwrap();
        assert!(entry.find("A1", &date).is_some());
        assert!(entry.find("A1", &other_date).is_none());
        assert!(entry.find("A2", &date).is_none());
    }

    #[test]
    fn test_pseudonyms_are_deduplicated_in_order() {
        let entry = LedgerEntry {
            index: Some(0),
            encounters: vec![
                encounter("A1", "20200101", "JS0_20200101"),
                encounter("A2", "20200102", "JS0_20200102"),
                encounter("A3", "20200101", "JS0_20200101"),
            ],
        };

        let names: Vec<&str> = entry.pseudonyms().iter().map(|p| p.as_str()).collect();
        assert_eq!(names, vec!["JS0_20200101", "JS0_20200102"]);
    }
}
