//! Identity extraction and resolution against the ledger
//!
//! [`IdentityResolver::resolve`] is idempotent per (patient, accession, study
//! date): the first sighting derives and records a pseudonym, every later
//! sighting returns the recorded one without touching the ledger.

use crate::anonymization::pseudonym::{derive_pseudonym, PersonName};
use crate::anonymization::tags::{ACCESSION_NUMBER, PATIENT_ID, PATIENT_NAME, STUDY_DATE};
use crate::core::ledger::{Encounter, MappingLedger};
use crate::domain::ids::{PatientId, Pseudonym, StudyDate};
use crate::domain::record::Record;
use crate::domain::{LinkageError, Result};

/// Default person name substituted when a record's name is unusable
pub const DEFAULT_NAME_SENTINEL: &str = "Z^Z";

/// Identity fields of one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Real patient identifier
    pub patient_id: PatientId,
    /// Person name as stored in the record
    pub name: String,
    /// Parsed person name
    pub person: PersonName,
    /// Accession number
    pub accession: String,
    /// Study date
    pub study_date: StudyDate,
}

/// Outcome of resolving one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Real patient identifier, for ledger bookkeeping only
    pub patient_id: PatientId,
    /// Pseudonym for this encounter
    pub pseudonym: Pseudonym,
    /// The patient's index
    pub index: u64,
    /// Whether this call recorded a new encounter
    pub is_new: bool,
}

/// Resolves records to stable pseudonyms
#[derive(Debug, Clone)]
pub struct IdentityResolver {
    name_sentinel: String,
    source_folder: String,
}

impl IdentityResolver {
    /// Creates a resolver
    ///
    /// `source_folder` is the base name of the source root, recorded with
    /// every new encounter.
    pub fn new(name_sentinel: impl Into<String>, source_folder: impl Into<String>) -> Self {
        Self {
            name_sentinel: name_sentinel.into(),
            source_folder: source_folder.into(),
        }
    }

    /// Reads the identity fields of `record`
    ///
    /// An absent or unparsable person name is overwritten with the sentinel
    /// and read back.
    ///
    /// # Errors
    ///
    /// Returns [`LinkageError::DataQuality`] if the patient identifier,
    /// accession number or a well-formed study date is missing, or if even the
    /// sentinel does not parse.
    pub fn extract_identity<R: Record>(&self, record: &mut R) -> Result<Identity> {
        let patient_id = record
            .text(&PATIENT_ID)
            .and_then(|id| PatientId::new(id).ok())
            .ok_or_else(|| missing(PATIENT_ID.keyword))?;
        let accession = record
            .text(&ACCESSION_NUMBER)
            .ok_or_else(|| missing(ACCESSION_NUMBER.keyword))?;
        let study_date = record
            .text(&STUDY_DATE)
            .ok_or_else(|| missing(STUDY_DATE.keyword))
            .and_then(|d| {
                StudyDate::new(d).map_err(|e| LinkageError::DataQuality(format!("StudyDate: {e}")))
            })?;

        let (name, person) = match self.read_name(record) {
            Some(found) => found,
            None => {
                tracing::warn!(
                    sentinel = %self.name_sentinel,
                    "Person name missing or unparsable, substituting sentinel"
                );
                record.set_text(&PATIENT_NAME, &self.name_sentinel);
                self.read_name(record).ok_or_else(|| {
                    LinkageError::DataQuality(format!(
                        "name sentinel '{}' is not a usable person name",
                        self.name_sentinel
                    ))
                })?
            }
        };

        Ok(Identity {
            patient_id,
            name,
            person,
            accession,
            study_date,
        })
    }

    /// Resolves `record` to its pseudonym, recording new encounters in `ledger`
    pub fn resolve<R: Record>(&self, record: &mut R, ledger: &mut MappingLedger) -> Result<Resolution> {
        let identity = self.extract_identity(record)?;
        let patient_id = identity.patient_id;

        ledger.ensure_entry(&patient_id);
        let index = ledger.index_for(&patient_id);

        if let Some(existing) =
            ledger.find_encounter(&patient_id, &identity.accession, &identity.study_date)
        {
            return Ok(Resolution {
                pseudonym: existing.pseudonym.clone(),
                patient_id,
                index,
                is_new: false,
            });
        }

        let pseudonym = derive_pseudonym(&identity.person, index, &identity.study_date)?;

        let index = ledger.append_encounter(
            &patient_id,
            Encounter {
                name: identity.name,
                pseudonym: pseudonym.clone(),
                accession: identity.accession,
                study_date: identity.study_date,
                source_folder: self.source_folder.clone(),
            },
        )?;

        tracing::debug!(pseudonym = %pseudonym, index, "Recorded new encounter");
        Ok(Resolution {
            patient_id,
            pseudonym,
            index,
            is_new: true,
        })
    }

    fn read_name<R: Record>(&self, record: &R) -> Option<(String, PersonName)> {
        let raw = record.text(&PATIENT_NAME)?;
        let person = PersonName::parse(&raw)?;
        Some((raw, person))
    }
}

fn missing(keyword: &str) -> LinkageError {
    LinkageError::DataQuality(format!("record has no {keyword}"))
}
