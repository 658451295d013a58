//! Persisted JSON layout of the ledger
//!
//! On disk each patient maps to parallel arrays, one element per encounter:
//!
//! ```json
//! {
//!   "P1": {
//!     "index": 0,
//!     "PatientName": ["Smith^John"],
//!     "NewPatientName": ["JS0_20200101"],
//!     "AccessionNumber": ["A1"],
//!     "StudyDate": ["20200101"],
//!     "OriginalBaseFolder": ["export"]
//!   }
//! }
//! ```
//!
//! The arrays are zipped into [`Encounter`]s on load; arrays of unequal length
//! make the file unusable.

use crate::core::ledger::entry::{Encounter, LedgerEntry};
use crate::domain::ids::{Pseudonym, StudyDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct WireEntry {
    #[serde(alias = "PatientIndex", default)]
    index: Option<u64>,
    #[serde(rename = "PatientName", default)]
    names: Vec<String>,
    #[serde(rename = "NewPatientName", default)]
    pseudonyms: Vec<Pseudonym>,
    #[serde(rename = "AccessionNumber", default)]
    accessions: Vec<Scalar>,
    #[serde(rename = "StudyDate", default)]
    study_dates: Vec<Scalar>,
    #[serde(rename = "OriginalBaseFolder", default)]
    source_folders: Vec<String>,
}

/// A string, or a number written by a tool that did not quote it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Number(serde_json::Number),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Scalar::Text(s) => s,
            Scalar::Number(n) => n.to_string(),
        }
    }
}

impl From<&LedgerEntry> for WireEntry {
    fn from(entry: &LedgerEntry) -> Self {
        let mut wire = WireEntry {
            index: entry.index,
            ..WireEntry::default()
        };
        for e in &entry.encounters {
            wire.names.push(e.name.clone());
            wire.pseudonyms.push(e.pseudonym.clone());
            wire.accessions.push(Scalar::Text(e.accession.clone()));
            wire.study_dates
                .push(Scalar::Text(e.study_date.as_str().to_string()));
            wire.source_folders.push(e.source_folder.clone());
        }
        wire
    }
}

impl TryFrom<WireEntry> for LedgerEntry {
    type Error = String;

    fn try_from(wire: WireEntry) -> Result<Self, Self::Error> {
        let len = wire.names.len();
        let lengths = [
            wire.pseudonyms.len(),
            wire.accessions.len(),
            wire.study_dates.len(),
            wire.source_folders.len(),
        ];
        if lengths.iter().any(|&l| l != len) {
            return Err(format!(
                "encounter arrays have unequal lengths ({len}, {})",
                lengths
                    .iter()
                    .map(|l| l.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
        }

        let mut encounters = Vec::with_capacity(len);
        let rows = wire
            .names
            .into_iter()
            .zip(wire.pseudonyms)
            .zip(wire.accessions)
            .zip(wire.study_dates)
            .zip(wire.source_folders);
        for ((((name, pseudonym), accession), study_date), source_folder) in rows {
            let study_date = StudyDate::new(study_date.into_string())?;
            encounters.push(Encounter {
                name,
                pseudonym,
                accession: accession.into_string(),
                study_date,
                source_folder,
            });
        }

        if wire.index.is_none() && !encounters.is_empty() {
            return Err("entry has encounters but no index".to_string());
        }

        Ok(LedgerEntry {
            index: wire.index,
            encounters,
        })
    }
}
