//! Domain identifier types with validation
//!
//! Newtype wrappers for the values that key the mapping ledger. Each type
//! validates its format once, at the boundary, so the ledger and the resolver
//! never see an empty patient identifier or a malformed study date.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Real-world patient identifier as found in the source records
///
/// # Examples
///
/// ```
/// use linkage::domain::ids::PatientId;
/// use std::str::FromStr;
///
/// let id = PatientId::from_str("P1").unwrap();
/// assert_eq!(id.as_str(), "P1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatientId(String);

impl PatientId {
    /// Creates a new PatientId, rejecting blank values
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Patient ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the patient ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PatientId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for PatientId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Study date in `YYYYMMDD` form
///
/// Only the shape is checked (eight ASCII digits); the value is carried
/// verbatim into pseudonyms, so no calendar normalisation happens here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StudyDate(String);

impl StudyDate {
    /// Creates a new StudyDate
    pub fn new(date: impl Into<String>) -> Result<Self, String> {
        let date = date.into();
        if date.len() != 8 || !date.bytes().all(|b| b.is_ascii_digit()) {
            return Err(format!("Study date must be 8 digits (YYYYMMDD), got '{date}'"));
        }
        Ok(Self(date))
    }

    /// Returns the study date as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StudyDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for StudyDate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for StudyDate {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<StudyDate> for String {
    fn from(value: StudyDate) -> Self {
        value.0
    }
}

/// Pseudonymous patient identity written into anonymised records
///
/// Also names the patient's output directory, so it never contains a path
/// separator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pseudonym(String);

impl Pseudonym {
    /// Creates a new Pseudonym
    pub fn new(value: impl Into<String>) -> Result<Self, String> {
        let value = value.into();
        if value.is_empty() {
            return Err("Pseudonym cannot be empty".to_string());
        }
        if value.contains(['/', '\\']) {
            return Err(format!("Pseudonym '{value}' contains a path separator"));
        }
        Ok(Self(value))
    }

    /// Returns the pseudonym as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Pseudonym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Pseudonym {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
