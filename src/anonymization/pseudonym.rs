//! Person-name parsing and pseudonym derivation

use crate::domain::ids::{Pseudonym, StudyDate};
use crate::domain::{LinkageError, Result};

/// Components of a person name in `Family^Given^Middle^Prefix^Suffix` form
///
/// Only the first (alphabetic) representation group is used when the value
/// carries `=`-separated ideographic or phonetic groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonName {
    /// Family name component
    pub family: String,
    /// Given name component
    pub given: String,
}

impl PersonName {
    /// Parses a person name value
    ///
    /// Returns `None` when the value holds no name at all.
    ///
    /// # Examples
    ///
    /// ```
    /// use linkage::anonymization::pseudonym::PersonName;
    ///
    /// let name = PersonName::parse("Smith^John").unwrap();
    /// assert_eq!(name.family, "Smith");
    /// assert_eq!(name.given, "John");
    /// assert!(PersonName::parse("  ").is_none());
    /// ```
    pub fn parse(value: &str) -> Option<Self> {
        let alphabetic = value.split('=').next().unwrap_or_default();
        let mut components = alphabetic.split('^').map(str::trim);
        let family = components.next().unwrap_or_default().to_string();
        let given = components.next().unwrap_or_default().to_string();

        if family.is_empty() && given.is_empty() {
            return None;
        }
        Some(Self { family, given })
    }

    /// First character of the family name
    pub fn family_initial(&self) -> Option<char> {
        self.family.chars().next()
    }

    /// First character of the given name
    pub fn given_initial(&self) -> Option<char> {
        self.given.chars().next()
    }
}

/// Derives the pseudonym for (name, index, study date)
///
/// The pseudonym is the given initial, the family initial, the index, an
/// underscore and the study date. Without a given initial the family initial
/// stands alone.
///
/// # Errors
///
/// Returns [`LinkageError::DataQuality`] if the family initial is missing or
/// the result is not a usable directory name.
///
/// # Examples
///
/// ```
/// use linkage::anonymization::pseudonym::{derive_pseudonym, PersonName};
/// use linkage::domain::StudyDate;
///
/// let name = PersonName::parse("Smith^John").unwrap();
/// let date = StudyDate::new("20200101").unwrap();
/// assert_eq!(derive_pseudonym(&name, 0, &date).unwrap().as_str(), "JS0_20200101");
/// ```
pub fn derive_pseudonym(name: &PersonName, index: u64, study_date: &StudyDate) -> Result<Pseudonym> {
    let family = name.family_initial().ok_or_else(|| {
        LinkageError::DataQuality("person name has no family name initial".to_string())
    })?;

    let mut value = String::new();
    if let Some(given) = name.given_initial() {
        value.push(given);
    }
    value.push(family);
    value.push_str(&format!("{index}_{study_date}"));

    Pseudonym::new(value).map_err(LinkageError::DataQuality)
}
