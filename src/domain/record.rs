//! Record model
//!
//! A record is one imaging file's metadata: a mapping from field tags to
//! values, plus whatever payload the file carries. The anonymisation engine
//! only ever talks to records through the [`Record`] trait and reads or writes
//! them through a [`RecordStore`], so the on-disk format stays an external
//! concern (see [`crate::adapters::dicom`]).

use crate::domain::errors::LinkageError;
use crate::domain::Result;
use dicom::core::VR;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Field tag as a (group, element) pair
///
/// Displayed and serialized as `(GGGG,EEEE)` in upper-case hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct FieldTag {
    /// Group number
    pub group: u16,
    /// Element number
    pub element: u16,
}

impl FieldTag {
    /// Creates a new tag
    pub const fn new(group: u16, element: u16) -> Self {
        Self { group, element }
    }

    /// Vendor-private fields live in odd-numbered groups
    pub fn is_private(&self) -> bool {
        self.group % 2 == 1
    }
}

impl fmt::Display for FieldTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:04X},{:04X})", self.group, self.element)
    }
}

impl FromStr for FieldTag {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let inner = s
            .trim()
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| format!("Tag '{s}' must look like (GGGG,EEEE)"))?;
        let (group, element) = inner
            .split_once(',')
            .ok_or_else(|| format!("Tag '{s}' must look like (GGGG,EEEE)"))?;
        let group = u16::from_str_radix(group.trim(), 16)
            .map_err(|e| format!("Invalid group in tag '{s}': {e}"))?;
        let element = u16::from_str_radix(element.trim(), 16)
            .map_err(|e| format!("Invalid element in tag '{s}': {e}"))?;
        Ok(Self::new(group, element))
    }
}

impl From<FieldTag> for String {
    fn from(tag: FieldTag) -> Self {
        tag.to_string()
    }
}

impl TryFrom<String> for FieldTag {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

/// A named, typed field the engine reads or rewrites
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// Standard keyword, used in logs and in the ledger wire format
    pub keyword: &'static str,
    /// Tag the field is stored under
    pub tag: FieldTag,
    /// Value representation used when the field has to be inserted
    pub vr: VR,
}

impl Field {
    /// Creates a new field description
    pub const fn new(keyword: &'static str, group: u16, element: u16, vr: VR) -> Self {
        Self {
            keyword,
            tag: FieldTag::new(group, element),
            vr,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.keyword, self.tag)
    }
}

/// Field-level access to one record
///
/// Accessors return present/absent instead of failing, so callers choose
/// their own fallback for missing fields.
pub trait Record {
    /// Text value of a field, trimmed of padding, if present and decodable
    fn text(&self, field: &Field) -> Option<String>;

    /// Whether the field is present at all
    fn contains(&self, field: &Field) -> bool;

    /// Sets a field, inserting it with the field's VR when absent
    fn set_text(&mut self, field: &Field, value: &str);

    /// Removes a field, returning whether it was present
    fn remove(&mut self, field: &Field) -> bool;

    /// Tags of every vendor-private field currently in the record, at any
    /// nesting depth
    fn private_tags(&self) -> Vec<FieldTag>;

    /// Removes one private field wherever it occurs, including inside nested
    /// items
    ///
    /// # Errors
    ///
    /// Returns [`LinkageError::Record`] if the field cannot be removed.
    fn remove_private(&mut self, tag: FieldTag) -> Result<()>;
}

/// Reader/writer for one record format
///
/// Failures are reported as I/O errors: on the storage this tool runs against
/// they are usually transient, and the pipeline retries them.
pub trait RecordStore {
    /// Record type produced by this store
    type Record: Record;

    /// Reads one record from `path`
    fn read(&self, path: &Path) -> std::io::Result<Self::Record>;

    /// Writes `record` to `path`, replacing any existing file
    fn write(&self, record: &Self::Record, path: &Path) -> std::io::Result<()>;
}

/// In-memory record, keyed by tag
///
/// Used for dry inspection and as a deterministic stand-in for real files.
/// Tags listed in `locked` refuse removal, which is how a malformed private
/// field behaves in the wild.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// Field values
    pub fields: BTreeMap<FieldTag, String>,
    /// Opaque payload carried through untouched
    #[serde(default)]
    pub payload: Vec<u8>,
    /// Fields that cannot be removed
    #[serde(default)]
    pub locked: BTreeSet<FieldTag>,
}

impl MemoryRecord {
    /// Creates an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field insertion
    pub fn with(mut self, field: &Field, value: impl Into<String>) -> Self {
        self.fields.insert(field.tag, value.into());
        self
    }

    /// Builder-style insertion by raw tag
    pub fn with_tag(mut self, tag: FieldTag, value: impl Into<String>) -> Self {
        self.fields.insert(tag, value.into());
        self
    }

    /// Marks a tag as impossible to remove
    pub fn lock(mut self, tag: FieldTag) -> Self {
        self.locked.insert(tag);
        self
    }

    /// Raw value by tag
    pub fn get(&self, tag: FieldTag) -> Option<&str> {
        self.fields.get(&tag).map(String::as_str)
    }
}

impl Record for MemoryRecord {
    fn text(&self, field: &Field) -> Option<String> {
        self.fields
            .get(&field.tag)
            .map(|v| v.trim_end_matches(['\0', ' ']).trim_start().to_string())
    }

    fn contains(&self, field: &Field) -> bool {
        self.fields.contains_key(&field.tag)
    }

    fn set_text(&mut self, field: &Field, value: &str) {
        self.fields.insert(field.tag, value.to_string());
    }

    fn remove(&mut self, field: &Field) -> bool {
        self.fields.remove(&field.tag).is_some()
    }

    fn private_tags(&self) -> Vec<FieldTag> {
        self.fields.keys().filter(|t| t.is_private()).copied().collect()
    }

    fn remove_private(&mut self, tag: FieldTag) -> Result<()> {
        if self.locked.contains(&tag) {
            return Err(LinkageError::Record(format!(
                "private field {tag} cannot be removed"
            )));
        }
        self.fields.remove(&tag);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PATIENT_NAME: Field = Field::new("PatientName", 0x0010, 0x0010, VR::PN);

    #[test]
    fn test_field_tag_display_and_parse() {
        let tag = FieldTag::new(0x0010, 0x0010);
        assert_eq!(tag.to_string(), "(0010,0010)");
        assert_eq!("(0010,0010)".parse::<FieldTag>().unwrap(), tag);
        assert_eq!("(0029,10af)".parse::<FieldTag>().unwrap(), FieldTag::new(0x0029, 0x10AF));
        assert!("0010,0010".parse::<FieldTag>().is_err());
        assert!("(00ZZ,0010)".parse::<FieldTag>().is_err());
    }

    #[test]
    fn test_private_tag_detection() {
        assert!(FieldTag::new(0x0029, 0x1010).is_private());
        assert!(!FieldTag::new(0x0010, 0x0010).is_private());
    }

    #[test]
    fn test_memory_record_trims_padding() {
        let record = MemoryRecord::new().with(&PATIENT_NAME, "Smith^John ");
        assert_eq!(record.text(&PATIENT_NAME), Some("Smith^John".to_string()));
    }

    #[test]
    fn test_memory_record_locked_private_field() {
        let locked = FieldTag::new(0x0029, 0x0010);
        let mut record = MemoryRecord::new()
            .with_tag(locked, "vendor")
            .with_tag(FieldTag::new(0x0029, 0x0011), "vendor2")
            .lock(locked);

        assert!(record.remove_private(locked).is_err());
        assert!(record.remove_private(FieldTag::new(0x0029, 0x0011)).is_ok());
        assert_eq!(record.private_tags(), vec![locked]);
    }

    #[test]
    fn test_memory_record_json_keys_are_tags() {
        let record = MemoryRecord::new().with(&PATIENT_NAME, "Smith^John");
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"(0010,0010)\":\"Smith^John\""));

        let back: MemoryRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
