//! DICOM record reader/writer
//!
//! Binds the [`Record`] and [`RecordStore`] seams to the `dicom` crate. Field
//! access works on top-level data elements by tag; private elements are the
//! ones in odd-numbered groups and are tracked through sequence items at any
//! depth.

use crate::domain::record::{Field, FieldTag, Record, RecordStore};
use crate::domain::{LinkageError, Result};
use dicom::core::header::Header;
use dicom::core::value::{DataSetSequence, PrimitiveValue};
use dicom::core::{DataElement, Tag, VR};
use dicom::object::{open_file, DefaultDicomObject, InMemDicomObject};
use std::collections::BTreeSet;
use std::io;
use std::path::Path;

impl From<FieldTag> for Tag {
    fn from(tag: FieldTag) -> Self {
        Tag(tag.group, tag.element)
    }
}

impl From<Tag> for FieldTag {
    fn from(tag: Tag) -> Self {
        FieldTag::new(tag.group(), tag.element())
    }
}

/// One DICOM file held in memory
#[derive(Debug, Clone)]
pub struct DicomRecord {
    object: DefaultDicomObject,
}

impl DicomRecord {
    /// Wraps a parsed DICOM file
    pub fn new(object: DefaultDicomObject) -> Self {
        Self { object }
    }

    /// The underlying DICOM object
    pub fn object(&self) -> &DefaultDicomObject {
        &self.object
    }

    /// Unwraps the underlying DICOM object
    pub fn into_inner(self) -> DefaultDicomObject {
        self.object
    }
}

impl Record for DicomRecord {
    fn text(&self, field: &Field) -> Option<String> {
        let element = self.object.element(field.tag.into()).ok()?;
        let value = element.to_str().ok()?;
        Some(value.trim_end_matches(['\0', ' ']).trim_start().to_string())
    }

    fn contains(&self, field: &Field) -> bool {
        self.object.element(field.tag.into()).is_ok()
    }

    fn set_text(&mut self, field: &Field, value: &str) {
        let tag: Tag = field.tag.into();
        let vr = self
            .object
            .element(tag)
            .map(|e| e.vr())
            .unwrap_or(field.vr);
        self.object
            .put(DataElement::new(tag, vr, PrimitiveValue::from(value.to_string())));
    }

    fn remove(&mut self, field: &Field) -> bool {
        self.object.remove_element(field.tag.into())
    }

    fn private_tags(&self) -> Vec<FieldTag> {
        let mut tags = BTreeSet::new();
        collect_private(&self.object, &mut tags);
        tags.into_iter().collect()
    }

    fn remove_private(&mut self, tag: FieldTag) -> Result<()> {
        if strip_private(&mut self.object, tag.into()) {
            Ok(())
        } else {
            Err(LinkageError::Record(format!("private element {tag} could not be removed")))
        }
    }
}

fn collect_private(object: &InMemDicomObject, out: &mut BTreeSet<FieldTag>) {
    for element in object.iter() {
        let tag = FieldTag::from(element.tag());
        if tag.is_private() {
            out.insert(tag);
        } else if let Some(items) = element.items() {
            for item in items {
                collect_private(item, out);
            }
        }
    }
}

/// Removes `tag` from the object and from every sequence item below it.
/// Returns whether anything was removed.
fn strip_private(object: &mut InMemDicomObject, tag: Tag) -> bool {
    let mut removed = object.remove_element(tag);

    let sequences: Vec<(Tag, Vec<InMemDicomObject>)> = object
        .iter()
        .filter_map(|e| e.items().map(|items| (e.tag(), items.to_vec())))
        .collect();

    for (seq_tag, mut items) in sequences {
        let mut changed = false;
        for item in items.iter_mut() {
            changed |= strip_private(item, tag);
        }
        if changed {
            object.put(DataElement::new(seq_tag, VR::SQ, DataSetSequence::from(items)));
            removed = true;
        }
    }

    removed
}

/// [`RecordStore`] for DICOM Part 10 files
#[derive(Debug, Clone, Copy, Default)]
pub struct DicomRecordStore;

impl RecordStore for DicomRecordStore {
    type Record = DicomRecord;

    fn read(&self, path: &Path) -> io::Result<DicomRecord> {
        let object = open_file(path)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
        Ok(DicomRecord::new(object))
    }

    fn write(&self, record: &DicomRecord, path: &Path) -> io::Result<()> {
        record
            .object
            .write_to_file(path)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
    }
}
