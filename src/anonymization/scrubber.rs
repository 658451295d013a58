//! Field-level scrubbing of one record

use crate::anonymization::tags::{DELETE_LIST, PATIENT_NAME, REPLACE_TABLE};
use crate::domain::ids::Pseudonym;
use crate::domain::record::{FieldTag, Record};

/// What a scrub changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrubReport {
    /// Delete-list fields that were present and removed
    pub deleted: usize,
    /// Private fields removed
    pub private_removed: usize,
    /// Private fields that could not be removed
    pub private_failed: Vec<FieldTag>,
}

impl ScrubReport {
    /// Whether every private field was removed
    pub fn is_complete(&self) -> bool {
        self.private_failed.is_empty()
    }
}

/// Applies the fixed replace, delete and private-strip rules
#[derive(Debug, Clone, Copy, Default)]
pub struct TagScrubber;

impl TagScrubber {
    /// Creates a scrubber
    pub fn new() -> Self {
        Self
    }

    /// Scrubs `record` in place
    ///
    /// The person name becomes `pseudonym`, replace-table fields are set or
    /// inserted, delete-list fields are dropped, and every private field is
    /// removed. A private field that refuses removal is skipped and reported;
    /// the scrub itself never fails.
    pub fn apply<R: Record>(&self, record: &mut R, pseudonym: &Pseudonym) -> ScrubReport {
        let mut report = ScrubReport::default();

        record.set_text(&PATIENT_NAME, pseudonym.as_str());

        for (field, value) in REPLACE_TABLE.iter() {
            record.set_text(field, value);
        }

        for field in DELETE_LIST.iter() {
            if record.remove(field) {
                report.deleted += 1;
            }
        }

        for tag in record.private_tags() {
            match record.remove_private(tag) {
                Ok(()) => report.private_removed += 1,
                Err(e) => {
                    tracing::warn!(tag = %tag, error = %e, "Skipping unremovable private field");
                    report.private_failed.push(tag);
                }
            }
        }

        report
    }
}
