//! Anonymization module for linkage
//!
//! This module turns identifying imaging records into pseudonymised ones while
//! keeping every patient linkable across runs.
//!
//! # Architecture
//!
//! - **Identity**: extract identity fields and resolve them against the
//!   [`MappingLedger`](crate::core::ledger::MappingLedger)
//! - **Pseudonym**: derive `<initials><index>_<study date>` identities
//! - **Scrubbing**: fixed replace-table, delete-list and private-field removal
//! - **Audit**: JSON-lines trail with hashed patient identifiers
//!
//! # Usage
//!
//! ```rust
//! use linkage::anonymization::{IdentityResolver, TagScrubber};
//! use linkage::anonymization::tags::{ACCESSION_NUMBER, PATIENT_ID, PATIENT_NAME, STUDY_DATE};
//! use linkage::core::ledger::MappingLedger;
//! use linkage::domain::MemoryRecord;
//!
//! # fn example() -> linkage::domain::Result<()> {
//! let mut record = MemoryRecord::new()
//!     .with(&PATIENT_ID, "P1")
//!     .with(&PATIENT_NAME, "Smith^John")
//!     .with(&ACCESSION_NUMBER, "A1")
//!     .with(&STUDY_DATE, "20200101");
//!
//! let mut ledger = MappingLedger::new();
//! let resolution = IdentityResolver::new("Z^Z", "export").resolve(&mut record, &mut ledger)?;
//! TagScrubber::new().apply(&mut record, &resolution.pseudonym);
//! assert_eq!(resolution.pseudonym.as_str(), "JS0_20200101");
//! # Ok(())
//! # }
//! ```

pub mod audit;
pub mod config;
pub mod identity;
pub mod pseudonym;
pub mod scrubber;
pub mod tags;

// Re-export main types
pub use config::AnonymizationConfig;
pub use identity::{Identity, IdentityResolver, Resolution};
pub use scrubber::{ScrubReport, TagScrubber};
