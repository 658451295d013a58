//! Domain models and types for linkage.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`PatientId`], [`StudyDate`], [`Pseudonym`])
//! - **Record model** ([`Field`], [`FieldTag`], [`Record`], [`RecordStore`])
//! - **Error types** ([`LinkageError`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! Identifiers are newtypes so a pseudonym can never be stored where a real
//! patient identifier is expected:
//!
//! ```rust
//! use linkage::domain::{PatientId, StudyDate};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let patient_id = PatientId::new("P1")?;
//! let study_date = StudyDate::new("20200101")?;
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod ids;
pub mod record;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::LinkageError;
pub use ids::{PatientId, Pseudonym, StudyDate};
pub use record::{Field, FieldTag, MemoryRecord, Record, RecordStore};
pub use result::Result;
