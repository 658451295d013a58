//! External format integrations for linkage.
//!
//! - [`dicom`] - DICOM files via the `dicom` crate
//!
//! Adapters implement [`RecordStore`](crate::domain::RecordStore) and
//! [`Record`](crate::domain::Record) so the pipeline never depends on a file
//! format directly.

pub mod dicom;
