//! Core business logic for linkage.
//!
//! This module contains the record-linkage engine and run orchestration.
//!
//! # Modules
//!
//! - [`retry`] - Retry-hardened filesystem and record I/O
//! - [`ledger`] - Persisted patient-to-pseudonym mapping
//! - [`pipeline`] - Patient/sequence/file traversal, summary and archiving
//!
//! # Run Workflow
//!
//! 1. **Load Ledger**: Read the mapping, or start empty
//! 2. **List Patients**: Largest-of-N listing of the source root
//! 3. **Resolve**: Look up or assign each record's pseudonym
//! 4. **Scrub**: Apply the fixed replace/delete/private rules
//! 5. **Write**: `target/<pseudonym>/<sequence>_<file>`
//! 6. **Checkpoint**: Save the ledger after each patient
//! 7. **Archive** (optional): Pack and remove each pseudonym directory
//!
//! # Example
//!
//! ```rust,no_run
//! use linkage::adapters::dicom::DicomRecordStore;
//! use linkage::config::load_config;
//! use linkage::core::pipeline::{AnonymizationPipeline, PipelineOptions};
//! use linkage::core::retry::RetryableOps;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("linkage.toml")?;
//! let ops = RetryableOps::local(config.retry.policy());
//! let pipeline = AnonymizationPipeline::new(DicomRecordStore, ops, PipelineOptions::from_config(&config));
//!
//! let summary = pipeline.execute()?;
//! println!("Files written: {}", summary.files_written);
//! # Ok(())
//! # }
//! ```

pub mod ledger;
pub mod pipeline;
pub mod retry;
