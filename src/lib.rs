// Linkage - DICOM record linkage and anonymisation
// Copyright (c) 2025 Atlas Contributors
// Licensed under the MIT License

//! # linkage - DICOM record linkage and anonymisation
//!
//! linkage walks an imaging export laid out as `<patient>/<sequence>/<file>`,
//! replaces every patient's identity with a stable pseudonym, scrubs
//! identifying fields, and writes the result per pseudonym. A persisted
//! mapping ledger keeps pseudonyms stable across runs so the same patient is
//! always linked to the same identity.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Retry-hardened I/O, mapping ledger, run pipeline
//! - [`anonymization`] - Identity resolution, pseudonyms, scrubbing, audit
//! - [`adapters`] - DICOM file binding
//! - [`domain`] - Core domain types, record seams and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use linkage::adapters::dicom::DicomRecordStore;
//! use linkage::config::load_config;
//! use linkage::core::pipeline::{AnonymizationPipeline, PipelineOptions};
//! use linkage::core::retry::RetryableOps;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("linkage.toml")?;
//!
//!     let pipeline = AnonymizationPipeline::new(
//!         DicomRecordStore,
//!         RetryableOps::local(config.retry.policy()),
//!         PipelineOptions::from_config(&config),
//!     );
//!
//!     let summary = pipeline.execute()?;
//!     println!("Wrote {} files", summary.files_written);
//!     Ok(())
//! }
//! ```
//!
//! ## Pseudonyms
//!
//! A pseudonym is `<family initial><given initial><index>_<study date>`,
//! for example `JS0_20200101`. The index is assigned once per patient and
//! never changes; each new study date yields a new pseudonym with the same
//! index.
//!
//! ## Error Handling
//!
//! All library errors are [`domain::LinkageError`]. Each variant maps to a
//! process exit code through [`domain::LinkageError::exit_code`].

pub mod adapters;
pub mod anonymization;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
