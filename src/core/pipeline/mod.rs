//! Anonymisation pipeline
//!
//! This module provides:
//! - Patient/sequence/file traversal ([`AnonymizationPipeline`])
//! - Run reporting ([`RunSummary`])
//! - The optional archive step ([`archive`])

pub mod archive;
pub mod coordinator;
pub mod summary;

pub use coordinator::{AnonymizationPipeline, PipelineOptions};
pub use summary::{RunError, RunErrorType, RunSummary};
