//! Configuration management for linkage.
//!
//! This module provides TOML-based configuration loading, parsing, and
//! validation.
//!
//! # Overview
//!
//! linkage uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `LINKAGE_<SECTION>_<KEY>` environment overrides
//! - Default values for optional settings
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use linkage::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("linkage.toml")?;
//!
//! println!("Source: {}", config.paths.source.display());
//! println!("Ledger: {}", config.paths.ledger.display());
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level and dry-run switch
//! - [`PathsConfig`] - Source, target and ledger locations
//! - [`AnonymizationConfig`] - File filter, archiving, name sentinel, audit
//! - [`RetryConfig`] - Attempt budgets per operation class
//! - [`LoggingConfig`] - Local file logging
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [paths]
//! source = "${LINKAGE_SHARE}/mri_export"
//! target = "/data/anonymised"
//! ledger = "/data/state/record_linkage.json"
//!
//! [anonymization]
//! compress = true
//!
//! [retry]
//! read_attempts = 50
//! list_attempts = 20
//! ```

pub mod loader;
pub mod schema;

// Re-export commonly used types
pub use crate::anonymization::config::{AnonymizationConfig, AuditConfig};
pub use loader::load_config;
pub use schema::{ApplicationConfig, LinkageConfig, LoggingConfig, PathsConfig, RetryConfig};
