//! Audit logging module
//!
//! Provides a JSON-lines audit trail of issued pseudonyms.

pub mod logger;

pub use logger::AuditLogger;
