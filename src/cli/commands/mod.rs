//! CLI command implementations

pub mod anonymize;
pub mod init;
pub mod status;
pub mod validate_config;
