//! Validate config command implementation

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates as part of loading
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Dry Run: {}", config.application.dry_run);
        println!("  Source: {}", config.paths.source.display());
        println!("  Target: {}", config.paths.target.display());
        println!("  Ledger: {}", config.paths.ledger.display());
        println!("  File Extension: {}", config.anonymization.file_extension);
        println!("  Compress: {}", config.anonymization.compress);
        println!("  Audit: {}", config.anonymization.audit.enabled);
        println!(
            "  Retry (read/write/list/probe): {}/{}/{}x{}/{}",
            config.retry.read_attempts,
            config.retry.write_attempts,
            config.retry.list_attempts,
            config.retry.list_inner_attempts,
            config.retry.probe_attempts
        );
        println!();
        Ok(0)
    }
}
