//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "linkage.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        match fs::write(&self.output, Self::generate_config()) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit [paths] in {}", self.output);
                println!("  2. Validate configuration: linkage validate-config");
                println!("  3. Try a dry run: linkage anonymize --dry-run");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(5)
            }
        }
    }

    /// Starter configuration with every section and its defaults
    fn generate_config() -> String {
        r#"# linkage configuration
# DICOM record linkage and anonymisation

[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"
# Resolve and scrub without writing output or the ledger
dry_run = false

[paths]
# One directory per patient, one sub-directory per sequence
source = "/data/mri_export"
# Receives <pseudonym>/<sequence>_<file> (or <pseudonym>.tar.gz)
target = "/data/anonymised"
# Persisted patient-to-pseudonym mapping
ledger = "/data/state/record_linkage.json"

[anonymization]
file_extension = ".dcm"
compress = false
# Used when a record's patient name is missing or unusable
name_sentinel = "Z^Z"

[anonymization.audit]
enabled = false
log_path = "./audit/linkage.log"
json_format = true
# Key for hashing patient identifiers; required when enabled
# hash_key = "${LINKAGE_AUDIT_KEY}"

[retry]
# Attempts per operation; retries are immediate
read_attempts = 50
write_attempts = 50
list_attempts = 20
list_inner_attempts = 10
probe_attempts = 40
serialize_attempts = 20

[logging]
local_enabled = false
local_path = "./logs"
# daily | hourly | never
local_rotation = "daily"
"#
        .to_string()
    }
}
