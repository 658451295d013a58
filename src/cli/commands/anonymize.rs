//! Anonymize command implementation
//!
//! Runs the anonymisation pipeline over the configured source tree.

use crate::adapters::dicom::DicomRecordStore;
use crate::anonymization::audit::AuditLogger;
use crate::config::{load_config, LinkageConfig};
use crate::core::pipeline::{AnonymizationPipeline, PipelineOptions, RunSummary};
use crate::core::retry::RetryableOps;
use clap::Args;
use std::path::PathBuf;
use tokio::sync::watch;

/// Arguments for the anonymize command
#[derive(Args, Debug, Default)]
pub struct AnonymizeArgs {
    /// Override the source root
    #[arg(long)]
    pub source: Option<PathBuf>,

    /// Override the target root
    #[arg(long)]
    pub target: Option<PathBuf>,

    /// Override the ledger file
    #[arg(long)]
    pub ledger: Option<PathBuf>,

    /// Archive each pseudonym directory as .tar.gz
    #[arg(long)]
    pub compress: bool,

    /// Resolve and scrub without writing output or the ledger
    #[arg(long)]
    pub dry_run: bool,
}

impl AnonymizeArgs {
    /// Applies command-line overrides on top of the loaded configuration
    fn apply_overrides(&self, config: &mut LinkageConfig) {
        if let Some(source) = &self.source {
            tracing::info!(source = %source.display(), "Overriding source from CLI");
            config.paths.source = source.clone();
        }
        if let Some(target) = &self.target {
            tracing::info!(target = %target.display(), "Overriding target from CLI");
            config.paths.target = target.clone();
        }
        if let Some(ledger) = &self.ledger {
            tracing::info!(ledger = %ledger.display(), "Overriding ledger from CLI");
            config.paths.ledger = ledger.clone();
        }
        if self.compress {
            config.anonymization.compress = true;
        }
        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }
    }

    /// Execute the anonymize command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting anonymize command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load configuration: {e}");
                return Ok(e.exit_code());
            }
        };

        self.apply_overrides(&mut config);

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        let options = PipelineOptions::from_config(&config);

        if options.dry_run {
            println!("🔍 DRY RUN MODE - nothing will be written");
            println!();
        } else if let Err(e) = std::fs::create_dir_all(&options.target) {
            eprintln!("Cannot create target {}: {e}", options.target.display());
            return Ok(2);
        }

        let audit_config = &config.anonymization.audit;
        let audit = match AuditLogger::new(
            audit_config.log_path.clone(),
            audit_config.hash_key.as_str(),
            audit_config.json_format,
            audit_config.enabled,
        ) {
            Ok(a) => a,
            Err(e) => {
                eprintln!("Failed to open audit log: {e}");
                return Ok(2);
            }
        };

        let pipeline = AnonymizationPipeline::new(
            DicomRecordStore,
            RetryableOps::local(config.retry.policy()),
            options,
        )
        .with_audit(audit)
        .with_shutdown_signal(shutdown_signal);

        println!("🚀 Starting anonymisation...");
        println!();

        let summary = match tokio::task::spawn_blocking(move || pipeline.execute()).await? {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Run failed before processing patients");
                eprintln!("Run failed: {e}");
                return Ok(e.exit_code());
            }
        };

        print_summary(&summary);
        Ok(summary.exit_code())
    }
}

fn print_summary(summary: &RunSummary) {
    println!("📊 Run Summary:");
    println!(
        "  Patients: {}/{}",
        summary.patients_completed, summary.total_patients
    );
    println!("  Files processed: {}", summary.files_processed);
    println!("  Files written: {}", summary.files_written);
    println!("  New encounters: {}", summary.new_encounters);
    println!("  Reused encounters: {}", summary.reused_encounters);
    if summary.unremovable_private_fields > 0 {
        println!(
            "  ⚠️  Unremovable private fields: {}",
            summary.unremovable_private_fields
        );
    }
    println!("  Archives: {}", summary.archives_created);
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    println!();

    if let Some(failure) = &summary.failure {
        println!("❌ Stopped in {}: {}", failure.patient_folder, failure.message);
        println!("   Completed patients are saved; rerun to resume.");
    } else if summary.interrupted {
        println!("⚠️  Run interrupted gracefully. Progress saved.");
        println!("   Run the same command to resume.");
    } else {
        println!("✅ Anonymisation completed successfully!");
    }
}
