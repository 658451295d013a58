//! Status command implementation
//!
//! Prints the ledger without source identifiers: index, pseudonyms and
//! encounter counts per patient.

use crate::config::load_config;
use crate::core::ledger::MappingLedger;
use crate::core::retry::RetryableOps;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the status command
#[derive(Args, Debug, Default)]
pub struct StatusArgs {
    /// Read this ledger instead of the configured one
    #[arg(long)]
    pub ledger: Option<PathBuf>,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking ledger status");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {}", e);
                return Ok(2);
            }
        };

        let ledger_path = self.ledger.clone().unwrap_or(config.paths.ledger);
        let ops = RetryableOps::local(config.retry.policy());

        println!("📊 Ledger Status: {}", ledger_path.display());
        println!();

        let ledger = match MappingLedger::load(&ledger_path, &ops) {
            Ok(l) => l,
            Err(e) => {
                println!("❌ Failed to load ledger");
                println!("   Error: {}", e);
                return Ok(e.exit_code());
            }
        };

        if ledger.is_empty() {
            println!("No patients recorded.");
            println!("Run 'linkage anonymize' to start.");
            return Ok(0);
        }

        print!("{}", render_table(&ledger));
        println!();
        println!(
            "{} patient(s), {} encounter(s), next index {}",
            ledger.len(),
            ledger.encounter_count(),
            ledger.next_index()
        );
        Ok(0)
    }
}

/// One row per patient, ordered by index
fn render_table(ledger: &MappingLedger) -> String {
    let mut rows: Vec<_> = ledger
        .entries()
        .map(|(_, entry)| {
            let pseudonyms: Vec<&str> = entry.pseudonyms().into_iter().map(|p| p.as_str()).collect();
            (entry.index(), entry.encounters().len(), pseudonyms.join(", "))
        })
        .collect();
    rows.sort_by_key(|(index, _, _)| index.unwrap_or(u64::MAX));

    let mut out = format!("{:<8} {:<12} {}\n", "Index", "Encounters", "Pseudonyms");
    out.push_str(&"-".repeat(60));
    out.push('\n');
    for (index, count, pseudonyms) in rows {
        let index = index.map(|i| i.to_string()).unwrap_or_else(|| "-".to_string());
        out.push_str(&format!("{:<8} {:<12} {}\n", index, count, pseudonyms));
    }
    out
}
