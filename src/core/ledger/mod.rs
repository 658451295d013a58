//! Record linkage ledger
//!
//! This module provides:
//! - Per-patient linkage state ([`LedgerEntry`], [`Encounter`])
//! - The persisted mapping ([`MappingLedger`])

pub mod entry;
pub mod store;
mod wire;

pub use entry::{Encounter, LedgerEntry};
pub use store::MappingLedger;
