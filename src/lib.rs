//! CNAB 240 Payroll Library
//! # Overview
//!
//! This library generates FEBRABAN CNAB 240 salary remittance files and
//! reconciles the bank's return files against them.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (payments, remittance files, line records, errors)
//! - [`codec`] - Fixed-width field encoding and the declarative record layout
//! - [`records`] - Layout tables and builders/readers for each CNAB 240 record
//! - [`core`] - Business logic components:
//!   - [`core::assembler`] - Remittance generation with sequence allocation
//!   - [`core::reconciler`] - Return file parsing and the status state machine
//!   - [`core::importer`] - Rebuilding a remittance from its bytes
//!   - [`core::memory_store`] - Thread-safe in-memory repository
//! - [`config`] - Environment configuration
//! - [`io`] - Payroll CSV input and reconciliation report output
//! - [`cli`] - CLI argument parsing and subcommands
//!
//! # File Lifecycle
//!
//! - **Generated**: the remittance was assembled and stored
//! - **Sent**: the remittance was delivered to the bank
//! - **Processed**: every answered payment was accepted
//! - **Rejected**: every answered payment was refused
//! - **Partial**: the bank accepted some payments and refused others

// Module declarations
pub mod cli;
pub mod codec;
pub mod config;
pub mod core;
pub mod io;
pub mod records;
pub mod types;

#[cfg(test)]
mod test_support;

pub use core::{
    import_remittance, FileAssembler, InMemoryRepository, ReconciliationOutcome,
    RemittanceRepository, ReturnReconciler,
};
pub use io::write_reconciliation_csv;
pub use types::{
    BankConfig, CnabError, DetailRecord, FileKind, FileStatus, LineRecord, LineStatus,
    PayrollPayment, RemittanceFile, TenantId,
};
