//! Core business logic module
//!
//! This module contains the remittance processing components:
//! - `traits` - Repository and clock abstractions
//! - `assembler` - Remittance file generation
//! - `reconciler` - Return file parsing and the reconciliation state machine
//! - `importer` - Rebuilding a remittance from its bytes
//! - `memory_store` - Thread-safe in-memory repository
//! - `clock` - System and fixed clocks
//! - `return_codes` - FEBRABAN occurrence code messages

pub mod assembler;
pub mod clock;
pub mod importer;
pub mod memory_store;
pub mod reconciler;
pub mod return_codes;
pub mod traits;

pub use assembler::{FileAssembler, MAX_PAYMENTS};
pub use clock::{FixedClock, SystemClock};
pub use importer::import_remittance;
pub use memory_store::InMemoryRepository;
pub use reconciler::{ReconciliationOutcome, ReturnReconciler};
pub use return_codes::{return_message, SUCCESS_CODE};
pub use traits::{Clock, RemittanceRepository};
