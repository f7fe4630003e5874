//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `payment`: payroll input values (payments, bank coordinates)
//! - `remittance`: remittance/return files and their line records
//! - `error`: Error types for the CNAB engine

pub mod error;
pub mod payment;
pub mod remittance;

pub use error::{CnabError, FieldError, PaymentFailure};
pub use payment::{BankConfig, PayrollPayment};
pub use remittance::{
    normalize_taxpayer_id, CnabLayout, DetailRecord, FileId, FileKind, FileStatus, LineRecord,
    LineStatus, RecordKind, RemittanceFile, Segment, TenantId, LINE_WIDTH,
};
