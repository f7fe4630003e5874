//! Error types for the CNAB payroll engine
//!
//! This module defines all error types that can occur while encoding a
//! remittance file or reconciling a bank return.
//!
//! # Error Categories
//!
//! - **Encoding Errors**: a value does not fit its fixed-width field
//! - **Structural Errors**: an assembled or received line breaks the 240-column layout
//! - **Reconciliation Errors**: a return file cannot be matched to its remittance
//! - **Ambient Errors**: storage, configuration, I/O and CSV input

use crate::types::remittance::{FileId, FileStatus, RecordKind};
use thiserror::Error;

/// Failure of a single codec primitive
///
/// Codec functions know nothing about record semantics, so they report the
/// offending value only. The layout packer attaches the field name when it
/// converts this into a [`CnabError`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("'{value}' does not fit in {width} digits")]
    Overflow { value: String, width: usize },

    #[error("'{value}' is not a digit string")]
    InvalidDigits { value: String },

    #[error("amount {value} is negative")]
    NegativeAmount { value: String },

    #[error("amount {value} has more than two decimal places")]
    SubCentAmount { value: String },

    #[error("'{value}' is not a valid date")]
    InvalidDate { value: String },

    #[error("'{value}' is not a valid time")]
    InvalidTime { value: String },
}

impl FieldError {
    /// The raw value that was rejected
    pub fn value(&self) -> &str {
        match self {
            FieldError::Overflow { value, .. }
            | FieldError::InvalidDigits { value }
            | FieldError::NegativeAmount { value }
            | FieldError::SubCentAmount { value }
            | FieldError::InvalidDate { value }
            | FieldError::InvalidTime { value } => value,
        }
    }
}

/// One payment that could not be encoded
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentFailure {
    /// 1-based position of the payment in the input batch
    pub position: usize,

    /// Employee identifier, when the caller supplied one
    pub employee: String,

    /// What went wrong while encoding its segments
    pub cause: Box<CnabError>,
}

impl std::fmt::Display for PaymentFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{} ({}): {}", self.position, self.employee, self.cause)
    }
}

fn join_failures(failures: &[PaymentFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Main error type for the CNAB engine
///
/// Generation errors abort the whole batch before anything is persisted.
/// Reconciliation errors at file-header level abort the whole return; errors
/// on individual detail lines are collected into the outcome instead of
/// being returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CnabError {
    /// A value needs more digits than its field provides
    ///
    /// Never truncated: transmitting a partial amount or taxpayer id would
    /// corrupt the payment instruction.
    #[error("Field '{field}' cannot hold '{value}' in {width} digits")]
    EncodingOverflow {
        field: &'static str,
        value: String,
        width: usize,
    },

    /// A value is not acceptable for its field (non-digits, sub-cent amount, ...)
    #[error("Invalid value '{value}' for field '{field}': {reason}")]
    InvalidField {
        field: &'static str,
        value: String,
        reason: String,
    },

    /// One or more payments of a batch cannot be encoded
    #[error("{} payment(s) cannot be encoded: {}", failures.len(), join_failures(failures))]
    InvalidPayments { failures: Vec<PaymentFailure> },

    /// An assembled line is not exactly 240 characters
    ///
    /// This signals a defect in a layout table, not bad input.
    #[error("{record} line has {length} characters, expected 240")]
    StructuralMismatch { record: RecordKind, length: usize },

    /// A received file does not follow the CNAB 240 structure
    #[error("Malformed CNAB file at line {line}: {reason}")]
    MalformedFile { line: usize, reason: String },

    /// No remittance exists for the bank and sequence named in a return header
    #[error("No remittance file for bank {bank_code} with sequence {sequence_number}")]
    UnmatchedReturn {
        bank_code: String,
        sequence_number: u32,
    },

    /// A return detail line has no pending payment with its taxpayer id
    ///
    /// Reported in the reconciliation outcome, never fatal.
    #[error("Return line {line}: no pending payment for taxpayer id '{taxpayer_id}'")]
    UnmatchedDetailLine { line: usize, taxpayer_id: String },

    /// The remittance already reached a terminal status
    #[error("Remittance file {file_id} is already {status}")]
    AlreadyReconciled { file_id: FileId, status: FileStatus },

    /// A lifecycle transition that the state machine does not allow
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition { from: FileStatus, to: FileStatus },

    /// The persistence collaborator failed
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// A configuration value is missing or invalid
    #[error("Configuration error for {key}: {message}")]
    Config { key: String, message: String },

    /// I/O error while reading or writing files
    #[error("I/O error: {message}")]
    Io { message: String },

    /// Payroll CSV input could not be parsed
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    Parse { line: Option<u64>, message: String },
}

impl From<std::io::Error> for CnabError {
    fn from(error: std::io::Error) -> Self {
        CnabError::Io {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for CnabError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        CnabError::Parse {
            line,
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl CnabError {
    /// Attach a field name to a codec failure
    pub fn field(field: &'static str, error: FieldError) -> Self {
        match error {
            FieldError::Overflow { value, width } => CnabError::EncodingOverflow {
                field,
                value,
                width,
            },
            other => CnabError::InvalidField {
                field,
                value: other.value().to_string(),
                reason: other.to_string(),
            },
        }
    }

    /// Create an InvalidField error
    pub fn invalid_field(field: &'static str, value: &str, reason: &str) -> Self {
        CnabError::InvalidField {
            field,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a MalformedFile error
    pub fn malformed(line: usize, reason: impl Into<String>) -> Self {
        CnabError::MalformedFile {
            line,
            reason: reason.into(),
        }
    }

    /// Create an UnmatchedReturn error
    pub fn unmatched_return(bank_code: &str, sequence_number: u32) -> Self {
        CnabError::UnmatchedReturn {
            bank_code: bank_code.to_string(),
            sequence_number,
        }
    }

    /// Create an UnmatchedDetailLine error
    pub fn unmatched_detail_line(line: usize, taxpayer_id: &str) -> Self {
        CnabError::UnmatchedDetailLine {
            line,
            taxpayer_id: taxpayer_id.to_string(),
        }
    }

    /// Create a Storage error
    pub fn storage(message: impl Into<String>) -> Self {
        CnabError::Storage {
            message: message.into(),
        }
    }

    /// Create a Config error
    pub fn config(key: &str, message: impl Into<String>) -> Self {
        CnabError::Config {
            key: key.to_string(),
            message: message.into(),
        }
    }
}
