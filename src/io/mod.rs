//! I/O module
//!
//! Handles the payroll CSV input and the reconciliation report output.
//!
//! # Components
//!
//! - `csv_format` - CSV row conversion and report serialization
//! - `payment_reader` - Streaming payroll reader with iterator interface

pub mod csv_format;
pub mod payment_reader;

pub use csv_format::{
    convert_csv_payment, status_counts, write_reconciliation_csv, CsvPayment, ReportRow,
};
pub use payment_reader::PaymentReader;
