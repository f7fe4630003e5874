//! CNAB 240 payroll CLI
//!
//! # Usage
//!
//! ```bash
//! cargo run -- generate payroll.csv --payment-date 2026-10-30 --output-dir out/
//! cargo run -- generate payroll.csv --payment-date 2026-10-30 --last-sequence 41
//! cargo run -- reconcile --remittance out/CB141001000001.REM bank.RET > report.csv
//! ```
//!
//! The paying company's coordinates are read from `CNAB_*` environment
//! variables (or a `.env` file). Logs go to stderr, filtered by `RUST_LOG`.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (bad configuration, unreadable input, invalid payments, etc.)

use cnab_payroll::cli;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .compact()
        .with_writer(std::io::stderr)
        .init();

    let args = cli::parse_args();

    if let Err(e) = cli::run(args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
