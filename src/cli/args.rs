use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Generate CNAB 240 payroll remittances and reconcile bank returns
#[derive(Parser, Debug)]
#[command(name = "cnab-payroll")]
#[command(about = "Generate CNAB 240 payroll remittances and reconcile bank returns", long_about = None)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build a remittance file from a payroll CSV
    Generate(GenerateArgs),
    /// Apply a bank return file to its remittance and print the outcome
    Reconcile(ReconcileArgs),
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[arg(value_name = "PAYMENTS_CSV", help = "Path to the payroll CSV file")]
    pub payments_csv: PathBuf,

    #[arg(
        long = "payment-date",
        value_name = "YYYY-MM-DD",
        help = "Date the salaries are credited"
    )]
    pub payment_date: NaiveDate,

    #[arg(
        long = "last-sequence",
        value_name = "N",
        help = "Sequence number of the previous remittance to this bank (default: 0)"
    )]
    pub last_sequence: Option<u32>,

    #[arg(
        long = "output-dir",
        value_name = "DIR",
        default_value = ".",
        help = "Directory the .REM file is written to"
    )]
    pub output_dir: PathBuf,
}

#[derive(Args, Debug)]
pub struct ReconcileArgs {
    #[arg(
        long = "remittance",
        value_name = "REM",
        help = "The remittance file the return answers"
    )]
    pub remittance: PathBuf,

    #[arg(value_name = "RETURN", help = "Path to the bank return file")]
    pub return_file: PathBuf,
}
