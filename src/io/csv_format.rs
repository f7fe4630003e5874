//! CSV format handling for payroll input and reconciliation reports
//!
//! This module centralizes all CSV format concerns, providing:
//! - CsvPayment structure for deserialization
//! - Conversion from CSV rows to `PayrollPayment`
//! - Reconciliation report serialization
//!
//! All functions are pure (no file I/O) for easy testing.

use crate::types::{CnabError, LineStatus, PayrollPayment, RemittanceFile};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::str::FromStr;
use uuid::Uuid;

/// One row of the payroll input CSV
///
/// Address columns may be omitted entirely or left empty.
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct CsvPayment {
    #[serde(default)]
    pub employee_id: Option<String>,
    pub employee_name: String,
    pub taxpayer_id: String,
    pub bank_code: String,
    pub branch_code: String,
    #[serde(default)]
    pub branch_digit: String,
    pub account_number: String,
    #[serde(default)]
    pub account_digit: String,
    pub amount: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub address_number: String,
    #[serde(default)]
    pub neighborhood: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub cep: String,
    #[serde(default)]
    pub cep_suffix: String,
}

/// Convert a CsvPayment to a PayrollPayment
///
/// Only parsing happens here. Whether the values fit their CNAB fields is
/// decided when the file is assembled, which reports every bad payment at
/// once.
///
/// # Returns
///
/// * `Ok(PayrollPayment)` - Successfully converted row
/// * `Err(String)` - Error message describing the conversion failure
pub fn convert_csv_payment(row: CsvPayment) -> Result<PayrollPayment, String> {
    let employee_id = match row.employee_id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => Some(
            Uuid::parse_str(id)
                .map_err(|_| format!("Invalid employee_id '{}' for '{}'", id, row.employee_name))?,
        ),
        _ => None,
    };

    if row.employee_name.trim().is_empty() {
        return Err("employee_name is required".to_string());
    }

    let amount_str = row.amount.trim();
    if amount_str.is_empty() {
        return Err(format!("Payment for '{}' requires an amount", row.employee_name));
    }
    let amount = Decimal::from_str(amount_str)
        .map_err(|_| format!("Invalid amount '{}' for '{}'", row.amount, row.employee_name))?;

    Ok(PayrollPayment {
        employee_id,
        employee_name: row.employee_name,
        taxpayer_id: row.taxpayer_id,
        bank_code: row.bank_code,
        branch_code: row.branch_code,
        branch_digit: row.branch_digit,
        account_number: row.account_number,
        account_digit: row.account_digit,
        amount,
        address: row.address,
        address_number: row.address_number,
        neighborhood: row.neighborhood,
        city: row.city,
        state: row.state,
        cep: row.cep,
        cep_suffix: row.cep_suffix,
    })
}

/// One payment of a reconciled remittance
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ReportRow {
    pub sequence: u32,
    pub employee_name: String,
    pub taxpayer_id: String,
    pub amount: String,
    pub return_code: String,
    pub return_message: String,
    pub status: String,
}

/// Write the per-payment outcome of a remittance as CSV
///
/// Columns: sequence, employee_name, taxpayer_id, amount, return_code,
/// return_message, status. Rows follow the file order.
pub fn write_reconciliation_csv(
    file: &RemittanceFile,
    output: &mut dyn Write,
) -> Result<(), CnabError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(output);

    let rows = file.detail_lines().filter_map(|line| line.detail.as_ref());
    let mut written = 0;
    for detail in rows {
        writer.serialize(ReportRow {
            sequence: detail.item_sequence,
            employee_name: detail.employee_name.clone(),
            taxpayer_id: detail.taxpayer_id.clone(),
            amount: format!("{:.2}", detail.amount),
            return_code: detail.return_code.clone().unwrap_or_default(),
            return_message: detail.return_message.clone().unwrap_or_default(),
            status: detail.status.to_string(),
        })?;
        written += 1;
    }

    // serialize() emits the header with the first row only
    if written == 0 {
        writer.write_record([
            "sequence",
            "employee_name",
            "taxpayer_id",
            "amount",
            "return_code",
            "return_message",
            "status",
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Count of payments per line status, in report order
pub fn status_counts(file: &RemittanceFile) -> [(LineStatus, usize); 3] {
    let mut counts = [
        (LineStatus::Processed, 0),
        (LineStatus::Rejected, 0),
        (LineStatus::Pending, 0),
    ];
    for detail in file.detail_lines().filter_map(|line| line.detail.as_ref()) {
        if let Some(entry) = counts.iter_mut().find(|(status, _)| *status == detail.status) {
            entry.1 += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{at, remittance_file};
    use rstest::rstest;

    fn row(amount: &str) -> CsvPayment {
        CsvPayment {
            employee_name: "ANA SOUZA".to_string(),
            taxpayer_id: "111.222.333-44".to_string(),
            bank_code: "237".to_string(),
            branch_code: "1234".to_string(),
            account_number: "98765".to_string(),
            amount: amount.to_string(),
            ..CsvPayment::default()
        }
    }

    #[rstest]
    #[case("1000.00", Decimal::new(100000, 2))]
    #[case("  250.5 ", Decimal::new(2505, 1))]
    fn test_convert_csv_payment_amount(#[case] amount: &str, #[case] expected: Decimal) {
        let payment = convert_csv_payment(row(amount)).unwrap();
        assert_eq!(payment.amount, expected);
        assert_eq!(payment.employee_id, None);
        assert_eq!(payment.taxpayer_id, "111.222.333-44");
    }

    #[test]
    fn test_convert_csv_payment_parses_employee_id() {
        let id = Uuid::new_v4();
        let mut input = row("10.00");
        input.employee_id = Some(id.to_string());

        assert_eq!(convert_csv_payment(input).unwrap().employee_id, Some(id));
    }

    #[rstest]
    #[case::missing_amount(row(""), "requires an amount")]
    #[case::invalid_amount(row("ten"), "Invalid amount")]
    #[case::invalid_employee_id(CsvPayment { employee_id: Some("x".to_string()), ..row("1") }, "Invalid employee_id")]
    #[case::missing_name(CsvPayment { employee_name: " ".to_string(), ..row("1") }, "employee_name is required")]
    fn test_convert_csv_payment_errors(#[case] input: CsvPayment, #[case] expected: &str) {
        let error = convert_csv_payment(input).unwrap_err();
        assert!(error.contains(expected), "{}", error);
    }

    #[test]
    fn test_write_reconciliation_csv() {
        let mut file = remittance_file(uuid::Uuid::nil(), 1);
        let detail = file.pending_detail_mut("11122233344").unwrap();
        detail.apply_return("AG", "Agência/Conta Corrente/DV Inválido".to_string(), at(2026, 10, 31, 9));

        let mut output = Vec::new();
        write_reconciliation_csv(&file, &mut output).unwrap();

        let text = String::from_utf8(output).unwrap();
        assert_eq!(
            text,
            "sequence,employee_name,taxpayer_id,amount,return_code,return_message,status\n\
             1,ANA SOUZA,111.222.333-44,1000.00,AG,Agência/Conta Corrente/DV Inválido,REJECTED\n"
        );
        assert_eq!(
            status_counts(&file),
            [
                (LineStatus::Processed, 0),
                (LineStatus::Rejected, 1),
                (LineStatus::Pending, 0)
            ]
        );
    }

    #[test]
    fn test_empty_report_still_has_header() {
        let mut file = remittance_file(uuid::Uuid::nil(), 1);
        file.lines.retain(|line| line.detail.is_none());

        let mut output = Vec::new();
        write_reconciliation_csv(&file, &mut output).unwrap();
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "sequence,employee_name,taxpayer_id,amount,return_code,return_message,status\n"
        );
    }
}
