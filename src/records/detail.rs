//! Detail records (type 3): segment A and segment B
//!
//! Every payment becomes one A/B pair sharing the same item sequence. Segment
//! A carries the credit instruction and, in a return file, the bank's
//! occurrence codes; segment B carries the payee's taxpayer id and address.

use crate::codec::{pad_digits, FieldKind::*, FieldSpec, RecordLayout, Value};
use crate::types::{CnabError, PayrollPayment, RecordKind};
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Taxpayer ids up to this many digits are a CPF
const CPF_DIGITS: usize = 11;

pub static SEGMENT_A: RecordLayout = RecordLayout {
    kind: RecordKind::Detail,
    fields: &[
        FieldSpec::new("bank_code", 1, 3, Numeric),
        FieldSpec::new("batch", 4, 4, Constant("0001")),
        FieldSpec::new("record_type", 8, 1, Constant("3")),
        FieldSpec::new("item_sequence", 9, 5, Numeric),
        FieldSpec::new("segment", 14, 1, Constant("A")),
        FieldSpec::new("movement", 15, 1, Constant("0")),
        FieldSpec::new("instruction", 16, 2, Constant("00")),
        FieldSpec::new("clearing", 18, 3, Constant("000")),
        FieldSpec::new("payee_bank", 21, 3, Numeric),
        FieldSpec::new("branch_code", 24, 5, Numeric),
        FieldSpec::new("branch_digit", 29, 1, Alpha),
        FieldSpec::new("account_number", 30, 12, Numeric),
        FieldSpec::new("account_digit", 42, 1, Alpha),
        FieldSpec::new("branch_account_digit", 43, 1, Blank),
        FieldSpec::new("payee_name", 44, 30, Alpha),
        FieldSpec::new("company_document", 74, 20, Blank),
        FieldSpec::new("payment_date", 94, 8, Date),
        FieldSpec::new("currency", 102, 3, Constant("BRL")),
        FieldSpec::new("currency_quantity", 105, 15, Zeros),
        FieldSpec::new("amount", 120, 15, Amount),
        FieldSpec::new("bank_document", 135, 20, Blank),
        FieldSpec::new("effective_date", 155, 8, Zeros),
        FieldSpec::new("effective_amount", 163, 15, Zeros),
        FieldSpec::new("information", 178, 40, Constant("SALARIO")),
        FieldSpec::new("doc_purpose", 218, 2, Constant("09")),
        FieldSpec::new("febraban", 220, 10, Blank),
        FieldSpec::new("notice", 230, 1, Constant("0")),
        FieldSpec::new("occurrences", 231, 10, Blank),
    ],
};

pub static SEGMENT_B: RecordLayout = RecordLayout {
    kind: RecordKind::Detail,
    fields: &[
        FieldSpec::new("bank_code", 1, 3, Numeric),
        FieldSpec::new("batch", 4, 4, Constant("0001")),
        FieldSpec::new("record_type", 8, 1, Constant("3")),
        FieldSpec::new("item_sequence", 9, 5, Numeric),
        FieldSpec::new("segment", 14, 1, Constant("B")),
        FieldSpec::new("febraban_1", 15, 3, Blank),
        FieldSpec::new("inscription_type", 18, 1, Numeric),
        FieldSpec::new("taxpayer_id", 19, 14, Numeric),
        FieldSpec::new("street", 33, 30, Alpha),
        FieldSpec::new("number", 63, 5, Numeric),
        FieldSpec::new("complement", 68, 15, Blank),
        FieldSpec::new("neighborhood", 83, 15, Alpha),
        FieldSpec::new("city", 98, 20, Alpha),
        FieldSpec::new("cep", 118, 5, Numeric),
        FieldSpec::new("cep_suffix", 123, 3, Numeric),
        FieldSpec::new("state", 126, 2, Alpha),
        FieldSpec::new("due_date", 128, 8, Zeros),
        FieldSpec::new("document_amount", 136, 15, Zeros),
        FieldSpec::new("rebate", 151, 15, Zeros),
        FieldSpec::new("discount", 166, 15, Zeros),
        FieldSpec::new("interest", 181, 15, Zeros),
        FieldSpec::new("fine", 196, 15, Zeros),
        FieldSpec::new("payee_code", 211, 15, Blank),
        FieldSpec::new("notice", 226, 1, Constant("0")),
        FieldSpec::new("ug_code", 227, 6, Zeros),
        FieldSpec::new("febraban_2", 233, 8, Blank),
    ],
};

/// Payment fields read back from a segment A line
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentAFields {
    pub item_sequence: u32,
    pub payee_bank: String,
    pub branch_code: String,
    pub branch_digit: String,
    pub account_number: String,
    pub account_digit: String,
    pub payee_name: String,
    pub payment_date: Option<NaiveDate>,
    pub amount: Decimal,

    /// Filled by the bank in a return file; in a CNAB 240 payroll return it
    /// echoes the payee's taxpayer id
    pub bank_document: String,

    /// First occurrence code (columns 231-232), blank in a remittance
    pub return_code: String,
}

/// Payee fields read back from a segment B line
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentBFields {
    pub item_sequence: u32,
    pub taxpayer_id: String,
}

pub fn segment_a(
    bank_code: &str,
    payment: &PayrollPayment,
    item_sequence: u32,
    payment_date: NaiveDate,
) -> Result<String, CnabError> {
    SEGMENT_A.pack(&[
        ("bank_code", Value::Digits(bank_code)),
        ("item_sequence", Value::Number(u64::from(item_sequence))),
        ("payee_bank", Value::Digits(&payment.bank_code)),
        ("branch_code", Value::Digits(&payment.branch_code)),
        ("branch_digit", Value::Text(&payment.branch_digit)),
        ("account_number", Value::Digits(&payment.account_number)),
        ("account_digit", Value::Text(&payment.account_digit)),
        ("payee_name", Value::Text(&payment.employee_name)),
        ("payment_date", Value::Date(payment_date)),
        ("amount", Value::Amount(payment.amount)),
    ])
}

pub fn segment_b(
    bank_code: &str,
    payment: &PayrollPayment,
    item_sequence: u32,
) -> Result<String, CnabError> {
    let taxpayer_id = pad_digits(&payment.taxpayer_id, 14)
        .map_err(|e| CnabError::field("taxpayer_id", e))?;
    let inscription_type = inscription_type(&taxpayer_id);
    let number = super::ascii_digits(&payment.address_number);

    SEGMENT_B.pack(&[
        ("bank_code", Value::Digits(bank_code)),
        ("item_sequence", Value::Number(u64::from(item_sequence))),
        ("inscription_type", Value::Number(inscription_type)),
        ("taxpayer_id", Value::Digits(&taxpayer_id)),
        ("street", Value::Text(&payment.address)),
        ("number", Value::Digits(&number)),
        ("neighborhood", Value::Text(&payment.neighborhood)),
        ("city", Value::Text(&payment.city)),
        ("cep", Value::Digits(&payment.cep)),
        ("cep_suffix", Value::Digits(&payment.cep_suffix)),
        ("state", Value::Text(&payment.state)),
    ])
}

/// `1` for a CPF, `2` for a CNPJ
fn inscription_type(padded_id: &str) -> u64 {
    let significant = padded_id.trim_start_matches('0').len();
    if significant <= CPF_DIGITS {
        1
    } else {
        2
    }
}

fn item_sequence(layout: &RecordLayout, line: &[u8]) -> Result<u32, CnabError> {
    let value = layout.number(line, "item_sequence")?;
    u32::try_from(value).map_err(|_| {
        CnabError::invalid_field("item_sequence", &value.to_string(), "out of range")
    })
}

pub fn read_segment_a(line: &[u8]) -> Result<SegmentAFields, CnabError> {
    let occurrences = SEGMENT_A.text(line, "occurrences")?;
    let return_code: String = occurrences.chars().take(2).collect();
    let bank_document = SEGMENT_A.text(line, "bank_document")?;

    Ok(SegmentAFields {
        item_sequence: item_sequence(&SEGMENT_A, line)?,
        payee_bank: SEGMENT_A.text(line, "payee_bank")?,
        branch_code: SEGMENT_A.text(line, "branch_code")?,
        branch_digit: SEGMENT_A.text(line, "branch_digit")?,
        account_number: SEGMENT_A.text(line, "account_number")?,
        account_digit: SEGMENT_A.text(line, "account_digit")?,
        payee_name: SEGMENT_A.text(line, "payee_name")?,
        payment_date: SEGMENT_A.date(line, "payment_date")?,
        amount: SEGMENT_A.amount(line, "amount")?,
        bank_document: bank_document.chars().filter(char::is_ascii_digit).collect(),
        return_code: return_code.trim().to_string(),
    })
}

pub fn read_segment_b(line: &[u8]) -> Result<SegmentBFields, CnabError> {
    Ok(SegmentBFields {
        item_sequence: item_sequence(&SEGMENT_B, line)?,
        taxpayer_id: SEGMENT_B.text(line, "taxpayer_id")?,
    })
}
