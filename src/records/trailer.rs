//! Batch trailer (type 5) and file trailer (type 9)

use crate::codec::{FieldKind::*, FieldSpec, RecordLayout, Value};
use crate::types::{CnabError, RecordKind};
use rust_decimal::Decimal;

pub static BATCH_TRAILER: RecordLayout = RecordLayout {
    kind: RecordKind::BatchTrailer,
    fields: &[
        FieldSpec::new("bank_code", 1, 3, Numeric),
        FieldSpec::new("batch", 4, 4, Constant("0001")),
        FieldSpec::new("record_type", 8, 1, Constant("5")),
        FieldSpec::new("febraban_1", 9, 9, Blank),
        FieldSpec::new("line_count", 18, 6, Numeric),
        FieldSpec::new("amount_sum", 24, 18, Amount),
        FieldSpec::new("currency_quantity_sum", 42, 18, Zeros),
        FieldSpec::new("debit_notice", 60, 6, Zeros),
        FieldSpec::new("febraban_2", 66, 165, Blank),
        FieldSpec::new("occurrences", 231, 10, Blank),
    ],
};

pub static FILE_TRAILER: RecordLayout = RecordLayout {
    kind: RecordKind::FileTrailer,
    fields: &[
        FieldSpec::new("bank_code", 1, 3, Numeric),
        FieldSpec::new("batch", 4, 4, Constant("9999")),
        FieldSpec::new("record_type", 8, 1, Constant("9")),
        FieldSpec::new("febraban_1", 9, 9, Blank),
        FieldSpec::new("batch_count", 18, 6, Numeric),
        FieldSpec::new("line_count", 24, 6, Numeric),
        FieldSpec::new("account_count", 30, 6, Zeros),
        FieldSpec::new("febraban_2", 36, 205, Blank),
    ],
};

/// Lines in a batch: header, two per payment, trailer
pub fn batch_line_count(payments: usize) -> usize {
    payments * 2 + 2
}

pub fn batch_trailer(bank_code: &str, payments: usize, total: Decimal) -> Result<String, CnabError> {
    BATCH_TRAILER.pack(&[
        ("bank_code", Value::Digits(bank_code)),
        ("line_count", Value::Number(batch_line_count(payments) as u64)),
        ("amount_sum", Value::Amount(total)),
    ])
}

pub fn file_trailer(bank_code: &str, batches: u32, total_lines: usize) -> Result<String, CnabError> {
    FILE_TRAILER.pack(&[
        ("bank_code", Value::Digits(bank_code)),
        ("batch_count", Value::Number(u64::from(batches))),
        ("line_count", Value::Number(total_lines as u64)),
    ])
}

/// Control totals declared by a batch trailer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchTotals {
    pub line_count: u64,
    pub amount_sum: Decimal,
}

/// Control totals declared by a file trailer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileTotals {
    pub batch_count: u64,
    pub line_count: u64,
}

pub fn read_batch_trailer(line: &[u8]) -> Result<BatchTotals, CnabError> {
    Ok(BatchTotals {
        line_count: BATCH_TRAILER.number(line, "line_count")?,
        amount_sum: BATCH_TRAILER.amount(line, "amount_sum")?,
    })
}

pub fn read_file_trailer(line: &[u8]) -> Result<FileTotals, CnabError> {
    Ok(FileTotals {
        batch_count: FILE_TRAILER.number(line, "batch_count")?,
        line_count: FILE_TRAILER.number(line, "line_count")?,
    })
}
