//! File header (type 0) and batch header (type 1)

use crate::codec::{FieldKind::*, FieldSpec, RecordLayout, Value};
use crate::types::{BankConfig, CnabError, RecordKind};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// FEBRABAN v089 file header
pub static FILE_HEADER: RecordLayout = RecordLayout {
    kind: RecordKind::FileHeader,
    fields: &[
        FieldSpec::new("bank_code", 1, 3, Numeric),
        FieldSpec::new("batch", 4, 4, Constant("0000")),
        FieldSpec::new("record_type", 8, 1, Constant("0")),
        FieldSpec::new("febraban_1", 9, 9, Blank),
        FieldSpec::new("inscription_type", 18, 1, Constant("2")),
        FieldSpec::new("cnpj", 19, 14, Numeric),
        FieldSpec::new("convenio", 33, 20, Alpha),
        FieldSpec::new("agencia", 53, 5, Numeric),
        FieldSpec::new("agencia_digito", 58, 1, Alpha),
        FieldSpec::new("conta", 59, 12, Numeric),
        FieldSpec::new("conta_digito", 71, 1, Alpha),
        FieldSpec::new("agencia_conta_digito", 72, 1, Blank),
        FieldSpec::new("company_name", 73, 30, Alpha),
        FieldSpec::new("bank_name", 103, 30, Alpha),
        FieldSpec::new("febraban_2", 133, 10, Blank),
        FieldSpec::new("file_code", 143, 1, Constant("1")),
        FieldSpec::new("generated_on", 144, 8, Date),
        FieldSpec::new("generated_at", 152, 6, Time),
        FieldSpec::new("sequence", 158, 6, Numeric),
        FieldSpec::new("layout_version", 164, 3, Constant("089")),
        FieldSpec::new("density", 167, 5, Zeros),
        FieldSpec::new("reserved_bank", 172, 20, Blank),
        FieldSpec::new("reserved_company", 192, 20, Blank),
        FieldSpec::new("febraban_3", 212, 29, Blank),
    ],
};

/// FEBRABAN v045 batch header for salary credits
pub static BATCH_HEADER: RecordLayout = RecordLayout {
    kind: RecordKind::BatchHeader,
    fields: &[
        FieldSpec::new("bank_code", 1, 3, Numeric),
        FieldSpec::new("batch", 4, 4, Constant("0001")),
        FieldSpec::new("record_type", 8, 1, Constant("1")),
        FieldSpec::new("operation", 9, 1, Constant("C")),
        FieldSpec::new("service", 10, 2, Constant("30")),
        FieldSpec::new("form", 12, 2, Constant("01")),
        FieldSpec::new("layout_version", 14, 3, Constant("045")),
        FieldSpec::new("febraban_1", 17, 1, Blank),
        FieldSpec::new("inscription_type", 18, 1, Constant("2")),
        FieldSpec::new("cnpj", 19, 14, Numeric),
        FieldSpec::new("convenio", 33, 20, Alpha),
        FieldSpec::new("agencia", 53, 5, Numeric),
        FieldSpec::new("agencia_digito", 58, 1, Alpha),
        FieldSpec::new("conta", 59, 12, Numeric),
        FieldSpec::new("conta_digito", 71, 1, Alpha),
        FieldSpec::new("agencia_conta_digito", 72, 1, Blank),
        FieldSpec::new("company_name", 73, 30, Alpha),
        FieldSpec::new("message", 103, 40, Constant("PAGAMENTO SALARIOS")),
        FieldSpec::new("address", 143, 30, Alpha),
        FieldSpec::new("address_number", 173, 5, Numeric),
        FieldSpec::new("complement", 178, 15, Blank),
        FieldSpec::new("city", 193, 20, Alpha),
        FieldSpec::new("cep", 213, 5, Numeric),
        FieldSpec::new("cep_suffix", 218, 3, Numeric),
        FieldSpec::new("state", 221, 2, Alpha),
        FieldSpec::new("febraban_2", 223, 8, Blank),
        FieldSpec::new("occurrences", 231, 10, Blank),
    ],
};

/// Identification read back from a file header
#[derive(Debug, Clone, PartialEq)]
pub struct FileHeaderFields {
    pub bank_code: String,
    pub bank_name: String,
    pub convenio: String,
    pub company_name: String,
    pub generated_on: Option<NaiveDate>,
    pub generated_time: Option<NaiveTime>,
    pub sequence: u32,
}

pub fn file_header(
    bank: &BankConfig,
    sequence: u32,
    generated_at: NaiveDateTime,
) -> Result<String, CnabError> {
    FILE_HEADER.pack(&[
        ("bank_code", Value::Digits(&bank.bank_code)),
        ("cnpj", Value::Digits(&bank.cnpj)),
        ("convenio", Value::Text(&bank.convenio)),
        ("agencia", Value::Digits(&bank.agencia)),
        ("agencia_digito", Value::Text(&bank.agencia_digito)),
        ("conta", Value::Digits(&bank.conta)),
        ("conta_digito", Value::Text(&bank.conta_digito)),
        ("company_name", Value::Text(&bank.company_name)),
        ("bank_name", Value::Text(&bank.bank_name)),
        ("generated_on", Value::Date(generated_at.date())),
        ("generated_at", Value::Time(generated_at.time())),
        ("sequence", Value::Number(u64::from(sequence))),
    ])
}

pub fn batch_header(bank: &BankConfig) -> Result<String, CnabError> {
    let address_number = super::ascii_digits(&bank.address_number);
    BATCH_HEADER.pack(&[
        ("bank_code", Value::Digits(&bank.bank_code)),
        ("cnpj", Value::Digits(&bank.cnpj)),
        ("convenio", Value::Text(&bank.convenio)),
        ("agencia", Value::Digits(&bank.agencia)),
        ("agencia_digito", Value::Text(&bank.agencia_digito)),
        ("conta", Value::Digits(&bank.conta)),
        ("conta_digito", Value::Text(&bank.conta_digito)),
        ("company_name", Value::Text(&bank.company_name)),
        ("address", Value::Text(&bank.address)),
        ("address_number", Value::Digits(&address_number)),
        ("city", Value::Text(&bank.city)),
        ("cep", Value::Digits(&bank.cep)),
        ("cep_suffix", Value::Digits(&bank.cep_suffix)),
        ("state", Value::Text(&bank.state)),
    ])
}

/// Read the identification fields of a file header line
///
/// The bank code is kept as its three digits so it compares equal to the
/// configured code.
pub fn read_file_header(line: &[u8]) -> Result<FileHeaderFields, CnabError> {
    let bank_code = FILE_HEADER.text(line, "bank_code")?;
    if bank_code.len() != 3 || !bank_code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CnabError::invalid_field(
            "bank_code",
            &bank_code,
            "bank code must be three digits",
        ));
    }

    let sequence = FILE_HEADER.number(line, "sequence")?;
    let sequence = u32::try_from(sequence).map_err(|_| {
        CnabError::invalid_field("sequence", &sequence.to_string(), "sequence out of range")
    })?;

    Ok(FileHeaderFields {
        bank_code,
        bank_name: FILE_HEADER.text(line, "bank_name")?,
        convenio: FILE_HEADER.text(line, "convenio")?,
        company_name: FILE_HEADER.text(line, "company_name")?,
        generated_on: FILE_HEADER.date(line, "generated_on").unwrap_or(None),
        generated_time: FILE_HEADER.time(line, "generated_at").ok(),
        sequence,
    })
}
