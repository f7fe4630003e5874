//! Shared fixtures for unit tests

use crate::codec::{pad_text, to_latin1};
use crate::core::{FileAssembler, FixedClock, InMemoryRepository};
use crate::records::{batch_trailer, file_trailer, segment_a, segment_b};
use crate::types::{BankConfig, PayrollPayment, RemittanceFile, TenantId};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;

pub(crate) fn at(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

pub(crate) fn sample_bank() -> BankConfig {
    BankConfig {
        bank_code: "001".to_string(),
        bank_name: "BANCO DO BRASIL".to_string(),
        company_code: "ACME".to_string(),
        convenio: "000123456".to_string(),
        cnpj: "12.345.678/0001-90".to_string(),
        company_name: "ACME FOLHA LTDA".to_string(),
        agencia: "1234".to_string(),
        agencia_digito: "5".to_string(),
        conta: "123456".to_string(),
        conta_digito: "7".to_string(),
        address: "AV PAULISTA".to_string(),
        address_number: "100".to_string(),
        city: "SAO PAULO".to_string(),
        state: "SP".to_string(),
        cep: "01310".to_string(),
        cep_suffix: "100".to_string(),
    }
}

pub(crate) fn sample_payment(name: &str, taxpayer_id: &str, amount: &str) -> PayrollPayment {
    PayrollPayment {
        employee_id: None,
        employee_name: name.to_string(),
        taxpayer_id: taxpayer_id.to_string(),
        bank_code: "237".to_string(),
        branch_code: "1234".to_string(),
        branch_digit: "5".to_string(),
        account_number: "98765".to_string(),
        account_digit: "0".to_string(),
        amount: Decimal::from_str(amount).unwrap(),
        address: "RUA DAS FLORES".to_string(),
        address_number: "100".to_string(),
        neighborhood: "CENTRO".to_string(),
        city: "SAO PAULO".to_string(),
        state: "SP".to_string(),
        cep: "01310".to_string(),
        cep_suffix: "100".to_string(),
    }
}

/// A one-payment remittance for ANA SOUZA with the given sequence
pub(crate) fn remittance_file(tenant_id: TenantId, sequence: u32) -> RemittanceFile {
    let repo = Arc::new(InMemoryRepository::new());
    repo.seed_sequence(tenant_id, "001", sequence - 1);
    let assembler = FileAssembler::with_clock(repo, Arc::new(FixedClock(at(2026, 10, 14, 8))));

    assembler
        .generate(
            tenant_id,
            &sample_bank(),
            &[sample_payment("ANA SOUZA", "111.222.333-44", "1000.00")],
            NaiveDate::from_ymd_opt(2026, 10, 30).unwrap(),
        )
        .unwrap()
}

/// Build the bank's answer to a remittance
///
/// Each `(taxpayer_id, code)` becomes a segment A/B pair whose bank document
/// field echoes the taxpayer id and whose occurrences start with the code.
pub(crate) fn build_return(remittance: &RemittanceFile, answers: &[(&str, &str)]) -> Vec<u8> {
    let bank_code = remittance.bank_code.as_str();
    let payment_date = NaiveDate::from_ymd_opt(2026, 10, 30).unwrap();

    let mut header = to_latin1(&remittance.lines[0].content);
    header[142] = b'2';
    header[157..163].copy_from_slice(format!("{:06}", remittance.sequence_number).as_bytes());

    let mut lines = vec![header, to_latin1(&remittance.lines[1].content)];
    let mut total = Decimal::ZERO;

    for (index, (taxpayer_id, code)) in answers.iter().enumerate() {
        let item = index as u32 + 1;
        let payment = sample_payment("PAYEE", taxpayer_id, "100.00");
        total += payment.amount;

        let mut a = to_latin1(&segment_a(bank_code, &payment, item, payment_date).unwrap());
        a[134..154].copy_from_slice(pad_text(taxpayer_id, 20).as_bytes());
        a[230..240].copy_from_slice(pad_text(code, 10).as_bytes());
        lines.push(a);
        lines.push(to_latin1(&segment_b(bank_code, &payment, item).unwrap()));
    }

    lines.push(to_latin1(&batch_trailer(bank_code, answers.len(), total).unwrap()));
    let count = lines.len() + 1;
    lines.push(to_latin1(&file_trailer(bank_code, 1, count).unwrap()));

    let mut content = Vec::new();
    for line in lines {
        content.extend_from_slice(&line);
        content.extend_from_slice(b"\r\n");
    }
    content
}
