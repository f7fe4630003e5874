//! Benchmark suite for remittance generation and reconciliation
//!
//! Payrolls are built in memory so the numbers reflect encoding,
//! assembly and matching only.
//!
//! # Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench
//! ```

use chrono::NaiveDate;
use cnab_payroll::codec::{pad_text, to_latin1};
use cnab_payroll::{
    BankConfig, FileAssembler, InMemoryRepository, PayrollPayment, RemittanceFile,
    ReturnReconciler,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

fn main() {
    divan::main();
}

fn bank() -> BankConfig {
    BankConfig {
        bank_code: "001".to_string(),
        bank_name: "BANCO DO BRASIL".to_string(),
        convenio: "000123456".to_string(),
        cnpj: "12345678000190".to_string(),
        company_name: "ACME FOLHA LTDA".to_string(),
        agencia: "1234".to_string(),
        conta: "123456".to_string(),
        ..BankConfig::default()
    }
}

fn payroll(size: usize) -> Vec<PayrollPayment> {
    (0..size)
        .map(|i| PayrollPayment {
            employee_id: Some(Uuid::new_v4()),
            employee_name: format!("EMPLOYEE {}", i),
            taxpayer_id: format!("{:011}", 10_000_000_000u64 + i as u64),
            bank_code: "237".to_string(),
            branch_code: "1234".to_string(),
            branch_digit: "5".to_string(),
            account_number: format!("{}", 10_000 + i),
            account_digit: "0".to_string(),
            amount: Decimal::new(150_000 + i as i64, 2),
            address: "RUA DAS FLORES".to_string(),
            address_number: "100".to_string(),
            neighborhood: "CENTRO".to_string(),
            city: "SAO PAULO".to_string(),
            state: "SP".to_string(),
            cep: "01310".to_string(),
            cep_suffix: "100".to_string(),
        })
        .collect()
}

fn payment_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 30).expect("valid date")
}

fn accept_all(remittance: &RemittanceFile) -> Vec<u8> {
    let mut content = Vec::with_capacity(remittance.content.len());
    for line in &remittance.lines {
        let mut bytes = to_latin1(&line.content);
        if let Some(detail) = &line.detail {
            bytes[134..154].copy_from_slice(pad_text(&detail.taxpayer_id, 20).as_bytes());
            bytes[230..232].copy_from_slice(b"00");
        }
        content.extend_from_slice(&bytes);
        content.extend_from_slice(b"\r\n");
    }
    content
}

/// Assemble one remittance for payrolls of increasing size
#[divan::bench(args = [100, 1000, 10000])]
fn generate(bencher: divan::Bencher, size: usize) {
    let payments = payroll(size);
    let bank = bank();

    bencher
        .with_inputs(|| FileAssembler::new(Arc::new(InMemoryRepository::new())))
        .bench_values(|assembler| {
            assembler
                .generate(Uuid::nil(), &bank, &payments, payment_date())
                .expect("Generation failed")
        });
}

/// Apply an all-accepted return to a freshly stored remittance
#[divan::bench(args = [100, 1000, 10000])]
fn reconcile(bencher: divan::Bencher, size: usize) {
    let payments = payroll(size);
    let bank = bank();

    bencher
        .with_inputs(|| {
            let repo = Arc::new(InMemoryRepository::new());
            let remittance = FileAssembler::new(repo.clone())
                .generate(Uuid::nil(), &bank, &payments, payment_date())
                .expect("Generation failed");
            (ReturnReconciler::new(repo), accept_all(&remittance))
        })
        .bench_values(|(reconciler, answer)| {
            reconciler
                .reconcile(Uuid::nil(), "BENCH.RET", &answer)
                .expect("Reconciliation failed")
        });
}
