//! Input values supplied by the payroll caller
//!
//! Both types are read-only to the engine: a [`BankConfig`] is constant for a
//! whole file and each [`PayrollPayment`] becomes one segment A/B pair.

use rust_decimal::Decimal;
use uuid::Uuid;

/// One salary credit instruction
#[derive(Debug, Clone, PartialEq)]
pub struct PayrollPayment {
    pub employee_id: Option<Uuid>,
    pub employee_name: String,

    /// CPF (11 digits) or CNPJ (14 digits), punctuation allowed
    pub taxpayer_id: String,

    /// Destination bank, branch and account
    pub bank_code: String,
    pub branch_code: String,
    pub branch_digit: String,
    pub account_number: String,
    pub account_digit: String,

    /// Amount in BRL with at most two decimal places
    pub amount: Decimal,

    pub address: String,
    pub address_number: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub cep: String,
    pub cep_suffix: String,
}

/// Banking coordinates of the paying company
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BankConfig {
    pub bank_code: String,
    pub bank_name: String,
    pub company_code: String,
    pub convenio: String,
    pub cnpj: String,
    pub company_name: String,
    pub agencia: String,
    pub agencia_digito: String,
    pub conta: String,
    pub conta_digito: String,
    pub address: String,
    pub address_number: String,
    pub city: String,
    pub state: String,
    pub cep: String,
    pub cep_suffix: String,
}
