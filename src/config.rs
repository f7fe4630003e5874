//! Environment configuration
//!
//! The paying company's coordinates come from `CNAB_*` variables, loaded
//! from a `.env` file when one exists. Parsing goes through a lookup
//! function, so tests can feed a map instead of mutating the process
//! environment.

use crate::types::{BankConfig, CnabError, TenantId};
use std::env;
use uuid::Uuid;

pub const TENANT_KEY: &str = "CNAB_TENANT_ID";

impl BankConfig {
    /// Load from the process environment after reading `.env`
    pub fn from_env() -> Result<Self, CnabError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup
    ///
    /// # Errors
    ///
    /// Returns `Config` naming the first required key that is missing or
    /// blank, or a bank code that is not 1 to 3 digits.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CnabError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).map(|v| v.trim().to_string()).unwrap_or_default();
        let required = |key: &str| -> Result<String, CnabError> {
            let value = optional(key);
            if value.is_empty() {
                return Err(CnabError::config(key, "is not set"));
            }
            Ok(value)
        };

        let bank_code = required("CNAB_BANK_CODE")?;
        if bank_code.len() > 3 || !bank_code.chars().all(|c| c.is_ascii_digit()) {
            return Err(CnabError::config(
                "CNAB_BANK_CODE",
                format!("'{}' is not a 3-digit bank code", bank_code),
            ));
        }

        Ok(BankConfig {
            bank_code: format!("{:0>3}", bank_code),
            bank_name: required("CNAB_BANK_NAME")?,
            company_code: optional("CNAB_COMPANY_CODE"),
            convenio: optional("CNAB_CONVENIO"),
            cnpj: required("CNAB_CNPJ")?,
            company_name: required("CNAB_COMPANY_NAME")?,
            agencia: required("CNAB_AGENCIA")?,
            agencia_digito: optional("CNAB_AGENCIA_DIGITO"),
            conta: required("CNAB_CONTA")?,
            conta_digito: optional("CNAB_CONTA_DIGITO"),
            address: optional("CNAB_ADDRESS"),
            address_number: optional("CNAB_ADDRESS_NUMBER"),
            city: optional("CNAB_CITY"),
            state: optional("CNAB_STATE"),
            cep: optional("CNAB_CEP"),
            cep_suffix: optional("CNAB_CEP_SUFFIX"),
        })
    }
}

/// Tenant from `CNAB_TENANT_ID`; the nil UUID when unset
pub fn tenant_from_lookup<F>(lookup: F) -> Result<TenantId, CnabError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(TENANT_KEY).map(|v| v.trim().to_string()) {
        None => Ok(Uuid::nil()),
        Some(value) if value.is_empty() => Ok(Uuid::nil()),
        Some(value) => Uuid::parse_str(&value)
            .map_err(|e| CnabError::config(TENANT_KEY, format!("'{}': {}", value, e))),
    }
}

pub fn tenant_from_env() -> Result<TenantId, CnabError> {
    dotenvy::dotenv().ok();
    tenant_from_lookup(|key| env::var(key).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn full_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("CNAB_BANK_CODE", "1"),
            ("CNAB_BANK_NAME", "BANCO DO BRASIL"),
            ("CNAB_CNPJ", "12.345.678/0001-90"),
            ("CNAB_COMPANY_NAME", "ACME FOLHA LTDA"),
            ("CNAB_AGENCIA", "1234"),
            ("CNAB_AGENCIA_DIGITO", "5"),
            ("CNAB_CONTA", "123456"),
            ("CNAB_CONTA_DIGITO", "7"),
            ("CNAB_CITY", " SAO PAULO "),
        ])
    }

    fn lookup<'a>(
        map: &'a HashMap<&'static str, &'static str>,
    ) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| map.get(key).map(|v| v.to_string())
    }

    #[test]
    fn test_from_lookup_reads_all_keys() {
        let env = full_env();
        let config = BankConfig::from_lookup(lookup(&env)).unwrap();

        assert_eq!(config.bank_code, "001");
        assert_eq!(config.bank_name, "BANCO DO BRASIL");
        assert_eq!(config.agencia_digito, "5");
        assert_eq!(config.city, "SAO PAULO");
        assert_eq!(config.convenio, "");
    }

    #[rstest]
    #[case("CNAB_BANK_CODE")]
    #[case("CNAB_CNPJ")]
    #[case("CNAB_CONTA")]
    fn test_missing_required_key(#[case] key: &'static str) {
        let mut env = full_env();
        env.remove(key);

        let error = BankConfig::from_lookup(lookup(&env)).unwrap_err();
        assert_eq!(error, CnabError::config(key, "is not set"));
    }

    #[rstest]
    #[case("1234")]
    #[case("AB1")]
    fn test_invalid_bank_code(#[case] code: &'static str) {
        let mut env = full_env();
        env.insert("CNAB_BANK_CODE", code);
        assert!(matches!(
            BankConfig::from_lookup(lookup(&env)),
            Err(CnabError::Config { .. })
        ));
    }

    #[test]
    fn test_tenant_defaults_to_nil() {
        assert_eq!(tenant_from_lookup(|_| None).unwrap(), Uuid::nil());
    }

    #[test]
    fn test_tenant_parses_uuid() {
        let id = Uuid::new_v4();
        let tenant = tenant_from_lookup(|_| Some(id.to_string())).unwrap();
        assert_eq!(tenant, id);
        assert!(tenant_from_lookup(|_| Some("not-a-uuid".to_string())).is_err());
    }
}
