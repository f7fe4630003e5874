//! FEBRABAN occurrence codes reported in return files

/// The only code meaning the credit went through
pub const SUCCESS_CODE: &str = "00";

const MESSAGES: &[(&str, &str)] = &[
    ("00", "Crédito ou Débito Efetivado"),
    ("01", "Insuficiência de Fundos"),
    ("02", "Crédito ou Débito Cancelado pelo Pagador/Credor"),
    ("03", "Débito Autorizado pela Agência"),
    ("AA", "Controle Inválido"),
    ("AB", "Tipo de Operação Inválido"),
    ("AC", "Tipo de Serviço Inválido"),
    ("AD", "Forma de Lançamento Inválida"),
    ("AE", "Tipo/Número de Inscrição Inválido"),
    ("AF", "Código de Convênio Inválido"),
    ("AG", "Agência/Conta Corrente/DV Inválido"),
    ("AH", "Nº Sequencial do Registro no Lote Inválido"),
    ("AI", "Código de Segmento de Detalhe Inválido"),
];

/// Human-readable message for a return code; unknown codes are echoed
pub fn return_message(code: &str) -> String {
    MESSAGES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, message)| (*message).to_string())
        .unwrap_or_else(|| format!("Código de retorno: {}", code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("00", "Crédito ou Débito Efetivado")]
    #[case("01", "Insuficiência de Fundos")]
    #[case("AG", "Agência/Conta Corrente/DV Inválido")]
    #[case("AI", "Código de Segmento de Detalhe Inválido")]
    #[case::unknown("ZZ", "Código de retorno: ZZ")]
    fn test_return_message(#[case] code: &str, #[case] expected: &str) {
        assert_eq!(return_message(code), expected);
    }
}
