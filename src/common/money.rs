// Valores monetários e quantidades trafegam como string no JSON para evitar
// arredondamento de ponto flutuante; aqui viram inteiros (centavos).

use serde::{Deserialize, Deserializer};

use crate::common::error::AppError;

/// Interpreta uma string de centavos ("1050" = 10,50). Só dígitos, sem sinal.
pub fn parse_cents(field: &str, raw: &str) -> Result<i64, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::BadRequest(format!(
            "O campo '{}' deve ser um inteiro em centavos (ex: \"1050\").",
            field
        )));
    }

    trimmed
        .parse::<i64>()
        .map_err(|_| AppError::BadRequest(format!("O campo '{}' é grande demais.", field)))
}

/// Igual a `parse_cents`, mas exige valor maior que zero.
pub fn parse_positive_cents(field: &str, raw: &str) -> Result<i64, AppError> {
    let cents = parse_cents(field, raw)?;
    if cents == 0 {
        return Err(AppError::BadRequest(format!(
            "O campo '{}' deve ser maior que zero.",
            field
        )));
    }
    Ok(cents)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IntOrString {
    Int(i64),
    Str(String),
}

/// Aceita `2` ou `"2"` para quantidades.
pub fn deserialize_quantity<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match IntOrString::deserialize(deserializer)? {
        IntOrString::Int(n) => Ok(n),
        IntOrString::Str(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| serde::de::Error::custom("quantidade inválida")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_cents() {
        assert_eq!(parse_cents("priceCents", "1000").unwrap(), 1000);
        assert_eq!(parse_cents("priceCents", " 0 ").unwrap(), 0);
    }

    #[test]
    fn rejects_decimals_signs_and_garbage() {
        for raw in ["10.50", "-1", "+3", "", "abc", "1e3"] {
            assert!(
                matches!(parse_cents("priceCents", raw), Err(AppError::BadRequest(_))),
                "{raw:?} deveria falhar"
            );
        }
    }

    #[test]
    fn rejects_overflow() {
        assert!(parse_cents("amountCents", "99999999999999999999").is_err());
    }

    #[test]
    fn positive_cents_rejects_zero() {
        assert!(parse_positive_cents("amountCents", "0").is_err());
        assert_eq!(parse_positive_cents("amountCents", "250").unwrap(), 250);
    }

    #[derive(Deserialize)]
    struct Line {
        #[serde(deserialize_with = "deserialize_quantity")]
        quantity: i64,
    }

    #[test]
    fn quantity_accepts_number_or_string() {
        let a: Line = serde_json::from_str(r#"{"quantity": 2}"#).unwrap();
        let b: Line = serde_json::from_str(r#"{"quantity": "3"}"#).unwrap();
        assert_eq!((a.quantity, b.quantity), (2, 3));
        assert!(serde_json::from_str::<Line>(r#"{"quantity": "x"}"#).is_err());
    }
}
