use crate::errors::StatementParseError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Data tal como aparece na coluna `Fecha` do extrato BPI.
///
/// O banco exporta sempre `DD/MM/YYYY`. Qualquer outro formato é tratado
/// como inválido: a linha é ignorada em vez de adivinhar a ordem dia/mês.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvDate(String);

impl CsvDate {
    pub fn parse(&self) -> Result<NaiveDate, StatementParseError> {
        let s = self.0.trim();
        if !has_date_shape(s) {
            return Err(StatementParseError::CsvDateInvalidFormat);
        }

        NaiveDate::parse_from_str(s, "%d/%m/%Y")
            .map_err(|_| StatementParseError::CsvDateInvalidFormat)
    }
}

/// Exactly `DD/MM/YYYY`: chrono's `%Y` also takes signs and short fields.
fn has_date_shape(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            2 | 5 => *b == b'/',
            _ => b.is_ascii_digit(),
        })
}

impl From<String> for CsvDate {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for CsvDate {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl TryFrom<CsvDate> for NaiveDate {
    type Error = StatementParseError;

    fn try_from(date: CsvDate) -> Result<Self, Self::Error> {
        date.parse()
    }
}

/// Valor da coluna `Importe`: decimal com vírgula como separador (`-807,15`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvAmount(String);

impl CsvAmount {
    pub fn parse(&self) -> Result<Decimal, StatementParseError> {
        let cleaned: String = self
            .0
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| if c == ',' { '.' } else { c })
            .collect();

        Decimal::from_str(&cleaned)
            .map_err(|_| StatementParseError::CsvAmountInvalid(self.0.clone()))
    }

    /// Unparsable amounts count as zero, and zero rows are dropped upstream.
    pub fn parse_or_zero(&self) -> Decimal {
        self.parse().unwrap_or(Decimal::ZERO)
    }
}

impl From<String> for CsvAmount {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for CsvAmount {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

// -----------------------------------------------------------------------------
// Testes
// -----------------------------------------------------------------------------
