use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::{CsvAmount, CsvDate};
use crate::parsers::traits::SkipReason;

/// One record of the BPI export, column names as the bank writes them.
///
/// Every column defaults to empty so short or partially filled rows still
/// decode; the date and amount checks decide whether the row is kept.
#[derive(Debug, Default, Deserialize)]
pub struct BpiRecordRaw {
    #[serde(rename = "Cuentas", default)]
    pub account: String,
    #[serde(rename = "Transferencias", default)]
    pub transfer: String,
    #[serde(rename = "Descripción", default)]
    pub description: String,
    #[serde(rename = "Beneficiario", default)]
    pub beneficiary: String,
    #[serde(rename = "Categoría", default)]
    pub category: String,
    #[serde(rename = "Fecha", default)]
    pub date: String,
    #[serde(rename = "Hora", default)]
    pub time: String,
    #[serde(rename = "Memoria", default)]
    pub memo: String,
    #[serde(rename = "Importe", default)]
    pub amount: String,
    #[serde(rename = "Moneda", default)]
    pub currency: String,
    #[serde(rename = "Número de cheque", default)]
    pub check_number: String,
    #[serde(rename = "Etiquetas", default)]
    pub tags: String,
}

/// A record that passed date and amount checks, not yet classified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedRow {
    pub line: u64,
    pub date: NaiveDate,
    /// Signed, as exported: negative for debits.
    pub amount: Decimal,
    /// Description with the memo appended when it adds information.
    pub description: String,
    pub raw_description: String,
    pub beneficiary: String,
    pub source_category: String,
    pub transfer: String,
    pub currency: String,
}

impl BpiRecordRaw {
    pub fn into_row(self, line: u64) -> Result<ParsedRow, SkipReason> {
        let date = CsvDate::from(self.date.as_str())
            .parse()
            .map_err(|_| SkipReason::InvalidDate(self.date.clone()))?;

        let amount = CsvAmount::from(self.amount.as_str()).parse_or_zero();
        if amount.is_zero() {
            return Err(SkipReason::ZeroAmount(self.amount));
        }

        let description = compose_description(&self.description, &self.memo);

        Ok(ParsedRow {
            line,
            date,
            amount,
            description,
            raw_description: self.description,
            beneficiary: self.beneficiary,
            source_category: self.category,
            transfer: self.transfer,
            currency: self.currency,
        })
    }
}

fn compose_description(description: &str, memo: &str) -> String {
    if memo.trim().is_empty() || memo == description {
        description.to_string()
    } else {
        format!("{} - {}", description, memo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    fn raw(date: &str, amount: &str, description: &str, memo: &str) -> BpiRecordRaw {
        BpiRecordRaw {
            account: "BPI COND. BURACA".to_string(),
            description: description.to_string(),
            beneficiary: "Trf Cr Intrab".to_string(),
            category: "Prestamos > Socios".to_string(),
            date: date.to_string(),
            time: "12:00".to_string(),
            memo: memo.to_string(),
            amount: amount.to_string(),
            currency: "EUR".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_into_row_valid() {
        let desc = "TRF CR INTRAB 492 DE VITOR MANUEL SEBASTIAN RODRIGUES";
        let row = raw("13/11/2025", "26,13", desc, desc).into_row(2).unwrap();

        assert_eq!(row.line, 2);
        assert_eq!(row.date, NaiveDate::from_ymd_opt(2025, 11, 13).unwrap());
        assert_eq!(row.amount, Decimal::from_str("26.13").unwrap());
        assert_eq!(row.description, desc);
        assert_eq!(row.source_category, "Prestamos > Socios");
    }

    #[rstest]
    #[case("IMPOSTO DE SELO OUT 2025", "", "IMPOSTO DE SELO OUT 2025")]
    #[case("IMPOSTO DE SELO OUT 2025", "   ", "IMPOSTO DE SELO OUT 2025")]
    #[case("DEPOSITO", "DEPOSITO", "DEPOSITO")]
    #[case("DEPOSITO EM NUMERARIO", "quota agosto", "DEPOSITO EM NUMERARIO - quota agosto")]
    fn test_description_composition(
        #[case] description: &str,
        #[case] memo: &str,
        #[case] expected: &str,
    ) {
        let row = raw("01/01/2025", "-1,00", description, memo).into_row(2).unwrap();
        assert_eq!(row.description, expected);
        assert_eq!(row.raw_description, description);
    }

    #[rstest]
    #[case("2025-11-13", "26,13")]
    #[case("", "26,13")]
    #[case("31/02/2025", "26,13")]
    fn test_into_row_invalid_date_skips(#[case] date: &str, #[case] amount: &str) {
        let result = raw(date, amount, "X", "").into_row(5);
        assert!(matches!(result, Err(SkipReason::InvalidDate(_))));
    }

    #[rstest]
    #[case("")]
    #[case("0,00")]
    #[case("n/a")]
    fn test_into_row_zero_amount_skips(#[case] amount: &str) {
        let result = raw("01/01/2025", amount, "X", "").into_row(5);
        assert_eq!(result, Err(SkipReason::ZeroAmount(amount.to_string())));
    }

    #[test]
    fn test_into_row_is_deterministic() {
        let a = raw("07/11/2025", "-0,32", "IMPOSTO DE SELO OUT 2025", "").into_row(4);
        let b = raw("07/11/2025", "-0,32", "IMPOSTO DE SELO OUT 2025", "").into_row(4);
        assert_eq!(a, b);
    }
}
