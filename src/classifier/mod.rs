//! Deterministic payer and category classification for parsed rows.
//!
//! Each decision reads only the text of the row being classified; there is
//! no cross-row state and nothing here can fail. A miss degrades to `None`.

mod rules;

pub use rules::{CategoryRule, MemberRule, RuleSet};

use rust_decimal::Decimal;
use tracing::debug;

use crate::parsers::prelude::ParsedRow;
use crate::types::{Transaction, TransactionKind};

#[derive(Debug, Clone, Default)]
pub struct Classifier {
    rules: RuleSet,
}

impl Classifier {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn classify(&self, row: &ParsedRow) -> Transaction {
        let kind = if row.amount > Decimal::ZERO {
            TransactionKind::Income {
                member_key: self.identify_member(&row.raw_description, &row.beneficiary),
                is_fee_payment: self.is_fee_payment(&row.raw_description, &row.source_category),
            }
        } else {
            TransactionKind::Expense {
                category_key: self.identify_category(
                    &row.raw_description,
                    &row.beneficiary,
                    &row.source_category,
                ),
            }
        };

        Transaction {
            date: row.date,
            amount: row.amount.abs(),
            description: row.description.clone(),
            beneficiary: row.beneficiary.clone(),
            source_category: row.source_category.clone(),
            kind,
        }
    }

    pub fn identify_member(&self, description: &str, beneficiary: &str) -> Option<String> {
        let text = format!("{} {}", description, beneficiary).to_uppercase();
        let hit = self
            .rules
            .member_rules
            .iter()
            .find(|rule| rule.matches(&text))
            .map(|rule| rule.member_key.clone());

        if hit.is_none() {
            debug!(text = %text, "no member matched");
        }
        hit
    }

    /// Either family of keywords is enough: the bank's category column or a
    /// transfer marker in the description.
    pub fn is_fee_payment(&self, description: &str, source_category: &str) -> bool {
        if self
            .rules
            .fee_category_keywords
            .iter()
            .any(|k| source_category.contains(k.as_str()))
        {
            return true;
        }

        let upper = description.to_uppercase();
        self.rules
            .fee_description_markers
            .iter()
            .any(|m| upper.contains(m.as_str()))
    }

    pub fn identify_category(
        &self,
        description: &str,
        beneficiary: &str,
        source_category: &str,
    ) -> Option<String> {
        let text = format!("{} {} {}", description, beneficiary, source_category).to_uppercase();
        let hit = self
            .rules
            .category_rules
            .iter()
            .find(|rule| rule.matches(&text))
            .map(|rule| rule.category_key.clone());

        if hit.is_none() {
            debug!(text = %text, "expense left uncategorized");
        }
        hit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;
    use std::str::FromStr;

    fn row(amount: &str, description: &str, beneficiary: &str, category: &str) -> ParsedRow {
        ParsedRow {
            line: 2,
            date: NaiveDate::from_ymd_opt(2025, 11, 13).unwrap(),
            amount: Decimal::from_str(amount).unwrap(),
            description: description.to_string(),
            raw_description: description.to_string(),
            beneficiary: beneficiary.to_string(),
            source_category: category.to_string(),
            transfer: String::new(),
            currency: "EUR".to_string(),
        }
    }

    #[test]
    fn test_transfer_from_member_is_fee_income() {
        let txn = Classifier::default().classify(&row(
            "26.13",
            "TRF CR INTRAB 492 DE VITOR MANUEL SEBASTIAN RODRIGUES",
            "Trf Cr Intrab",
            "",
        ));

        assert_eq!(txn.amount, Decimal::from_str("26.13").unwrap());
        assert_eq!(
            txn.kind,
            TransactionKind::Income {
                member_key: Some("vitor".to_string()),
                is_fee_payment: true,
            }
        );
    }

    #[test]
    fn test_insurer_beneficiary_is_insurance_expense() {
        let txn = Classifier::default().classify(&row("-807.15", "DD SEGURO ANUAL", "FIDELIDADE", ""));
        assert_eq!(txn.amount.to_string(), "807.15");
        assert_eq!(txn.category_key(), Some("seguros"));
        assert_eq!(txn.member_key(), None);
        assert!(!txn.is_fee_payment());
    }

    #[test]
    fn test_stamp_duty_is_bank_fee() {
        let txn = Classifier::default().classify(&row(
            "-0.32",
            "IMPOSTO DE SELO OUT 2025",
            "Imposto De Selo Out 202",
            "",
        ));
        assert_eq!(txn.amount.to_string(), "0.32");
        assert_eq!(txn.category_key(), Some("banco"));
    }

    #[rstest]
    #[case("DD SU ELETRICIDADE, S.A. 100000862991", "SU Eletricidade", "Despesas de condomínio > LUZ", Some("luz"))]
    #[case("MANUTENCAO DE CONTA VALOR NEGOCIOS OUT 2025", "Manutencao De Conta Valor Negocios", "GASTOS FINANCIEROS > BANCOS > Tarifa banco", Some("banco"))]
    #[case("TRF VICENCIA LIMPEZA MARCO", "", "", Some("limpeza"))]
    #[case("PAGAMENTO COPIMATICA", "", "", Some("admin"))]
    #[case("TRF JOSE RODRIGUES REPARACAO", "", "", Some("manutencao"))]
    #[case("COMPRA LOJA XYZ", "Loja Xyz", "", None)]
    fn test_expense_categories(
        #[case] description: &str,
        #[case] beneficiary: &str,
        #[case] category: &str,
        #[case] expected: Option<&str>,
    ) {
        let txn = Classifier::default().classify(&row("-10.00", description, beneficiary, category));
        assert_eq!(txn.category_key(), expected);
    }

    #[rstest]
    #[case("TRF CR SEPA+ 0000030 DE JOAO MANUEL FERNANDES LONGO", "Trf Cr Sepa+", Some("joao"))]
    #[case("DEPOSITO EM NUMERARIO", "Aldina Sequeira", Some("aldina"))]
    #[case("TRF CR SEPA+ DE ALEXANDRE MARTINS DA SILVA", "", Some("cristina"))]
    #[case("TRF CR SEPA+ DE JOSÉ RICARDO", "", Some("jose"))]
    #[case("JUROS CREDORES", "", None)]
    fn test_member_identification(
        #[case] description: &str,
        #[case] beneficiary: &str,
        #[case] expected: Option<&str>,
    ) {
        let txn = Classifier::default().classify(&row("43.54", description, beneficiary, ""));
        assert_eq!(txn.member_key(), expected);
    }

    #[rstest]
    #[case("DEPOSITO EM NUMERARIO", "Quota > Fraçao B - RC/ESQ", true)]
    #[case("JUROS CREDORES", "Reembolsos Anulaciones", true)]
    #[case("TRANSFERENCIA DE TERCEIRO", "", true)]
    #[case("JUROS CREDORES", "", false)]
    #[case("JUROS CREDORES", "quota", false)]
    fn test_fee_payment_either_family(
        #[case] description: &str,
        #[case] category: &str,
        #[case] expected: bool,
    ) {
        let txn = Classifier::default().classify(&row("10.00", description, "", category));
        assert_eq!(txn.is_fee_payment(), expected);
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let rules = RuleSet {
            member_rules: vec![
                MemberRule::new("MANUEL", "first"),
                MemberRule::new("VITOR MANUEL", "second"),
            ],
            ..RuleSet::default()
        };
        let classifier = Classifier::new(rules);
        let txn = classifier.classify(&row("1.00", "DE VITOR MANUEL", "", ""));
        assert_eq!(txn.member_key(), Some("first"));
    }

    #[test]
    fn test_member_match_uses_description_not_memo() {
        let mut input = row("5.00", "DEPOSITO", "", "");
        input.description = "DEPOSITO - entregue pelo VITOR".to_string();
        let txn = Classifier::default().classify(&input);
        assert_eq!(txn.member_key(), None);
        assert_eq!(txn.description, "DEPOSITO - entregue pelo VITOR");
    }

    #[test]
    fn test_classification_is_deterministic() {
        let classifier = Classifier::default();
        let input = row("-6.82", "DD SU ELETRICIDADE, S.A.", "SU Eletricidade", "");
        assert_eq!(classifier.classify(&input), classifier.classify(&input));
    }
}
