//! Ordered rule tables for payer and expense-category matching.
//!
//! Every table is a list evaluated top to bottom and the first hit wins, so
//! declaration order is part of the data. Several aliases can point at the
//! same household (a relative paying on someone's behalf, a short and a
//! long form of the same name); keep longer aliases above shorter ones.

use serde::{Deserialize, Serialize};

/// `pattern` found in the upper-cased text resolves to `member_key`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRule {
    pub pattern: String,
    pub member_key: String,
}

impl MemberRule {
    pub fn new(pattern: &str, member_key: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            member_key: member_key.to_string(),
        }
    }

    pub fn matches(&self, upper_text: &str) -> bool {
        upper_text.contains(&self.pattern.to_uppercase())
    }
}

/// Any of `keywords` found in the upper-cased text resolves to `category_key`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub keywords: Vec<String>,
    pub category_key: String,
}

impl CategoryRule {
    pub fn new(keywords: &[&str], category_key: &str) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            category_key: category_key.to_string(),
        }
    }

    pub fn matches(&self, upper_text: &str) -> bool {
        self.keywords
            .iter()
            .any(|k| upper_text.contains(&k.to_uppercase()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    pub member_rules: Vec<MemberRule>,
    /// Matched against the bank's own category column, case as exported.
    pub fee_category_keywords: Vec<String>,
    /// Matched against the upper-cased description.
    pub fee_description_markers: Vec<String>,
    pub category_rules: Vec<CategoryRule>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            member_rules: default_member_rules(),
            fee_category_keywords: ["Quota", "Fraçao", "INICIO", "Prestamos > Socios", "Reembolsos Anulaciones"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            fee_description_markers: ["QUOTA", "TRF CR", "TRANSFERENCIA", "NUMERARIO"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            category_rules: default_category_rules(),
        }
    }
}

fn default_member_rules() -> Vec<MemberRule> {
    vec![
        // Full names as printed on transfers, then the beneficiary aliases.
        MemberRule::new("VITOR MANUEL SEBASTIAN RODRIGUES", "vitor"),
        MemberRule::new("VITOR RODRIGUES", "vitor"),
        MemberRule::new("JOAO MANUEL FERNANDES LONGO", "joao"),
        MemberRule::new("Joao Longo", "joao"),
        MemberRule::new("ANTONIO MANUEL CARACA BAIAO", "antonio"),
        MemberRule::new("Antonio Beirao", "antonio"),
        MemberRule::new("CRISTINA MARIA BERTOLO GOUVEIA", "cristina"),
        MemberRule::new("Cristina Gouveia", "cristina"),
        // Pays on behalf of fraction D.
        MemberRule::new("ALEXANDRE MARTINS DA SILVA", "cristina"),
        MemberRule::new("CARLOTA LOPES BERTOLO GOUVEIA", "cristina"),
        MemberRule::new("MARIA ALDINA SEQUEIRA", "aldina"),
        MemberRule::new("Aldina Sequeira", "aldina"),
        MemberRule::new("DEPOSITO EM NUMERARIO ALINA", "aldina"),
        MemberRule::new("JOSE MANUEL COSTA RICARDO", "jose"),
        MemberRule::new("Jose Ricardo", "jose"),
        // First-name fallbacks.
        MemberRule::new("VITOR", "vitor"),
        MemberRule::new("JOAO", "joao"),
        MemberRule::new("JOÃO", "joao"),
        MemberRule::new("JOSE", "jose"),
        MemberRule::new("JOSÉ", "jose"),
        MemberRule::new("ANTONIO", "antonio"),
        MemberRule::new("ANTÓNIO", "antonio"),
        MemberRule::new("CRISTINA", "cristina"),
        MemberRule::new("MARIA ALDINA", "aldina"),
        MemberRule::new("ALDINA", "aldina"),
    ]
}

fn default_category_rules() -> Vec<CategoryRule> {
    vec![
        // Vendors first.
        CategoryRule::new(&["SU ELETRICIDADE"], "luz"),
        CategoryRule::new(&["FIDELIDADE", "ALLIANZ"], "seguros"),
        CategoryRule::new(&["VICENCIA"], "limpeza"),
        CategoryRule::new(&["COPIMATICA"], "admin"),
        CategoryRule::new(&["JOSE RODRIGUES"], "manutencao"),
        // Bank statement phrasing.
        CategoryRule::new(
            &["MANUTENCAO DE CONTA", "MANUTENÇÃO CONTA", "IMPOSTO DE SELO", "INPOSTO SELO"],
            "banco",
        ),
        // Generic terms.
        CategoryRule::new(&["ELETRICIDADE", "EL-E"], "luz"),
        CategoryRule::new(&["IMPOSTO", "SELO"], "banco"),
        CategoryRule::new(&["MANUTENCAO", "MANUTENÇÃO", "COMISSAO", "CARTAO", "BANCO"], "banco"),
        CategoryRule::new(&["SEGURO"], "seguros"),
        CategoryRule::new(&["LIMPEZA"], "limpeza"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Joao Longo", "TRF CR SEPA+ JOAO LONGO", true)]
    #[case("VITOR", "DE VITOR MANUEL", true)]
    #[case("VITOR", "DE VICTOR MANUEL", false)]
    fn test_member_rule_matches_case_insensitively(
        #[case] pattern: &str,
        #[case] text: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(MemberRule::new(pattern, "k").matches(text), expected);
    }

    #[test]
    fn test_category_rule_any_keyword() {
        let rule = CategoryRule::new(&["FIDELIDADE", "ALLIANZ"], "seguros");
        assert!(rule.matches("DD ALLIANZ PORTUGAL"));
        assert!(rule.matches("FIDELIDADE"));
        assert!(!rule.matches("SU ELETRICIDADE"));
    }

    #[test]
    fn test_default_full_names_precede_first_names() {
        let rules = RuleSet::default().member_rules;
        let full = rules
            .iter()
            .position(|r| r.pattern == "VITOR MANUEL SEBASTIAN RODRIGUES")
            .unwrap();
        let short = rules.iter().position(|r| r.pattern == "VITOR").unwrap();
        assert!(full < short);
    }

    #[test]
    fn test_default_vendors_precede_generic_terms() {
        let rules = RuleSet::default().category_rules;
        let vendor = rules
            .iter()
            .position(|r| r.keywords.contains(&"FIDELIDADE".to_string()))
            .unwrap();
        let generic = rules
            .iter()
            .position(|r| r.keywords.contains(&"IMPOSTO".to_string()))
            .unwrap();
        assert!(vendor < generic);
    }

    #[test]
    fn test_partial_json_keeps_other_defaults() {
        let json = r#"{ "member_rules": [ { "pattern": "ZE", "member_key": "ze" } ] }"#;
        let rules: RuleSet = serde_json::from_str(json).unwrap();
        assert_eq!(rules.member_rules, vec![MemberRule::new("ZE", "ze")]);
        assert_eq!(rules.category_rules, RuleSet::default().category_rules);
        assert!(rules.fee_description_markers.contains(&"TRF CR".to_string()));
    }
}
