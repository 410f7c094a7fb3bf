//! Run configuration: classification tables plus the database references the
//! generated SQL points at. Both halves have built-in defaults for the BPI
//! condominium account, and a JSON file only needs the fields it changes.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::classifier::RuleSet;
use crate::emitter::sql_ident;
use crate::errors::{StatementParseError, StatementResult};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub rules: RuleSet,
    pub emitter: EmitterConfig,
}

impl Config {
    pub fn from_json(content: &str) -> StatementResult<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> StatementResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Member and category keys end up in `--` comments and in variable
    /// names, so they must be single-line and map to distinct identifiers.
    pub fn validate(&self) -> StatementResult<()> {
        let members = self
            .rules
            .member_rules
            .iter()
            .map(|r| r.member_key.as_str())
            .chain(self.emitter.member_name_patterns.keys().map(String::as_str));
        check_keys("member", members)?;

        let categories = self
            .rules
            .category_rules
            .iter()
            .map(|r| r.category_key.as_str())
            .chain(self.emitter.categories.keys().map(String::as_str));
        check_keys("category", categories)
    }
}

fn check_keys<'a>(kind: &str, keys: impl Iterator<Item = &'a str>) -> StatementResult<()> {
    let mut seen: BTreeMap<String, &str> = BTreeMap::new();
    for key in keys {
        if key.trim().is_empty() || key.chars().any(char::is_control) {
            return Err(StatementParseError::InvalidRuleKey(format!(
                "{} key {:?} is empty or contains control characters",
                kind, key
            )));
        }
        let ident = sql_ident(key);
        match seen.get(&ident) {
            Some(other) if *other != key => {
                return Err(StatementParseError::InvalidRuleKey(format!(
                    "{} keys {:?} and {:?} both map to {:?}",
                    kind, other, key, ident
                )));
            }
            Some(_) => {}
            None => {
                seen.insert(ident, key);
            }
        }
    }
    Ok(())
}

/// How an expense category key becomes a `category_id`.
///
/// With `id` set the UUID is written as a literal; otherwise the id is looked
/// up by `name` in `transaction_categories` at execution time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub name: String,
    #[serde(default)]
    pub id: Option<String>,
}

impl CategoryRef {
    fn new(name: &str, id: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            id: id.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    pub building_id: String,
    /// SQL expression producing each row's primary key.
    pub id_expression: String,
    pub income_payment_method: String,
    pub expense_payment_method: String,
    /// Member key to a `LIKE` pattern on `members.name`. Keys not listed
    /// fall back to the title-cased key followed by `%`.
    pub member_name_patterns: BTreeMap<String, String>,
    pub categories: BTreeMap<String, CategoryRef>,
    pub recalculate_call: String,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        let member_name_patterns = [
            ("vitor", "Vítor%"),
            ("joao", "João%"),
            ("antonio", "António%"),
            ("cristina", "Cristina%"),
            ("aldina", "Maria Albina%"),
            ("jose", "José%"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let categories = [
            ("luz", CategoryRef::new("Eletricidade", Some("a1c5c5c5-5e5e-4e4e-8e8e-8e8e8e8e8e04"))),
            ("limpeza", CategoryRef::new("Limpeza", Some("a1c5c5c5-5e5e-4e4e-8e8e-8e8e8e8e8e03"))),
            ("seguros", CategoryRef::new("Seguros", Some("a1c5c5c5-5e5e-4e4e-8e8e-8e8e8e8e8e06"))),
            ("banco", CategoryRef::new("Despesas Bancárias", Some("a1c5c5c5-5e5e-4e4e-8e8e-8e8e8e8e8e07"))),
            ("admin", CategoryRef::new("Administração", Some("a1c5c5c5-5e5e-4e4e-8e8e-8e8e8e8e8e08"))),
            ("manutencao", CategoryRef::new("Manutenção e Conservação", None)),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        Self {
            building_id: "fb0d83d3-fe04-47cb-ba48-f95538a2a7fc".to_string(),
            id_expression: "uuid_generate_v4()".to_string(),
            income_payment_method: "Transferência Bancária".to_string(),
            expense_payment_method: "Débito Direto".to_string(),
            member_name_patterns,
            categories,
            recalculate_call: "recalculate_all_period_balances()".to_string(),
        }
    }
}
