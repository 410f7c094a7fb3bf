use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Income,
    Expense,
}

impl Direction {
    /// Value stored in `transactions.transaction_type`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Income => "income",
            Direction::Expense => "expense",
        }
    }
}

/// Classification result. Member and fee data exist only on income, the
/// category only on expenses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransactionKind {
    Income {
        member_key: Option<String>,
        is_fee_payment: bool,
    },
    Expense {
        category_key: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    /// Magnitude only; the sign lives in `kind`.
    pub amount: Decimal,
    pub description: String,
    pub beneficiary: String,
    pub source_category: String,
    pub kind: TransactionKind,
}

impl Transaction {
    pub fn direction(&self) -> Direction {
        match self.kind {
            TransactionKind::Income { .. } => Direction::Income,
            TransactionKind::Expense { .. } => Direction::Expense,
        }
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }

    pub fn member_key(&self) -> Option<&str> {
        match &self.kind {
            TransactionKind::Income { member_key, .. } => member_key.as_deref(),
            TransactionKind::Expense { .. } => None,
        }
    }

    pub fn is_fee_payment(&self) -> bool {
        matches!(self.kind, TransactionKind::Income { is_fee_payment: true, .. })
    }

    pub fn category_key(&self) -> Option<&str> {
        match &self.kind {
            TransactionKind::Expense { category_key } => category_key.as_deref(),
            TransactionKind::Income { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn income(member_key: Option<&str>, is_fee_payment: bool) -> Transaction {
        Transaction {
            date: NaiveDate::from_ymd_opt(2025, 11, 13).unwrap(),
            amount: Decimal::from_str("26.13").unwrap(),
            description: "TRF CR INTRAB 492 DE VITOR MANUEL SEBASTIAN RODRIGUES".to_string(),
            beneficiary: "Trf Cr Intrab".to_string(),
            source_category: "Prestamos > Socios".to_string(),
            kind: TransactionKind::Income {
                member_key: member_key.map(str::to_string),
                is_fee_payment,
            },
        }
    }

    #[test]
    fn test_income_accessors() {
        let txn = income(Some("vitor"), true);
        assert_eq!(txn.direction(), Direction::Income);
        assert_eq!(txn.member_key(), Some("vitor"));
        assert!(txn.is_fee_payment());
        assert_eq!(txn.category_key(), None);
        assert_eq!(txn.year(), 2025);
    }

    #[test]
    fn test_expense_has_no_member_or_fee() {
        let txn = Transaction {
            kind: TransactionKind::Expense {
                category_key: Some("seguros".to_string()),
            },
            ..income(None, false)
        };
        assert_eq!(txn.direction(), Direction::Expense);
        assert_eq!(txn.member_key(), None);
        assert!(!txn.is_fee_payment());
        assert_eq!(txn.category_key(), Some("seguros"));
    }

    #[test]
    fn test_transaction_serialization() {
        let txn = income(Some("vitor"), true);
        let json = serde_json::to_string(&txn).unwrap();
        assert!(json.contains("\"type\":\"income\""));
        assert!(json.contains("vitor"));

        let deserialized: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, txn);
    }

    #[test]
    fn test_direction_as_str() {
        assert_eq!(Direction::Income.as_str(), "income");
        assert_eq!(Direction::Expense.as_str(), "expense");
    }
}
