use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::types::{Direction, Transaction};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MemberLedgerEntry {
    pub count: usize,
    pub total: Decimal,
}

/// Transactions of one calendar year, split by direction in source order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct YearBucket {
    pub income: Vec<Transaction>,
    pub expense: Vec<Transaction>,
}

impl YearBucket {
    pub fn len(&self) -> usize {
        self.income.len() + self.expense.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Everything the emitter needs. `BTreeMap` keys give ascending years and
/// lexicographic member keys regardless of input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub ledger: BTreeMap<String, MemberLedgerEntry>,
    pub years: BTreeMap<i32, YearBucket>,
}

impl Summary {
    pub fn transaction_count(&self) -> usize {
        self.years.values().map(YearBucket::len).sum()
    }

    pub fn income_count(&self) -> usize {
        self.years.values().map(|b| b.income.len()).sum()
    }

    pub fn expense_count(&self) -> usize {
        self.years.values().map(|b| b.expense.len()).sum()
    }

    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self
            .years
            .values()
            .flat_map(|b| b.income.iter().chain(b.expense.iter()))
            .map(|t| t.date);
        let first = dates.next()?;
        Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }

    pub fn latest_year(&self) -> Option<i32> {
        self.years.keys().next_back().copied()
    }
}

pub fn aggregate(transactions: &[Transaction]) -> Summary {
    let mut summary = Summary::default();

    for txn in transactions {
        let bucket = summary.years.entry(txn.year()).or_default();
        match txn.direction() {
            Direction::Income => bucket.income.push(txn.clone()),
            Direction::Expense => bucket.expense.push(txn.clone()),
        }

        if let Some(key) = txn.member_key() {
            let entry = summary.ledger.entry(key.to_string()).or_default();
            entry.count += 1;
            entry.total += txn.amount;
        }
    }

    summary
}
