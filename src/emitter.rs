//! Renders a [`Summary`] as a PL/pgSQL import script.
//!
//! Layout: a comment header with run statistics, one `DO` block that resolves
//! period, member and category ids into variables and then inserts one batch
//! per year and direction, a balance recalculation call, and two
//! verification queries.

use std::collections::BTreeSet;
use std::io::Write;

use tracing::debug;

use crate::aggregate::Summary;
use crate::config::EmitterConfig;
use crate::errors::{StatementParseError, StatementResult};
use crate::types::{Direction, Transaction};

const INDENT: &str = "    ";

/// One multi-row `INSERT`, rows in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertBatch {
    pub year: i32,
    pub direction: Direction,
    /// Value tuples, without the trailing separator.
    pub rows: Vec<String>,
}

impl InsertBatch {
    fn reference_column(&self) -> &'static str {
        match self.direction {
            Direction::Income => "member_id",
            Direction::Expense => "category_id",
        }
    }

    /// Every row but the last ends with `,`, the last with `;`.
    pub fn to_sql(&self) -> String {
        self.to_sql_indented("")
    }

    /// Same statement with `indent` in front of each line it generates.
    /// Value rows are pushed whole: a literal may span lines and must
    /// reach the database unchanged.
    pub fn to_sql_indented(&self, indent: &str) -> String {
        let mut lines = vec![
            format!("{indent}INSERT INTO transactions ("),
            format!("{indent}{INDENT}id, building_id, period_id, {},", self.reference_column()),
            format!("{indent}{INDENT}transaction_date, transaction_type, description, amount,"),
            format!("{indent}{INDENT}is_fee_payment, payment_method, year"),
            format!("{indent}) VALUES"),
        ];

        let last = self.rows.len().saturating_sub(1);
        for (idx, row) in self.rows.iter().enumerate() {
            let terminator = if idx < last { ',' } else { ';' };
            lines.push(format!("{indent}{INDENT}{row}{terminator}"));
        }

        lines.join("\n")
    }
}

pub struct SqlEmitter {
    config: EmitterConfig,
}

impl SqlEmitter {
    pub fn new(config: EmitterConfig) -> Self {
        Self { config }
    }

    pub fn emit<W: Write>(&self, summary: &Summary, out: &mut W) -> StatementResult<()> {
        out.write_all(self.render(summary).as_bytes())
            .map_err(StatementParseError::Write)
    }

    /// Income before expenses inside each year, years ascending; empty
    /// batches are left out.
    pub fn insert_batches(&self, summary: &Summary) -> Vec<InsertBatch> {
        let mut batches = Vec::new();

        for (&year, bucket) in &summary.years {
            for (direction, txns) in [
                (Direction::Income, &bucket.income),
                (Direction::Expense, &bucket.expense),
            ] {
                if txns.is_empty() {
                    continue;
                }
                debug!(year, direction = direction.as_str(), rows = txns.len(), "building insert batch");
                batches.push(InsertBatch {
                    year,
                    direction,
                    rows: txns.iter().map(|t| self.value_row(t)).collect(),
                });
            }
        }

        batches
    }

    pub fn render(&self, summary: &Summary) -> String {
        let mut lines = self.header(summary);

        if summary.transaction_count() == 0 {
            lines.push("-- Nothing to import.".to_string());
            return finish(lines);
        }

        let body = self.block_body(summary);
        let tag = dollar_tag(&body);
        lines.push(format!("DO {tag}"));
        lines.push(body);
        lines.push(format!("END {tag};"));
        lines.push(String::new());

        lines.extend(self.footer(summary));
        finish(lines)
    }

    fn header(&self, summary: &Summary) -> Vec<String> {
        let rule = "-- =====================================================".to_string();
        let mut lines = vec![
            rule.clone(),
            "-- BANK STATEMENT IMPORT".to_string(),
            format!("-- Total transactions: {}", summary.transaction_count()),
        ];
        if let Some((first, last)) = summary.date_range() {
            lines.push(format!("-- Period: {} to {}", first, last));
        }
        lines.push(rule);
        lines.push(String::new());
        lines.push(format!("-- Income: {} transactions", summary.income_count()));
        lines.push(format!("-- Expenses: {} transactions", summary.expense_count()));
        lines.push(String::new());

        if !summary.ledger.is_empty() {
            lines.push("-- Payments per member:".to_string());
            for (member, entry) in &summary.ledger {
                lines.push(format!("--   {}: {} payments = €{:.2}", member, entry.count, entry.total));
            }
            lines.push(String::new());
        }

        lines
    }

    fn block_body(&self, summary: &Summary) -> String {
        let members: Vec<&String> = summary.ledger.keys().collect();
        let categories = self.looked_up_categories(summary);

        let mut lines = vec![
            "DECLARE".to_string(),
            format!(
                "{INDENT}v_building_id UUID := {};",
                quote_literal(&self.config.building_id)
            ),
        ];
        for year in summary.years.keys() {
            lines.push(format!("{INDENT}{} UUID;", period_var(*year)));
        }
        for member in &members {
            lines.push(format!("{INDENT}{} UUID;", member_var(member)));
        }
        for key in &categories {
            lines.push(format!("{INDENT}{} UUID;", category_var(key)));
        }
        lines.push("BEGIN".to_string());
        lines.push(String::new());

        lines.push(format!("{INDENT}-- Financial period ids"));
        for year in summary.years.keys() {
            lines.push(format!(
                "{INDENT}SELECT id INTO {} FROM financial_periods WHERE building_id = v_building_id AND year = {};",
                period_var(*year),
                year
            ));
        }
        lines.push(String::new());

        if !members.is_empty() {
            lines.push(format!("{INDENT}-- Member ids"));
            for member in &members {
                lines.push(format!(
                    "{INDENT}SELECT id INTO {} FROM members WHERE building_id = v_building_id AND name LIKE {};",
                    member_var(member),
                    quote_literal(&self.member_pattern(member))
                ));
            }
            lines.push(String::new());
        }

        if !categories.is_empty() {
            lines.push(format!("{INDENT}-- Category ids"));
            for key in &categories {
                lines.push(format!(
                    "{INDENT}SELECT id INTO {} FROM transaction_categories WHERE building_id = v_building_id AND name = {};",
                    category_var(key),
                    quote_literal(self.category_name(key))
                ));
            }
            lines.push(String::new());
        }

        let batches = self.insert_batches(summary);
        for (&year, bucket) in &summary.years {
            lines.push(format!("{INDENT}-- ============================================="));
            lines.push(format!("{INDENT}-- YEAR {} ({} transactions)", year, bucket.len()));
            lines.push(format!("{INDENT}-- ============================================="));
            lines.push(String::new());

            for batch in batches.iter().filter(|b| b.year == year) {
                let label = match batch.direction {
                    Direction::Income => "Income",
                    Direction::Expense => "Expenses",
                };
                lines.push(format!("{INDENT}-- {} {}", label, year));
                lines.push(batch.to_sql_indented(INDENT));
                lines.push(String::new());
            }
        }

        lines.join("\n")
    }

    fn footer(&self, summary: &Summary) -> Vec<String> {
        let years = summary
            .years
            .keys()
            .map(|y| y.to_string())
            .collect::<Vec<_>>()
            .join(", ");

        let mut lines = vec![
            "-- Recalculate member balances".to_string(),
            format!("SELECT * FROM {};", self.config.recalculate_call),
            String::new(),
            "-- Totals per year".to_string(),
            "SELECT".to_string(),
            format!("{INDENT}year,"),
            format!("{INDENT}transaction_type,"),
            format!("{INDENT}COUNT(*) AS num_transactions,"),
            format!("{INDENT}SUM(amount) AS total"),
            "FROM transactions".to_string(),
            format!("WHERE year IN ({})", years),
            "  AND deleted_at IS NULL".to_string(),
            "GROUP BY year, transaction_type".to_string(),
            "ORDER BY year, transaction_type;".to_string(),
        ];

        if let Some(year) = summary.latest_year() {
            lines.extend([
                String::new(),
                format!("-- Member balances for {}", year),
                "SELECT".to_string(),
                format!("{INDENT}m.name,"),
                format!("{INDENT}mpb.quota_expected_annual,"),
                format!("{INDENT}mpb.quota_paid_total,"),
                format!("{INDENT}mpb.balance,"),
                format!("{INDENT}mpb.status"),
                "FROM member_period_balance mpb".to_string(),
                "JOIN members m ON mpb.member_id = m.id".to_string(),
                "JOIN financial_periods fp ON mpb.period_id = fp.id".to_string(),
                format!("WHERE fp.year = {}", year),
                "ORDER BY m.name;".to_string(),
            ]);
        }

        lines
    }

    fn value_row(&self, txn: &Transaction) -> String {
        let year = txn.year();
        let (reference, is_fee, method) = match txn.direction() {
            Direction::Income => (
                txn.member_key().map(member_var).unwrap_or_else(|| "NULL".to_string()),
                txn.is_fee_payment(),
                &self.config.income_payment_method,
            ),
            Direction::Expense => (
                txn.category_key()
                    .map(|k| self.category_reference(k))
                    .unwrap_or_else(|| "NULL".to_string()),
                false,
                &self.config.expense_payment_method,
            ),
        };

        format!(
            "({}, v_building_id, {}, {}, '{}', '{}', {}, {}, {}, {}, {})",
            self.config.id_expression,
            period_var(year),
            reference,
            txn.date.format("%Y-%m-%d"),
            txn.direction().as_str(),
            quote_literal(&txn.description),
            txn.amount,
            is_fee,
            quote_literal(method),
            year
        )
    }

    fn category_reference(&self, key: &str) -> String {
        match self.config.categories.get(key).and_then(|c| c.id.as_deref()) {
            Some(id) => quote_literal(id),
            None => category_var(key),
        }
    }

    fn category_name<'a>(&'a self, key: &'a str) -> &'a str {
        self.config
            .categories
            .get(key)
            .map(|c| c.name.as_str())
            .unwrap_or(key)
    }

    /// Category keys used by expenses that have no literal id configured.
    fn looked_up_categories(&self, summary: &Summary) -> BTreeSet<String> {
        summary
            .years
            .values()
            .flat_map(|b| b.expense.iter())
            .filter_map(Transaction::category_key)
            .filter(|k| self.config.categories.get(*k).and_then(|c| c.id.as_ref()).is_none())
            .map(str::to_string)
            .collect()
    }

    fn member_pattern(&self, key: &str) -> String {
        self.config
            .member_name_patterns
            .get(key)
            .cloned()
            .unwrap_or_else(|| format!("{}%", title_case(key)))
    }
}

fn finish(lines: Vec<String>) -> String {
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

/// Single-quoted SQL literal with embedded quotes doubled.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Lower-cased identifier fragment restricted to `[a-z0-9_]`.
pub fn sql_ident(value: &str) -> String {
    value
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

fn period_var(year: i32) -> String {
    format!("v_period_{}_id", year)
}

fn member_var(key: &str) -> String {
    format!("v_{}_id", sql_ident(key))
}

fn category_var(key: &str) -> String {
    format!("v_cat_{}_id", sql_ident(key))
}

/// `$$` unless the body already contains it; otherwise the first
/// `$import$`, `$import1$`, ... tag absent from the body.
fn dollar_tag(body: &str) -> String {
    if !body.contains("$$") {
        return "$$".to_string();
    }
    let mut candidate = "$import$".to_string();
    let mut n = 0;
    while body.contains(&candidate) {
        n += 1;
        candidate = format!("$import{}$", n);
    }
    candidate
}

fn title_case(value: &str) -> String {
    value
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
