//! Turn BPI bank statement exports into SQL for condominium accounting.
//!
//! ```rust,ignore
//! use bank_statement_sql::{aggregate, Config, ParserBuilder, SqlEmitter};
//!
//! let config = Config::default();
//! let transactions = ParserBuilder::new()
//!     .content(&file_content)
//!     .rules(config.rules.clone())
//!     .parse()?;
//!
//! let summary = aggregate(&transactions);
//! print!("{}", SqlEmitter::new(config.emitter).render(&summary));
//! ```

mod aggregate;
mod builder;
mod emitter;
mod types;

pub mod classifier;
pub mod config;
pub mod errors;
pub mod parsers;

pub use aggregate::{aggregate, MemberLedgerEntry, Summary, YearBucket};
pub use builder::{FileFormat, ParseReport, ParserBuilder};
pub use classifier::{CategoryRule, Classifier, MemberRule, RuleSet};
pub use config::{CategoryRef, Config, EmitterConfig};
pub use emitter::{quote_literal, sql_ident, InsertBatch, SqlEmitter};
pub use parsers::prelude::*;
pub use types::{Direction, Transaction, TransactionKind};

use errors::StatementResult;

/// Whole pipeline in one call: parse, classify, aggregate, render.
pub fn render_sql(content: &str, config: &Config) -> StatementResult<String> {
    let transactions = ParserBuilder::new()
        .content(content)
        .format(FileFormat::BpiCsv)
        .rules(config.rules.clone())
        .parse()?;

    let summary = aggregate(&transactions);
    Ok(SqlEmitter::new(config.emitter.clone()).render(&summary))
}
