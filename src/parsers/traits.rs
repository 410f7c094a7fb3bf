use serde::{Deserialize, Serialize};

use crate::errors::StatementResult;

pub trait Parser {
    type Output;

    /// Parse every record, keeping skipped rows alongside the good ones so
    /// the caller decides how to report them. Input is raw bytes: a record
    /// that is not valid UTF-8 is skipped, not the whole file.
    fn parse(content: &[u8]) -> StatementResult<Vec<Result<Self::Output, SkippedRow>>>;

    fn is_supported(filename: Option<&str>, content: &str) -> bool;
}

/// Why a record did not become a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    InvalidDate(String),
    ZeroAmount(String),
    Malformed(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::InvalidDate(raw) => write!(f, "invalid date {:?}", raw),
            SkipReason::ZeroAmount(raw) => write!(f, "zero or unparsable amount {:?}", raw),
            SkipReason::Malformed(msg) => write!(f, "malformed record: {}", msg),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRow {
    /// 1-based line in the source, header included.
    pub line: u64,
    pub reason: SkipReason,
}
