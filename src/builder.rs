use std::fs;

use crate::{
    classifier::{Classifier, RuleSet},
    errors::StatementParseError,
    parsers::prelude::*,
    types::Transaction,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileFormat {
    #[serde(rename = "bpi-csv")]
    BpiCsv,
}

impl FileFormat {
    fn parse_raw(&self, content: &[u8]) -> Result<Vec<Result<ParsedRow, SkippedRow>>, StatementParseError> {
        match self {
            FileFormat::BpiCsv => BpiCsvParser::parse(content),
        }
    }

    fn detect(filename: Option<&str>, content: Option<&str>) -> Result<Self, StatementParseError> {
        if let Some(content) = content {
            if BpiCsvParser::is_supported(filename, content) {
                return Ok(FileFormat::BpiCsv);
            }
        }

        if let (Some(filename), None) = (filename, content) {
            if filename.to_lowercase().ends_with(".csv") {
                return Ok(FileFormat::BpiCsv);
            }
        }

        Err(StatementParseError::UnsupportedFormat)
    }
}

/// Classified transactions plus the rows that were dropped on the way.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParseReport {
    pub transactions: Vec<Transaction>,
    pub skipped: Vec<SkippedRow>,
}

#[derive(Default)]
pub struct ParserBuilder {
    content: Option<Vec<u8>>,
    filepath: Option<String>,
    format: Option<FileFormat>,
    rules: Option<RuleSet>,
}

impl ParserBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(mut self, content: &str) -> Self {
        self.content = Some(content.as_bytes().to_vec());
        self
    }

    /// Raw export bytes; rows that are not valid UTF-8 are skipped later.
    pub fn content_bytes(mut self, content: &[u8]) -> Self {
        self.content = Some(content.to_vec());
        self
    }

    pub fn filename(mut self, filename: &str) -> Self {
        self.filepath = Some(filename.to_string());
        self
    }

    pub fn format(mut self, format: FileFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn rules(mut self, rules: RuleSet) -> Self {
        self.rules = Some(rules);
        self
    }

    pub fn parse(self) -> Result<Vec<Transaction>, StatementParseError> {
        self.parse_report().map(|report| report.transactions)
    }

    pub fn parse_report(self) -> Result<ParseReport, StatementParseError> {
        let format = match self.format {
            Some(format) => format,
            None => {
                let text = self.content.as_deref().map(String::from_utf8_lossy);
                FileFormat::detect(self.filepath.as_deref(), text.as_deref())?
            }
        };

        let content = self.content
            .map(Ok)
            .unwrap_or_else(|| {
                self.filepath
                    .ok_or(StatementParseError::MissingContentAndFilepath)
                    .and_then(|path| fs::read(path).map_err(Into::into))
            })?;

        let classifier = Classifier::new(self.rules.unwrap_or_default());
        let mut report = ParseReport::default();

        for row in format.parse_raw(&content)? {
            match row {
                Ok(parsed) => report.transactions.push(classifier.classify(&parsed)),
                Err(skipped) => {
                    warn!(line = skipped.line, reason = %skipped.reason, "skipping statement row");
                    report.skipped.push(skipped);
                }
            }
        }

        info!(
            kept = report.transactions.len(),
            skipped = report.skipped.len(),
            "statement parsed"
        );
        Ok(report)
    }
}
