use super::dto::{BpiRecordRaw, ParsedRow};
use crate::errors::{StatementParseError, StatementResult};
use crate::parsers::traits::{Parser, SkipReason, SkippedRow};
use csv::{ByteRecord, ReaderBuilder, StringRecord};

const REQUIRED_COLUMNS: &[&str] = &["Descripción", "Fecha", "Importe"];

pub struct BpiCsvParser;

impl Parser for BpiCsvParser {
    type Output = ParsedRow;

    fn is_supported(filename: Option<&str>, content: &str) -> bool {
        let has_csv_extension = filename
            .map(|name| name.to_lowercase().ends_with(".csv"))
            .unwrap_or(false);

        let first_line = content.lines().next().unwrap_or("");
        let looks_like_bpi = first_line.contains("Fecha") && first_line.contains("Importe");

        match filename {
            Some(_) => has_csv_extension && looks_like_bpi,
            None => looks_like_bpi,
        }
    }

    fn parse(content: &[u8]) -> StatementResult<Vec<Result<Self::Output, SkippedRow>>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(content);

        let headers = normalize_headers(reader.byte_headers()?);
        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == *column) {
                return Err(StatementParseError::ParseFailed(format!(
                    "missing required column {:?}",
                    column
                )));
            }
        }

        let mut rows = Vec::new();
        for result in reader.byte_records() {
            let row = match result {
                Ok(record) => {
                    let line = record.position().map(|p| p.line()).unwrap_or_default();
                    StringRecord::from_byte_record(record)
                        .map_err(|e| SkipReason::Malformed(e.to_string()))
                        .and_then(|record| {
                            record
                                .deserialize::<BpiRecordRaw>(Some(&headers))
                                .map_err(|e| SkipReason::Malformed(e.to_string()))
                        })
                        .and_then(|raw| raw.into_row(line))
                        .map_err(|reason| SkippedRow { line, reason })
                }
                Err(e) => {
                    let line = e.position().map(|p| p.line()).unwrap_or_default();
                    Err(SkippedRow {
                        line,
                        reason: SkipReason::Malformed(e.to_string()),
                    })
                }
            };
            rows.push(row);
        }

        Ok(rows)
    }
}

/// The BPI export writes the first header as `Cuentas"` (opening quote
/// missing), so stray quotes and whitespace are stripped from every name.
fn normalize_headers(headers: &ByteRecord) -> StringRecord {
    headers
        .iter()
        .map(|h| {
            String::from_utf8_lossy(h)
                .trim_start_matches('\u{feff}')
                .trim()
                .trim_matches('"')
                .to_string()
        })
        .collect()
}
