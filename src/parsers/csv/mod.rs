mod dto;
mod parser;
mod types;

pub mod prelude {
    pub use super::dto::{BpiRecordRaw, ParsedRow};
    pub use super::parser::BpiCsvParser;
    pub use super::types::{CsvAmount, CsvDate};
}
