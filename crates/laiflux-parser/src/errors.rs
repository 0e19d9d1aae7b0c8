use std::fmt;

use chrono::NaiveDate;
use thiserror::Error;

use crate::model::{Band, PixelId};

#[derive(Debug, Clone)]
pub struct ParserAttempt {
    pub parser: &'static str,
    pub message: String,
}

impl ParserAttempt {
    pub fn new(parser: &'static str, message: impl Into<String>) -> Self {
        Self {
            parser,
            message: message.into(),
        }
    }
}

impl fmt::Display for ParserAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.parser, self.message)
    }
}

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("{parser} format mismatch: {reason}")]
    FormatMismatch {
        parser: &'static str,
        reason: String,
    },

    #[error("{parser} CSV error: {source}")]
    Csv {
        parser: &'static str,
        #[source]
        source: csv::Error,
    },

    #[error("{parser} data row {line_index} invalid: {message}")]
    DataRow {
        parser: &'static str,
        line_index: usize,
        message: String,
    },

    #[error("{parser} line {line_index}: table switches from band {first} to {found}")]
    MixedBands {
        parser: &'static str,
        line_index: usize,
        first: Band,
        found: Band,
    },

    #[error("{parser} line {line_index}: second record for pixel {pixel} on {date}")]
    DuplicateObservation {
        parser: &'static str,
        line_index: usize,
        pixel: PixelId,
        date: NaiveDate,
    },

    #[error("{parser} line {line_index}: expected {expected} pixel values, found {found}")]
    PixelColumnCount {
        parser: &'static str,
        line_index: usize,
        expected: usize,
        found: usize,
    },

    #[error("table holds band {found}, expected {expected}")]
    UnexpectedBand { expected: Band, found: Band },

    #[error("{parser} file did not contain any data rows")]
    EmptyData { parser: &'static str },

    #[error("no MODIS subset layout recognized this table; attempts: {attempts:?}")]
    NoMatchingParser { attempts: Vec<ParserAttempt> },
}
