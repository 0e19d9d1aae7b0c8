// crates/laiflux-core/src/error.rs

use std::path::PathBuf;

use chrono::NaiveDate;
use laiflux_parser::{Band, ParserError, PixelId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReconstructionError {
    #[error("station {station}: {band} table not found at {}", path.display())]
    MissingSourceFile {
        station: String,
        band: Band,
        path: PathBuf,
    },

    #[error("{band} table has no records for pixel {pixel}")]
    MissingPixel { band: Band, pixel: PixelId },

    #[error("{band} table has no record for pixel {pixel} on {date}")]
    MissingObservation {
        band: Band,
        pixel: PixelId,
        date: NaiveDate,
    },

    #[error("{} declares band {found}, expected {expected}", path.display())]
    BandMismatch {
        path: PathBuf,
        expected: Band,
        found: Band,
    },

    #[error("pixel grid shape mismatch: {0}")]
    GridShape(String),

    #[error("no observations available: {0}")]
    EmptyInput(String),

    #[error("cubic interpolation needs at least {required} valid points, found {found}")]
    InsufficientPointsForInterpolation { found: usize, required: usize },

    #[error("calendar slot {position} ({date}) is missing at the edge of the retained record")]
    CalendarGapFillBoundaryViolation { position: usize, date: NaiveDate },

    #[error("{length} consecutive calendar slots missing from {start}")]
    AdjacentCalendarGaps { start: NaiveDate, length: usize },

    #[error("no calendar years left after boundary trimming (observed {first_year}-{last_year})")]
    NoRetainedYears { first_year: i32, last_year: i32 },

    #[error("series of {len} values is shorter than the smoothing window {window}")]
    SeriesTooShort { len: usize, window: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("table parsing failed: {0}")]
    Parser(#[from] ParserError),

    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, ReconstructionError>;
