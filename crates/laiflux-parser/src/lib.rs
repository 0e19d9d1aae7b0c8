pub mod errors;
pub mod formats;
pub mod model;
mod registry;

pub use errors::{ParserAttempt, ParserError};
pub use model::{Band, DuplicateRecord, PixelId, PixelTable};
pub use registry::{parse_band_table, parse_pixel_table, parse_with_parsers, PixelTableParser};

#[cfg(test)]
mod tests;
