use crate::errors::{ParserAttempt, ParserError};
use crate::formats::{SubsetLongParser, SubsetWideParser};
use crate::model::{Band, PixelTable};

pub trait PixelTableParser {
    fn name(&self) -> &'static str;
    fn parse(&self, content: &str) -> Result<PixelTable, ParserError>;
}

pub fn parse_pixel_table(content: &str) -> Result<PixelTable, ParserError> {
    let subset_long = SubsetLongParser;
    let subset_wide = SubsetWideParser;
    let parsers: [&dyn PixelTableParser; 2] = [&subset_long, &subset_wide];
    parse_with_parsers(content, &parsers)
}

/// Parses a table that is known to hold `expected`. A table without a band column
/// takes the expected band, which also enables its default scale.
pub fn parse_band_table(content: &str, expected: Band) -> Result<PixelTable, ParserError> {
    let table = parse_pixel_table(content)?;
    match table.band() {
        None => Ok(table.with_band(expected)),
        Some(found) if found == expected => Ok(table),
        Some(found) => Err(ParserError::UnexpectedBand { expected, found }),
    }
}

pub fn parse_with_parsers(
    content: &str,
    parsers: &[&dyn PixelTableParser],
) -> Result<PixelTable, ParserError> {
    let mut attempts = Vec::new();

    for parser in parsers {
        match parser.parse(content) {
            Ok(parsed) => return Ok(parsed),
            Err(ParserError::FormatMismatch { reason, .. }) => {
                attempts.push(ParserAttempt::new(parser.name(), reason));
            }
            Err(err) => return Err(err),
        }
    }

    Err(ParserError::NoMatchingParser { attempts })
}
