use csv::{ReaderBuilder, StringRecord};

use crate::errors::ParserError;
use crate::model::{Band, PixelId, PixelTable};
use crate::registry::PixelTableParser;

use super::{parse_modis_date, parse_optional_f64};

/// Headerless subset download: one row per composite with every pixel laid out
/// horizontally.
///
/// ```text
/// MOD15A2H.A2003001.h18v03.061.2021...,Lai_500m,A2003001,BE-Bra,2021...,12,14,...
/// ```
///
/// Pixel ids follow column order starting at zero. The format carries no scale, so the
/// band's published factor applies.
pub struct SubsetWideParser;

impl Default for SubsetWideParser {
    fn default() -> Self {
        Self
    }
}

impl SubsetWideParser {
    const NAME: &'static str = "ORNL_SUBSET_WIDE";
    const BAND_FIELD: usize = 1;
    const DATE_FIELD: usize = 2;
    const FIRST_PIXEL_FIELD: usize = 5;

    fn mismatch(reason: impl Into<String>) -> ParserError {
        ParserError::FormatMismatch {
            parser: Self::NAME,
            reason: reason.into(),
        }
    }

    fn classify_first_row(record: &StringRecord) -> Result<Band, ParserError> {
        if record.len() <= Self::FIRST_PIXEL_FIELD {
            return Err(Self::mismatch(format!(
                "expected more than {} fields, found {}",
                Self::FIRST_PIXEL_FIELD,
                record.len()
            )));
        }
        let stamp = record.get(Self::DATE_FIELD).unwrap_or_default();
        if parse_modis_date(stamp).is_none() {
            return Err(Self::mismatch(format!(
                "field {} is not a MODIS date: '{}'",
                Self::DATE_FIELD,
                stamp.trim()
            )));
        }
        Band::try_from(record.get(Self::BAND_FIELD).unwrap_or_default()).map_err(Self::mismatch)
    }
}

impl PixelTableParser for SubsetWideParser {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(&self, content: &str) -> Result<PixelTable, ParserError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(content.as_bytes());

        let mut rows = Vec::new();
        for (offset, record) in reader.records().enumerate() {
            let record = record.map_err(|source| ParserError::Csv {
                parser: Self::NAME,
                source,
            })?;
            if !record.iter().all(|field| field.trim().is_empty()) {
                rows.push((offset + 1, record));
            }
        }

        let Some((_, first)) = rows.first() else {
            return Err(ParserError::EmptyData { parser: Self::NAME });
        };
        let first_band = Self::classify_first_row(first)?;
        let mut table = PixelTable::new(Some(first_band));
        let pixel_columns = first.len() - Self::FIRST_PIXEL_FIELD;

        for (line_index, record) in rows {
            let band_field = record.get(Self::BAND_FIELD).unwrap_or_default();
            let band = Band::try_from(band_field).map_err(|message| ParserError::DataRow {
                parser: Self::NAME,
                line_index,
                message,
            })?;
            if band != first_band {
                return Err(ParserError::MixedBands {
                    parser: Self::NAME,
                    line_index,
                    first: first_band,
                    found: band,
                });
            }

            let stamp = record.get(Self::DATE_FIELD).unwrap_or_default();
            let date = parse_modis_date(stamp).ok_or_else(|| ParserError::DataRow {
                parser: Self::NAME,
                line_index,
                message: format!("invalid MODIS date '{}'", stamp.trim()),
            })?;

            let found = record.len().saturating_sub(Self::FIRST_PIXEL_FIELD);
            if found != pixel_columns {
                return Err(ParserError::PixelColumnCount {
                    parser: Self::NAME,
                    line_index,
                    expected: pixel_columns,
                    found,
                });
            }

            for (column, raw) in record.iter().skip(Self::FIRST_PIXEL_FIELD).enumerate() {
                let value = parse_optional_f64(Self::NAME, raw, line_index, "pixel value")?;
                table
                    .insert(PixelId(column as u32), date, value, None)
                    .map_err(|duplicate| ParserError::DuplicateObservation {
                        parser: Self::NAME,
                        line_index,
                        pixel: duplicate.pixel,
                        date: duplicate.date,
                    })?;
            }
        }

        Ok(table)
    }
}
