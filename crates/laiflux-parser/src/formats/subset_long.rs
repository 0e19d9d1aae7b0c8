use csv::{ReaderBuilder, StringRecord};

use crate::errors::ParserError;
use crate::model::{Band, PixelTable};
use crate::registry::PixelTableParser;

use super::{parse_calendar_date, parse_modis_date, parse_optional_f64, parse_pixel_id, parse_scale};

/// Long subset export: a header row, then one row per pixel per composite date.
///
/// ```text
/// modis_date,calendar_date,band,tile,proc_date,pixel,value,scale
/// A2003001,2003-01-01,Lai_500m,h18v03,2015...,0,12,0.1
/// ```
pub struct SubsetLongParser;

impl Default for SubsetLongParser {
    fn default() -> Self {
        Self
    }
}

enum DateColumn {
    Calendar(usize),
    Modis(usize),
}

struct ColumnIndex {
    pixel: usize,
    value: usize,
    date: DateColumn,
    scale: Option<usize>,
    band: Option<usize>,
}

impl SubsetLongParser {
    const NAME: &'static str = "ORNL_SUBSET_LONG";

    fn locate_columns(header: &StringRecord) -> Result<ColumnIndex, ParserError> {
        let find = |name: &str| {
            header
                .iter()
                .position(|column| column.trim().eq_ignore_ascii_case(name))
        };

        let pixel = find("pixel").ok_or_else(|| Self::mismatch("missing 'pixel' column"))?;
        let value = find("value").ok_or_else(|| Self::mismatch("missing 'value' column"))?;
        let date = match (find("calendar_date").or_else(|| find("date")), find("modis_date")) {
            (Some(idx), _) => DateColumn::Calendar(idx),
            (None, Some(idx)) => DateColumn::Modis(idx),
            (None, None) => {
                return Err(Self::mismatch(
                    "missing 'calendar_date' (or 'modis_date') column",
                ))
            }
        };

        Ok(ColumnIndex {
            pixel,
            value,
            date,
            scale: find("scale"),
            band: find("band"),
        })
    }

    fn mismatch(reason: impl Into<String>) -> ParserError {
        ParserError::FormatMismatch {
            parser: Self::NAME,
            reason: reason.into(),
        }
    }

    fn field<'r>(
        record: &'r StringRecord,
        index: usize,
        line_index: usize,
    ) -> Result<&'r str, ParserError> {
        record.get(index).ok_or_else(|| ParserError::DataRow {
            parser: Self::NAME,
            line_index,
            message: format!("row has {} fields, expected column {index}", record.len()),
        })
    }
}

impl PixelTableParser for SubsetLongParser {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(&self, content: &str) -> Result<PixelTable, ParserError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(content.as_bytes());

        let header = reader
            .headers()
            .map_err(|source| ParserError::Csv {
                parser: Self::NAME,
                source,
            })?
            .clone();
        let columns = Self::locate_columns(&header)?;

        let mut table = PixelTable::new(None);

        for (offset, record) in reader.records().enumerate() {
            // Line 1 is the header.
            let line_index = offset + 2;
            let record = record.map_err(|source| ParserError::Csv {
                parser: Self::NAME,
                source,
            })?;

            if record.iter().all(|field| field.trim().is_empty()) {
                continue;
            }

            if let Some(band_idx) = columns.band {
                let raw = Self::field(&record, band_idx, line_index)?;
                let band = Band::try_from(raw).map_err(|message| ParserError::DataRow {
                    parser: Self::NAME,
                    line_index,
                    message,
                })?;
                match table.band() {
                    None => table.set_band(band),
                    Some(first) if first != band => {
                        return Err(ParserError::MixedBands {
                            parser: Self::NAME,
                            line_index,
                            first,
                            found: band,
                        });
                    }
                    Some(_) => {}
                }
            }

            let date = match columns.date {
                DateColumn::Calendar(idx) => parse_calendar_date(
                    Self::NAME,
                    Self::field(&record, idx, line_index)?,
                    line_index,
                )?,
                DateColumn::Modis(idx) => {
                    let raw = Self::field(&record, idx, line_index)?;
                    parse_modis_date(raw).ok_or_else(|| ParserError::DataRow {
                        parser: Self::NAME,
                        line_index,
                        message: format!("invalid MODIS date '{}'", raw.trim()),
                    })?
                }
            };

            let pixel = parse_pixel_id(
                Self::NAME,
                Self::field(&record, columns.pixel, line_index)?,
                line_index,
            )?;
            let value = parse_optional_f64(
                Self::NAME,
                Self::field(&record, columns.value, line_index)?,
                line_index,
                "value",
            )?;
            let scale = match columns.scale {
                Some(idx) => parse_scale(Self::field(&record, idx, line_index)?),
                None => None,
            };

            table
                .insert(pixel, date, value, scale)
                .map_err(|duplicate| ParserError::DuplicateObservation {
                    parser: Self::NAME,
                    line_index,
                    pixel: duplicate.pixel,
                    date: duplicate.date,
                })?;
        }

        if table.is_empty() {
            return Err(ParserError::EmptyData { parser: Self::NAME });
        }

        Ok(table)
    }
}
