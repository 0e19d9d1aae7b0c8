use chrono::{NaiveDate, NaiveDateTime};

use crate::errors::ParserError;
use crate::model::PixelId;

pub(crate) fn parse_calendar_date(
    parser: &'static str,
    value: &str,
    line_index: usize,
) -> Result<NaiveDate, ParserError> {
    static FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"];
    let trimmed = value.trim();
    for fmt in FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Ok(date);
        }
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt.date());
    }
    Err(ParserError::DataRow {
        parser,
        line_index,
        message: format!("invalid calendar date '{trimmed}'"),
    })
}

/// Parses the `AYYYYDDD` acquisition stamp used in MODIS granule names.
pub(crate) fn parse_modis_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    let digits = trimmed.strip_prefix('A')?;
    if digits.len() != 7 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let year = digits[..4].parse::<i32>().ok()?;
    let ordinal = digits[4..].parse::<u32>().ok()?;
    NaiveDate::from_yo_opt(year, ordinal)
}

pub(crate) fn parse_pixel_id(
    parser: &'static str,
    value: &str,
    line_index: usize,
) -> Result<PixelId, ParserError> {
    PixelId::try_from(value).map_err(|message| ParserError::DataRow {
        parser,
        line_index,
        message,
    })
}

pub(crate) fn parse_optional_f64(
    parser: &'static str,
    value: &str,
    line_index: usize,
    column: &str,
) -> Result<Option<f64>, ParserError> {
    let trimmed = value.trim();
    if trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("nan")
        || trimmed.eq_ignore_ascii_case("f")
    {
        return Ok(None);
    }

    match trimmed.parse::<f64>() {
        Ok(parsed) if parsed.is_finite() => Ok(Some(parsed)),
        Ok(_) => Ok(None),
        Err(err) => Err(ParserError::DataRow {
            parser,
            line_index,
            message: format!("failed to parse column '{column}' as float: {err}"),
        }),
    }
}

/// Scale cells are free text in subset exports ("0.1", "Not Available"); only positive
/// numbers count as a declaration.
pub(crate) fn parse_scale(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|scale| scale.is_finite() && *scale > 0.0)
}
