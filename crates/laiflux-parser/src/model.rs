use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// MODIS MOD15A2H science datasets carried by the per-station pixel tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Band {
    Lai,
    LaiStdDev,
    FparLaiQc,
}

impl Band {
    pub fn as_str(&self) -> &'static str {
        match self {
            Band::Lai => "Lai_500m",
            Band::LaiStdDev => "LaiStdDev_500m",
            Band::FparLaiQc => "FparLai_QC",
        }
    }

    /// Scale factor published with the product, used when a table does not declare one.
    pub fn default_scale(&self) -> Option<f64> {
        match self {
            Band::Lai | Band::LaiStdDev => Some(0.1),
            Band::FparLaiQc => None,
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Band {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "lai_500m" | "lai" => Ok(Band::Lai),
            "laistddev_500m" | "laistddev" | "lai_sd" => Ok(Band::LaiStdDev),
            "fparlai_qc" | "qc" => Ok(Band::FparLaiQc),
            other => Err(format!("unknown MODIS band '{other}'")),
        }
    }
}

/// Position of a pixel inside the row-major subset grid delivered for a station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PixelId(pub u32);

impl PixelId {
    pub fn index(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for PixelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<&str> for PixelId {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        // Some exports write integral columns as floats ("12.0").
        let integral = trimmed.strip_suffix(".0").unwrap_or(trimmed);
        integral
            .parse::<u32>()
            .map(PixelId)
            .map_err(|err| format!("invalid pixel identifier '{trimmed}': {err}"))
    }
}

/// A (pixel, date) key seen twice in one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuplicateRecord {
    pub pixel: PixelId,
    pub date: NaiveDate,
}

impl fmt::Display for DuplicateRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "duplicate record for pixel {} on {}", self.pixel, self.date)
    }
}

/// Keyed form of one tabular source: raw values addressed by (pixel, calendar date).
///
/// A `None` value is a cell that exists in the source but carries no number. Scale
/// factors are recorded once per pixel; the first declaration wins.
#[derive(Debug, Clone, Default)]
pub struct PixelTable {
    band: Option<Band>,
    values: BTreeMap<(PixelId, NaiveDate), Option<f64>>,
    scales: BTreeMap<PixelId, Option<f64>>,
}

impl PixelTable {
    pub fn new(band: Option<Band>) -> Self {
        Self {
            band,
            values: BTreeMap::new(),
            scales: BTreeMap::new(),
        }
    }

    pub fn band(&self) -> Option<Band> {
        self.band
    }

    pub(crate) fn set_band(&mut self, band: Band) {
        self.band = Some(band);
    }

    /// Assigns the band of a table whose source did not declare one.
    pub fn with_band(mut self, band: Band) -> Self {
        self.band = Some(band);
        self
    }

    /// Inserts one observation, rejecting a second record for the same key.
    ///
    /// The first declared scale of a pixel wins; rows without a scale never clear it.
    pub fn insert(
        &mut self,
        pixel: PixelId,
        date: NaiveDate,
        value: Option<f64>,
        scale: Option<f64>,
    ) -> Result<(), DuplicateRecord> {
        if self.values.contains_key(&(pixel, date)) {
            return Err(DuplicateRecord { pixel, date });
        }
        self.values.insert((pixel, date), value);
        let declared = self.scales.entry(pixel).or_insert(None);
        if declared.is_none() {
            *declared = scale;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn observation_count(&self) -> usize {
        self.values.len()
    }

    pub fn pixel_count(&self) -> usize {
        self.scales.len()
    }

    pub fn pixels(&self) -> impl Iterator<Item = PixelId> + '_ {
        self.scales.keys().copied()
    }

    pub fn contains_pixel(&self, pixel: PixelId) -> bool {
        self.scales.contains_key(&pixel)
    }

    /// Observation dates of one pixel in ascending order.
    pub fn dates(&self, pixel: PixelId) -> Vec<NaiveDate> {
        self.values
            .range((pixel, NaiveDate::MIN)..=(pixel, NaiveDate::MAX))
            .map(|((_, date), _)| *date)
            .collect()
    }

    /// `None` when the record is absent, `Some(None)` when it is present but empty.
    pub fn value(&self, pixel: PixelId, date: NaiveDate) -> Option<Option<f64>> {
        self.values.get(&(pixel, date)).copied()
    }

    /// Declared scale of the pixel, falling back to the band's published factor.
    pub fn scale(&self, pixel: PixelId) -> Option<f64> {
        self.scales
            .get(&pixel)
            .copied()
            .flatten()
            .or_else(|| self.band.and_then(|band| band.default_scale()))
    }

    /// Long-format frame with `pixel`, `calendar_date`, `value` and `scale` columns.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let len = self.values.len();
        let mut pixels = Vec::with_capacity(len);
        let mut dates = Vec::with_capacity(len);
        let mut values = Vec::with_capacity(len);
        let mut scales = Vec::with_capacity(len);

        for ((pixel, date), value) in &self.values {
            pixels.push(pixel.index());
            dates.push(days_since_epoch(*date));
            values.push(*value);
            scales.push(self.scale(*pixel));
        }

        let date_series = Series::new("calendar_date".into(), dates).cast(&DataType::Date)?;

        DataFrame::new(vec![
            Series::new("pixel".into(), pixels).into(),
            date_series.into(),
            Series::new("value".into(), values).into(),
            Series::new("scale".into(), scales).into(),
        ])
    }
}

fn days_since_epoch(date: NaiveDate) -> i32 {
    (date - DateTime::UNIX_EPOCH.date_naive()).num_days() as i32
}
