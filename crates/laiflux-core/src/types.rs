// crates/laiflux-core/src/types.rs

use chrono::{NaiveDate, NaiveDateTime};
use laiflux_parser::{Band, PixelId, PixelTable};
use ndarray::Array2;

use crate::error::{ReconstructionError, Result};

/// The three raw tables of one station, keyed by (pixel, date).
#[derive(Debug, Clone)]
pub struct StationTables {
    pub lai: PixelTable,
    pub std_dev: PixelTable,
    pub qc: PixelTable,
}

impl StationTables {
    pub fn table(&self, band: Band) -> &PixelTable {
        match band {
            Band::Lai => &self.lai,
            Band::LaiStdDev => &self.std_dev,
            Band::FparLaiQc => &self.qc,
        }
    }
}

/// Selected neighbourhood of one station as `[timestep, pixel]` arrays.
///
/// LAI and standard deviation are already scaled; cells without a value are NaN.
/// QC codes outside the 16-bit range or without a value are `None`.
#[derive(Debug, Clone)]
pub struct PixelGrid {
    dates: Vec<NaiveDate>,
    pixels: Vec<PixelId>,
    lai: Array2<f64>,
    std_dev: Array2<f64>,
    qc: Array2<Option<u16>>,
}

impl PixelGrid {
    pub fn new(
        dates: Vec<NaiveDate>,
        pixels: Vec<PixelId>,
        lai: Array2<f64>,
        std_dev: Array2<f64>,
        qc: Array2<Option<u16>>,
    ) -> Result<Self> {
        let expected = (dates.len(), pixels.len());
        for (name, shape) in [
            ("lai", lai.dim()),
            ("std_dev", std_dev.dim()),
            ("qc", qc.dim()),
        ] {
            if shape != expected {
                return Err(ReconstructionError::GridShape(format!(
                    "{name} grid has shape {shape:?}, expected {expected:?}"
                )));
            }
        }
        Ok(Self {
            dates,
            pixels,
            lai,
            std_dev,
            qc,
        })
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn pixels(&self) -> &[PixelId] {
        &self.pixels
    }

    pub fn lai(&self) -> &Array2<f64> {
        &self.lai
    }

    pub fn std_dev(&self) -> &Array2<f64> {
        &self.std_dev
    }

    pub fn qc(&self) -> &Array2<Option<u16>> {
        &self.qc
    }

    pub fn timesteps(&self) -> usize {
        self.dates.len()
    }
}

/// One inverse-variance weighted LAI value per raw time step; `None` marks a step
/// where every pixel was masked.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatiallyWeightedSeries {
    pub dates: Vec<NaiveDate>,
    pub values: Vec<Option<f64>>,
}

impl SpatiallyWeightedSeries {
    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|value| value.is_none()).count()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Final LAI on the model time axis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconstructedSeries {
    pub timestamps: Vec<NaiveDateTime>,
    pub values: Vec<f64>,
}

impl ReconstructedSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
