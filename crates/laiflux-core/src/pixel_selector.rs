use chrono::NaiveDate;
use laiflux_parser::{Band, PixelId, PixelTable};
use ndarray::Array2;
use tracing::debug;

use crate::config::PixelSelectionConfig;
use crate::error::{ReconstructionError, Result};
use crate::types::{PixelGrid, StationTables};

/// Pixel ids of the neighbourhood, centre first, then the rest in row-major order.
pub fn neighbourhood_pixels(config: &PixelSelectionConfig) -> Vec<PixelId> {
    let size = config.grid_size;
    let centre = size / 2;
    let id = |row: u32, col: u32| PixelId(config.first_pixel_id + row * size + col);

    let mut pixels = vec![id(centre, centre)];
    for row in centre - config.radius..=centre + config.radius {
        for col in centre - config.radius..=centre + config.radius {
            if row != centre || col != centre {
                pixels.push(id(row, col));
            }
        }
    }
    pixels
}

/// Builds the `[timestep, pixel]` grids for the configured neighbourhood.
///
/// The time axis is the first `N` dates of the centre pixel in the LAI table, where
/// `N` is the smallest row count among the three tables divided by the number of LAI
/// pixels. Every selected (pixel, date) record must exist in all three tables.
pub fn select_pixels(tables: &StationTables, config: &PixelSelectionConfig) -> Result<PixelGrid> {
    let pixels = neighbourhood_pixels(config);
    let reference = pixels[0];

    for band in [Band::Lai, Band::LaiStdDev, Band::FparLaiQc] {
        let table = tables.table(band);
        if let Some(&pixel) = pixels.iter().find(|pixel| !table.contains_pixel(**pixel)) {
            return Err(ReconstructionError::MissingPixel { band, pixel });
        }
    }

    let pixel_count = tables.lai.pixel_count();
    let common_rows = tables
        .lai
        .observation_count()
        .min(tables.std_dev.observation_count())
        .min(tables.qc.observation_count());
    let steps = common_rows / pixel_count;

    let dates: Vec<NaiveDate> = tables.lai.dates(reference).into_iter().take(steps).collect();
    if dates.is_empty() {
        return Err(ReconstructionError::EmptyInput(format!(
            "reference pixel {reference} has no usable observations"
        )));
    }

    let shape = (dates.len(), pixels.len());
    let mut lai = Array2::<f64>::from_elem(shape, f64::NAN);
    let mut std_dev = Array2::<f64>::from_elem(shape, f64::NAN);
    let mut qc = Array2::<Option<u16>>::from_elem(shape, None);

    for (col, &pixel) in pixels.iter().enumerate() {
        let lai_scale = pixel_scale(&tables.lai, Band::Lai, pixel);
        let std_scale = pixel_scale(&tables.std_dev, Band::LaiStdDev, pixel);

        for (row, &date) in dates.iter().enumerate() {
            if let Some(raw) = lookup(&tables.lai, Band::Lai, pixel, date)? {
                lai[[row, col]] = raw * lai_scale;
            }
            if let Some(raw) = lookup(&tables.std_dev, Band::LaiStdDev, pixel, date)? {
                std_dev[[row, col]] = raw * std_scale;
            }
            qc[[row, col]] = lookup(&tables.qc, Band::FparLaiQc, pixel, date)?.and_then(qc_code);
        }
    }

    debug!(
        steps = dates.len(),
        pixels = pixels.len(),
        first = %dates[0],
        last = %dates[dates.len() - 1],
        "selected pixel neighbourhood"
    );

    PixelGrid::new(dates, pixels, lai, std_dev, qc)
}

fn lookup(table: &PixelTable, band: Band, pixel: PixelId, date: NaiveDate) -> Result<Option<f64>> {
    table
        .value(pixel, date)
        .ok_or(ReconstructionError::MissingObservation { band, pixel, date })
}

/// Declared scale, else the band's published factor, else unscaled.
fn pixel_scale(table: &PixelTable, band: Band, pixel: PixelId) -> f64 {
    table
        .scale(pixel)
        .or_else(|| band.default_scale())
        .unwrap_or(1.0)
}

fn qc_code(raw: f64) -> Option<u16> {
    if raw.fract() == 0.0 && (0.0..=f64::from(u16::MAX)).contains(&raw) {
        Some(raw as u16)
    } else {
        None
    }
}
