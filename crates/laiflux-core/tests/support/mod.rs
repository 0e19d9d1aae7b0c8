#![allow(dead_code)]

use chrono::NaiveDate;
use laiflux_core::calendar::RegularCalendar;
use laiflux_core::StationTables;
use laiflux_parser::{Band, PixelId, PixelTable};

/// Pixels in a 5x5 subset.
pub const GRID_PIXELS: u32 = 25;

/// One pixel observation in physical units.
#[derive(Debug, Clone, Copy)]
pub struct Cell {
    pub lai: f64,
    pub std_dev: f64,
    pub qc: u16,
}

impl Cell {
    pub fn good(lai: f64) -> Self {
        Self {
            lai,
            std_dev: 0.5,
            qc: 0,
        }
    }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// MODIS composite dates for every year in `[first_year, last_year]`.
pub fn composite_dates(first_year: i32, last_year: i32) -> Vec<NaiveDate> {
    RegularCalendar::for_years(first_year, last_year).dates().to_vec()
}

/// Builds the three tables of a 5x5 subset, storing raw digital numbers with a 0.1
/// scale as the ORNL subsets do.
pub fn station_tables(dates: &[NaiveDate], cell: impl Fn(usize, PixelId) -> Cell) -> StationTables {
    let mut lai = PixelTable::new(Some(Band::Lai));
    let mut std_dev = PixelTable::new(Some(Band::LaiStdDev));
    let mut qc = PixelTable::new(Some(Band::FparLaiQc));

    for pixel in (0..GRID_PIXELS).map(PixelId) {
        for (step, date) in dates.iter().enumerate() {
            let value = cell(step, pixel);
            lai.insert(pixel, *date, Some(value.lai * 10.0), Some(0.1)).unwrap();
            std_dev
                .insert(pixel, *date, Some(value.std_dev * 10.0), Some(0.1))
                .unwrap();
            qc.insert(pixel, *date, Some(f64::from(value.qc)), None).unwrap();
        }
    }

    StationTables { lai, std_dev, qc }
}
