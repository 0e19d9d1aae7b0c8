use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate};
use ndarray::Array2;
use tracing::{debug, info};

use crate::config::{CalendarConfig, GapFillStrategy};
use crate::error::{ReconstructionError, Result};
use crate::interpolation::InterpolatedSeries;

/// Length of a MOD15A2H compositing period.
pub const COMPOSITE_STEP_DAYS: i64 = 8;
/// Composites per calendar year; the last one of each year is shorter.
pub const SLOTS_PER_YEAR: usize = 46;

/// Expected composite dates: every eighth day from January 1 of each year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegularCalendar {
    years: Vec<i32>,
    dates: Vec<NaiveDate>,
}

impl RegularCalendar {
    pub fn for_years(first_year: i32, last_year: i32) -> Self {
        let years: Vec<i32> = (first_year..=last_year).collect();
        let dates = years.iter().flat_map(|&year| Self::year_dates(year)).collect();
        Self { years, dates }
    }

    pub fn year_dates(year: i32) -> Vec<NaiveDate> {
        let Some(jan_first) = NaiveDate::from_ymd_opt(year, 1, 1) else {
            return Vec::new();
        };
        (0..SLOTS_PER_YEAR as i64)
            .map(|slot| jan_first + Duration::days(slot * COMPOSITE_STEP_DAYS))
            .collect()
    }

    pub fn years(&self) -> &[i32] {
        &self.years
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }
}

/// Gap-free `[year, slot]` LAI matrix over the retained years.
#[derive(Debug, Clone)]
pub struct RegularizedLai {
    pub years: Vec<i32>,
    /// Calendar dates of the retained years in flattened (row-major) order.
    pub dates: Vec<NaiveDate>,
    pub matrix: Array2<f64>,
    /// Flattened positions that had no observation and were filled.
    pub filled_slots: Vec<usize>,
}

/// Places the interpolated series on the regular calendar, trims boundary years and
/// fills calendar slots that were never observed.
pub fn regularize(series: &InterpolatedSeries, config: &CalendarConfig) -> Result<RegularizedLai> {
    let (Some(first), Some(last)) = (series.dates.first(), series.dates.last()) else {
        return Err(ReconstructionError::EmptyInput(
            "interpolated series has no dates".to_string(),
        ));
    };
    let (first_year, last_year) = (first.year(), last.year());
    let calendar = RegularCalendar::for_years(first_year, last_year);

    let observed: HashMap<NaiveDate, f64> = series
        .dates
        .iter()
        .copied()
        .zip(series.values.iter().copied())
        .collect();

    let trim = usize::from(config.drop_boundary_years);
    let (lowest, highest) = config.supported_years;
    let years: Vec<(usize, i32)> = calendar
        .years()
        .iter()
        .copied()
        .enumerate()
        .skip(trim)
        .take(calendar.years().len().saturating_sub(2 * trim))
        .filter(|(_, year)| (lowest..=highest).contains(year))
        .collect();

    if years.is_empty() {
        return Err(ReconstructionError::NoRetainedYears {
            first_year,
            last_year,
        });
    }

    let mut dates = Vec::with_capacity(years.len() * SLOTS_PER_YEAR);
    let mut flat = Vec::with_capacity(years.len() * SLOTS_PER_YEAR);
    for &(row, _) in &years {
        let row_dates = &calendar.dates()[row * SLOTS_PER_YEAR..(row + 1) * SLOTS_PER_YEAR];
        for date in row_dates {
            dates.push(*date);
            flat.push(observed.get(date).copied().unwrap_or(f64::NAN));
        }
    }

    let filled_slots = fill_calendar_gaps(&mut flat, &dates, config.gap_fill)?;
    let retained: Vec<i32> = years.iter().map(|(_, year)| *year).collect();

    info!(
        first_year = retained[0],
        last_year = retained[retained.len() - 1],
        years = retained.len(),
        filled = filled_slots.len(),
        "regularized composites onto calendar"
    );

    let matrix = Array2::from_shape_vec((retained.len(), SLOTS_PER_YEAR), flat)
        .map_err(|err| ReconstructionError::GridShape(err.to_string()))?;

    Ok(RegularizedLai {
        years: retained,
        dates,
        matrix,
        filled_slots,
    })
}

/// Fills NaN runs in flattened calendar order and returns the filled positions.
///
/// A single missing slot takes the mean of its two neighbours. A longer run is bridged
/// linearly between the bounding values under [`GapFillStrategy::Linear`] and rejected
/// under [`GapFillStrategy::IsolatedOnly`]. A run touching either end has only one
/// neighbour and is always an error.
pub fn fill_calendar_gaps(
    values: &mut [f64],
    dates: &[NaiveDate],
    strategy: GapFillStrategy,
) -> Result<Vec<usize>> {
    let len = values.len();
    let mut filled = Vec::new();
    let mut idx = 0;

    while idx < len {
        if !values[idx].is_nan() {
            idx += 1;
            continue;
        }

        let start = idx;
        while idx < len && values[idx].is_nan() {
            idx += 1;
        }
        let end = idx;

        if start == 0 || end == len {
            let position = if start == 0 { 0 } else { len - 1 };
            return Err(ReconstructionError::CalendarGapFillBoundaryViolation {
                position,
                date: dates[position],
            });
        }

        let run = end - start;
        if run > 1 && strategy == GapFillStrategy::IsolatedOnly {
            return Err(ReconstructionError::AdjacentCalendarGaps {
                start: dates[start],
                length: run,
            });
        }

        let before = values[start - 1];
        let after = values[end];
        for (offset, position) in (start..end).enumerate() {
            let fraction = (offset + 1) as f64 / (run + 1) as f64;
            values[position] = before + (after - before) * fraction;
            filled.push(position);
        }
        debug!(start = %dates[start], length = run, "filled calendar gap");
    }

    Ok(filled)
}
