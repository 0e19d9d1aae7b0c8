use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::config::OutputConfig;
use crate::error::{ReconstructionError, Result};
use crate::types::ReconstructedSeries;

const MINUTES_PER_DAY: i64 = 24 * 60;

/// Last timestamp of the output grid when no explicit end is configured: the final
/// cadence step of December 31 of `year`.
pub fn default_extend_to(year: i32, cadence_minutes: u32) -> Result<NaiveDateTime> {
    let new_years_eve = NaiveDate::from_ymd_opt(year, 12, 31).ok_or_else(|| {
        ReconstructionError::InvalidConfig(format!("year {year} is out of range"))
    })?;
    Ok(new_years_eve.and_time(NaiveTime::MIN)
        + Duration::minutes(MINUTES_PER_DAY - i64::from(cadence_minutes)))
}

/// Step-holds the 8-day values onto a regular grid anchored at midnight of the first
/// date, forward-filled up to `extend_to` and clipped to the inclusive `[start, end]`.
///
/// A window that misses the grid entirely yields an empty series.
pub fn step_hold(
    dates: &[NaiveDate],
    values: &[f64],
    start: NaiveDateTime,
    end: NaiveDateTime,
    extend_to: NaiveDateTime,
    config: &OutputConfig,
) -> Result<ReconstructedSeries> {
    if dates.len() != values.len() {
        return Err(ReconstructionError::GridShape(format!(
            "{} dates for {} values",
            dates.len(),
            values.len()
        )));
    }
    let Some(first) = dates.first() else {
        return Ok(ReconstructedSeries::default());
    };

    let cadence = i64::from(config.cadence_minutes);
    if cadence == 0 {
        return Err(ReconstructionError::InvalidConfig(
            "output cadence must be positive".to_string(),
        ));
    }

    let anchor = first.and_time(NaiveTime::MIN);
    let from = start.max(anchor);
    let until = end.min(extend_to);
    if from > until {
        return Ok(ReconstructedSeries::default());
    }

    let mut first_step = (from - anchor).num_minutes() / cadence;
    if anchor + Duration::minutes(first_step * cadence) < from {
        first_step += 1;
    }
    let last_step = (until - anchor).num_minutes() / cadence;
    if first_step > last_step {
        return Ok(ReconstructedSeries::default());
    }

    let capacity = usize::try_from(last_step - first_step + 1).unwrap_or_default();
    let mut series = ReconstructedSeries {
        timestamps: Vec::with_capacity(capacity),
        values: Vec::with_capacity(capacity),
    };

    let mut held = 0;
    for step_index in first_step..=last_step {
        let timestamp = anchor + Duration::minutes(step_index * cadence);
        let day = timestamp.date();
        while held + 1 < dates.len() && dates[held + 1] <= day {
            held += 1;
        }
        series.timestamps.push(timestamp);
        series.values.push(values[held]);
    }

    Ok(series)
}
