use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::info;

use crate::calendar::{self, RegularizedLai};
use crate::climatology::{self, SmoothedLai};
use crate::config::ReconstructionConfig;
use crate::error::Result;
use crate::interpolation::{self, InterpolatedSeries};
use crate::pixel_selector;
use crate::quality_filters::{self, SpatialAggregate};
use crate::resample;
use crate::types::{PixelGrid, ReconstructedSeries, StationTables};

/// Counts reported for one station run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconstructionSummary {
    pub station: String,
    pub observation_steps: usize,
    pub pixels: usize,
    pub masked_steps: usize,
    pub interpolated_steps: usize,
    pub extrapolated_steps: usize,
    pub retained_years: Vec<i32>,
    pub calendar_gaps_filled: usize,
    pub output_rows: usize,
}

/// Every intermediate stage of one station run.
#[derive(Debug, Clone)]
pub struct LaiReconstruction {
    pub grid: PixelGrid,
    pub aggregate: SpatialAggregate,
    pub interpolated: InterpolatedSeries,
    pub regular: RegularizedLai,
    pub smoothed: SmoothedLai,
    pub series: ReconstructedSeries,
    pub summary: ReconstructionSummary,
}

/// Runs the full reconstruction for one station and returns the LAI on the output
/// cadence within `[start, end]`.
pub fn reconstruct_lai(
    tables: &StationTables,
    station_id: &str,
    start: NaiveDateTime,
    end: NaiveDateTime,
    config: &ReconstructionConfig,
) -> Result<ReconstructedSeries> {
    reconstruct_lai_detailed(tables, station_id, start, end, config).map(|run| run.series)
}

pub fn reconstruct_lai_detailed(
    tables: &StationTables,
    station_id: &str,
    start: NaiveDateTime,
    end: NaiveDateTime,
    config: &ReconstructionConfig,
) -> Result<LaiReconstruction> {
    config.validate()?;

    let grid = pixel_selector::select_pixels(tables, &config.pixels)?;
    let aggregate = quality_filters::aggregate_spatially(&grid, &config.quality);
    let interpolated = interpolation::fill_gaps(&aggregate.series, &config.interpolation)?;
    let regular = calendar::regularize(&interpolated, &config.calendar)?;
    let smoothed = climatology::smooth(&regular, &config.smoothing)?;

    let extend_to = match config.output.extend_to {
        Some(explicit) => explicit,
        None => {
            let last_year = regular.years[regular.years.len() - 1];
            resample::default_extend_to(last_year, config.output.cadence_minutes)?
        }
    };
    let series = resample::step_hold(
        &smoothed.dates,
        &smoothed.values,
        start,
        end,
        extend_to,
        &config.output,
    )?;

    let summary = ReconstructionSummary {
        station: station_id.to_string(),
        observation_steps: grid.timesteps(),
        pixels: grid.pixels().len(),
        masked_steps: aggregate.series.missing_count(),
        interpolated_steps: interpolated.filled,
        extrapolated_steps: interpolated.extrapolated,
        retained_years: regular.years.clone(),
        calendar_gaps_filled: regular.filled_slots.len(),
        output_rows: series.len(),
    };

    info!(
        station = station_id,
        steps = summary.observation_steps,
        masked = summary.masked_steps,
        years = summary.retained_years.len(),
        rows = summary.output_rows,
        "reconstructed LAI"
    );

    Ok(LaiReconstruction {
        grid,
        aggregate,
        interpolated,
        regular,
        smoothed,
        series,
        summary,
    })
}
