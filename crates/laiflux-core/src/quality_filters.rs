use ndarray::{Array2, Zip};
use tracing::debug;

use crate::config::QualityConfig;
use crate::types::{PixelGrid, SpatiallyWeightedSeries};

/// Weighted spatial mean plus the normalised weights that produced it.
#[derive(Debug, Clone)]
pub struct SpatialAggregate {
    pub mask: Array2<bool>,
    /// Zero for masked cells; each row with at least one kept cell sums to one.
    pub weights: Array2<f64>,
    pub series: SpatiallyWeightedSeries,
}

/// A cell is kept when its QC code is accepted, its standard deviation reaches the
/// floor and its LAI stays under the ceiling. NaN inputs are never kept.
pub fn build_quality_mask(grid: &PixelGrid, config: &QualityConfig) -> Array2<bool> {
    let mut mask = Array2::from_elem(grid.lai().dim(), false);
    Zip::from(&mut mask)
        .and(grid.lai())
        .and(grid.std_dev())
        .and(grid.qc())
        .for_each(|keep, &lai, &std_dev, &qc| {
            let qc_ok = qc.is_some_and(|code| config.accepted_qc.contains(&code));
            *keep = qc_ok
                && std_dev.is_finite()
                && std_dev >= config.min_std_dev
                && lai.is_finite()
                && lai <= config.max_lai;
        });
    mask
}

pub fn aggregate_spatially(grid: &PixelGrid, config: &QualityConfig) -> SpatialAggregate {
    let mask = build_quality_mask(grid, config);
    let mut weights = Array2::<f64>::zeros(mask.dim());
    let mut values = Vec::with_capacity(grid.timesteps());

    for (row, date) in grid.dates().iter().enumerate() {
        let keep = mask.row(row);
        let lai = grid.lai().row(row);
        let std_dev = grid.std_dev().row(row);

        let mut total = 0.0;
        for col in 0..keep.len() {
            if keep[col] {
                let inverse_variance = 1.0 / (std_dev[col] * std_dev[col]);
                weights[[row, col]] = inverse_variance;
                total += inverse_variance;
            }
        }

        if total == 0.0 {
            debug!(%date, "all pixels masked");
            values.push(None);
            continue;
        }

        let mut weighted = 0.0;
        for col in 0..keep.len() {
            if keep[col] {
                weights[[row, col]] /= total;
                weighted += weights[[row, col]] * lai[col];
            }
        }
        values.push(Some(weighted));
    }

    let series = SpatiallyWeightedSeries {
        dates: grid.dates().to_vec(),
        values,
    };
    debug!(
        steps = series.len(),
        masked_steps = series.missing_count(),
        "aggregated pixel neighbourhood"
    );

    SpatialAggregate {
        mask,
        weights,
        series,
    }
}
