use chrono::NaiveDate;
use ndarray::{Array1, Array2, Axis};
use tracing::debug;

use crate::calendar::RegularizedLai;
use crate::config::SmoothingConfig;
use crate::error::Result;
use crate::smoothing::{centered_rolling_mean, savitzky_golay};

/// Mean seasonal cycle, one value per calendar slot.
#[derive(Debug, Clone, PartialEq)]
pub struct ClimatologyProfile {
    /// Per-slot mean across years, ignoring NaN.
    pub raw: Array1<f64>,
    pub smoothed: Array1<f64>,
}

/// Split of a `[year, slot]` matrix into its per-slot mean and the deviation from it.
#[derive(Debug, Clone)]
pub struct Decomposition {
    pub climatology: Array1<f64>,
    pub anomaly: Array2<f64>,
}

impl Decomposition {
    /// Adds the climatology back onto every year of the anomaly.
    pub fn recompose(&self) -> Array2<f64> {
        &self.anomaly + &self.climatology
    }
}

/// Dense 8-day LAI after recombining the smoothed anomaly and climatology.
#[derive(Debug, Clone)]
pub struct SmoothedLai {
    pub dates: Vec<NaiveDate>,
    pub values: Vec<f64>,
    pub climatology: ClimatologyProfile,
}

/// Per-slot mean over years. A slot without any finite value stays NaN.
pub fn slot_means(matrix: &Array2<f64>) -> Array1<f64> {
    matrix
        .axis_iter(Axis(1))
        .map(|slot| {
            let (sum, count) = slot
                .iter()
                .filter(|value| !value.is_nan())
                .fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
            if count > 0 {
                sum / count as f64
            } else {
                f64::NAN
            }
        })
        .collect()
}

pub fn decompose(matrix: &Array2<f64>) -> Decomposition {
    let climatology = slot_means(matrix);
    let anomaly = matrix - &climatology;
    Decomposition {
        climatology,
        anomaly,
    }
}

/// Smooths the climatology and anomaly separately and recombines them.
pub fn smooth(regular: &RegularizedLai, config: &SmoothingConfig) -> Result<SmoothedLai> {
    let decomposition = decompose(&regular.matrix);
    let raw = decomposition.climatology;
    let smoothed = Array1::from(savitzky_golay(
        &raw.to_vec(),
        config.savgol_window,
        config.savgol_order,
    )?);

    let flat_anomaly: Vec<f64> = decomposition.anomaly.iter().copied().collect();
    let smooth_anomaly = centered_rolling_mean(&flat_anomaly, config.anomaly_window);

    let slots = smoothed.len();
    let values: Vec<f64> = smooth_anomaly
        .iter()
        .enumerate()
        .map(|(idx, anomaly)| anomaly + smoothed[idx % slots])
        .collect();

    debug!(
        years = regular.years.len(),
        savgol_window = config.savgol_window,
        anomaly_window = config.anomaly_window,
        "smoothed climatology and anomaly"
    );

    Ok(SmoothedLai {
        dates: regular.dates.clone(),
        values,
        climatology: ClimatologyProfile { raw, smoothed },
    })
}
