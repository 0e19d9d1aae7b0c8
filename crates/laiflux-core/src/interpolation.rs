use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::config::InterpolationConfig;
use crate::error::{ReconstructionError, Result};
use crate::types::SpatiallyWeightedSeries;

/// Interpolating cubic spline with not-a-knot end conditions.
///
/// Outside `[x_0, x_{n-1}]` the first and last polynomial pieces are continued, so
/// evaluation extrapolates instead of clamping.
#[derive(Debug, Clone)]
pub struct CubicSpline {
    x: Vec<f64>,
    y: Vec<f64>,
    /// Second derivative at each knot.
    m: Vec<f64>,
}

impl CubicSpline {
    pub const MIN_POINTS: usize = 4;

    /// `x` must be strictly increasing and hold at least four knots.
    pub fn not_a_knot(x: &[f64], y: &[f64]) -> Result<Self> {
        let n = x.len();
        if n < Self::MIN_POINTS || y.len() != n {
            return Err(ReconstructionError::InsufficientPointsForInterpolation {
                found: n.min(y.len()),
                required: Self::MIN_POINTS,
            });
        }

        let h: Vec<f64> = x.windows(2).map(|pair| pair[1] - pair[0]).collect();
        let slope: Vec<f64> = (0..n - 1).map(|i| (y[i + 1] - y[i]) / h[i]).collect();

        // Tridiagonal system in the interior second derivatives m[1..n-1]; the
        // not-a-knot rows are folded into the first and last equations.
        let k = n - 2;
        let mut sub = vec![0.0; k];
        let mut diag = vec![0.0; k];
        let mut sup = vec![0.0; k];
        let mut rhs = vec![0.0; k];
        for j in 0..k {
            let i = j + 1;
            sub[j] = h[i - 1];
            diag[j] = 2.0 * (h[i - 1] + h[i]);
            sup[j] = h[i];
            rhs[j] = 6.0 * (slope[i] - slope[i - 1]);
        }

        let (h0, h1) = (h[0], h[1]);
        diag[0] += h0 * (h0 + h1) / h1;
        sup[0] -= h0 * h0 / h1;
        sub[0] = 0.0;

        let (p, q) = (h[n - 3], h[n - 2]);
        diag[k - 1] += q * (p + q) / p;
        sub[k - 1] -= q * q / p;
        sup[k - 1] = 0.0;

        for j in 1..k {
            let factor = sub[j] / diag[j - 1];
            diag[j] -= factor * sup[j - 1];
            rhs[j] -= factor * rhs[j - 1];
        }
        let mut interior = vec![0.0; k];
        interior[k - 1] = rhs[k - 1] / diag[k - 1];
        for j in (0..k - 1).rev() {
            interior[j] = (rhs[j] - sup[j] * interior[j + 1]) / diag[j];
        }

        let mut m = Vec::with_capacity(n);
        m.push(((h0 + h1) * interior[0] - h0 * interior[1]) / h1);
        m.extend_from_slice(&interior);
        m.push(((p + q) * interior[k - 1] - q * interior[k - 2]) / p);

        Ok(Self {
            x: x.to_vec(),
            y: y.to_vec(),
            m,
        })
    }

    pub fn evaluate(&self, at: f64) -> f64 {
        let last = self.x.len() - 2;
        let i = self
            .x
            .partition_point(|&knot| knot <= at)
            .saturating_sub(1)
            .min(last);

        let (x0, x1) = (self.x[i], self.x[i + 1]);
        let (y0, y1) = (self.y[i], self.y[i + 1]);
        let (m0, m1) = (self.m[i], self.m[i + 1]);
        let h = x1 - x0;
        let left = x1 - at;
        let right = at - x0;

        m0 * left.powi(3) / (6.0 * h)
            + m1 * right.powi(3) / (6.0 * h)
            + (y0 / h - m0 * h / 6.0) * left
            + (y1 / h - m1 * h / 6.0) * right
    }
}

/// Dense LAI per raw observation step.
#[derive(Debug, Clone, PartialEq)]
pub struct InterpolatedSeries {
    pub dates: Vec<NaiveDate>,
    pub values: Vec<f64>,
    /// Steps that were missing before interpolation.
    pub filled: usize,
    /// Filled steps lying outside the first/last observed step.
    pub extrapolated: usize,
}

/// Fills every missing step from a cubic spline through the observed steps (indexed
/// by position), clamps negatives to zero and optionally pins the final step to zero.
pub fn fill_gaps(
    series: &SpatiallyWeightedSeries,
    config: &InterpolationConfig,
) -> Result<InterpolatedSeries> {
    let (known_x, known_y): (Vec<f64>, Vec<f64>) = series
        .values
        .iter()
        .enumerate()
        .filter_map(|(idx, value)| value.filter(|v| v.is_finite()).map(|v| (idx as f64, v)))
        .unzip();

    let required = config.min_points.max(CubicSpline::MIN_POINTS);
    if known_x.len() < required {
        return Err(ReconstructionError::InsufficientPointsForInterpolation {
            found: known_x.len(),
            required,
        });
    }

    let spline = CubicSpline::not_a_knot(&known_x, &known_y)?;
    let first_known = known_x[0];
    let last_known = known_x[known_x.len() - 1];

    let mut filled = 0;
    let mut extrapolated = 0;
    let mut values: Vec<f64> = series
        .values
        .iter()
        .enumerate()
        .map(|(idx, value)| match value.filter(|v| v.is_finite()) {
            Some(observed) => observed,
            None => {
                let at = idx as f64;
                filled += 1;
                if at < first_known || at > last_known {
                    extrapolated += 1;
                }
                spline.evaluate(at)
            }
        })
        .collect();

    for value in values.iter_mut() {
        if *value < 0.0 {
            *value = 0.0;
        }
    }
    if config.force_last_zero {
        if let Some(last) = values.last_mut() {
            *last = 0.0;
        }
    }

    if extrapolated > 0 {
        warn!(extrapolated, "extrapolated LAI beyond the observed record");
    }
    debug!(filled, steps = values.len(), "interpolated weighted series");

    Ok(InterpolatedSeries {
        dates: series.dates.clone(),
        values,
        filled,
        extrapolated,
    })
}
