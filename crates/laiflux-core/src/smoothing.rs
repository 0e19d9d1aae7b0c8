use nalgebra::DMatrix;

use crate::error::{ReconstructionError, Result};

/// Savitzky-Golay filter with interpolating edges.
///
/// Every full window is fitted with a polynomial of degree `order` by least squares.
/// Interior samples take the fit at the window centre; the first and last `window / 2`
/// samples are evaluated from the fit of the first and last full window.
pub fn savitzky_golay(data: &[f64], window: usize, order: usize) -> Result<Vec<f64>> {
    if window % 2 == 0 || order >= window {
        return Err(ReconstructionError::InvalidConfig(format!(
            "Savitzky-Golay needs an odd window above the order, got window {window} order {order}"
        )));
    }
    if data.len() < window {
        return Err(ReconstructionError::SeriesTooShort {
            len: data.len(),
            window,
        });
    }

    let hat = projection_matrix(window, order)?;
    let half = window / 2;
    let last_start = data.len() - window;

    let smoothed: Vec<f64> = (0..data.len())
        .map(|i| {
            let start = i.saturating_sub(half).min(last_start);
            let row = hat.row(i - start);
            data[start..start + window]
                .iter()
                .enumerate()
                .map(|(k, value)| row[k] * value)
                .sum::<f64>()
        })
        .collect();
    Ok(smoothed)
}

/// `V (VᵀV)⁻¹ Vᵀ` for the Vandermonde matrix of centred positions in one window.
/// Row `p` holds the weights giving the fitted value at position `p`.
fn projection_matrix(window: usize, order: usize) -> Result<DMatrix<f64>> {
    let centre = (window / 2) as f64;
    let vandermonde = DMatrix::from_fn(window, order + 1, |row, power| {
        (row as f64 - centre).powi(power as i32)
    });
    let transposed = vandermonde.transpose();
    let normal = &transposed * &vandermonde;
    let inverse = normal.try_inverse().ok_or_else(|| {
        ReconstructionError::InvalidConfig(format!(
            "Savitzky-Golay normal equations are singular for window {window} order {order}"
        ))
    })?;
    Ok(&vandermonde * inverse * transposed)
}

/// Centred moving average that shrinks at both ends and skips NaN samples.
/// A window holding no finite sample yields NaN.
pub fn centered_rolling_mean(data: &[f64], window: usize) -> Vec<f64> {
    let half = window / 2;
    let len = data.len();
    (0..len)
        .map(|t| {
            let start = t.saturating_sub(half);
            let end = (t + half + 1).min(len);
            let (sum, count) = data[start..end]
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
