use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use laiflux_parser::Band;
use serde::Deserialize;

use crate::error::{ReconstructionError, Result};

/// Tunables of the reconstruction. Every field has a default matching the reference
/// processing of the ICOS station set, so an empty TOML document is a valid config.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReconstructionConfig {
    pub pixels: PixelSelectionConfig,
    pub quality: QualityConfig,
    pub interpolation: InterpolationConfig,
    pub calendar: CalendarConfig,
    pub smoothing: SmoothingConfig,
    pub output: OutputConfig,
    pub tables: TableLayout,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PixelSelectionConfig {
    /// Side length of the square subset delivered per station.
    pub grid_size: u32,
    /// Neighbourhood radius around the centre pixel (1 => 3x3).
    pub radius: u32,
    /// Identifier of the top-left pixel in the subset tables.
    pub first_pixel_id: u32,
}

impl Default for PixelSelectionConfig {
    fn default() -> Self {
        Self {
            grid_size: 5,
            radius: 1,
            first_pixel_id: 0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QualityConfig {
    pub accepted_qc: Vec<u16>,
    pub min_std_dev: f64,
    pub max_lai: f64,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            accepted_qc: vec![0, 2, 24, 26, 32, 34, 56, 58],
            min_std_dev: 0.1,
            max_lai: 10.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InterpolationConfig {
    pub min_points: usize,
    /// Pins the last interpolated composite to zero, as the reference processing does.
    pub force_last_zero: bool,
}

impl Default for InterpolationConfig {
    fn default() -> Self {
        Self {
            min_points: 4,
            force_last_zero: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapFillStrategy {
    /// Single gaps take the neighbour mean, longer runs are bridged linearly.
    Linear,
    /// Single gaps take the neighbour mean, longer runs are rejected.
    IsolatedOnly,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CalendarConfig {
    /// Discard the first and last observed calendar years as partial.
    pub drop_boundary_years: bool,
    /// Inclusive range of years kept after boundary trimming.
    pub supported_years: (i32, i32),
    pub gap_fill: GapFillStrategy,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            drop_boundary_years: true,
            supported_years: (2003, 2023),
            gap_fill: GapFillStrategy::Linear,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SmoothingConfig {
    pub savgol_window: usize,
    pub savgol_order: usize,
    pub anomaly_window: usize,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            savgol_window: 13,
            savgol_order: 3,
            anomaly_window: 13,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub cadence_minutes: u32,
    /// Last timestamp of the forward-filled series. Defaults to the final half hour of
    /// the last retained year.
    pub extend_to: Option<NaiveDateTime>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            cadence_minutes: 30,
            extend_to: None,
        }
    }
}

/// File name templates of the per-station tables; `{station}` is substituted.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TableLayout {
    pub lai: String,
    pub std_dev: String,
    pub qc: String,
}

impl Default for TableLayout {
    fn default() -> Self {
        Self {
            lai: "{station}_Lai_500m.csv".to_string(),
            std_dev: "{station}_LaiStdDev_500m.csv".to_string(),
            qc: "{station}_FparLai_QC.csv".to_string(),
        }
    }
}

impl TableLayout {
    pub fn path_for(&self, dir: &Path, station: &str, band: Band) -> PathBuf {
        let template = match band {
            Band::Lai => &self.lai,
            Band::LaiStdDev => &self.std_dev,
            Band::FparLaiQc => &self.qc,
        };
        dir.join(template.replace("{station}", station))
    }
}

impl ReconstructionConfig {
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| Err(ReconstructionError::InvalidConfig(message));

        let pixels = &self.pixels;
        if pixels.grid_size % 2 == 0 {
            return invalid(format!("pixels.grid_size must be odd, got {}", pixels.grid_size));
        }
        if pixels.radius > pixels.grid_size / 2 {
            return invalid(format!(
                "pixels.radius {} does not fit a {}x{} grid",
                pixels.radius, pixels.grid_size, pixels.grid_size
            ));
        }

        if self.quality.accepted_qc.is_empty() {
            return invalid("quality.accepted_qc must not be empty".to_string());
        }
        if !(self.quality.min_std_dev > 0.0) {
            return invalid("quality.min_std_dev must be positive".to_string());
        }

        if self.interpolation.min_points < 4 {
            return invalid("interpolation.min_points must be at least 4 for a cubic".to_string());
        }

        let (first, last) = self.calendar.supported_years;
        if first > last {
            return invalid(format!("calendar.supported_years [{first}, {last}] is empty"));
        }

        let smoothing = &self.smoothing;
        for (name, window) in [
            ("smoothing.savgol_window", smoothing.savgol_window),
            ("smoothing.anomaly_window", smoothing.anomaly_window),
        ] {
            if window == 0 || window % 2 == 0 {
                return invalid(format!("{name} must be a positive odd number, got {window}"));
            }
        }
        if smoothing.savgol_order >= smoothing.savgol_window {
            return invalid(format!(
                "smoothing.savgol_order {} must be below the window {}",
                smoothing.savgol_order, smoothing.savgol_window
            ));
        }

        let cadence = self.output.cadence_minutes;
        if cadence == 0 || (24 * 60) % cadence != 0 {
            return invalid(format!(
                "output.cadence_minutes must divide a day evenly, got {cadence}"
            ));
        }

        Ok(())
    }
}
