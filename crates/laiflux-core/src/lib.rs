pub mod calendar;
pub mod climatology;
pub mod config;
pub mod error;
pub mod ingestion;
pub mod interpolation;
pub mod outputs;
pub mod pipelines;
pub mod pixel_selector;
pub mod quality_filters;
pub mod resample;
pub mod smoothing;
pub mod types;

pub use config::ReconstructionConfig;
pub use error::{ReconstructionError, Result};
pub use outputs::{write_series, OutputFormat};
pub use pipelines::{
    reconstruct_lai, reconstruct_lai_detailed, LaiReconstruction, ReconstructionSummary,
};
pub use types::{ReconstructedSeries, StationTables};
