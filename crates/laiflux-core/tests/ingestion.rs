use std::path::{Path, PathBuf};

use anyhow::Result;
use laiflux_core::config::{PixelSelectionConfig, QualityConfig, TableLayout};
use laiflux_core::ingestion::{load_station_tables, load_table};
use laiflux_core::pixel_selector::select_pixels;
use laiflux_core::quality_filters::aggregate_spatially;
use laiflux_core::ReconstructionError;
use laiflux_parser::{Band, PixelId};

fn fixture_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../laiflux-parser/tests/data")
}

fn fixture_layout() -> TableLayout {
    TableLayout {
        lai: "subset_long_lai.csv".to_string(),
        std_dev: "subset_wide_stddev.csv".to_string(),
        qc: "subset_long_qc_modis_dates.csv".to_string(),
    }
}

#[test]
fn loads_all_three_tables_in_any_supported_layout() -> Result<()> {
    let tables = load_station_tables(&fixture_dir(), "BE-Bra", &fixture_layout())?;

    assert_eq!(tables.lai.band(), Some(Band::Lai));
    assert_eq!(tables.std_dev.band(), Some(Band::LaiStdDev));
    assert_eq!(tables.qc.band(), Some(Band::FparLaiQc));
    assert_eq!(tables.lai.pixel_count(), 3);
    assert_eq!(tables.std_dev.pixel_count(), 4);
    Ok(())
}

#[test]
fn loaded_tables_feed_the_pixel_selector() -> Result<()> {
    let tables = load_station_tables(&fixture_dir(), "BE-Bra", &fixture_layout())?;
    let single_pixel = PixelSelectionConfig {
        grid_size: 1,
        radius: 0,
        first_pixel_id: 0,
    };

    let grid = select_pixels(&tables, &single_pixel)?;
    // min(6, 8, 4) rows over 3 LAI pixels.
    assert_eq!(grid.timesteps(), 1);
    assert_eq!(grid.pixels(), &[PixelId(0)]);
    assert!((grid.lai()[[0, 0]] - 1.2).abs() < 1e-12);
    assert!((grid.std_dev()[[0, 0]] - 0.5).abs() < 1e-12);
    assert_eq!(grid.qc()[[0, 0]], Some(0));
    Ok(())
}

#[test]
fn missing_table_aborts_the_station() {
    let layout = TableLayout::default();
    let err = load_station_tables(&fixture_dir(), "XX-None", &layout).unwrap_err();

    match err {
        ReconstructionError::MissingSourceFile {
            station,
            band,
            path,
        } => {
            assert_eq!(station, "XX-None");
            assert_eq!(band, Band::Lai);
            assert!(path.ends_with("XX-None_Lai_500m.csv"));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn table_declaring_another_band_is_rejected() {
    let layout = TableLayout {
        lai: "subset_wide_stddev.csv".to_string(),
        ..fixture_layout()
    };

    let err = load_table(&fixture_dir(), "BE-Bra", &layout, Band::Lai).unwrap_err();
    assert!(matches!(
        err,
        ReconstructionError::BandMismatch {
            expected: Band::Lai,
            found: Band::LaiStdDev,
            ..
        }
    ));
}

#[test]
fn selector_requires_every_neighbourhood_pixel() -> Result<()> {
    let tables = load_station_tables(&fixture_dir(), "BE-Bra", &fixture_layout())?;

    let err = select_pixels(&tables, &PixelSelectionConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        ReconstructionError::MissingPixel {
            band: Band::Lai,
            pixel: PixelId(12)
        }
    ));
    Ok(())
}

#[test]
fn tables_without_band_or_scale_use_the_published_factor() -> Result<()> {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data");
    let tables = load_station_tables(&dir, "BARE", &TableLayout::default())?;

    assert_eq!(tables.lai.band(), Some(Band::Lai));
    assert_eq!(tables.std_dev.band(), Some(Band::LaiStdDev));
    assert_eq!(tables.qc.band(), Some(Band::FparLaiQc));
    assert_eq!(tables.lai.scale(PixelId(12)), Some(0.1));

    let grid = select_pixels(&tables, &PixelSelectionConfig::default())?;
    assert_eq!(grid.timesteps(), 2);
    assert!(grid.lai().iter().all(|lai| (lai - 3.0).abs() < 1e-9));
    assert!(grid.std_dev().iter().all(|std_dev| (std_dev - 0.5).abs() < 1e-9));

    let aggregate = aggregate_spatially(&grid, &QualityConfig::default());
    assert_eq!(aggregate.series.missing_count(), 0);
    assert!((aggregate.series.values[0].unwrap_or_default() - 3.0).abs() < 1e-9);
    Ok(())
}
