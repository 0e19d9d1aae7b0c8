mod support;

use anyhow::Result;
use chrono::NaiveDateTime;
use laiflux_core::{reconstruct_lai, reconstruct_lai_detailed, ReconstructionConfig};

use support::{composite_dates, date, station_tables, Cell};

fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    date(year, month, day).and_hms_opt(hour, minute, 0).unwrap()
}

#[test]
fn constant_canopy_reconstructs_to_constant_lai() -> Result<()> {
    let dates = composite_dates(2004, 2007);
    let tables = station_tables(&dates, |_, _| Cell::good(3.0));
    let config = ReconstructionConfig::default();

    let run = reconstruct_lai_detailed(
        &tables,
        "XX-Con",
        at(2005, 1, 1, 0, 0),
        at(2005, 1, 2, 0, 0),
        &config,
    )?;

    for value in run.aggregate.series.values.iter().flatten() {
        assert!((value - 3.0).abs() < 1e-9);
    }
    assert_eq!(run.interpolated.filled, 0);
    assert_eq!(run.interpolated.values.last().copied(), Some(0.0));
    assert_eq!(run.regular.years, vec![2005, 2006]);
    assert!(run.regular.filled_slots.is_empty());
    for value in &run.smoothed.values {
        assert!((value - 3.0).abs() < 1e-9, "smoothed value {value}");
    }

    assert_eq!(run.series.len(), 49);
    assert_eq!(run.series.timestamps[0], at(2005, 1, 1, 0, 0));
    assert_eq!(run.series.timestamps[48], at(2005, 1, 2, 0, 0));
    assert!(run.series.values.iter().all(|value| (value - 3.0).abs() < 1e-9));

    assert_eq!(run.summary.station, "XX-Con");
    assert_eq!(run.summary.observation_steps, dates.len());
    assert_eq!(run.summary.pixels, 9);
    assert_eq!(run.summary.masked_steps, 0);
    assert_eq!(run.summary.output_rows, 49);
    Ok(())
}

#[test]
fn output_is_forward_filled_to_the_end_of_the_last_retained_year() -> Result<()> {
    let dates = composite_dates(2004, 2007);
    let tables = station_tables(&dates, |_, _| Cell::good(2.0));

    let series = reconstruct_lai(
        &tables,
        "XX-Ext",
        at(2000, 1, 1, 0, 0),
        at(2030, 1, 1, 0, 0),
        &ReconstructionConfig::default(),
    )?;

    assert_eq!(series.timestamps.first().copied(), Some(at(2005, 1, 1, 0, 0)));
    assert_eq!(series.timestamps.last().copied(), Some(at(2006, 12, 31, 23, 30)));
    assert_eq!(series.len(), 730 * 48);
    Ok(())
}

#[test]
fn explicit_extension_and_hourly_cadence_are_honoured() -> Result<()> {
    let dates = composite_dates(2004, 2007);
    let tables = station_tables(&dates, |_, _| Cell::good(2.0));
    let config = ReconstructionConfig::from_toml_str(
        r#"
        [output]
        cadence_minutes = 60
        extend_to = "2007-01-01T05:00:00"
        "#,
    )?;

    let series = reconstruct_lai(
        &tables,
        "XX-Hrs",
        at(2006, 12, 31, 22, 0),
        at(2008, 1, 1, 0, 0),
        &config,
    )?;

    assert_eq!(series.len(), 8);
    assert_eq!(series.timestamps.last().copied(), Some(at(2007, 1, 1, 5, 0)));
    assert!(series.values.iter().all(|value| (value - 2.0).abs() < 1e-9));
    Ok(())
}

#[test]
fn end_before_the_record_yields_an_empty_series() -> Result<()> {
    let dates = composite_dates(2004, 2007);
    let tables = station_tables(&dates, |_, _| Cell::good(3.0));

    let series = reconstruct_lai(
        &tables,
        "XX-Emp",
        at(2003, 1, 1, 0, 0),
        at(2003, 6, 1, 0, 0),
        &ReconstructionConfig::default(),
    )?;

    assert!(series.is_empty());
    Ok(())
}

#[test]
fn invalid_config_is_rejected_before_processing() {
    let dates = composite_dates(2004, 2007);
    let tables = station_tables(&dates, |_, _| Cell::good(3.0));
    let mut config = ReconstructionConfig::default();
    config.smoothing.anomaly_window = 12;

    let err = reconstruct_lai(
        &tables,
        "XX-Cfg",
        at(2005, 1, 1, 0, 0),
        at(2005, 2, 1, 0, 0),
        &config,
    )
    .unwrap_err();
    assert!(matches!(err, laiflux_core::ReconstructionError::InvalidConfig(_)));
}
