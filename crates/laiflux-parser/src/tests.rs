use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::errors::ParserError;
use crate::formats::{SubsetLongParser, SubsetWideParser};
use crate::model::{Band, PixelId};
use crate::{parse_band_table, parse_pixel_table};
use crate::registry::{parse_with_parsers, PixelTableParser};

fn fixture(path: &str) -> String {
    let base = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let full_path = base.join("tests/data").join(path);
    fs::read_to_string(&full_path)
        .unwrap_or_else(|err| panic!("failed to read fixture {}: {}", full_path.display(), err))
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

#[test]
fn parses_long_subset_table() {
    let table = parse_pixel_table(&fixture("subset_long_lai.csv")).expect("long parse failed");

    assert_eq!(table.band(), Some(Band::Lai));
    assert_eq!(table.pixel_count(), 3);
    assert_eq!(table.observation_count(), 6);
    assert_eq!(
        table.dates(PixelId(1)),
        vec![date(2003, 1, 1), date(2003, 1, 9)]
    );
    assert_eq!(table.value(PixelId(0), date(2003, 1, 9)), Some(Some(13.0)));
    assert_eq!(table.value(PixelId(2), date(2003, 1, 1)), Some(None));
    assert_eq!(table.value(PixelId(7), date(2003, 1, 1)), None);
    assert_eq!(table.scale(PixelId(0)), Some(0.1));
}

#[test]
fn long_table_accepts_modis_dates_and_text_scales() {
    let table = parse_pixel_table(&fixture("subset_long_qc_modis_dates.csv"))
        .expect("qc parse failed");

    assert_eq!(table.band(), Some(Band::FparLaiQc));
    assert_eq!(table.value(PixelId(0), date(2003, 1, 9)), Some(Some(32.0)));
    // "Not Available" is not a scale and QC has no published factor.
    assert_eq!(table.scale(PixelId(0)), None);
}

#[test]
fn parses_wide_subset_download() {
    let table =
        parse_pixel_table(&fixture("subset_wide_stddev.csv")).expect("wide parse failed");

    assert_eq!(table.band(), Some(Band::LaiStdDev));
    assert_eq!(table.pixel_count(), 4);
    assert_eq!(table.observation_count(), 8);
    assert_eq!(table.value(PixelId(1), date(2003, 1, 9)), Some(None));
    assert_eq!(table.value(PixelId(3), date(2003, 1, 9)), Some(Some(255.0)));
    assert_eq!(table.scale(PixelId(3)), Some(0.1));
}

#[test]
fn wide_parser_rejects_long_tables_as_mismatch() {
    let err = SubsetWideParser
        .parse(&fixture("subset_long_lai.csv"))
        .expect_err("long table should not parse as wide");
    assert!(matches!(err, ParserError::FormatMismatch { .. }));
}

#[test]
fn mixed_bands_are_rejected() {
    let err = parse_pixel_table(&fixture("mixed_bands.csv")).expect_err("mixed bands accepted");
    assert!(
        matches!(
            err,
            ParserError::MixedBands {
                line_index: 3,
                first: Band::Lai,
                found: Band::LaiStdDev,
                ..
            }
        ),
        "{err}"
    );
}

#[test]
fn duplicate_keys_are_rejected() {
    let content = "calendar_date,pixel,value\n2003-01-01,0,1\n2003-01-01,0,2\n";
    let err = SubsetLongParser.parse(content).expect_err("duplicate accepted");
    match err {
        ParserError::DuplicateObservation {
            line_index,
            pixel,
            date: day,
            ..
        } => {
            assert_eq!(line_index, 3);
            assert_eq!(pixel, PixelId(0));
            assert_eq!(day, date(2003, 1, 1));
        }
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn wide_rows_must_keep_their_pixel_count() {
    let content = "MOD15A2H.A2003001,Lai_500m,A2003001,BE-Bra,2021131151410,5,6,7\n\
                   MOD15A2H.A2003009,Lai_500m,A2003009,BE-Bra,2021131160833,4,6\n";
    let err = SubsetWideParser.parse(content).expect_err("short row accepted");
    assert!(
        matches!(
            err,
            ParserError::PixelColumnCount {
                line_index: 2,
                expected: 3,
                found: 2,
                ..
            }
        ),
        "{err}"
    );
}

#[test]
fn first_declared_scale_wins_over_unavailable_rows() {
    let content = "calendar_date,band,pixel,value,scale\n\
                   2003-01-01,Lai_500m,0,12,Not Available\n\
                   2003-01-09,Lai_500m,0,13,0.2\n\
                   2003-01-17,Lai_500m,0,14,0.5\n";
    let table = SubsetLongParser.parse(content).expect("long parse failed");
    assert_eq!(table.scale(PixelId(0)), Some(0.2));
}

#[test]
fn assigned_band_supplies_the_default_scale() {
    let content = "pixel,calendar_date,value\n0,2003-01-01,30\n";
    let table = SubsetLongParser.parse(content).expect("long parse failed");
    assert_eq!(table.band(), None);
    assert_eq!(table.scale(PixelId(0)), None);

    let table = table.with_band(Band::Lai);
    assert_eq!(table.scale(PixelId(0)), Some(0.1));
}

#[test]
fn band_table_fills_in_or_checks_the_band() {
    let bare = "pixel,calendar_date,value\n0,2003-01-01,30\n";
    let table = parse_band_table(bare, Band::LaiStdDev).expect("bare parse failed");
    assert_eq!(table.band(), Some(Band::LaiStdDev));
    assert_eq!(table.scale(PixelId(0)), Some(0.1));

    let lai = fixture("subset_long_lai.csv");
    assert!(parse_band_table(&lai, Band::Lai).is_ok());
    let err = parse_band_table(&lai, Band::FparLaiQc).expect_err("wrong band accepted");
    assert!(matches!(
        err,
        ParserError::UnexpectedBand {
            expected: Band::FparLaiQc,
            found: Band::Lai
        }
    ));
}

#[test]
fn header_only_table_is_empty() {
    let err = SubsetLongParser
        .parse("calendar_date,pixel,value\n")
        .expect_err("empty table accepted");
    assert!(matches!(err, ParserError::EmptyData { .. }));
}

#[test]
fn unknown_content_lists_all_attempts() {
    let long = SubsetLongParser;
    let wide = SubsetWideParser;
    let parsers: [&dyn PixelTableParser; 2] = [&long, &wide];

    let err = parse_with_parsers("station,latitude\nBE-Bra,51.3\n", &parsers)
        .expect_err("garbage parsed");
    match err {
        ParserError::NoMatchingParser { attempts } => {
            let names: Vec<_> = attempts.iter().map(|attempt| attempt.parser).collect();
            assert_eq!(names, vec!["ORNL_SUBSET_LONG", "ORNL_SUBSET_WIDE"]);
        }
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn table_converts_to_dataframe() {
    let table = parse_pixel_table(&fixture("subset_long_lai.csv")).unwrap();
    let df = table.to_dataframe().unwrap();

    assert_eq!(
        df.get_column_names(),
        vec!["pixel", "calendar_date", "value", "scale"]
    );
    assert_eq!(df.height(), 6);
    assert_eq!(df.column("value").unwrap().null_count(), 1);
}
