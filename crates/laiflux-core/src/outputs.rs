use std::fs::File;
use std::path::Path;

use polars::io::parquet::write::{ParquetCompression, ParquetWriter, StatisticsOptions};
use polars::prelude::*;
use serde::Deserialize;
use tracing::info;

use crate::error::Result;
use crate::types::ReconstructedSeries;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Csv,
    Parquet,
}

impl ReconstructedSeries {
    /// Two columns: `timestamp` (naive datetime, microseconds) and `lai`.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let micros: Vec<i64> = self
            .timestamps
            .iter()
            .map(|timestamp| timestamp.and_utc().timestamp_micros())
            .collect();
        let timestamps = Series::new("timestamp".into(), micros)
            .cast(&DataType::Datetime(TimeUnit::Microseconds, None))?;

        DataFrame::new(vec![
            timestamps.into(),
            Series::new("lai".into(), self.values.clone()).into(),
        ])
    }
}

pub fn write_series(series: &ReconstructedSeries, path: &Path, format: OutputFormat) -> Result<()> {
    let mut frame = series.to_dataframe()?;
    let mut file = File::create(path)?;

    match format {
        OutputFormat::Csv => {
            CsvWriter::new(&mut file)
                .include_header(true)
                .finish(&mut frame)?;
        }
        OutputFormat::Parquet => {
            ParquetWriter::new(&mut file)
                .with_compression(ParquetCompression::Zstd(None))
                .with_statistics(StatisticsOptions::default())
                .finish(&mut frame)?;
        }
    }

    info!(path = %path.display(), rows = frame.height(), ?format, "wrote reconstructed series");
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn dataframe_carries_timestamps_and_values() {
        let start = NaiveDate::from_ymd_opt(2005, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let series = ReconstructedSeries {
            timestamps: vec![start, start + chrono::Duration::minutes(30)],
            values: vec![1.5, 2.5],
        };

        let frame = series.to_dataframe().unwrap();
        assert_eq!(frame.height(), 2);
        assert_eq!(
            frame.column("timestamp").unwrap().dtype(),
            &DataType::Datetime(TimeUnit::Microseconds, None)
        );
        let lai: Vec<Option<f64>> = frame.column("lai").unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(lai, vec![Some(1.5), Some(2.5)]);
    }
}
