use std::io::ErrorKind;
use std::path::Path;

use laiflux_parser::{parse_band_table, Band, ParserError, PixelTable};
use tracing::{debug, info};

use crate::config::TableLayout;
use crate::error::{ReconstructionError, Result};
use crate::types::StationTables;

/// Reads and parses the LAI, standard-deviation and QC tables of one station.
///
/// A table that does not exist aborts the station; nothing is zero-filled.
pub fn load_station_tables(dir: &Path, station: &str, layout: &TableLayout) -> Result<StationTables> {
    let lai = load_table(dir, station, layout, Band::Lai)?;
    let std_dev = load_table(dir, station, layout, Band::LaiStdDev)?;
    let qc = load_table(dir, station, layout, Band::FparLaiQc)?;

    info!(
        station,
        lai_rows = lai.observation_count(),
        std_dev_rows = std_dev.observation_count(),
        qc_rows = qc.observation_count(),
        "loaded station tables"
    );

    Ok(StationTables { lai, std_dev, qc })
}

pub fn load_table(dir: &Path, station: &str, layout: &TableLayout, band: Band) -> Result<PixelTable> {
    let path = layout.path_for(dir, station, band);
    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(ReconstructionError::MissingSourceFile {
                station: station.to_string(),
                band,
                path,
            });
        }
        Err(err) => return Err(err.into()),
    };

    let table = match parse_band_table(&content, band) {
        Ok(table) => table,
        Err(ParserError::UnexpectedBand { expected, found }) => {
            return Err(ReconstructionError::BandMismatch {
                path,
                expected,
                found,
            });
        }
        Err(err) => return Err(err.into()),
    };

    debug!(path = %path.display(), %band, pixels = table.pixel_count(), "parsed table");
    Ok(table)
}
