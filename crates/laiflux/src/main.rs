use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use clap::{Args, Parser, Subcommand, ValueEnum};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use laiflux_core::ingestion::load_station_tables;
use laiflux_core::outputs::{write_series, OutputFormat};
use laiflux_core::{reconstruct_lai_detailed, ReconstructionConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Reconstruct gap-free MODIS LAI for flux-tower stations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reconstruct LAI for one station and write it to a file
    Reconstruct(ReconstructArgs),
    /// Print per-stage counts for one station
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
struct StationArgs {
    /// Station identifier used in the table file names (e.g. DE-Hai)
    #[arg(short, long)]
    station: String,
    /// Directory holding the station's LAI, standard deviation and QC tables
    #[arg(short, long)]
    input_dir: PathBuf,
    /// TOML configuration; falls back to LAIFLUX_CONFIG, then built-in defaults
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ReconstructArgs {
    #[command(flatten)]
    station: StationArgs,
    /// First timestamp to emit (YYYY-MM-DD or YYYY-MM-DDTHH:MM)
    #[arg(long, value_parser = parse_start)]
    start: NaiveDateTime,
    /// Last timestamp to emit; a bare date includes the whole day
    #[arg(long, value_parser = parse_end)]
    end: NaiveDateTime,
    #[arg(short, long)]
    output: PathBuf,
    #[arg(long, value_enum, default_value_t = FormatArg::Csv)]
    format: FormatArg,
}

#[derive(Args, Debug)]
struct InspectArgs {
    #[command(flatten)]
    station: StationArgs,
    /// Also print the parsed LAI pixel table
    #[arg(long)]
    pixels: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Csv,
    Parquet,
}

impl From<FormatArg> for OutputFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Csv => OutputFormat::Csv,
            FormatArg::Parquet => OutputFormat::Parquet,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    match cli.command {
        Command::Reconstruct(args) => run_reconstruct(args),
        Command::Inspect(args) => run_inspect(args),
    }
}

fn run_reconstruct(args: ReconstructArgs) -> Result<()> {
    let config = load_config(args.station.config.as_deref())?;
    let station = &args.station.station;
    let tables = load_station_tables(&args.station.input_dir, station, &config.tables)
        .with_context(|| format!("failed to load tables for station {station}"))?;

    let run = reconstruct_lai_detailed(&tables, station, args.start, args.end, &config)
        .with_context(|| format!("reconstruction failed for station {station}"))?;
    if run.series.is_empty() {
        info!(station = %station, "requested window holds no reconstructed values");
    }

    write_series(&run.series, &args.output, args.format.into())
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    println!(
        "Wrote {} rows for {} to {}",
        run.series.len(),
        station,
        args.output.display()
    );
    Ok(())
}

fn run_inspect(args: InspectArgs) -> Result<()> {
    let config = load_config(args.station.config.as_deref())?;
    let station = &args.station.station;
    let tables = load_station_tables(&args.station.input_dir, station, &config.tables)
        .with_context(|| format!("failed to load tables for station {station}"))?;

    if args.pixels {
        let frame = tables
            .lai
            .to_dataframe()
            .context("failed to build LAI pixel table")?;
        println!("{frame}");
    }

    // An empty output window keeps the run to the 8-day stages.
    let run = reconstruct_lai_detailed(
        &tables,
        station,
        NaiveDateTime::MIN,
        NaiveDateTime::MIN,
        &config,
    )
    .with_context(|| format!("reconstruction failed for station {station}"))?;
    let summary = &run.summary;

    let years = match (summary.retained_years.first(), summary.retained_years.last()) {
        (Some(first), Some(last)) => format!("{first}-{last} ({})", summary.retained_years.len()),
        _ => "none".to_string(),
    };

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Stage", "Value"]);
    table.add_row(vec!["Station".to_string(), summary.station.clone()]);
    table.add_row(vec!["Pixels".to_string(), summary.pixels.to_string()]);
    table.add_row(vec!["Observation steps".to_string(), summary.observation_steps.to_string()]);
    table.add_row(vec!["Fully masked steps".to_string(), summary.masked_steps.to_string()]);
    table.add_row(vec!["Interpolated steps".to_string(), summary.interpolated_steps.to_string()]);
    table.add_row(vec!["Extrapolated steps".to_string(), summary.extrapolated_steps.to_string()]);
    table.add_row(vec!["Retained years".to_string(), years]);
    table.add_row(vec!["Calendar gaps filled".to_string(), summary.calendar_gaps_filled.to_string()]);
    println!("{table}");

    Ok(())
}

fn load_config(explicit: Option<&Path>) -> Result<ReconstructionConfig> {
    let path = explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os("LAIFLUX_CONFIG").map(PathBuf::from));

    match path {
        Some(path) => ReconstructionConfig::load(&path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(ReconstructionConfig::default()),
    }
}

fn parse_timestamp(value: &str, end_of_day: bool) -> Result<NaiveDateTime, String> {
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(timestamp);
        }
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|err| format!("expected YYYY-MM-DD or YYYY-MM-DDTHH:MM, got '{value}': {err}"))?;
    let time = if end_of_day {
        NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN)
    } else {
        NaiveTime::MIN
    };
    Ok(date.and_time(time))
}

fn parse_start(value: &str) -> Result<NaiveDateTime, String> {
    parse_timestamp(value, false)
}

fn parse_end(value: &str) -> Result<NaiveDateTime, String> {
    parse_timestamp(value, true)
}
