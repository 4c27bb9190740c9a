//! Command-line interface components.

use crate::models::StationLocation;
use chrono::{NaiveDate, NaiveDateTime};
use clap::{ArgAction, Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "datem")]
#[command(about = "Write, read and script datem files for HYSPLIT c2datem model evaluation")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (defaults to <config dir>/datem-processor/config.toml when present)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

impl Args {
    /// Log level implied by the verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate the shell script that runs c2datem over cdump files
    Script(ScriptArgs),
    /// Write a dummy station file telling c2datem where and when to extract
    Stations(StationsArgs),
    /// Convert a CSV table of observation/model pairs to datem text
    Write(WriteArgs),
    /// Parse c2datem output into a table
    Read(ReadArgs),
    /// Parse a merged observation/model file into a table
    Merged(MergedArgs),
}

#[derive(ClapArgs, Debug)]
pub struct ScriptArgs {
    /// cdump files or glob patterns
    #[arg(required = true, value_name = "CDUMP")]
    pub cdump: Vec<String>,

    /// Output base names, one per cdump file (default: cdump -> model)
    #[arg(long, value_delimiter = ',')]
    pub output_names: Option<Vec<String>>,

    /// Particle size indices; non-integers fall back to 1
    #[arg(short = 'p', long, value_delimiter = ',', default_value = "1")]
    pub sizes: Vec<String>,

    /// Vertical level indices (-1 selects by height)
    #[arg(
        short = 'z',
        long,
        value_delimiter = ',',
        default_value = "1",
        allow_negative_numbers = true
    )]
    pub levels: Vec<i32>,

    /// Do not concatenate c2datem output
    #[arg(long)]
    pub no_concat: bool,

    /// File receiving concatenated output
    #[arg(long)]
    pub concat_file: Option<String>,

    /// Extra tokens appended to each concatenated line, one per cdump file
    #[arg(long, value_delimiter = ',')]
    pub extra: Option<Vec<String>>,

    /// Concentration multiplier
    #[arg(long)]
    pub mult: Option<String>,

    /// Directory holding the c2datem executable
    #[arg(long)]
    pub mdl: Option<String>,

    /// Script file to write
    #[arg(short, long)]
    pub script: Option<PathBuf>,
}

#[derive(ClapArgs, Debug)]
pub struct StationsArgs {
    /// Output station file
    #[arg(short, long, default_value = "datemfile.txt")]
    pub output: PathBuf,

    /// Station as LAT,LON,HOURS (repeatable)
    #[arg(
        short = 's',
        long = "station",
        required = true,
        allow_hyphen_values = true,
        value_parser = parse_station_location
    )]
    pub stations: Vec<StationLocation>,

    /// First sampling time (YYYY-MM-DD HH:MM)
    #[arg(long, value_parser = parse_timestamp)]
    pub start: NaiveDateTime,

    /// End of sampling, exclusive (YYYY-MM-DD HH:MM)
    #[arg(long, value_parser = parse_timestamp)]
    pub end: NaiveDateTime,

    /// Height field written on every line
    #[arg(long, allow_hyphen_values = true)]
    pub height: Option<String>,
}

#[derive(ClapArgs, Debug)]
pub struct WriteArgs {
    /// CSV table with a header row
    #[arg(value_name = "CSV")]
    pub input: PathBuf,

    /// Datem file to write
    #[arg(short, long)]
    pub output: PathBuf,

    /// Label on the first header line
    #[arg(long)]
    pub label: Option<String>,

    /// Append lines without a header instead of overwriting
    #[arg(long)]
    pub append: bool,

    /// Eight column names: date,duration,lat,lon,obs,vals,sid,altitude
    #[arg(long, value_delimiter = ',')]
    pub columns: Option<Vec<String>>,
}

#[derive(ClapArgs, Debug)]
pub struct ReadArgs {
    /// c2datem output file
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Table output (.parquet or CSV); printed as CSV when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Column names in file order; must include year,month,day,hour
    #[arg(long, value_delimiter = ',')]
    pub columns: Option<Vec<String>>,
}

#[derive(ClapArgs, Debug)]
pub struct MergedArgs {
    /// Merged observation/model file
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Table output (.parquet or CSV); printed as CSV when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Parse `LAT,LON,HOURS`
pub fn parse_station_location(value: &str) -> Result<StationLocation, String> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(format!("expected LAT,LON,HOURS, got '{}'", value));
    }

    let lat = parts[0]
        .parse::<f64>()
        .map_err(|e| format!("invalid latitude '{}': {}", parts[0], e))?;
    let lon = parts[1]
        .parse::<f64>()
        .map_err(|e| format!("invalid longitude '{}': {}", parts[1], e))?;
    let hours = parts[2]
        .parse::<i64>()
        .map_err(|e| format!("invalid interval '{}': {}", parts[2], e))?;

    Ok(StationLocation::new(lat, lon, hours))
}

/// Parse a sampling timestamp
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, String> {
    const FORMATS: &[&str] = &["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

    FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| format!("invalid timestamp '{}', expected YYYY-MM-DD HH:MM", value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_station_location() {
        assert_eq!(
            parse_station_location("64.1, -21.9, 3").unwrap(),
            StationLocation::new(64.1, -21.9, 3)
        );
        assert!(parse_station_location("64.1,-21.9").is_err());
        assert!(parse_station_location("north,-21.9,3").is_err());
    }

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(
            parse_timestamp("2010-04-14 06:00").unwrap().to_string(),
            "2010-04-14 06:00:00"
        );
        assert_eq!(
            parse_timestamp("2010-04-14").unwrap().to_string(),
            "2010-04-14 00:00:00"
        );
        assert!(parse_timestamp("14/04/2010").is_err());
    }

    #[test]
    fn test_script_args_parse_negative_levels() {
        let args = Args::try_parse_from([
            "datem", "script", "cdump.*", "--levels", "1,-1", "--sizes", "1,abc",
        ])
        .unwrap();

        match args.command {
            Some(Commands::Script(script)) => {
                assert_eq!(script.levels, vec![1, -1]);
                assert_eq!(script.sizes, vec!["1", "abc"]);
                assert_eq!(script.cdump, vec!["cdump.*"]);
            }
            other => panic!("Expected script command, got {:?}", other),
        }
    }

    #[test]
    fn test_stations_args() {
        let args = Args::try_parse_from([
            "datem",
            "-vv",
            "stations",
            "--station",
            "-21.5,64.0,3",
            "--start",
            "2010-04-14 00:00",
            "--end",
            "2010-04-15 00:00",
        ])
        .unwrap();

        assert_eq!(args.get_log_level(), "debug");
        match args.command {
            Some(Commands::Stations(stations)) => {
                assert_eq!(stations.stations, vec![StationLocation::new(-21.5, 64.0, 3)]);
                assert_eq!(stations.output, PathBuf::from("datemfile.txt"));
            }
            other => panic!("Expected stations command, got {:?}", other),
        }
    }

    #[test]
    fn test_quiet_overrides_verbose() {
        let args = Args::try_parse_from(["datem", "-q", "-v"]).unwrap();
        assert_eq!(args.get_log_level(), "error");
        assert!(args.command.is_none());
    }
}
