//! Subcommand implementations.
//!
//! Sets up logging, loads configuration and dispatches each subcommand to
//! the library, printing a short colored summary on success.

use crate::cli::{Args, Commands, MergedArgs, ReadArgs, ScriptArgs, StationsArgs, WriteArgs};
use crate::config::DatemConfig;
use crate::constants::LOG_TARGET;
use crate::frame::{frame_to_datem, read_csv_table, write_csv, write_table};
use crate::models::{FrameColumns, WriteMode};
use crate::reader::{read_datem_file, read_merged_file};
use crate::script::{CdumpFileSet, ScriptOptions, write_datem_script};
use crate::writer::write_station_file;
use anyhow::{Context, Result, bail};
use colored::*;
use polars::prelude::DataFrame;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Run the parsed command line
pub fn run(args: Args) -> Result<()> {
    setup_logging(&args)?;

    let config = DatemConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    match args.command {
        Some(Commands::Script(script_args)) => run_script(script_args, &config),
        Some(Commands::Stations(stations_args)) => run_stations(stations_args, &config),
        Some(Commands::Write(write_args)) => run_write(write_args, &config),
        Some(Commands::Read(read_args)) => run_read(read_args, &config),
        Some(Commands::Merged(merged_args)) => run_merged(merged_args, &config),
        None => Ok(()),
    }
}

/// Set up structured logging based on CLI arguments
fn setup_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{}={}", LOG_TARGET, log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Expand glob patterns, keeping patterns without matches as literal names
fn expand_cdump_patterns(patterns: &[String]) -> Result<Vec<String>> {
    let mut files = Vec::new();

    for pattern in patterns {
        let mut matches: Vec<PathBuf> = glob::glob(pattern)
            .with_context(|| format!("Invalid cdump pattern '{}'", pattern))?
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(e) => {
                    warn!("Skipping unreadable path: {}", e);
                    None
                }
            })
            .collect();

        if matches.is_empty() {
            warn!("No files match '{}', using it as a file name", pattern);
            files.push(pattern.clone());
        } else {
            matches.sort();
            files.extend(matches.iter().map(|p| p.to_string_lossy().into_owned()));
        }
    }

    Ok(files)
}

fn run_script(args: ScriptArgs, config: &DatemConfig) -> Result<()> {
    let inputs = expand_cdump_patterns(&args.cdump)?;

    let mut files = CdumpFileSet::new(inputs);
    if let Some(names) = args.output_names {
        files = files.with_output_names(names)?;
    }
    if let Some(extra) = args.extra {
        files = files.with_extra_info(extra)?;
    }

    let options = ScriptOptions {
        multiplier: args.mult.unwrap_or_else(|| config.multiplier.clone()),
        model_dir: args.mdl.unwrap_or_else(|| config.model_dir.clone()),
        particle_sizes: args.sizes,
        levels: args.levels,
        concat: !args.no_concat,
        concat_file: args
            .concat_file
            .unwrap_or_else(|| config.concat_file.clone()),
        script_path: args
            .script
            .unwrap_or_else(|| PathBuf::from(&config.script_name)),
    };

    let outputs = write_datem_script(&files, &options)
        .with_context(|| format!("Failed to write {}", options.script_path.display()))?;

    for output in &outputs {
        info!("c2datem output: {}", output);
    }

    println!(
        "{} {} ({} cdump files, {} c2datem runs)",
        "Wrote".bright_green(),
        options.script_path.display().to_string().bright_white().bold(),
        files.len(),
        outputs.len()
    );
    Ok(())
}

fn run_stations(args: StationsArgs, config: &DatemConfig) -> Result<()> {
    if args.end <= args.start {
        warn!(
            "Sampling end {} is not after start {}, no ticks will be written",
            args.end, args.start
        );
    }

    let height = args
        .height
        .unwrap_or_else(|| config.station_height.clone());
    let lines = write_station_file(&args.output, &args.stations, args.start, args.end, &height)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    println!(
        "{} {} ({} stations, {} lines)",
        "Wrote".bright_green(),
        args.output.display().to_string().bright_white().bold(),
        args.stations.len(),
        lines
    );
    Ok(())
}

fn run_write(args: WriteArgs, config: &DatemConfig) -> Result<()> {
    let columns = match args.columns {
        Some(names) => match FrameColumns::from_ordered(&names) {
            Some(columns) => columns,
            None => bail!("--columns needs exactly 8 names, got {}", names.len()),
        },
        None => config.frame_columns.clone(),
    };
    let label = args.label.unwrap_or_else(|| config.header_label.clone());
    let mode = if args.append {
        WriteMode::Append
    } else {
        WriteMode::Overwrite
    };

    let df = read_csv_table(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let written = frame_to_datem(&args.output, &df, &label, mode, &columns)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    println!(
        "{} {} datem records to {}",
        "Wrote".bright_green(),
        written.to_string().bright_white().bold(),
        args.output.display()
    );
    Ok(())
}

fn run_read(args: ReadArgs, config: &DatemConfig) -> Result<()> {
    let columns = args.columns.unwrap_or_else(|| config.datem_columns.clone());

    let df = read_datem_file(&args.input, &columns)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    emit_table(df, args.output.as_deref(), config)
}

fn run_merged(args: MergedArgs, config: &DatemConfig) -> Result<()> {
    // A bad date here is fatal; it propagates to main, which prints the
    // file name and row sample and exits non-zero.
    let df = read_merged_file(&args.input)?;
    emit_table(df, args.output.as_deref(), config)
}

fn emit_table(mut df: DataFrame, output: Option<&Path>, config: &DatemConfig) -> Result<()> {
    match output {
        Some(path) => {
            write_table(&mut df, path, config.compression)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!(
                "{} {} rows to {}",
                "Wrote".bright_green(),
                df.height().to_string().bright_white().bold(),
                path.display()
            );
        }
        None => write_csv(&mut df, std::io::stdout().lock())?,
    }
    Ok(())
}
