//! Datem text writers.
//!
//! Serializes observation/model records into the fixed-column datem layout
//! and writes the dummy station files that tell c2datem which station and
//! time combinations to extract.

use crate::constants::DATE_FORMAT;
use crate::error::{DatemError, Result};
use crate::header::{write_datem_header, write_station_header};
use crate::models::{DatemRecord, StationLocation, WriteMode};
use chrono::{Duration, NaiveDateTime};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, warn};

/// Format one record as a datem line, without the trailing newline
///
/// Field widths: lat/lon 8.3, obs/model 8.4, site_id 12, altitude 7.2.
/// At least one space separates every field, even when a value overflows
/// its width.
pub fn format_datem_line(record: &DatemRecord) -> String {
    let mut line = format!(
        "{} {} {:8.3}  {:8.3} {:8.4}  {:8.4} ",
        record.date.format(DATE_FORMAT),
        record.duration,
        record.lat,
        record.lon,
        record.obs,
        record.model,
    );

    match &record.station_id {
        Some(station_id) => line.push_str(&station_id.to_field()),
        None => warn!("Not printing station id for record at {}", record.date),
    }

    line.push_str(&format!("{:7.2} ", record.altitude));
    line
}

/// Serialize records to a datem file
///
/// `WriteMode::Overwrite` truncates the file and writes the two-line header
/// first; `WriteMode::Append` adds data lines to the end, creating the file
/// if needed. Returns the number of data lines written.
pub fn write_datem_records(
    path: &Path,
    records: &[DatemRecord],
    header_label: &str,
    mode: WriteMode,
) -> Result<usize> {
    let file = match mode {
        WriteMode::Overwrite => File::create(path)?,
        WriteMode::Append => OpenOptions::new().create(true).append(true).open(path)?,
    };
    let mut writer = BufWriter::new(file);

    if mode == WriteMode::Overwrite {
        write_datem_header(&mut writer, header_label)?;
    }

    for record in records {
        writeln!(writer, "{}", format_datem_line(record))?;
    }
    writer.flush()?;

    debug!(
        "Wrote {} datem records to {} ({:?})",
        records.len(),
        path.display(),
        mode
    );
    Ok(records.len())
}

/// Write a dummy station file listing every sampling tick per station
///
/// Each station gets one line per tick from `sample_start` (inclusive) to
/// `sample_end` (exclusive), advancing by its interval. Measurement and
/// source id fields are the placeholder `1`. Returns the number of data
/// lines written.
pub fn write_station_file(
    path: &Path,
    stations: &[StationLocation],
    sample_start: NaiveDateTime,
    sample_end: NaiveDateTime,
    height: &str,
) -> Result<usize> {
    if let Some((station, location)) = stations
        .iter()
        .enumerate()
        .find(|(_, location)| location.interval_hours <= 0)
    {
        return Err(DatemError::InvalidInterval {
            station,
            hours: location.interval_hours,
        });
    }

    let mut writer = BufWriter::new(File::create(path)?);
    write_station_header(&mut writer)?;

    let mut lines = 0;
    for location in stations {
        let step = Duration::hours(location.interval_hours);
        let mut tick = sample_start;
        while tick < sample_end {
            writeln!(
                writer,
                "{} {}00 {:.3} {:.3} 1 1 {}",
                tick.format(DATE_FORMAT),
                location.interval_hours,
                location.lat,
                location.lon,
                height
            )?;
            lines += 1;
            tick += step;
        }
    }
    writer.flush()?;

    debug!(
        "Wrote {} station ticks for {} stations to {}",
        lines,
        stations.len(),
        path.display()
    );
    Ok(lines)
}
