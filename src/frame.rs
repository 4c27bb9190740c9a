//! Polars table adapters.
//!
//! Converts parsed datem tables into DataFrames, extracts datem records
//! from caller DataFrames by configurable column names, and writes tables
//! to CSV or Parquet.

use crate::config::CompressionAlgorithm;
use crate::constants::DATE_COLUMN;
use crate::error::{DatemError, Result};
use crate::models::{DatemRecord, FrameColumns, StationId, WriteMode};
use crate::reader::DatemTable;
use crate::writer::write_datem_records;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::{debug, warn};

/// Accepted layouts for string date columns
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y %m %d %H%M",
];

impl DatemTable {
    /// Build a DataFrame: the kept columns in file order, then `date`
    ///
    /// Each kept column is typed by its values: Int64 when every value is an
    /// integer, Float64 when every value is numeric, String otherwise.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let mut columns: Vec<Column> = Vec::with_capacity(self.columns.len() + 1);

        for (index, name) in self.columns.iter().enumerate() {
            let values: Vec<Option<&str>> =
                self.rows.iter().map(|row| row[index].as_deref()).collect();
            columns.push(infer_series(name, &values).into());
        }

        let millis: Vec<i64> = self
            .dates
            .iter()
            .map(|date| date.and_utc().timestamp_millis())
            .collect();
        let dates = Series::new(DATE_COLUMN.into(), millis)
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;
        columns.push(dates.into());

        Ok(DataFrame::new(columns)?)
    }
}

fn infer_series(name: &str, values: &[Option<&str>]) -> Series {
    let present = || values.iter().flatten();

    if present().next().is_none() {
        let empty: Vec<Option<f64>> = vec![None; values.len()];
        return Series::new(name.into(), empty);
    }

    if present().all(|v| v.parse::<i64>().is_ok()) {
        let parsed: Vec<Option<i64>> = values
            .iter()
            .map(|v| v.and_then(|s| s.parse().ok()))
            .collect();
        return Series::new(name.into(), parsed);
    }

    if present().all(|v| v.parse::<f64>().is_ok()) {
        let parsed: Vec<Option<f64>> = values
            .iter()
            .map(|v| v.and_then(|s| s.parse().ok()))
            .collect();
        return Series::new(name.into(), parsed);
    }

    Series::new(name.into(), values.to_vec())
}

fn column_series<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    df.column(name)
        .map(|column| column.as_materialized_series())
        .map_err(|_| DatemError::MissingColumn {
            column: name.to_string(),
        })
}

fn timestamp_to_naive(raw: i64, unit: TimeUnit) -> Option<NaiveDateTime> {
    let millis = match unit {
        TimeUnit::Nanoseconds => raw.div_euclid(1_000_000),
        TimeUnit::Microseconds => raw.div_euclid(1_000),
        TimeUnit::Milliseconds => raw,
    };
    DateTime::from_timestamp_millis(millis).map(|dt| dt.naive_utc())
}

fn days_to_naive(days: i32) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(1970, 1, 1)?
        .checked_add_signed(chrono::Duration::days(i64::from(days)))?
        .and_hms_opt(0, 0, 0)
}

fn parse_datetime_str(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

fn date_values(series: &Series) -> Result<Vec<Option<NaiveDateTime>>> {
    match series.dtype() {
        DataType::Datetime(unit, _) => {
            let unit = *unit;
            let raw = series.cast(&DataType::Int64)?;
            Ok(raw
                .i64()?
                .into_iter()
                .map(|v| v.and_then(|ts| timestamp_to_naive(ts, unit)))
                .collect())
        }
        DataType::Date => {
            let raw = series.cast(&DataType::Int32)?;
            Ok(raw.i32()?.into_iter().map(|v| v.and_then(days_to_naive)).collect())
        }
        DataType::String => Ok(series
            .str()?
            .into_iter()
            .map(|v| v.and_then(parse_datetime_str))
            .collect()),
        other => Err(DatemError::ColumnType {
            column: series.name().to_string(),
            dtype: other.to_string(),
        }),
    }
}

fn null_value(series: &Series, row: usize) -> DatemError {
    DatemError::NullValue {
        column: series.name().to_string(),
        row,
    }
}

/// Duration strings; integer columns are zero-padded back to HHMM
fn duration_values(series: &Series) -> Result<Vec<String>> {
    if series.dtype().is_integer() {
        let raw = series.cast(&DataType::Int64)?;
        return raw
            .i64()?
            .into_iter()
            .enumerate()
            .map(|(row, v)| {
                v.map(|hhmm| format!("{:04}", hhmm))
                    .ok_or_else(|| null_value(series, row))
            })
            .collect();
    }

    let text = series.cast(&DataType::String)?;
    text.str()?
        .into_iter()
        .enumerate()
        .map(|(row, v)| {
            v.map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .ok_or_else(|| null_value(series, row))
        })
        .collect()
}

/// Float values; nulls are rejected
fn float_values(series: &Series) -> Result<Vec<f64>> {
    let raw = series.cast(&DataType::Float64)?;
    raw.f64()?
        .into_iter()
        .enumerate()
        .map(|(row, v)| v.ok_or_else(|| null_value(series, row)))
        .collect()
}

/// Station ids from an integer, float or string column
///
/// Any other column type is rejected with
/// [`DatemError::UnsupportedStationId`]. Null and non-finite values become
/// `None`.
pub fn station_id_values(series: &Series) -> Result<Vec<Option<StationId>>> {
    let dtype = series.dtype();

    if dtype.is_integer() {
        let raw = series.cast(&DataType::Int64)?;
        Ok(raw.i64()?.into_iter().map(|v| v.map(StationId::Integer)).collect())
    } else if dtype.is_float() {
        let raw = series.cast(&DataType::Float64)?;
        Ok(raw
            .f64()?
            .into_iter()
            .map(|v| v.filter(|f| f.is_finite()).map(StationId::from_float))
            .collect())
    } else if matches!(dtype, DataType::String) {
        Ok(series
            .str()?
            .into_iter()
            .map(|v| v.map(StationId::from))
            .collect())
    } else {
        Err(DatemError::UnsupportedStationId {
            dtype: dtype.to_string(),
        })
    }
}

/// Extract datem records from a DataFrame using the configured column names
///
/// A station id column of unsupported type is logged and the ids are left
/// out. A missing or unparseable date, or a null in any other field, is
/// [`DatemError::NullValue`].
pub fn frame_to_records(df: &DataFrame, columns: &FrameColumns) -> Result<Vec<DatemRecord>> {
    let height = df.height();

    let dates = date_values(column_series(df, &columns.date)?)?;
    let durations = duration_values(column_series(df, &columns.duration)?)?;
    let lats = float_values(column_series(df, &columns.lat)?)?;
    let lons = float_values(column_series(df, &columns.lon)?)?;
    let obs = float_values(column_series(df, &columns.obs)?)?;
    let vals = float_values(column_series(df, &columns.vals)?)?;
    let altitudes = float_values(column_series(df, &columns.altitude)?)?;

    let station_ids = match station_id_values(column_series(df, &columns.station_id)?) {
        Ok(ids) => ids,
        Err(err @ DatemError::UnsupportedStationId { .. }) => {
            warn!("{}; not printing station id", err);
            vec![None; height]
        }
        Err(err) => return Err(err),
    };

    let mut records = Vec::with_capacity(height);
    for row in 0..height {
        let date = dates[row].ok_or_else(|| DatemError::NullValue {
            column: columns.date.clone(),
            row,
        })?;

        records.push(DatemRecord {
            date,
            duration: durations[row].clone(),
            lat: lats[row],
            lon: lons[row],
            obs: obs[row],
            model: vals[row],
            station_id: station_ids[row].clone(),
            altitude: altitudes[row],
        });
    }

    Ok(records)
}

/// Serialize a DataFrame to a datem file
pub fn frame_to_datem(
    path: &Path,
    df: &DataFrame,
    header_label: &str,
    mode: WriteMode,
    columns: &FrameColumns,
) -> Result<usize> {
    let records = frame_to_records(df, columns)?;
    write_datem_records(path, &records, header_label, mode)
}

/// Read a CSV table with a header row, parsing date-like columns
pub fn read_csv_table(path: &Path) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .map_parse_options(|options| options.with_try_parse_dates(true))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    debug!(
        "Read {} rows x {} columns from {}",
        df.height(),
        df.width(),
        path.display()
    );
    Ok(df)
}

/// Whether a path names a Parquet file
pub fn is_parquet_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("parquet"))
}

/// Write a table as Parquet (by extension) or CSV
pub fn write_table(
    df: &mut DataFrame,
    path: &Path,
    compression: CompressionAlgorithm,
) -> Result<()> {
    let file = File::create(path)?;

    if is_parquet_path(path) {
        ParquetWriter::new(file)
            .with_compression(compression.to_polars_compression())
            .finish(df)?;
    } else {
        CsvWriter::new(file).include_header(true).finish(df)?;
    }

    debug!("Wrote {} rows to {}", df.height(), path.display());
    Ok(())
}

/// Write a table as CSV to any writer
pub fn write_csv<W: Write>(df: &mut DataFrame, writer: W) -> Result<()> {
    CsvWriter::new(writer).include_header(true).finish(df)?;
    Ok(())
}
