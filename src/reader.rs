//! Datem text parsers.
//!
//! Reads whitespace-delimited datem files into tables. Columns are
//! positional and named by the caller; the packed `hour` field (HHMM) is
//! split into hour and minute and combined with year, month and day into a
//! single `date` column.
//!
//! Two entry points exist and deliberately differ: [`read_merged_file`]
//! skips the two header lines of a post-processed merged file and reports a
//! bad date as the fatal [`DatemError::MergedDate`], while
//! [`read_datem_file`] reads from the first line and returns the ordinary
//! [`DatemError::InvalidDate`].

use crate::constants::{MERGED_COLUMNS, MERGED_HEADER_LINES, MERGED_SAMPLE_ROWS, date_parts};
use crate::error::{DatemError, Result};
use crate::header::skip_header_lines;
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::DataFrame;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

/// One data line split into fields
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    /// 1-based line number in the source file
    pub line: usize,
    pub fields: Vec<String>,
}

/// Parsed rows with the date components folded into one timestamp
///
/// `columns` excludes the consumed year/month/day/hour columns; each row in
/// `rows` holds one optional value per entry in `columns`.
#[derive(Debug, Clone, PartialEq)]
pub struct DatemTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
    pub dates: Vec<NaiveDateTime>,
}

impl DatemTable {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Values of one column, `None` where the row was short
    pub fn column(&self, name: &str) -> Option<Vec<Option<&str>>> {
        let index = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|row| row[index].as_deref()).collect())
    }
}

/// Combine date components into a timestamp
///
/// `hhmm` packs hour and minute as `hour * 100 + minute`. Returns `None`
/// when the components do not form a valid calendar date and time.
pub fn build_date(year: i64, month: i64, day: i64, hhmm: i64) -> Option<NaiveDateTime> {
    let hour = hhmm.div_euclid(100);
    let minute = hhmm.rem_euclid(100);

    NaiveDate::from_ymd_opt(
        i32::try_from(year).ok()?,
        u32::try_from(month).ok()?,
        u32::try_from(day).ok()?,
    )?
    .and_hms_opt(u32::try_from(hour).ok()?, u32::try_from(minute).ok()?, 0)
}

/// Split data lines on runs of whitespace, skipping blank lines
///
/// Rows may have fewer fields than `width` (the missing trailing values
/// read as null) but not more.
pub fn read_raw_rows<R: BufRead>(
    reader: R,
    path: &Path,
    width: usize,
    first_line: usize,
) -> Result<Vec<RawRow>> {
    let mut rows = Vec::new();

    for (offset, line) in reader.lines().enumerate() {
        let line = line?;
        let line_number = first_line + offset;

        let fields: Vec<String> = line.split_whitespace().map(str::to_string).collect();
        if fields.is_empty() {
            continue;
        }
        if fields.len() > width {
            return Err(DatemError::ColumnCount {
                path: path.to_path_buf(),
                line: line_number,
                expected: width,
                found: fields.len(),
            });
        }

        rows.push(RawRow {
            line: line_number,
            fields,
        });
    }

    Ok(rows)
}

/// Positions of the year, month, day and hour columns
fn date_part_indices<S: AsRef<str>>(columns: &[S]) -> Result<[usize; 4]> {
    let mut indices = [0; 4];
    for (slot, part) in indices.iter_mut().zip(date_parts::ALL) {
        *slot = columns
            .iter()
            .position(|c| c.as_ref() == *part)
            .ok_or_else(|| DatemError::MissingColumn {
                column: part.to_string(),
            })?;
    }
    Ok(indices)
}

/// Parse the integer date components of one row
fn date_components(
    path: &Path,
    row: &RawRow,
    columns: &[String],
    indices: &[usize; 4],
) -> Result<[i64; 4]> {
    let mut values = [0i64; 4];
    for (value, &index) in values.iter_mut().zip(indices) {
        let raw = row.fields.get(index).map(String::as_str).unwrap_or("");
        *value = raw.parse::<i64>().map_err(|_| DatemError::Parse {
            path: path.to_path_buf(),
            line: row.line,
            field: columns[index].clone(),
            value: raw.to_string(),
        })?;
    }
    Ok(values)
}

/// How a row whose date cannot be built is reported
#[derive(Clone, Copy)]
enum DateFailure<'a> {
    Propagate,
    Fatal { rows: &'a [RawRow] },
}

fn assemble_table(
    path: &Path,
    columns: &[String],
    rows: &[RawRow],
    on_bad_date: DateFailure<'_>,
) -> Result<DatemTable> {
    let indices = date_part_indices(columns)?;

    let kept: Vec<usize> = (0..columns.len())
        .filter(|i| !indices.contains(i))
        .collect();

    let mut table = DatemTable {
        columns: kept.iter().map(|&i| columns[i].clone()).collect(),
        rows: Vec::with_capacity(rows.len()),
        dates: Vec::with_capacity(rows.len()),
    };

    for row in rows {
        let [year, month, day, hhmm] = date_components(path, row, columns, &indices)?;

        let date = match build_date(year, month, day, hhmm) {
            Some(date) => date,
            None => {
                return Err(match on_bad_date {
                    DateFailure::Propagate => DatemError::InvalidDate {
                        path: path.to_path_buf(),
                        line: row.line,
                        year,
                        month,
                        day,
                        hhmm,
                    },
                    DateFailure::Fatal { rows } => DatemError::MergedDate {
                        path: path.to_path_buf(),
                        line: row.line,
                        sample: sample_rows(rows),
                    },
                });
            }
        };

        table
            .rows
            .push(kept.iter().map(|&i| row.fields.get(i).cloned()).collect());
        table.dates.push(date);
    }

    Ok(table)
}

fn sample_rows(rows: &[RawRow]) -> String {
    rows.iter()
        .take(MERGED_SAMPLE_ROWS)
        .map(|row| row.fields.join(" "))
        .collect::<Vec<_>>()
        .join("\n")
}

fn owned_columns<S: AsRef<str>>(columns: &[S]) -> Vec<String> {
    columns.iter().map(|c| c.as_ref().to_string()).collect()
}

/// Read a merged file into a [`DatemTable`]
///
/// Layout: `Num sid lat lon year month day hour obs model`, after two header
/// lines.
pub fn read_merged_table(path: &Path) -> Result<DatemTable> {
    let mut reader = BufReader::new(File::open(path)?);
    let skipped = skip_header_lines(&mut reader, MERGED_HEADER_LINES)?;

    let columns = owned_columns(MERGED_COLUMNS);
    let rows = read_raw_rows(reader, path, columns.len(), skipped + 1)?;
    let table = assemble_table(path, &columns, &rows, DateFailure::Fatal { rows: &rows })?;

    debug!("Read {} merged rows from {}", table.len(), path.display());
    Ok(table)
}

/// Read a merged (post-processed) file into a DataFrame
///
/// Output columns: `Num sid lat lon obs model date`. A row whose date
/// cannot be built yields [`DatemError::MergedDate`], which is fatal: the
/// caller should stop, typically after printing the error and its sample.
pub fn read_merged_file(path: &Path) -> Result<DataFrame> {
    read_merged_table(path)?.to_dataframe()
}

/// Read a c2datem output file into a [`DatemTable`]
///
/// `columns` names every field in order and must include `year`, `month`,
/// `day` and `hour`. No header lines are skipped.
pub fn read_datem_table<S: AsRef<str>>(path: &Path, columns: &[S]) -> Result<DatemTable> {
    let columns = owned_columns(columns);
    date_part_indices(&columns)?;

    let reader = BufReader::new(File::open(path)?);
    let rows = read_raw_rows(reader, path, columns.len(), 1)?;
    let table = assemble_table(path, &columns, &rows, DateFailure::Propagate)?;

    debug!("Read {} datem rows from {}", table.len(), path.display());
    Ok(table)
}

/// Read a c2datem output file into a DataFrame with a synthesized `date` column
pub fn read_datem_file<S: AsRef<str>>(path: &Path, columns: &[S]) -> Result<DataFrame> {
    read_datem_table(path, columns)?.to_dataframe()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    fn datem_columns() -> Vec<&'static str> {
        crate::constants::DEFAULT_DATEM_COLUMNS.to_vec()
    }

    #[test]
    fn test_build_date_splits_hhmm() {
        let date = build_date(2020, 3, 4, 1530).unwrap();
        assert_eq!(date.to_string(), "2020-03-04 15:30:00");
        assert_eq!(build_date(2020, 3, 4, 5).unwrap().to_string(), "2020-03-04 00:05:00");
        assert!(build_date(2020, 2, 30, 0).is_none());
        assert!(build_date(2020, 1, 1, 2400).is_none());
        assert!(build_date(2020, 1, 1, 1260).is_none());
    }

    #[test]
    fn test_raw_rows_split_on_whitespace() {
        let input = "2020 01 01  0100\t0100 40.0\n\n2020 01 01 0200\n";
        let rows = read_raw_rows(Cursor::new(input), Path::new("x"), 6, 1).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].fields, vec!["2020", "01", "01", "0100", "0100", "40.0"]);
        assert_eq!(rows[1].line, 3);
        assert_eq!(rows[1].fields.len(), 4);
    }

    #[test]
    fn test_raw_rows_too_many_fields() {
        let result = read_raw_rows(Cursor::new("1 2 3\n"), Path::new("x.txt"), 2, 5);
        match result {
            Err(DatemError::ColumnCount {
                line,
                expected,
                found,
                ..
            }) => {
                assert_eq!(line, 5);
                assert_eq!(expected, 2);
                assert_eq!(found, 3);
            }
            other => panic!("Expected ColumnCount error, got {:?}", other),
        }
    }

    #[test]
    fn test_read_datem_table() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "2010 04 15 0130 0100 64.123 -21.988 3.5e-05 1 1 1 100"
        )
        .unwrap();
        writeln!(file, "2010 04 15 0230 0100 64.123 -21.988 0.0 1 1 1 100").unwrap();

        let table = read_datem_table(file.path(), &datem_columns()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.columns,
            vec![
                "duration",
                "meas_lat",
                "meas_lon",
                "vals",
                "stationid",
                "sourceid",
                "level",
                "thickness"
            ]
        );
        assert_eq!(table.dates[0].to_string(), "2010-04-15 01:30:00");
        assert_eq!(table.dates[1].to_string(), "2010-04-15 02:30:00");
        assert_eq!(
            table.column("vals").unwrap(),
            vec![Some("3.5e-05"), Some("0.0")]
        );
    }

    #[test]
    fn test_read_datem_requires_date_columns() {
        let file = NamedTempFile::new().unwrap();
        let result = read_datem_table(file.path(), &["year", "month", "day", "vals"]);
        match result {
            Err(DatemError::MissingColumn { column }) => assert_eq!(column, "hour"),
            other => panic!("Expected MissingColumn error, got {:?}", other),
        }
    }

    #[test]
    fn test_read_datem_invalid_date_propagates() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "2010 02 30 0000 0100 1 2 3 4 5 6 7").unwrap();

        match read_datem_table(file.path(), &datem_columns()) {
            Err(err @ DatemError::InvalidDate { .. }) => {
                assert!(!err.is_fatal());
                assert!(err.to_string().contains("day=30"));
            }
            other => panic!("Expected InvalidDate error, got {:?}", other),
        }
    }

    #[test]
    fn test_read_datem_non_integer_hour() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "2010 04 15 01:30 0100 1 2 3 4 5 6 7").unwrap();

        match read_datem_table(file.path(), &datem_columns()) {
            Err(DatemError::Parse { field, value, .. }) => {
                assert_eq!(field, "hour");
                assert_eq!(value, "01:30");
            }
            other => panic!("Expected Parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_read_merged_table_skips_header() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "merged output").unwrap();
        writeln!(file, "Num sid lat lon year month day hour obs model").unwrap();
        writeln!(file, "1 101 40.0 -105.0 2020 01 02 0300 1.5 2.5").unwrap();
        writeln!(file, "2 102 41.0 -106.0 2020 01 02 1245 0.5 0.25").unwrap();

        let table = read_merged_table(file.path()).unwrap();
        assert_eq!(table.columns, vec!["Num", "sid", "lat", "lon", "obs", "model"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.dates[1].to_string(), "2020-01-02 12:45:00");
        assert_eq!(table.column("sid").unwrap(), vec![Some("101"), Some("102")]);
    }

    #[test]
    fn test_read_merged_bad_date_is_fatal() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "header one").unwrap();
        writeln!(file, "header two").unwrap();
        writeln!(file, "1 101 40.0 -105.0 2020 01 02 0300 1.5 2.5").unwrap();
        writeln!(file, "2 102 41.0 -106.0 2020 13 02 0300 1.5 2.5").unwrap();

        match read_merged_table(file.path()) {
            Err(err @ DatemError::MergedDate { .. }) => {
                assert!(err.is_fatal());
                if let DatemError::MergedDate { path, line, sample } = &err {
                    assert_eq!(path, file.path());
                    assert_eq!(line, &4);
                    assert!(sample.contains("2020 01 02 0300"));
                    assert!(sample.contains("2020 13 02 0300"));
                }
            }
            other => panic!("Expected MergedDate error, got {:?}", other),
        }
    }

    #[test]
    fn test_read_merged_header_only() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "header one").unwrap();

        let table = read_merged_table(file.path()).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.columns.len(), 6);
    }
}
