//! Datem header lines.
//!
//! Writes the two-line headers that precede data in serialized datem and
//! dummy station files, and skips header lines when reading merged files.

use crate::constants::{DATEM_CAPTION, HEADER_LABEL_SUFFIX, STATION_FILE_CAPTION, STATION_FILE_TITLE};
use std::io::{self, BufRead, Write};

/// Write the label and caption lines of a serialized datem file
pub fn write_datem_header<W: Write>(writer: &mut W, label: &str) -> io::Result<()> {
    writeln!(writer, "{}{}", label, HEADER_LABEL_SUFFIX)?;
    writeln!(writer, "{}", DATEM_CAPTION)
}

/// Write the title and caption lines of a dummy station file
pub fn write_station_header<W: Write>(writer: &mut W) -> io::Result<()> {
    writeln!(writer, "{}", STATION_FILE_TITLE)?;
    writeln!(writer, "{}", STATION_FILE_CAPTION)
}

/// Consume up to `count` lines, returning how many were skipped
pub fn skip_header_lines<R: BufRead>(reader: &mut R, count: usize) -> io::Result<usize> {
    let mut line = String::new();
    for skipped in 0..count {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Ok(skipped);
        }
    }
    Ok(count)
}
