//! Core data structures for datem processing.
//!
//! Defines the datem record, station identifiers and locations, and the
//! column sets used to map tables onto the datem layout.

use crate::constants::frame_columns;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Station identifier as it appears in a datem line
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StationId {
    Integer(i64),
    Label(String),
}

impl StationId {
    /// Build an integer id from a float, truncating toward zero
    pub fn from_float(value: f64) -> Self {
        StationId::Integer(value.trunc() as i64)
    }

    /// Render the fixed-width site_id field
    ///
    /// Integers are right-justified to 12 columns and followed by one space.
    /// Labels are right-justified to 12 columns and followed by two spaces.
    pub fn to_field(&self) -> String {
        match self {
            StationId::Integer(id) => format!("{:>12} ", id),
            StationId::Label(label) => format!("{:>12}  ", label),
        }
    }
}

impl From<i64> for StationId {
    fn from(id: i64) -> Self {
        StationId::Integer(id)
    }
}

impl From<String> for StationId {
    fn from(label: String) -> Self {
        StationId::Label(label)
    }
}

impl From<&str> for StationId {
    fn from(label: &str) -> Self {
        StationId::Label(label.to_string())
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StationId::Integer(id) => write!(f, "{}", id),
            StationId::Label(label) => f.write_str(label),
        }
    }
}

/// One observation/model pair at a station and time
#[derive(Debug, Clone, PartialEq)]
pub struct DatemRecord {
    pub date: NaiveDateTime,
    /// Sampling duration as HHMM
    pub duration: String,
    pub lat: f64,
    pub lon: f64,
    pub obs: f64,
    pub model: f64,
    /// `None` when the source value had no usable type
    pub station_id: Option<StationId>,
    pub altitude: f64,
}

/// A station location for the dummy station file
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StationLocation {
    pub lat: f64,
    pub lon: f64,
    /// Sampling interval in hours
    pub interval_hours: i64,
}

impl StationLocation {
    pub fn new(lat: f64, lon: f64, interval_hours: i64) -> Self {
        Self {
            lat,
            lon,
            interval_hours,
        }
    }
}

/// How a serialized file is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Truncate and write the two-line header first
    #[default]
    Overwrite,
    /// Append data lines only
    Append,
}

/// Names of the eight table columns read when serializing a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameColumns {
    pub date: String,
    pub duration: String,
    pub lat: String,
    pub lon: String,
    pub obs: String,
    pub vals: String,
    pub station_id: String,
    pub altitude: String,
}

impl Default for FrameColumns {
    fn default() -> Self {
        Self {
            date: frame_columns::DATE.to_string(),
            duration: frame_columns::DURATION.to_string(),
            lat: frame_columns::LAT.to_string(),
            lon: frame_columns::LON.to_string(),
            obs: frame_columns::OBS.to_string(),
            vals: frame_columns::VALS.to_string(),
            station_id: frame_columns::STATION_ID.to_string(),
            altitude: frame_columns::ALTITUDE.to_string(),
        }
    }
}

impl FrameColumns {
    /// Build from an ordered list of eight names
    /// (date, duration, lat, lon, obs, vals, station id, altitude)
    pub fn from_ordered(names: &[String]) -> Option<Self> {
        match names {
            [date, duration, lat, lon, obs, vals, station_id, altitude] => Some(Self {
                date: date.clone(),
                duration: duration.clone(),
                lat: lat.clone(),
                lon: lon.clone(),
                obs: obs.clone(),
                vals: vals.clone(),
                station_id: station_id.clone(),
                altitude: altitude.clone(),
            }),
            _ => None,
        }
    }

    /// Column names in serialization order
    pub fn ordered(&self) -> [&str; 8] {
        [
            self.date.as_str(),
            self.duration.as_str(),
            self.lat.as_str(),
            self.lon.as_str(),
            self.obs.as_str(),
            self.vals.as_str(),
            self.station_id.as_str(),
            self.altitude.as_str(),
        ]
    }
}
