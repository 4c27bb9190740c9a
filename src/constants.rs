//! Application constants for the datem processor
//!
//! Fixed file names, header captions and default column layouts shared by
//! the script generator, the writers and the parsers.

// =============================================================================
// c2datem Invocation
// =============================================================================

/// Name of the external extraction tool, resolved relative to `$MDL`
pub const C2DATEM_TOOL: &str = "c2datem";

/// Station/time definition file passed to c2datem with `-m`
pub const DATEM_DEFINITION_FILE: &str = "datemfile.txt";

/// Default name of the generated shell script
pub const DEFAULT_SCRIPT_NAME: &str = "datem.sh";

/// Default concentration multiplier passed with `-c`
pub const DEFAULT_MULTIPLIER: &str = "1e20";

/// Default directory holding the c2datem executable
pub const DEFAULT_MODEL_DIR: &str = "./";

/// Default target for concatenated c2datem output
pub const DEFAULT_CONCAT_FILE: &str = "model.txt";

/// Substring of a cdump file name replaced to build its output base name
pub const CDUMP_MARKER: &str = "cdump";

/// Replacement for [`CDUMP_MARKER`] in output base names
pub const MODEL_MARKER: &str = "model";

/// Level index that selects levels by height (`-z-1`)
pub const HEIGHT_LEVEL: i32 = -1;

/// Particle size used when a requested size is not an integer
pub const FALLBACK_PARTICLE_SIZE: u32 = 1;

// =============================================================================
// Datem Text Layout
// =============================================================================

/// Default label on the first header line of a serialized datem file
pub const DEFAULT_HEADER_LABEL: &str = "Header";

/// Suffix appended to the header label
pub const HEADER_LABEL_SUFFIX: &str = " (obs then model) ";

/// Column caption line of a serialized datem file
pub const DATEM_CAPTION: &str = "year mn dy shr dur(hhmm) LAT LON  ug/m2 ug/m2 site_id  height ";

/// Title line of a dummy station file
pub const STATION_FILE_TITLE: &str = "DOE ASHFALL PROJECT";

/// Column caption line of a dummy station file
pub const STATION_FILE_CAPTION: &str = "year mn dy shr dur(hhmm) LAT LON g/m2  site_id  height ";

/// Default height field of a dummy station file
pub const DEFAULT_STATION_HEIGHT: &str = " 10";

/// Number of header lines preceding data in a merged file
pub const MERGED_HEADER_LINES: usize = 2;

/// Number of data rows shown when a merged file has a bad date
pub const MERGED_SAMPLE_ROWS: usize = 10;

/// `strftime` pattern of the date fields
pub const DATE_FORMAT: &str = "%Y %m %d %H%M";

// =============================================================================
// Column Names
// =============================================================================

/// Name of the synthesized timestamp column in parsed tables
pub const DATE_COLUMN: &str = "date";

/// Date components consumed when synthesizing [`DATE_COLUMN`]
pub mod date_parts {
    pub const YEAR: &str = "year";
    pub const MONTH: &str = "month";
    pub const DAY: &str = "day";
    pub const HOUR: &str = "hour";

    pub const ALL: &[&str] = &[YEAR, MONTH, DAY, HOUR];
}

/// Fixed layout of a merged (post-processed) file
pub const MERGED_COLUMNS: &[&str] = &[
    "Num", "sid", "lat", "lon", "year", "month", "day", "hour", "obs", "model",
];

/// Default layout of a c2datem output file
pub const DEFAULT_DATEM_COLUMNS: &[&str] = &[
    "year",
    "month",
    "day",
    "hour",
    "duration",
    "meas_lat",
    "meas_lon",
    "vals",
    "stationid",
    "sourceid",
    "level",
    "thickness",
];

/// Default column names read when serializing a table
pub mod frame_columns {
    pub const DATE: &str = "date";
    pub const DURATION: &str = "duration";
    pub const LAT: &str = "lat";
    pub const LON: &str = "lon";
    pub const OBS: &str = "obs";
    pub const VALS: &str = "vals";
    pub const STATION_ID: &str = "sid";
    pub const ALTITUDE: &str = "altitude";
}

// =============================================================================
// Configuration
// =============================================================================

/// Directory name under the user config dir
pub const CONFIG_DIR_NAME: &str = "datem-processor";

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Prefix of the default tracing filter
pub const LOG_TARGET: &str = "datem_processor";
