//! Datem Processor Library
//!
//! A Rust library for the datem text format used to exchange station,
//! time and concentration data with the HYSPLIT `c2datem` tool.
//!
//! This library provides tools for:
//! - Generating the shell script that runs c2datem over cdump model output
//! - Writing dummy station files that declare where and when to extract
//! - Serializing observation/model pairs into the fixed-column datem layout
//! - Parsing c2datem and merged output back into polars DataFrames

pub mod cli;
pub mod commands;
pub mod config;
pub mod constants;
pub mod error;
pub mod frame;
pub mod header;
pub mod models;
pub mod reader;
pub mod script;
pub mod writer;

// Re-export commonly used types
pub use config::DatemConfig;
pub use error::{DatemError, Result};
pub use frame::{frame_to_datem, frame_to_records};
pub use models::{DatemRecord, FrameColumns, StationId, StationLocation, WriteMode};
pub use reader::{read_datem_file, read_merged_file};
pub use script::{CdumpFileSet, ScriptOptions, write_datem_script};
pub use writer::{write_datem_records, write_station_file};
