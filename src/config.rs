//! Configuration management and validation.
//!
//! Provides the configuration structure holding c2datem invocation
//! defaults, header labels, column layouts and table output settings,
//! loaded from an optional TOML file.

use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_CONCAT_FILE, DEFAULT_DATEM_COLUMNS,
    DEFAULT_HEADER_LABEL, DEFAULT_MODEL_DIR, DEFAULT_MULTIPLIER, DEFAULT_SCRIPT_NAME,
    DEFAULT_STATION_HEIGHT, date_parts,
};
use crate::error::{DatemError, Result};
use crate::models::FrameColumns;
use polars::prelude::ParquetCompression;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Supported compression algorithms for parquet table output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionAlgorithm {
    /// Snappy compression - good balance of speed and compression
    #[default]
    Snappy,
    /// ZSTD compression - better compression ratio, slower
    Zstd,
    /// LZ4 compression - fastest, lower compression ratio
    Lz4,
    /// No compression
    Uncompressed,
}

impl CompressionAlgorithm {
    /// Convert to polars ParquetCompression type
    pub fn to_polars_compression(self) -> ParquetCompression {
        match self {
            CompressionAlgorithm::Snappy => ParquetCompression::Snappy,
            CompressionAlgorithm::Zstd => ParquetCompression::Zstd(None),
            CompressionAlgorithm::Lz4 => ParquetCompression::Lz4Raw,
            CompressionAlgorithm::Uncompressed => ParquetCompression::Uncompressed,
        }
    }
}

/// Global configuration for datem processing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatemConfig {
    /// Concentration multiplier passed to c2datem
    pub multiplier: String,

    /// Directory holding the c2datem executable
    pub model_dir: String,

    /// File receiving concatenated c2datem output
    pub concat_file: String,

    /// Name of the generated shell script
    pub script_name: String,

    /// Label on the first header line of serialized datem files
    pub header_label: String,

    /// Height field written to dummy station files
    pub station_height: String,

    /// Table columns read when serializing a table
    pub frame_columns: FrameColumns,

    /// Column layout of c2datem output files
    pub datem_columns: Vec<String>,

    /// Parquet compression for table output
    pub compression: CompressionAlgorithm,
}

impl Default for DatemConfig {
    fn default() -> Self {
        Self {
            multiplier: DEFAULT_MULTIPLIER.to_string(),
            model_dir: DEFAULT_MODEL_DIR.to_string(),
            concat_file: DEFAULT_CONCAT_FILE.to_string(),
            script_name: DEFAULT_SCRIPT_NAME.to_string(),
            header_label: DEFAULT_HEADER_LABEL.to_string(),
            station_height: DEFAULT_STATION_HEIGHT.to_string(),
            frame_columns: FrameColumns::default(),
            datem_columns: DEFAULT_DATEM_COLUMNS.iter().map(|s| s.to_string()).collect(),
            compression: CompressionAlgorithm::default(),
        }
    }
}

impl DatemConfig {
    /// Default config file location (`<config dir>/datem-processor/config.toml`)
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| DatemError::Configuration {
            message: "Could not determine user config directory".to_string(),
        })?;
        Ok(config_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load and validate a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: DatemConfig =
            toml::from_str(&content).map_err(|e| DatemError::Configuration {
                message: format!("Failed to parse {}: {}", path.display(), e),
            })?;
        config.validate()?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load from an explicit path, else from the default path when it
    /// exists, else fall back to defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        match Self::default_config_path() {
            Ok(path) if path.exists() => Self::from_file(&path),
            _ => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Validate column layouts
    pub fn validate(&self) -> Result<()> {
        if let Some(empty) = self.frame_columns.ordered().iter().find(|c| c.trim().is_empty()) {
            return Err(DatemError::Configuration {
                message: format!("frame_columns contains an empty name '{}'", empty),
            });
        }

        for part in date_parts::ALL {
            if !self.datem_columns.iter().any(|c| c == part) {
                return Err(DatemError::Configuration {
                    message: format!("datem_columns must include '{}'", part),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = DatemConfig::default();
        assert_eq!(config.multiplier, "1e20");
        assert_eq!(config.model_dir, "./");
        assert_eq!(config.concat_file, "model.txt");
        assert_eq!(config.script_name, "datem.sh");
        assert_eq!(config.datem_columns.len(), 12);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "multiplier = \"1e15\"").unwrap();
        writeln!(file, "compression = \"zstd\"").unwrap();
        writeln!(file, "[frame_columns]").unwrap();
        writeln!(file, "station_id = \"site\"").unwrap();

        let config = DatemConfig::from_file(file.path()).unwrap();
        assert_eq!(config.multiplier, "1e15");
        assert_eq!(config.compression, CompressionAlgorithm::Zstd);
        assert_eq!(config.frame_columns.station_id, "site");
        assert_eq!(config.frame_columns.date, "date");
        assert_eq!(config.concat_file, "model.txt");
    }

    #[test]
    fn test_datem_columns_require_date_parts() {
        let config = DatemConfig {
            datem_columns: vec!["year".to_string(), "month".to_string(), "vals".to_string()],
            ..DatemConfig::default()
        };
        match config.validate() {
            Err(DatemError::Configuration { message }) => assert!(message.contains("'day'")),
            other => panic!("Expected configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "multiplier = ").unwrap();
        assert!(matches!(
            DatemConfig::from_file(file.path()),
            Err(DatemError::Configuration { .. })
        ));
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let result = DatemConfig::load(Some(Path::new("/nonexistent/datem/config.toml")));
        assert!(matches!(result, Err(DatemError::Io(_))));
    }
}
