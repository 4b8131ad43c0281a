//! Configuration management.
//!
//! Provides the process-wide settings shared by every data store: the
//! storage root, the registration warning switch and Parquet output options
//! for processed arrays.

use crate::constants::{APP_DIR_NAME, ENV_DATA_DIR, ENV_DONT_WARN};
use crate::error::{DataStoreError, Result};
use polars::prelude::{ParquetCompression, StatisticsOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Supported compression algorithms for processed parquet files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompressionAlgorithm {
    /// Snappy compression - good balance of speed and compression
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
    pub fn to_polars_compression(&self) -> ParquetCompression {
        match self {
            CompressionAlgorithm::Snappy => ParquetCompression::Snappy,
            CompressionAlgorithm::Zstd => ParquetCompression::Zstd(None),
            CompressionAlgorithm::Lz4 => ParquetCompression::Lz4Raw,
            CompressionAlgorithm::Uncompressed => ParquetCompression::Uncompressed,
        }
    }

    /// Parse a compression name as accepted by `--compression`
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "snappy" => Ok(CompressionAlgorithm::Snappy),
            "zstd" => Ok(CompressionAlgorithm::Zstd),
            "lz4" => Ok(CompressionAlgorithm::Lz4),
            "none" | "uncompressed" => Ok(CompressionAlgorithm::Uncompressed),
            other => Err(DataStoreError::Configuration {
                message: format!("Unknown compression algorithm: {}", other),
            }),
        }
    }
}

/// Global configuration for data store processing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Root directory holding registries, intermediate and processed data
    pub data_dir: PathBuf,

    /// Suppress the warning emitted for handles on unregistered names
    pub dont_warn: bool,

    /// Compression used for processed parquet files
    pub compression: CompressionAlgorithm,

    /// Write column statistics into processed parquet files
    pub enable_statistics: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR_NAME);

        Self {
            data_dir,
            dont_warn: false,
            compression: CompressionAlgorithm::Snappy,
            enable_statistics: true,
        }
    }
}

impl StoreConfig {
    /// Default configuration with environment overrides applied
    ///
    /// `LCA_DATASTORE_DIR` replaces the data directory and
    /// `LCA_DATASTORE_DONT_WARN` (any of `1`, `true`, `yes`) silences
    /// registration warnings.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = std::env::var(ENV_DATA_DIR) {
            if !dir.trim().is_empty() {
                config.data_dir = PathBuf::from(dir);
            }
        }

        if let Ok(flag) = std::env::var(ENV_DONT_WARN) {
            config.dont_warn = matches!(
                flag.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes"
            );
        }

        debug!(
            "Store configuration: data_dir={}, dont_warn={}",
            config.data_dir.display(),
            config.dont_warn
        );
        config
    }

    /// Create configuration rooted at a custom data directory
    pub fn with_data_dir(mut self, data_dir: impl AsRef<Path>) -> Self {
        self.data_dir = data_dir.as_ref().to_path_buf();
        self
    }

    /// Silence registration warnings
    pub fn with_dont_warn(mut self) -> Self {
        self.dont_warn = true;
        self
    }

    /// Set parquet compression
    pub fn with_compression(mut self, compression: CompressionAlgorithm) -> Self {
        self.compression = compression;
        self
    }

    /// Disable parquet column statistics
    pub fn without_statistics(mut self) -> Self {
        self.enable_statistics = false;
        self
    }

    /// Statistics options handed to the parquet writer
    pub fn statistics_options(&self) -> StatisticsOptions {
        if self.enable_statistics {
            StatisticsOptions::full()
        } else {
            StatisticsOptions::empty()
        }
    }

    pub fn intermediate_dir(&self) -> PathBuf {
        self.data_dir.join("intermediate")
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.data_dir.join("processed")
    }

    pub fn backup_dir(&self) -> PathBuf {
        self.data_dir.join("backups")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert!(config.data_dir.ends_with(APP_DIR_NAME));
        assert!(!config.dont_warn);
        assert_eq!(config.compression, CompressionAlgorithm::Snappy);
        assert!(config.enable_statistics);
    }

    #[test]
    fn test_builder_methods() {
        let config = StoreConfig::default()
            .with_data_dir("/tmp/lca")
            .with_dont_warn()
            .with_compression(CompressionAlgorithm::Zstd)
            .without_statistics();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/lca"));
        assert!(config.dont_warn);
        assert_eq!(config.compression, CompressionAlgorithm::Zstd);
        assert!(!config.enable_statistics);
        assert_eq!(config.intermediate_dir(), PathBuf::from("/tmp/lca/intermediate"));
        assert_eq!(config.processed_dir(), PathBuf::from("/tmp/lca/processed"));
    }

    #[test]
    fn test_compression_from_name() {
        assert_eq!(
            CompressionAlgorithm::from_name("ZSTD").unwrap(),
            CompressionAlgorithm::Zstd
        );
        assert_eq!(
            CompressionAlgorithm::from_name("none").unwrap(),
            CompressionAlgorithm::Uncompressed
        );
        assert!(CompressionAlgorithm::from_name("brotli").is_err());
    }
}
