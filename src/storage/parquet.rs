//! Parquet writing module for processed arrays
//!
//! Writes processed DataFrames to Parquet files with the configured
//! compression, replacing any previous file atomically.

use crate::config::{CompressionAlgorithm, StoreConfig};
use crate::error::{DataStoreError, Result};
use crate::storage::write_atomic;

use polars::prelude::{
    DataFrame, ParquetReader, ParquetWriter as PolarsParquetWriter, SerReader, StatisticsOptions,
};
use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// Parquet writer with the store's output settings
#[derive(Debug, Clone)]
pub struct ParquetWriter {
    compression: CompressionAlgorithm,
    statistics: StatisticsOptions,
}

impl ParquetWriter {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            compression: config.compression,
            statistics: config.statistics_options(),
        }
    }

    /// Write a DataFrame, fully replacing `path`
    pub fn write_dataframe(&self, path: &Path, df: &DataFrame) -> Result<usize> {
        let mut df = df.clone();
        let rows = df.height();

        write_atomic(path, |file| {
            PolarsParquetWriter::new(file)
                .with_compression(self.compression.to_polars_compression())
                .with_statistics(self.statistics)
                .finish(&mut df)
                .map_err(|e| DataStoreError::CorruptFile {
                    path: path.to_path_buf(),
                    reason: format!("Failed to write parquet: {}", e),
                })?;
            Ok(())
        })?;

        debug!("Wrote {} rows to {}", rows, path.display());
        Ok(rows)
    }
}

/// Read a parquet file; `Ok(None)` if it does not exist
pub fn read_dataframe(path: &Path) -> Result<Option<DataFrame>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let df = ParquetReader::new(file)
        .finish()
        .map_err(|e| DataStoreError::CorruptFile {
            path: path.to_path_buf(),
            reason: format!("Failed to read parquet: {}", e),
        })?;
    Ok(Some(df))
}
