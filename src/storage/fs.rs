//! Filesystem storage backend.
//!
//! Layout under the data directory:
//! - `intermediate/<filename>.json` - intermediate records
//! - `processed/<filename>.parquet` - processed arrays
//! - `backups/<filename>.<timestamp>.json` - backup documents

use crate::array::ProcessedArray;
use crate::config::StoreConfig;
use crate::constants::{INTERMEDIATE_EXTENSION, PROCESSED_EXTENSION};
use crate::error::Result;
use crate::models::{BackupDocument, IntermediateData, IntermediateRecord};
use crate::storage::parquet::{ParquetWriter, read_dataframe};
use crate::storage::{StorageBackend, read_json_file, write_json_atomic};
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug)]
pub struct FsStorage {
    intermediate_dir: PathBuf,
    processed_dir: PathBuf,
    backup_dir: PathBuf,
    parquet_writer: ParquetWriter,
}

impl FsStorage {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            intermediate_dir: config.intermediate_dir(),
            processed_dir: config.processed_dir(),
            backup_dir: config.backup_dir(),
            parquet_writer: ParquetWriter::new(config),
        }
    }

    pub fn intermediate_path(&self, filename: &str) -> PathBuf {
        self.intermediate_dir
            .join(format!("{}.{}", filename, INTERMEDIATE_EXTENSION))
    }

    pub fn processed_path(&self, filename: &str) -> PathBuf {
        self.processed_dir
            .join(format!("{}.{}", filename, PROCESSED_EXTENSION))
    }
}

impl StorageBackend for FsStorage {
    fn read_intermediate(&self, filename: &str) -> Result<Option<IntermediateData>> {
        read_json_file(&self.intermediate_path(filename))
    }

    fn write_intermediate(&mut self, filename: &str, data: &[IntermediateRecord]) -> Result<()> {
        let path = self.intermediate_path(filename);
        write_json_atomic(&path, data)?;
        debug!("Wrote {} intermediate records to {}", data.len(), path.display());
        Ok(())
    }

    fn read_processed(&self, filename: &str) -> Result<Option<ProcessedArray>> {
        Ok(read_dataframe(&self.processed_path(filename))?.map(ProcessedArray::from_dataframe))
    }

    fn write_processed(&mut self, filename: &str, array: &ProcessedArray) -> Result<()> {
        self.parquet_writer
            .write_dataframe(&self.processed_path(filename), array.dataframe())?;
        Ok(())
    }

    fn write_backup(&mut self, filename: &str, document: &BackupDocument) -> Result<String> {
        let stamp = document.created_at.format("%Y%m%dT%H%M%S%.3fZ");
        let path = self.backup_dir.join(format!("{}.{}.json", filename, stamp));
        write_json_atomic(&path, document)?;
        Ok(path.display().to_string())
    }
}
