//! In-memory storage backend.

use crate::array::ProcessedArray;
use crate::error::Result;
use crate::models::{BackupDocument, IntermediateData, IntermediateRecord};
use crate::storage::StorageBackend;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub struct MemoryStorage {
    intermediate: BTreeMap<String, IntermediateData>,
    processed: BTreeMap<String, ProcessedArray>,
    backups: Vec<BackupDocument>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn backups(&self) -> &[BackupDocument] {
        &self.backups
    }
}

impl StorageBackend for MemoryStorage {
    fn read_intermediate(&self, filename: &str) -> Result<Option<IntermediateData>> {
        Ok(self.intermediate.get(filename).cloned())
    }

    fn write_intermediate(&mut self, filename: &str, data: &[IntermediateRecord]) -> Result<()> {
        self.intermediate.insert(filename.to_string(), data.to_vec());
        Ok(())
    }

    fn read_processed(&self, filename: &str) -> Result<Option<ProcessedArray>> {
        Ok(self.processed.get(filename).cloned())
    }

    fn write_processed(&mut self, filename: &str, array: &ProcessedArray) -> Result<()> {
        self.processed.insert(filename.to_string(), array.clone());
        Ok(())
    }

    fn write_backup(&mut self, filename: &str, document: &BackupDocument) -> Result<String> {
        self.backups.push(document.clone());
        Ok(format!("memory://backups/{}/{}", filename, self.backups.len()))
    }
}
