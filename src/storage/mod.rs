//! Persistence transport for intermediate and processed data.
//!
//! The data store core only talks to the `StorageBackend` trait. Two
//! backends are provided:
//! - [`fs::FsStorage`] - JSON intermediate files and Parquet processed files
//!   under the configured data directory
//! - [`memory::MemoryStorage`] - in-process maps, for tests and dry runs
//!
//! Reads return `Ok(None)` when nothing has been persisted under a name.
//! Writes fully replace prior content.

pub mod fs;
pub mod memory;
pub mod parquet;

pub use fs::FsStorage;
pub use memory::MemoryStorage;

use crate::array::ProcessedArray;
use crate::error::{DataStoreError, Result};
use crate::models::{BackupDocument, IntermediateData, IntermediateRecord};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::ffi::OsString;
use std::fs::File;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

pub trait StorageBackend: std::fmt::Debug {
    fn read_intermediate(&self, filename: &str) -> Result<Option<IntermediateData>>;

    fn write_intermediate(&mut self, filename: &str, data: &[IntermediateRecord]) -> Result<()>;

    fn read_processed(&self, filename: &str) -> Result<Option<ProcessedArray>>;

    fn write_processed(&mut self, filename: &str, array: &ProcessedArray) -> Result<()>;

    /// Persist a backup document; returns where it was written
    fn write_backup(&mut self, filename: &str, document: &BackupDocument) -> Result<String>;
}

/// Sibling temp path used for atomic replacement
pub(crate) fn tmp_write_path(path: &Path) -> PathBuf {
    let mut tmp: OsString = path.as_os_str().to_os_string();
    tmp.push(format!(".tmp-{}", std::process::id()));
    PathBuf::from(tmp)
}

pub(crate) fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Write `write_body` to a temp file, sync it and rename it over `path`
///
/// On failure the temp file is removed and the previous content of `path`
/// is left untouched.
pub(crate) fn write_atomic<F>(path: &Path, write_body: F) -> Result<()>
where
    F: FnOnce(&mut File) -> Result<()>,
{
    ensure_parent_dir(path)?;
    let tmp_path = tmp_write_path(path);

    let result = (|| -> Result<()> {
        let mut file = File::create(&tmp_path)?;
        write_body(&mut file)?;
        file.sync_all()?;
        Ok(())
    })();

    if let Err(error) = result {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(error);
    }

    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Serialize `value` as pretty JSON and atomically replace `path`
pub(crate) fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    write_atomic(path, |file| {
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.flush()?;
        Ok(())
    })
}

/// Read a JSON file; `Ok(None)` if it does not exist
pub(crate) fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| DataStoreError::CorruptFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}
