//! Persisted preferences consumed by the update driver.

use crate::error::Result;
use crate::storage::{read_json_file, write_json_atomic};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct Preferences {
    values: Map<String, Value>,
    path: Option<PathBuf>,
}

impl Preferences {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let values = read_json_file::<Map<String, Value>>(&path)?.unwrap_or_default();
        Ok(Self {
            values,
            path: Some(path),
        })
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.values.get_mut(key)
    }

    /// Set a value in memory; call `save` to persist it
    pub fn set(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }

    pub fn save(&self) -> Result<()> {
        match &self.path {
            Some(path) => write_json_atomic(path, &self.values),
            None => Ok(()),
        }
    }
}
