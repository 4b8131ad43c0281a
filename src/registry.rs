//! Metadata registry: store name to attribute record.
//!
//! One registry exists per store kind (`databases`, `methods`, ...). A
//! registry is either memory-only or backed by a JSON file under the data
//! directory, rewritten on every change.

use crate::error::Result;
use crate::models::Metadata;
use crate::storage::{read_json_file, write_json_atomic};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct MetadataRegistry {
    name: &'static str,
    entries: BTreeMap<String, Metadata>,
    path: Option<PathBuf>,
}

impl MetadataRegistry {
    pub fn in_memory(name: &'static str) -> Self {
        Self {
            name,
            entries: BTreeMap::new(),
            path: None,
        }
    }

    /// Open a file-backed registry, starting empty if the file is absent
    pub fn open(name: &'static str, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = read_json_file::<BTreeMap<String, Metadata>>(&path)?.unwrap_or_default();
        debug!("Loaded {} registry with {} entries", name, entries.len());
        Ok(Self {
            name,
            entries,
            path: Some(path),
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Metadata> {
        self.entries.get(key)
    }

    /// Store an attribute record, replacing any previous one
    pub fn set(&mut self, key: &str, attributes: Metadata) -> Result<()> {
        self.entries.insert(key.to_string(), attributes);
        self.save()
    }

    /// Remove an entry; returns whether it was present
    pub fn delete(&mut self, key: &str) -> Result<bool> {
        let removed = self.entries.remove(key).is_some();
        if removed {
            self.save()?;
        }
        Ok(removed)
    }

    /// Registered names in sorted order
    pub fn names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn save(&self) -> Result<()> {
        match &self.path {
            Some(path) => write_json_atomic(path, &self.entries),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn attributes(value: serde_json::Value) -> Metadata {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("attributes must be an object"),
        }
    }

    #[test]
    fn test_set_get_delete() {
        let mut registry = MetadataRegistry::in_memory("methods");
        assert!(!registry.contains("ipcc"));

        registry
            .set("ipcc", attributes(json!({"unit": "kg CO2-eq"})))
            .unwrap();
        assert!(registry.contains("ipcc"));
        assert_eq!(registry.get("ipcc").unwrap()["unit"], json!("kg CO2-eq"));

        assert!(registry.delete("ipcc").unwrap());
        assert!(!registry.delete("ipcc").unwrap());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_names_are_sorted() {
        let mut registry = MetadataRegistry::in_memory("databases");
        registry.set("zeta", Metadata::new()).unwrap();
        registry.set("alpha", Metadata::new()).unwrap();
        assert_eq!(registry.names(), vec!["alpha", "zeta"]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_file_backed_registry_persists() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("databases.json");

        let mut registry = MetadataRegistry::open("databases", &path).unwrap();
        registry
            .set("ecoinvent", attributes(json!({"version": 3})))
            .unwrap();

        let reopened = MetadataRegistry::open("databases", &path).unwrap();
        assert_eq!(reopened.get("ecoinvent").unwrap()["version"], json!(3));
    }
}
