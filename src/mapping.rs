//! Key mappings: stable integer ids for reference keys.
//!
//! Processed arrays cannot hold composite keys such as
//! `["biosphere", "co2"]`, so every key written to a store is assigned a
//! sequential `u32` id here. Keys are canonicalised by their compact JSON
//! text. Ids are never reused or reassigned.

use crate::constants::{GEOMAPPING_FILE, GLOBAL_LOCATION, MAPPING_FILE};
use crate::error::{DataStoreError, Result};
use crate::storage::{read_json_file, write_json_atomic};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Mapping {
    label: &'static str,
    ids: BTreeMap<String, u32>,
    path: Option<PathBuf>,
}

impl Mapping {
    /// Create an empty, memory-only mapping
    pub fn in_memory(label: &'static str) -> Self {
        Self {
            label,
            ids: BTreeMap::new(),
            path: None,
        }
    }

    /// Open a file-backed mapping, starting empty if the file is absent
    pub fn open(label: &'static str, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let ids = read_json_file::<BTreeMap<String, u32>>(&path)?.unwrap_or_default();
        debug!("Loaded {} mapping with {} keys", label, ids.len());
        Ok(Self {
            label,
            ids,
            path: Some(path),
        })
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn canonical_key(key: &Value) -> String {
        key.to_string()
    }

    /// Register keys, assigning ids to those not yet present
    ///
    /// Returns the number of newly assigned ids. The backing file is only
    /// rewritten when something was added.
    pub fn add<'a>(&mut self, keys: impl IntoIterator<Item = &'a Value>) -> Result<usize> {
        let mut added = 0;
        for key in keys {
            let canonical = Self::canonical_key(key);
            if !self.ids.contains_key(&canonical) {
                let next = self.next_id();
                self.ids.insert(canonical, next);
                added += 1;
            }
        }

        if added > 0 {
            debug!("Added {} keys to {} mapping", added, self.label);
            self.save()?;
        }
        Ok(added)
    }

    pub fn get(&self, key: &Value) -> Option<u32> {
        self.ids.get(&Self::canonical_key(key)).copied()
    }

    /// Look up a key, failing with `UnmappedKey` when absent
    pub fn require(&self, key: &Value) -> Result<u32> {
        self.get(key).ok_or_else(|| DataStoreError::UnmappedKey {
            mapping: self.label.to_string(),
            key: Self::canonical_key(key),
        })
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    fn next_id(&self) -> u32 {
        self.ids.values().max().map(|max| max + 1).unwrap_or(1)
    }

    fn save(&self) -> Result<()> {
        match &self.path {
            Some(path) => write_json_atomic(path, &self.ids),
            None => Ok(()),
        }
    }
}

/// The two mappings consulted by store kinds
#[derive(Debug, Clone)]
pub struct Mappings {
    /// Activity and flow keys
    pub mapping: Mapping,
    /// Locations; the global location is always present
    pub geomapping: Mapping,
}

impl Mappings {
    pub fn in_memory() -> Result<Self> {
        Self::with_global(Mapping::in_memory("mapping"), Mapping::in_memory("geomapping"))
    }

    /// Open both mappings from files under `dir`
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        Self::with_global(
            Mapping::open("mapping", dir.join(MAPPING_FILE))?,
            Mapping::open("geomapping", dir.join(GEOMAPPING_FILE))?,
        )
    }

    fn with_global(mapping: Mapping, mut geomapping: Mapping) -> Result<Self> {
        geomapping.add([&Value::from(GLOBAL_LOCATION)])?;
        Ok(Self {
            mapping,
            geomapping,
        })
    }
}
