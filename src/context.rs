//! The explicitly passed context shared by every data store operation.
//!
//! Holds what would otherwise be process-wide state: configuration,
//! the storage backend, one metadata registry per store kind, key mappings
//! and preferences. Tests build isolated contexts with
//! [`StoreContext::in_memory`].

use crate::config::StoreConfig;
use crate::constants::{PREFERENCES_FILE, registries};
use crate::error::{DataStoreError, Result};
use crate::mapping::Mappings;
use crate::models::Metadata;
use crate::preferences::Preferences;
use crate::registry::MetadataRegistry;
use crate::storage::{FsStorage, MemoryStorage, StorageBackend};
use std::collections::BTreeMap;
use tracing::info;

#[derive(Debug)]
pub struct StoreContext {
    config: StoreConfig,
    storage: Box<dyn StorageBackend>,
    registries: BTreeMap<&'static str, MetadataRegistry>,
    mappings: Mappings,
    preferences: Preferences,
    file_backed: bool,
}

impl StoreContext {
    /// Open the file-backed context rooted at `config.data_dir`
    pub fn open(config: StoreConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;
        info!("Opening data stores at {}", config.data_dir.display());

        let mut registries = BTreeMap::new();
        for &name in registries::ALL {
            registries.insert(name, Self::open_registry(&config, name)?);
        }

        Ok(Self {
            storage: Box::new(FsStorage::new(&config)),
            mappings: Mappings::open(&config.data_dir)?,
            preferences: Preferences::open(config.data_dir.join(PREFERENCES_FILE))?,
            registries,
            config,
            file_backed: true,
        })
    }

    /// A context that never touches the filesystem
    pub fn in_memory(config: StoreConfig) -> Result<Self> {
        let registries = registries::ALL
            .iter()
            .map(|&name| (name, MetadataRegistry::in_memory(name)))
            .collect();

        Ok(Self {
            config,
            storage: Box::new(MemoryStorage::new()),
            registries,
            mappings: Mappings::in_memory()?,
            preferences: Preferences::in_memory(),
            file_backed: false,
        })
    }

    /// Replace the storage backend, keeping registries and mappings
    pub fn with_storage(mut self, storage: Box<dyn StorageBackend>) -> Self {
        self.storage = storage;
        self
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn storage(&self) -> &dyn StorageBackend {
        self.storage.as_ref()
    }

    pub fn storage_mut(&mut self) -> &mut dyn StorageBackend {
        self.storage.as_mut()
    }

    pub fn registry(&self, name: &str) -> Option<&MetadataRegistry> {
        self.registries.get(name)
    }

    /// Registry for `name`, created on first use for custom store kinds
    pub fn registry_mut(&mut self, name: &'static str) -> Result<&mut MetadataRegistry> {
        if !self.registries.contains_key(name) {
            let registry = if self.file_backed {
                Self::open_registry(&self.config, name)?
            } else {
                MetadataRegistry::in_memory(name)
            };
            self.registries.insert(name, registry);
        }
        self.registries
            .get_mut(name)
            .ok_or_else(|| DataStoreError::Configuration {
                message: format!("Registry {} could not be opened", name),
            })
    }

    pub fn is_registered(&self, registry: &str, name: &str) -> bool {
        self.registries
            .get(registry)
            .is_some_and(|r| r.contains(name))
    }

    pub fn metadata(&self, registry: &str, name: &str) -> Option<&Metadata> {
        self.registries.get(registry).and_then(|r| r.get(name))
    }

    pub fn mappings(&self) -> &Mappings {
        &self.mappings
    }

    pub fn mappings_mut(&mut self) -> &mut Mappings {
        &mut self.mappings
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn preferences_mut(&mut self) -> &mut Preferences {
        &mut self.preferences
    }

    fn open_registry(config: &StoreConfig, name: &'static str) -> Result<MetadataRegistry> {
        MetadataRegistry::open(name, config.data_dir.join(format!("{}.json", name)))
    }
}
