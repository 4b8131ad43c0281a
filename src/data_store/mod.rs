//! Versioned data stores and the compile-to-array pass.
//!
//! A [`DataStore`] is a lightweight handle: a name plus a [`StoreKind`].
//! All state lives in the [`StoreContext`] passed to each operation:
//! registration in the kind's metadata registry, intermediate and processed
//! data in the storage backend.
//!
//! `process` is all-or-nothing. Every record is compiled before anything is
//! written, so a failure at any row leaves prior processed data untouched.

use crate::array::{ArrayBuilder, ProcessedArray};
use crate::context::StoreContext;
use crate::error::{DataStoreError, Result};
use crate::kinds::StoreKind;
use crate::mapping::Mappings;
use crate::models::{BackupDocument, IntermediateData, IntermediateRecord, Metadata, ProcessingStats};
use crate::schema::{FieldValue, RowSchema};
use crate::uncertainty::{UncertaintyRecord, as_uncertainty_dict};
use regex::Regex;
use sha2::{Digest, Sha256};
use std::sync::OnceLock;
use std::time::Instant;
use tracing::{debug, info, warn};

fn unsafe_chars_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9_.\-]").expect("filename regex must compile"))
}

/// Filesystem-safe file stem for a store name
///
/// Unsafe characters become `_`; the SHA-256 prefix keeps names that
/// sanitize identically apart.
pub fn safe_filename(name: &str) -> String {
    let digest = Sha256::digest(name.as_bytes());
    let hash: String = digest
        .iter()
        .take(4)
        .map(|byte| format!("{:02x}", byte))
        .collect();
    format!("{}.{}", unsafe_chars_re().replace_all(name, "_"), hash)
}

#[derive(Debug, Clone)]
pub struct DataStore<K: StoreKind> {
    name: String,
    kind: K,
}

impl<K: StoreKind> DataStore<K> {
    /// Create a handle; warns if the name is not registered yet
    pub fn new(ctx: &StoreContext, kind: K, name: impl Into<String>) -> Self {
        let store = Self {
            name: name.into(),
            kind,
        };
        if !ctx.config().dont_warn && !store.is_registered(ctx) {
            warn!(
                "{} '{}' is not registered. Register it before reading or writing data",
                store.kind.label(),
                store.name
            );
        }
        store
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &K {
        &self.kind
    }

    pub fn filename(&self) -> String {
        safe_filename(&self.name)
    }

    pub fn is_registered(&self, ctx: &StoreContext) -> bool {
        ctx.is_registered(self.kind.registry(), &self.name)
    }

    /// The registered attribute record
    pub fn metadata<'a>(&self, ctx: &'a StoreContext) -> Result<&'a Metadata> {
        ctx.metadata(self.kind.registry(), &self.name)
            .ok_or_else(|| self.unknown())
    }

    pub fn register(&self, ctx: &mut StoreContext, attributes: Metadata) -> Result<()> {
        if self.is_registered(ctx) {
            return Err(DataStoreError::AlreadyRegistered {
                kind: self.kind.label().to_string(),
                name: self.name.clone(),
            });
        }
        ctx.registry_mut(self.kind.registry())?
            .set(&self.name, attributes)?;
        info!("Registered {} '{}'", self.kind.label(), self.name);
        Ok(())
    }

    /// Remove the metadata entry; data files are left in place
    pub fn deregister(&self, ctx: &mut StoreContext) -> Result<()> {
        let removed = ctx.registry_mut(self.kind.registry())?.delete(&self.name)?;
        if removed {
            info!("Deregistered {} '{}'", self.kind.label(), self.name);
        }
        Ok(())
    }

    pub fn assert_registered(&self, ctx: &StoreContext) -> Result<()> {
        if self.is_registered(ctx) {
            Ok(())
        } else {
            Err(self.unknown())
        }
    }

    /// Load the intermediate data
    pub fn load(&self, ctx: &StoreContext) -> Result<IntermediateData> {
        self.assert_registered(ctx)?;
        ctx.storage()
            .read_intermediate(&self.filename())?
            .ok_or_else(|| DataStoreError::MissingIntermediateData {
                kind: self.kind.label().to_string(),
                name: self.name.clone(),
            })
    }

    /// Serialize intermediate data, registering its keys first
    pub fn write(&self, ctx: &mut StoreContext, data: &[IntermediateRecord]) -> Result<()> {
        self.assert_registered(ctx)?;
        self.kind.add_mappings(data, ctx.mappings_mut())?;
        ctx.storage_mut().write_intermediate(&self.filename(), data)?;
        debug!(
            "Wrote {} records for {} '{}'",
            data.len(),
            self.kind.label(),
            self.name
        );
        Ok(())
    }

    /// Compile the intermediate data to a processed array and persist it
    pub fn process(&self, ctx: &mut StoreContext) -> Result<ProcessingStats> {
        let start_time = Instant::now();
        let data = self.load(ctx)?;
        let schema = self.kind.schema();
        let mut builder = ArrayBuilder::new(self.kind.label(), &schema, data.len());
        let mut negative_rows = 0;

        for (index, record) in data.iter().enumerate() {
            let (prefix, uncertainty) = self
                .compile_row(&schema, record, ctx.mappings(), index)
                .map_err(|e| e.at_row(&self.name, index))?;

            if uncertainty.negative {
                negative_rows += 1;
            }
            let mut row = prefix;
            row.extend_from_slice(&uncertainty.to_fields());
            builder.push_row(&row)?;
        }

        let array = builder.finish()?;
        ctx.storage_mut().write_processed(&self.filename(), &array)?;

        let stats = ProcessingStats {
            rows: array.len(),
            fields: schema.width(),
            negative_rows,
            processing_time_ms: start_time.elapsed().as_millis(),
        };
        info!(
            "Processed {} '{}': {} rows in {}ms",
            self.kind.label(),
            self.name,
            stats.rows,
            stats.processing_time_ms
        );
        Ok(stats)
    }

    /// The persisted processed array
    pub fn processed(&self, ctx: &StoreContext) -> Result<ProcessedArray> {
        self.assert_registered(ctx)?;
        ctx.storage()
            .read_processed(&self.filename())?
            .ok_or_else(|| DataStoreError::MissingProcessedData {
                kind: self.kind.label().to_string(),
                name: self.name.clone(),
            })
    }

    /// Make a registered, written and processed copy under `new_name`
    pub fn copy(&self, ctx: &mut StoreContext, new_name: &str) -> Result<DataStore<K>> {
        if ctx.is_registered(self.kind.registry(), new_name) {
            return Err(DataStoreError::AlreadyExists {
                kind: self.kind.label().to_string(),
                name: new_name.to_string(),
            });
        }
        let attributes = self.metadata(ctx)?.clone();
        let data = self.load(ctx)?;

        let copied = DataStore {
            name: new_name.to_string(),
            kind: self.kind.clone(),
        };
        copied.register(ctx, attributes)?;
        copied.write(ctx, &data)?;
        copied.process(ctx)?;
        info!(
            "Copied {} '{}' to '{}'",
            self.kind.label(),
            self.name,
            new_name
        );
        Ok(copied)
    }

    /// Run the kind's validator, if it has one
    pub fn validate(&self, data: &[IntermediateRecord]) -> Result<bool> {
        match self.kind.validator() {
            Some(validator) => validator(data)
                .map(|()| true)
                .map_err(|message| DataStoreError::Validation {
                    name: self.name.clone(),
                    message,
                }),
            None => Ok(true),
        }
    }

    /// Write metadata and intermediate data to a timestamped backup document
    pub fn backup(&self, ctx: &mut StoreContext) -> Result<String> {
        let document = BackupDocument {
            name: self.name.clone(),
            kind: self.kind.label().to_string(),
            created_at: chrono::Utc::now(),
            metadata: self.metadata(ctx)?.clone(),
            data: self.load(ctx)?,
        };
        let location = ctx.storage_mut().write_backup(&self.filename(), &document)?;
        info!(
            "Backed up {} '{}' to {}",
            self.kind.label(),
            self.name,
            location
        );
        Ok(location)
    }

    fn compile_row(
        &self,
        schema: &RowSchema,
        record: &IntermediateRecord,
        mappings: &Mappings,
        index: usize,
    ) -> Result<(Vec<FieldValue>, UncertaintyRecord)> {
        let (prefix, uncertainty_input) = self.kind.compile_record(record, mappings)?;

        if let Some((expected, found)) = schema.check_prefix(&prefix) {
            return Err(DataStoreError::PrefixMismatch {
                kind: self.kind.label().to_string(),
                expected,
                found,
            });
        }

        let dict = as_uncertainty_dict(&uncertainty_input)?;
        let uncertainty =
            UncertaintyRecord::from_dict(&dict)?.ok_or_else(|| DataStoreError::MissingAmount {
                name: self.name.clone(),
                row: index,
            })?;
        Ok((prefix, uncertainty))
    }

    fn unknown(&self) -> DataStoreError {
        DataStoreError::UnknownObject {
            kind: self.kind.label().to_string(),
            name: self.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests;
