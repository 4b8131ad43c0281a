//! Error handling for data store operations.
//!
//! Provides error types with context for registration, persistence,
//! record compilation and migration failures.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("{kind} '{name}' is not yet registered")]
    UnknownObject { kind: String, name: String },

    #[error("{kind} '{name}' is already registered")]
    AlreadyRegistered { kind: String, name: String },

    #[error("{kind} '{name}' already exists")]
    AlreadyExists { kind: String, name: String },

    #[error("Can't load intermediate data for {kind} '{name}'")]
    MissingIntermediateData { kind: String, name: String },

    #[error("No processed data for {kind} '{name}'")]
    MissingProcessedData { kind: String, name: String },

    #[error("Value must be either an uncertainty dict. or number (got {type_name}: {value})")]
    UncertaintyType { type_name: String, value: String },

    #[error("Must provide at least `amount` field in uncertainties (row {row} of '{name}')")]
    MissingAmount { name: String, row: usize },

    #[error(
        "Prefix mismatch in store kind {kind}: expected {expected} fields, compiler returned {found}"
    )]
    PrefixMismatch {
        kind: String,
        expected: String,
        found: String,
    },

    #[error("Key {key} has no entry in the {mapping} mapping")]
    UnmappedKey { mapping: String, key: String },

    #[error("Invalid record at row {row} of '{name}': {reason}")]
    InvalidRecord {
        name: String,
        row: usize,
        reason: String,
    },

    #[error("Validation failed for '{name}': {message}")]
    Validation { name: String, message: String },

    #[error("Unknown update: {name}")]
    UnknownUpdate { name: String },

    #[error("Unsupported value in processed column '{column}': {value}")]
    UnsupportedColumn { column: String, value: String },

    #[error("Corrupt file {path}: {reason}")]
    CorruptFile { path: PathBuf, reason: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl DataStoreError {
    /// Create a record-level error; the data store fills in name and row
    pub fn invalid_record(reason: impl Into<String>) -> Self {
        Self::InvalidRecord {
            name: String::new(),
            row: 0,
            reason: reason.into(),
        }
    }

    /// Attach the store name and row index to a record-level error
    pub fn at_row(self, store: &str, index: usize) -> Self {
        match self {
            Self::InvalidRecord { reason, .. } => Self::InvalidRecord {
                name: store.to_string(),
                row: index,
                reason,
            },
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, DataStoreError>;
