//! LCA Data Store Library
//!
//! Versioned scientific data stores for life-cycle inventory and impact
//! assessment data. Each store keeps an editable intermediate representation
//! and a processed, fixed-schema numeric array compiled from it.
//!
//! This library provides tools for:
//! - Registering stores per kind and persisting their metadata
//! - Writing and loading intermediate records
//! - Compiling records to processed rows carrying uncertainty metadata
//! - Persisting processed arrays as Parquet files
//! - Tracking and applying one-time data updates
//! - Rewriting reference keys across all stores

pub mod array;
pub mod config;
pub mod constants;
pub mod context;
pub mod data_store;
pub mod error;
pub mod kinds;
pub mod mapping;
pub mod models;
pub mod preferences;
pub mod progress;
pub mod registry;
pub mod rewrite;
pub mod schema;
pub mod storage;
pub mod uncertainty;
pub mod updates;

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use array::ProcessedArray;
pub use config::{CompressionAlgorithm, StoreConfig};
pub use context::StoreContext;
pub use data_store::DataStore;
pub use error::{DataStoreError, Result};
pub use kinds::{Database, Method, Normalization, StoreKind, Weighting};
pub use models::{IntermediateData, IntermediateRecord, Metadata, ProcessingStats};
pub use uncertainty::{UncertaintyKind, UncertaintyRecord, as_uncertainty_dict};
pub use updates::{ReprocessReport, Update, Updates};
