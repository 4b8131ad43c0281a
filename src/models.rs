//! Core data structures shared across the crate.
//!
//! Defines the intermediate data representation, store metadata and
//! processing statistics.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Arbitrary attribute record held by a metadata registry
pub type Metadata = Map<String, Value>;

/// One editable, schema-flexible entry of a store
pub type IntermediateRecord = Value;

/// The full intermediate representation of a store, in row order
pub type IntermediateData = Vec<IntermediateRecord>;

/// Statistics of one `process` run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessingStats {
    pub rows: usize,
    pub fields: usize,
    pub negative_rows: usize,
    pub processing_time_ms: u128,
}

/// Document written by `backup`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupDocument {
    pub name: String,
    pub kind: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub metadata: Metadata,
    pub data: IntermediateData,
}
