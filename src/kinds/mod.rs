//! Store kinds and their record compilers.
//!
//! Each kind declares the prefix fields of its processed rows and turns one
//! intermediate record into `(prefix values, uncertainty input)`. The data
//! store appends the uncertainty suffix.
//!
//! - [`Database`] - inventory exchanges
//! - [`Method`] - impact assessment characterization factors
//! - [`Weighting`] - a single weighting value
//! - [`Normalization`] - normalization factors per flow

pub mod database;
pub mod method;
pub mod normalization;
pub mod weighting;

pub use database::Database;
pub use method::Method;
pub use normalization::Normalization;
pub use weighting::Weighting;

use crate::error::{DataStoreError, Result};
use crate::mapping::Mappings;
use crate::models::IntermediateRecord;
use crate::schema::{FieldSpec, FieldValue, RowSchema};
use crate::uncertainty::coerce_number;
use serde_json::{Map, Value};

/// Validation capability: `Err` carries a human-readable reason
pub type Validator = fn(&[IntermediateRecord]) -> std::result::Result<(), String>;

/// Output of a record compiler
pub type CompiledRecord = (Vec<FieldValue>, Value);

pub trait StoreKind: Clone + std::fmt::Debug {
    /// Kind name used in messages, e.g. `Method`
    fn label(&self) -> &'static str;

    /// Name of the metadata registry holding stores of this kind
    fn registry(&self) -> &'static str;

    /// Fields preceding the uncertainty suffix
    fn prefix_fields(&self) -> &'static [FieldSpec];

    /// Translate one record into prefix values and an uncertainty input
    fn compile_record(
        &self,
        record: &IntermediateRecord,
        mappings: &Mappings,
    ) -> Result<CompiledRecord>;

    /// Register auxiliary keys before intermediate data is written
    fn add_mappings(&self, _data: &[IntermediateRecord], _mappings: &mut Mappings) -> Result<()> {
        Ok(())
    }

    fn validator(&self) -> Option<Validator> {
        None
    }

    fn schema(&self) -> RowSchema {
        RowSchema::new(self.prefix_fields())
    }
}

pub(crate) fn as_object<'a>(
    record: &'a IntermediateRecord,
    kind: &str,
) -> Result<&'a Map<String, Value>> {
    record.as_object().ok_or_else(|| {
        DataStoreError::invalid_record(format!("{} records must be objects, got {}", kind, record))
    })
}

pub(crate) fn as_array<'a>(
    record: &'a IntermediateRecord,
    kind: &str,
    lengths: &[usize],
) -> Result<&'a [Value]> {
    match record.as_array() {
        Some(items) if lengths.contains(&items.len()) => Ok(items.as_slice()),
        _ => Err(DataStoreError::invalid_record(format!(
            "{} records must be lists of length {:?}, got {}",
            kind, lengths, record
        ))),
    }
}

pub(crate) fn required<'a>(map: &'a Map<String, Value>, key: &str) -> Result<&'a Value> {
    map.get(key)
        .ok_or_else(|| DataStoreError::invalid_record(format!("missing `{}` field", key)))
}

/// A required field holding a reference key
pub(crate) fn required_key<'a>(map: &'a Map<String, Value>, key: &str) -> Result<&'a Value> {
    let value = required(map, key)?;
    if is_reference_key(value) {
        Ok(value)
    } else {
        Err(DataStoreError::invalid_record(format!(
            "`{}` is not a reference key: {}",
            key, value
        )))
    }
}

/// A reference key is a two-element list of strings: `[collection, code]`
pub(crate) fn is_reference_key(value: &Value) -> bool {
    matches!(value.as_array(), Some(parts) if parts.len() == 2 && parts.iter().all(Value::is_string))
}

/// An amount is a number or an uncertainty mapping with a numeric amount
pub(crate) fn is_amount(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.get("amount").and_then(coerce_number).is_some(),
        other => coerce_number(other).is_some(),
    }
}
