//! Weightings: a single value with no prefix fields.

use crate::constants::registries;
use crate::error::Result;
use crate::kinds::{CompiledRecord, StoreKind, Validator, is_amount};
use crate::mapping::Mappings;
use crate::models::IntermediateRecord;
use crate::schema::FieldSpec;

#[derive(Debug, Clone, Copy, Default)]
pub struct Weighting;

impl StoreKind for Weighting {
    fn label(&self) -> &'static str {
        "Weighting"
    }

    fn registry(&self) -> &'static str {
        registries::WEIGHTINGS
    }

    fn prefix_fields(&self) -> &'static [FieldSpec] {
        &[]
    }

    /// The record itself is the uncertainty input
    fn compile_record(
        &self,
        record: &IntermediateRecord,
        _mappings: &Mappings,
    ) -> Result<CompiledRecord> {
        Ok((Vec::new(), record.clone()))
    }

    fn validator(&self) -> Option<Validator> {
        Some(validate_weighting)
    }
}

fn validate_weighting(data: &[IntermediateRecord]) -> std::result::Result<(), String> {
    match data {
        [value] if is_amount(value) => Ok(()),
        [_] => Err("weighting value must be a number or an uncertainty dict".to_string()),
        _ => Err(format!(
            "weighting must contain exactly one value, got {}",
            data.len()
        )),
    }
}
