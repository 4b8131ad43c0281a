//! Normalizations: `[flow_key, amount]` per flow.

use crate::constants::{MAX_INDEX, registries};
use crate::error::Result;
use crate::kinds::{CompiledRecord, StoreKind, Validator, as_array, is_amount, is_reference_key};
use crate::mapping::Mappings;
use crate::models::IntermediateRecord;
use crate::schema::{FieldSpec, FieldType, FieldValue};

const PREFIX: [FieldSpec; 2] = [
    FieldSpec::new("flow", FieldType::UInt32),
    FieldSpec::new("index", FieldType::UInt32),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct Normalization;

impl StoreKind for Normalization {
    fn label(&self) -> &'static str {
        "Normalization"
    }

    fn registry(&self) -> &'static str {
        registries::NORMALIZATIONS
    }

    fn prefix_fields(&self) -> &'static [FieldSpec] {
        &PREFIX
    }

    fn compile_record(
        &self,
        record: &IntermediateRecord,
        mappings: &Mappings,
    ) -> Result<CompiledRecord> {
        let entry = as_array(record, self.label(), &[2])?;
        let flow = mappings.mapping.require(&entry[0])?;
        Ok((
            vec![FieldValue::UInt32(flow), FieldValue::UInt32(MAX_INDEX)],
            entry[1].clone(),
        ))
    }

    fn add_mappings(&self, data: &[IntermediateRecord], mappings: &mut Mappings) -> Result<()> {
        let flows = data
            .iter()
            .filter_map(|record| record.as_array())
            .filter_map(|entry| entry.first());
        mappings.mapping.add(flows)?;
        Ok(())
    }

    fn validator(&self) -> Option<Validator> {
        Some(validate_entries)
    }
}

fn validate_entries(data: &[IntermediateRecord]) -> std::result::Result<(), String> {
    for (index, record) in data.iter().enumerate() {
        match record.as_array().map(Vec::as_slice) {
            Some([flow, amount]) if is_reference_key(flow) && is_amount(amount) => {}
            _ => {
                return Err(format!(
                    "normalization entry {} must be [flow key, amount]",
                    index
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_compile_maps_flow() {
        let mut mappings = Mappings::in_memory().unwrap();
        let entries = vec![json!([["biosphere", "co2"], 0.5])];
        Normalization.add_mappings(&entries, &mut mappings).unwrap();

        let (prefix, amount) = Normalization.compile_record(&entries[0], &mappings).unwrap();
        assert_eq!(
            prefix,
            vec![FieldValue::UInt32(1), FieldValue::UInt32(u32::MAX)]
        );
        assert_eq!(amount, json!(0.5));
    }

    #[test]
    fn test_validator() {
        let validate = Normalization.validator().unwrap();
        assert!(validate(&[json!([["biosphere", "co2"], 0.5])]).is_ok());
        assert!(validate(&[json!([["biosphere", "co2"], 0.5, "GLO"])]).is_err());
        assert!(validate(&[json!(0.5)]).is_err());
    }
}
