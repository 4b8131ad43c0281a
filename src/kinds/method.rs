//! Impact assessment methods: one processed row per characterization factor.
//!
//! A characterization factor is `[flow_key, amount]` or
//! `[flow_key, amount, location]`, where `amount` is a number or an
//! uncertainty mapping. Factors without a location are global.

use crate::constants::{GLOBAL_LOCATION, MAX_INDEX, registries};
use crate::error::Result;
use crate::kinds::{CompiledRecord, StoreKind, Validator, as_array, is_amount, is_reference_key};
use crate::mapping::Mappings;
use crate::models::IntermediateRecord;
use crate::schema::{FieldSpec, FieldType, FieldValue};
use serde_json::Value;

const PREFIX: [FieldSpec; 4] = [
    FieldSpec::new("flow", FieldType::UInt32),
    FieldSpec::new("row", FieldType::UInt32),
    FieldSpec::new("col", FieldType::UInt32),
    FieldSpec::new("geo", FieldType::UInt32),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct Method;

fn location(factor: &[Value]) -> Value {
    factor
        .get(2)
        .cloned()
        .unwrap_or_else(|| Value::from(GLOBAL_LOCATION))
}

impl StoreKind for Method {
    fn label(&self) -> &'static str {
        "Method"
    }

    fn registry(&self) -> &'static str {
        registries::METHODS
    }

    fn prefix_fields(&self) -> &'static [FieldSpec] {
        &PREFIX
    }

    fn compile_record(
        &self,
        record: &IntermediateRecord,
        mappings: &Mappings,
    ) -> Result<CompiledRecord> {
        let factor = as_array(record, self.label(), &[2, 3])?;
        let flow = mappings.mapping.require(&factor[0])?;
        let geo = mappings.geomapping.require(&location(factor))?;

        Ok((
            vec![
                FieldValue::UInt32(flow),
                FieldValue::UInt32(MAX_INDEX),
                FieldValue::UInt32(MAX_INDEX),
                FieldValue::UInt32(geo),
            ],
            factor[1].clone(),
        ))
    }

    fn add_mappings(&self, data: &[IntermediateRecord], mappings: &mut Mappings) -> Result<()> {
        let factors = data
            .iter()
            .filter_map(|record| record.as_array())
            .filter(|factor| !factor.is_empty());

        let mut flows = Vec::new();
        let mut locations = Vec::new();
        for factor in factors {
            flows.push(&factor[0]);
            locations.push(location(factor));
        }

        mappings.mapping.add(flows)?;
        mappings.geomapping.add(locations.iter())?;
        Ok(())
    }

    fn validator(&self) -> Option<Validator> {
        Some(validate_factors)
    }
}

fn validate_factors(data: &[IntermediateRecord]) -> std::result::Result<(), String> {
    for (index, record) in data.iter().enumerate() {
        let factor = match record.as_array() {
            Some(items) if items.len() == 2 || items.len() == 3 => items,
            _ => return Err(format!("factor {} must be a list of 2 or 3 items", index)),
        };
        if !is_reference_key(&factor[0]) {
            return Err(format!("factor {} has an invalid flow key", index));
        }
        if !is_amount(&factor[1]) {
            return Err(format!("factor {} has no numeric amount", index));
        }
        if let Some(location) = factor.get(2) {
            if !(location.is_string() || location.is_array()) {
                return Err(format!("factor {} has an invalid location", index));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DataStoreError;
    use serde_json::json;

    #[test]
    fn test_missing_location_is_global() {
        let mut mappings = Mappings::in_memory().unwrap();
        let factors = vec![
            json!([["biosphere", "co2"], 1.0]),
            json!([["biosphere", "ch4"], {"amount": 28.0, "uncertainty type": 3, "scale": 2.0}, "CH"]),
        ];
        Method.add_mappings(&factors, &mut mappings).unwrap();

        let (prefix, amount) = Method.compile_record(&factors[0], &mappings).unwrap();
        assert_eq!(prefix[0], FieldValue::UInt32(1));
        assert_eq!(prefix[3], FieldValue::UInt32(1));
        assert_eq!(amount, json!(1.0));

        let (prefix, uncertainty) = Method.compile_record(&factors[1], &mappings).unwrap();
        assert_eq!(prefix[0], FieldValue::UInt32(2));
        assert_eq!(prefix[3], FieldValue::UInt32(2));
        assert_eq!(uncertainty["scale"], json!(2.0));
    }

    #[test]
    fn test_compile_rejects_wrong_shape() {
        let mappings = Mappings::in_memory().unwrap();
        assert!(matches!(
            Method.compile_record(&json!({"flow": 1}), &mappings),
            Err(DataStoreError::InvalidRecord { .. })
        ));
    }

    #[test]
    fn test_validator() {
        let validate = Method.validator().unwrap();
        assert!(validate(&[json!([["biosphere", "co2"], 1.0, "GLO"])]).is_ok());
        assert!(validate(&[json!([["biosphere", "co2"]])]).is_err());
        assert!(validate(&[json!(["co2", 1.0])]).is_err());
        assert!(validate(&[json!([["biosphere", "co2"], "lots"])]).is_err());
        assert!(validate(&[json!([["biosphere", "co2"], 1.0, 7])]).is_err());
    }
}
