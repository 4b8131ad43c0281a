//! Inventory databases: one processed row per exchange.
//!
//! An exchange record is an object with `input` and `output` reference keys,
//! an exchange `type` and its uncertainty fields inline:
//!
//! ```json
//! {"input": ["biosphere", "co2"], "output": ["db", "steel"],
//!  "type": "biosphere", "amount": 1.9, "uncertainty type": 2, "loc": 0.64}
//! ```

use crate::constants::{MAX_INDEX, exchange_types, registries};
use crate::error::{DataStoreError, Result};
use crate::kinds::{
    CompiledRecord, StoreKind, Validator, as_object, is_amount, is_reference_key, required,
    required_key,
};
use crate::mapping::Mappings;
use crate::models::IntermediateRecord;
use crate::schema::{FieldSpec, FieldType, FieldValue};

const PREFIX: [FieldSpec; 5] = [
    FieldSpec::new("input", FieldType::UInt32),
    FieldSpec::new("output", FieldType::UInt32),
    FieldSpec::new("row", FieldType::UInt32),
    FieldSpec::new("col", FieldType::UInt32),
    FieldSpec::new("type", FieldType::UInt8),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct Database;

impl StoreKind for Database {
    fn label(&self) -> &'static str {
        "Database"
    }

    fn registry(&self) -> &'static str {
        registries::DATABASES
    }

    fn prefix_fields(&self) -> &'static [FieldSpec] {
        &PREFIX
    }

    fn compile_record(
        &self,
        record: &IntermediateRecord,
        mappings: &Mappings,
    ) -> Result<CompiledRecord> {
        let exchange = as_object(record, self.label())?;
        let input = mappings.mapping.require(required_key(exchange, "input")?)?;
        let output = mappings.mapping.require(required_key(exchange, "output")?)?;

        let type_name = required(exchange, "type")?;
        let type_code = type_name
            .as_str()
            .and_then(exchange_types::code)
            .ok_or_else(|| {
                DataStoreError::invalid_record(format!("unknown exchange type {}", type_name))
            })?;

        Ok((
            vec![
                FieldValue::UInt32(input),
                FieldValue::UInt32(output),
                FieldValue::UInt32(MAX_INDEX),
                FieldValue::UInt32(MAX_INDEX),
                FieldValue::UInt8(type_code),
            ],
            record.clone(),
        ))
    }

    /// Exchange inputs and outputs receive ids as a side effect of writing
    fn add_mappings(&self, data: &[IntermediateRecord], mappings: &mut Mappings) -> Result<()> {
        let keys = data
            .iter()
            .filter_map(|record| record.as_object())
            .flat_map(|exchange| [exchange.get("input"), exchange.get("output")])
            .flatten()
            .filter(|key| is_reference_key(key));
        mappings.mapping.add(keys)?;
        Ok(())
    }

    fn validator(&self) -> Option<Validator> {
        Some(validate_exchanges)
    }
}

fn validate_exchanges(data: &[IntermediateRecord]) -> std::result::Result<(), String> {
    for (index, record) in data.iter().enumerate() {
        let exchange = record
            .as_object()
            .ok_or_else(|| format!("exchange {} is not an object", index))?;

        for field in ["input", "output"] {
            match exchange.get(field) {
                Some(key) if is_reference_key(key) => {}
                _ => return Err(format!("exchange {} has an invalid `{}` key", index, field)),
            }
        }

        match exchange.get("type").and_then(|t| t.as_str()) {
            Some(name) if exchange_types::code(name).is_some() => {}
            _ => return Err(format!("exchange {} has an invalid `type`", index)),
        }

        if !is_amount(record) {
            return Err(format!("exchange {} has no numeric `amount`", index));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn exchange() -> IntermediateRecord {
        json!({
            "input": ["biosphere", "co2"],
            "output": ["db", "steel"],
            "type": "biosphere",
            "amount": 1.9,
            "uncertainty type": 2,
            "loc": 0.64
        })
    }

    #[test]
    fn test_add_mappings_registers_inputs_and_outputs() {
        let mut mappings = Mappings::in_memory().unwrap();
        Database
            .add_mappings(&[exchange(), json!("not an exchange")], &mut mappings)
            .unwrap();
        assert_eq!(mappings.mapping.get(&json!(["biosphere", "co2"])), Some(1));
        assert_eq!(mappings.mapping.get(&json!(["db", "steel"])), Some(2));
    }

    #[test]
    fn test_compile_uses_mapped_ids_and_type_code() {
        let mut mappings = Mappings::in_memory().unwrap();
        Database.add_mappings(&[exchange()], &mut mappings).unwrap();

        let (prefix, uncertainty) = Database.compile_record(&exchange(), &mappings).unwrap();
        assert_eq!(
            prefix,
            vec![
                FieldValue::UInt32(1),
                FieldValue::UInt32(2),
                FieldValue::UInt32(u32::MAX),
                FieldValue::UInt32(u32::MAX),
                FieldValue::UInt8(exchange_types::BIOSPHERE),
            ]
        );
        assert_eq!(uncertainty, exchange());
    }

    #[test]
    fn test_compile_rejects_unknown_type() {
        let mut mappings = Mappings::in_memory().unwrap();
        let mut record = exchange();
        record["type"] = json!("magic");
        Database.add_mappings(&[record.clone()], &mut mappings).unwrap();

        assert!(matches!(
            Database.compile_record(&record, &mappings),
            Err(DataStoreError::InvalidRecord { .. })
        ));
    }

    #[test]
    fn test_compile_rejects_malformed_keys() {
        let mut mappings = Mappings::in_memory().unwrap();
        let mut record = exchange();
        record["input"] = json!(["db", 5]);
        Database.add_mappings(&[record.clone()], &mut mappings).unwrap();

        match Database.compile_record(&record, &mappings) {
            Err(DataStoreError::InvalidRecord { reason, .. }) => {
                assert!(reason.contains("`input`"));
            }
            other => panic!("Expected InvalidRecord error, got {:?}", other),
        }
    }

    #[test]
    fn test_compile_rejects_unmapped_keys() {
        let mappings = Mappings::in_memory().unwrap();
        assert!(matches!(
            Database.compile_record(&exchange(), &mappings),
            Err(DataStoreError::UnmappedKey { .. })
        ));
    }

    #[test]
    fn test_validator() {
        let validate = Database.validator().unwrap();
        assert!(validate(&[exchange()]).is_ok());

        let mut missing_amount = exchange();
        missing_amount.as_object_mut().unwrap().remove("amount");
        assert!(validate(&[missing_amount]).is_err());

        let mut bad_input = exchange();
        bad_input["input"] = json!("co2");
        assert!(validate(&[bad_input]).is_err());
    }
}
