//! Fixed row schema for processed arrays.
//!
//! A row schema is the store kind's prefix fields followed by the
//! eight-field uncertainty suffix. Every row of a processed array has
//! exactly this width and field order.

use crate::constants::uncertainty_columns as cols;
use polars::prelude::DataType;
use std::fmt;

/// Primitive numeric type of a processed array column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    UInt8,
    UInt32,
    Float32,
    Bool,
}

impl FieldType {
    /// Polars dtype used for the column
    pub fn to_polars(&self) -> DataType {
        match self {
            FieldType::UInt8 => DataType::UInt8,
            FieldType::UInt32 => DataType::UInt32,
            FieldType::Float32 => DataType::Float32,
            FieldType::Bool => DataType::Boolean,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::UInt8 => "u8",
            FieldType::UInt32 => "u32",
            FieldType::Float32 => "f32",
            FieldType::Bool => "bool",
        };
        f.write_str(name)
    }
}

/// One value of a processed row
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    UInt8(u8),
    UInt32(u32),
    Float32(f32),
    Bool(bool),
}

impl FieldValue {
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldValue::UInt8(_) => FieldType::UInt8,
            FieldValue::UInt32(_) => FieldType::UInt32,
            FieldValue::Float32(_) => FieldType::Float32,
            FieldValue::Bool(_) => FieldType::Bool,
        }
    }

    /// Bitwise equality, treating identical NaN payloads as equal
    pub fn bit_eq(&self, other: &FieldValue) -> bool {
        match (self, other) {
            (FieldValue::Float32(a), FieldValue::Float32(b)) => a.to_bits() == b.to_bits(),
            _ => self == other,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match *self {
            FieldValue::UInt8(v) => f64::from(v),
            FieldValue::UInt32(v) => f64::from(v),
            FieldValue::Float32(v) => f64::from(v),
            FieldValue::Bool(v) => {
                if v {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::UInt8(v) => write!(f, "{}", v),
            FieldValue::UInt32(v) => write!(f, "{}", v),
            FieldValue::Float32(v) => write!(f, "{}", v),
            FieldValue::Bool(v) => write!(f, "{}", v),
        }
    }
}

/// A named, typed column of the row schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub field_type: FieldType,
}

impl FieldSpec {
    pub const fn new(name: &'static str, field_type: FieldType) -> Self {
        Self { name, field_type }
    }
}

/// The uncertainty suffix appended to every kind's prefix fields
pub const UNCERTAINTY_FIELDS: [FieldSpec; 8] = [
    FieldSpec::new(cols::UNCERTAINTY_TYPE, FieldType::UInt8),
    FieldSpec::new(cols::AMOUNT, FieldType::Float32),
    FieldSpec::new(cols::LOC, FieldType::Float32),
    FieldSpec::new(cols::SCALE, FieldType::Float32),
    FieldSpec::new(cols::SHAPE, FieldType::Float32),
    FieldSpec::new(cols::MINIMUM, FieldType::Float32),
    FieldSpec::new(cols::MAXIMUM, FieldType::Float32),
    FieldSpec::new(cols::NEGATIVE, FieldType::Bool),
];

/// Ordered field layout of a processed array
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSchema {
    fields: Vec<FieldSpec>,
    prefix_len: usize,
}

impl RowSchema {
    /// Concatenate a kind's prefix fields with the uncertainty suffix
    pub fn new(prefix: &[FieldSpec]) -> Self {
        let mut fields = Vec::with_capacity(prefix.len() + UNCERTAINTY_FIELDS.len());
        fields.extend_from_slice(prefix);
        fields.extend_from_slice(&UNCERTAINTY_FIELDS);
        Self {
            fields,
            prefix_len: prefix.len(),
        }
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn prefix(&self) -> &[FieldSpec] {
        &self.fields[..self.prefix_len]
    }

    pub fn prefix_len(&self) -> usize {
        self.prefix_len
    }

    pub fn width(&self) -> usize {
        self.fields.len()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.name).collect()
    }

    /// Check prefix values against the declared prefix fields
    ///
    /// Returns a description of the mismatch, if any.
    pub fn check_prefix(&self, values: &[FieldValue]) -> Option<(String, String)> {
        let expected = self.prefix();
        let matches = expected.len() == values.len()
            && expected
                .iter()
                .zip(values)
                .all(|(spec, value)| spec.field_type == value.field_type());

        if matches {
            None
        } else {
            let describe_expected = expected
                .iter()
                .map(|f| format!("{}:{}", f.name, f.field_type))
                .collect::<Vec<_>>()
                .join(", ");
            let describe_found = values
                .iter()
                .map(|v| v.field_type().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            Some((
                format!("{} [{}]", expected.len(), describe_expected),
                format!("{} [{}]", values.len(), describe_found),
            ))
        }
    }
}
