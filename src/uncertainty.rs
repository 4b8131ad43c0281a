//! Uncertainty normalization.
//!
//! Turns a bare number or a distribution description into a canonical
//! uncertainty dict, and resolves that dict into the eight values of the
//! uncertainty suffix. Absent or malformed optional fields fall back to
//! defaults; only a missing or non-numeric `amount` is an error.

use crate::constants::uncertainty_keys as keys;
use crate::error::{DataStoreError, Result};
use crate::schema::FieldValue;
use serde_json::{Map, Value};

/// Distribution codes understood by downstream samplers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UncertaintyKind {
    Undefined,
    NoUncertainty,
    Lognormal,
    Normal,
    Uniform,
    Triangular,
    Bernoulli,
    DiscreteUniform,
    Weibull,
    Gamma,
    Beta,
    GeneralizedExtremeValue,
    StudentsT,
}

impl UncertaintyKind {
    pub fn from_code(code: u8) -> Option<Self> {
        let kind = match code {
            0 => Self::Undefined,
            1 => Self::NoUncertainty,
            2 => Self::Lognormal,
            3 => Self::Normal,
            4 => Self::Uniform,
            5 => Self::Triangular,
            6 => Self::Bernoulli,
            7 => Self::DiscreteUniform,
            8 => Self::Weibull,
            9 => Self::Gamma,
            10 => Self::Beta,
            11 => Self::GeneralizedExtremeValue,
            12 => Self::StudentsT,
            _ => return None,
        };
        Some(kind)
    }

    pub fn code(&self) -> u8 {
        match self {
            Self::Undefined => 0,
            Self::NoUncertainty => 1,
            Self::Lognormal => 2,
            Self::Normal => 3,
            Self::Uniform => 4,
            Self::Triangular => 5,
            Self::Bernoulli => 6,
            Self::DiscreteUniform => 7,
            Self::Weibull => 8,
            Self::Gamma => 9,
            Self::Beta => 10,
            Self::GeneralizedExtremeValue => 11,
            Self::StudentsT => 12,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::NoUncertainty => "no uncertainty",
            Self::Lognormal => "lognormal",
            Self::Normal => "normal",
            Self::Uniform => "uniform",
            Self::Triangular => "triangular",
            Self::Bernoulli => "bernoulli",
            Self::DiscreteUniform => "discrete uniform",
            Self::Weibull => "weibull",
            Self::Gamma => "gamma",
            Self::Beta => "beta",
            Self::GeneralizedExtremeValue => "generalized extreme value",
            Self::StudentsT => "student's t",
        }
    }
}

/// Convert a number to an uncertainty dict, if necessary
///
/// Mappings are returned unchanged. Numbers, and strings that parse as
/// numbers, become `{"amount": value}`. Anything else is a type error
/// naming the JSON type and value.
pub fn as_uncertainty_dict(value: &Value) -> Result<Map<String, Value>> {
    if let Value::Object(map) = value {
        return Ok(map.clone());
    }

    match coerce_number(value) {
        Some(amount) => {
            let mut map = Map::new();
            map.insert(keys::AMOUNT.to_string(), Value::from(amount));
            Ok(map)
        }
        None => Err(DataStoreError::UncertaintyType {
            type_name: json_type_name(value).to_string(),
            value: value.to_string(),
        }),
    }
}

/// Numeric coercion of a JSON scalar
///
/// Only finite values coerce; `"nan"` and `"inf"` are not numbers here.
pub fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// The resolved uncertainty suffix of one processed row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UncertaintyRecord {
    pub uncertainty_type: u8,
    pub amount: f32,
    pub loc: f32,
    pub scale: f32,
    pub shape: f32,
    pub minimum: f32,
    pub maximum: f32,
    pub negative: bool,
}

impl UncertaintyRecord {
    /// Resolve a normalized uncertainty dict
    ///
    /// Returns `Ok(None)` when `amount` is absent so the caller can report
    /// the offending row.
    pub fn from_dict(dict: &Map<String, Value>) -> Result<Option<Self>> {
        let Some(raw_amount) = dict.get(keys::AMOUNT) else {
            return Ok(None);
        };
        let amount = coerce_number(raw_amount).ok_or_else(|| DataStoreError::UncertaintyType {
            type_name: json_type_name(raw_amount).to_string(),
            value: raw_amount.to_string(),
        })?;

        let uncertainty_type = dict
            .get(keys::UNCERTAINTY_TYPE)
            .or_else(|| dict.get(keys::UNCERTAINTY_TYPE_ALT))
            .and_then(coerce_type_code)
            .unwrap_or(0);

        Ok(Some(Self {
            uncertainty_type,
            amount: amount as f32,
            loc: optional_f32(dict, keys::LOC),
            scale: optional_f32(dict, keys::SCALE),
            shape: optional_f32(dict, keys::SHAPE),
            minimum: optional_f32(dict, keys::MINIMUM),
            maximum: optional_f32(dict, keys::MAXIMUM),
            negative: amount < 0.0,
        }))
    }

    pub fn kind(&self) -> Option<UncertaintyKind> {
        UncertaintyKind::from_code(self.uncertainty_type)
    }

    /// The eight suffix values in schema order
    pub fn to_fields(&self) -> [FieldValue; 8] {
        [
            FieldValue::UInt8(self.uncertainty_type),
            FieldValue::Float32(self.amount),
            FieldValue::Float32(self.loc),
            FieldValue::Float32(self.scale),
            FieldValue::Float32(self.shape),
            FieldValue::Float32(self.minimum),
            FieldValue::Float32(self.maximum),
            FieldValue::Bool(self.negative),
        ]
    }
}

fn optional_f32(dict: &Map<String, Value>, key: &str) -> f32 {
    dict.get(key)
        .and_then(coerce_number)
        .map(|v| v as f32)
        .unwrap_or(f32::NAN)
}

fn coerce_type_code(value: &Value) -> Option<u8> {
    let code = coerce_number(value)?;
    if code.fract() == 0.0 && (0.0..=255.0).contains(&code) {
        Some(code as u8)
    } else {
        None
    }
}
