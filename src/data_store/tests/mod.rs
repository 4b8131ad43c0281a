//! Tests for the data store lifecycle and the compile-to-array pass
//!
//! Every test builds its own isolated context; file-backed tests use a
//! temporary data directory.

pub mod copy;

use crate::config::StoreConfig;
use crate::context::StoreContext;
use crate::models::Metadata;
use serde_json::{Value, json};

/// In-memory context with registration warnings silenced
pub fn memory_context() -> StoreContext {
    StoreContext::in_memory(StoreConfig::default().with_dont_warn()).unwrap()
}

pub fn attributes(value: Value) -> Metadata {
    value.as_object().cloned().unwrap_or_default()
}

pub fn exchanges() -> Vec<Value> {
    vec![
        json!({
            "input": ["biosphere", "co2"],
            "output": ["steel", "rolling"],
            "type": "biosphere",
            "amount": 1.9,
            "uncertainty type": 2,
            "loc": 0.64,
            "scale": 0.1
        }),
        json!({
            "input": ["steel", "rolling"],
            "output": ["steel", "rolling"],
            "type": "production",
            "amount": 1.0
        }),
        json!({
            "input": ["steel", "ore"],
            "output": ["steel", "rolling"],
            "type": "technosphere",
            "amount": -0.25,
            "comment": "kept verbatim"
        }),
    ]
}
