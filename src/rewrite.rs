//! Bulk substitution of reference keys across registered stores.
//!
//! Rewrites touch intermediate data only. Callers reprocess the affected
//! stores when they need the processed arrays to follow.

use crate::context::StoreContext;
use crate::data_store::DataStore;
use crate::error::{DataStoreError, Result};
use crate::kinds::{Database, Method, StoreKind};
use crate::models::IntermediateData;
use serde_json::Value;
use tracing::{debug, info};

/// Replace `old_key` with `new_key` in the `input` of every exchange
///
/// Only databases with at least one match are written back. Returns the
/// number of modified exchanges.
pub fn replace_exchanges(ctx: &mut StoreContext, old_key: &Value, new_key: &Value) -> Result<usize> {
    let mut modified = 0;
    for name in registered_names(ctx, &Database) {
        let store = DataStore::new(ctx, Database, name);
        let Some(mut data) = load_if_written(ctx, &store)? else {
            continue;
        };

        let mut changed = 0;
        for exchange in data.iter_mut().filter_map(Value::as_object_mut) {
            if exchange.get("input") == Some(old_key) {
                exchange.insert("input".to_string(), new_key.clone());
                changed += 1;
            }
        }

        if changed > 0 {
            store.write(ctx, &data)?;
            debug!("Replaced {} exchange inputs in '{}'", changed, store.name());
            modified += changed;
        }
    }

    info!("Replaced {} with {} in {} exchanges", old_key, new_key, modified);
    Ok(modified)
}

/// Replace `old_key` with `new_key` in the flow of every characterization factor
///
/// Returns the names of the methods that changed.
pub fn replace_cfs(ctx: &mut StoreContext, old_key: &Value, new_key: &Value) -> Result<Vec<String>> {
    let mut changed_methods = Vec::new();
    for name in registered_names(ctx, &Method) {
        let store = DataStore::new(ctx, Method, name);
        let Some(mut data) = load_if_written(ctx, &store)? else {
            continue;
        };

        let mut changed = false;
        for factor in data.iter_mut().filter_map(Value::as_array_mut) {
            if let Some(flow) = factor.first_mut()
                && flow == old_key
            {
                *flow = new_key.clone();
                changed = true;
            }
        }

        if changed {
            store.write(ctx, &data)?;
            changed_methods.push(store.name().to_string());
        }
    }

    info!(
        "Replaced {} with {} in {} methods",
        old_key,
        new_key,
        changed_methods.len()
    );
    Ok(changed_methods)
}

fn registered_names<K: StoreKind>(ctx: &StoreContext, kind: &K) -> Vec<String> {
    ctx.registry(kind.registry())
        .map(|registry| registry.names())
        .unwrap_or_default()
}

/// Stores registered but never written have nothing to rewrite
fn load_if_written<K: StoreKind>(
    ctx: &StoreContext,
    store: &DataStore<K>,
) -> Result<Option<IntermediateData>> {
    match store.load(ctx) {
        Ok(data) => Ok(Some(data)),
        Err(DataStoreError::MissingIntermediateData { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}
