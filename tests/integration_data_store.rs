//! Integration tests for file-backed data stores
//!
//! These tests exercise the public API end to end: a context rooted in a
//! temporary data directory, several store kinds sharing mappings, and
//! processed arrays read back from Parquet.

use lca_datastore::schema::FieldValue;
use lca_datastore::storage::FsStorage;
use lca_datastore::{
    CompressionAlgorithm, DataStore, DataStoreError, Database, Metadata, Method, Normalization,
    StoreConfig, StoreContext, Weighting,
};
use serde_json::{Value, json};
use tempfile::TempDir;

fn config(dir: &TempDir) -> StoreConfig {
    StoreConfig::default()
        .with_data_dir(dir.path())
        .with_dont_warn()
}

fn metadata(value: Value) -> Metadata {
    value.as_object().cloned().unwrap_or_default()
}

/// A small steel inventory with a biosphere flow
fn steel_inventory() -> Vec<Value> {
    vec![
        json!({
            "input": ["steel", "rolling"],
            "output": ["steel", "rolling"],
            "type": "production",
            "amount": 1.0
        }),
        json!({
            "input": ["steel", "pig iron"],
            "output": ["steel", "rolling"],
            "type": "technosphere",
            "amount": 1.08,
            "uncertainty type": 2,
            "loc": 0.077,
            "scale": 0.05
        }),
        json!({
            "input": ["biosphere", "co2"],
            "output": ["steel", "rolling"],
            "type": "biosphere",
            "amount": 1.9,
            "uncertainty type": 5,
            "minimum": 1.5,
            "maximum": 2.4
        }),
    ]
}

#[test]
fn test_full_workflow_across_kinds() {
    let temp_dir = TempDir::new().unwrap();
    let mut ctx = StoreContext::open(config(&temp_dir)).unwrap();

    let database = DataStore::new(&ctx, Database, "steel");
    database
        .register(&mut ctx, metadata(json!({"depends": ["biosphere"]})))
        .unwrap();
    database.write(&mut ctx, &steel_inventory()).unwrap();

    let method = DataStore::new(&ctx, Method, "IPCC 2013/GWP 100a");
    method.register(&mut ctx, metadata(json!({"unit": "kg CO2-Eq"}))).unwrap();
    method
        .write(
            &mut ctx,
            &[
                json!([["biosphere", "co2"], 1.0]),
                json!([["biosphere", "ch4"], {"amount": 28.0, "uncertainty type": 3, "scale": 3.0}]),
            ],
        )
        .unwrap();

    let normalization = DataStore::new(&ctx, Normalization, "EU 2010");
    normalization.register(&mut ctx, metadata(json!({}))).unwrap();
    normalization
        .write(&mut ctx, &[json!([["biosphere", "co2"], 9.2e3])])
        .unwrap();

    let weighting = DataStore::new(&ctx, Weighting, "panel");
    weighting.register(&mut ctx, metadata(json!({}))).unwrap();
    weighting.write(&mut ctx, &[json!(0.4)]).unwrap();

    let database_stats = database.process(&mut ctx).unwrap();
    assert_eq!(database_stats.rows, 3);
    method.process(&mut ctx).unwrap();
    normalization.process(&mut ctx).unwrap();
    weighting.process(&mut ctx).unwrap();

    // The biosphere flow has one id across kinds
    let co2 = ctx.mappings().mapping.get(&json!(["biosphere", "co2"])).unwrap();
    let inventory = database.processed(&ctx).unwrap();
    assert_eq!(inventory.row(2).unwrap()[0], FieldValue::UInt32(co2));
    let factors = method.processed(&ctx).unwrap();
    assert_eq!(factors.row(0).unwrap()[0], FieldValue::UInt32(co2));
    let normalized = normalization.processed(&ctx).unwrap();
    assert_eq!(normalized.row(0).unwrap()[0], FieldValue::UInt32(co2));

    // Triangular bounds survive the Parquet round trip
    let triangular = inventory.row(2).unwrap();
    assert_eq!(triangular[5], FieldValue::UInt8(5));
    assert_eq!(triangular[10], FieldValue::Float32(1.5));
    assert_eq!(triangular[11], FieldValue::Float32(2.4));

    assert_eq!(weighting.processed(&ctx).unwrap().width(), 8);
}

#[test]
fn test_state_survives_reopening() {
    let temp_dir = TempDir::new().unwrap();

    {
        let mut ctx = StoreContext::open(config(&temp_dir)).unwrap();
        let database = DataStore::new(&ctx, Database, "steel");
        database.register(&mut ctx, metadata(json!({}))).unwrap();
        database.write(&mut ctx, &steel_inventory()).unwrap();
        database.process(&mut ctx).unwrap();
    }

    let mut ctx = StoreContext::open(config(&temp_dir)).unwrap();
    let database = DataStore::new(&ctx, Database, "steel");
    assert!(database.is_registered(&ctx));
    assert_eq!(database.load(&ctx).unwrap(), steel_inventory());
    let before = database.processed(&ctx).unwrap();

    // Mapping ids are stable, so reprocessing reproduces the array
    database.process(&mut ctx).unwrap();
    assert!(
        database
            .processed(&ctx)
            .unwrap()
            .bit_identical(&before)
            .unwrap()
    );

    let registering_again = database.register(&mut ctx, metadata(json!({})));
    assert!(matches!(
        registering_again,
        Err(DataStoreError::AlreadyRegistered { .. })
    ));
}

#[test]
fn test_failed_process_keeps_processed_file() {
    let temp_dir = TempDir::new().unwrap();
    let config = config(&temp_dir);
    let mut ctx = StoreContext::open(config.clone()).unwrap();

    let database = DataStore::new(&ctx, Database, "steel");
    database.register(&mut ctx, metadata(json!({}))).unwrap();
    database.write(&mut ctx, &steel_inventory()).unwrap();
    database.process(&mut ctx).unwrap();

    let path = FsStorage::new(&config).processed_path(&database.filename());
    let before = std::fs::read(&path).unwrap();

    let mut broken = steel_inventory();
    broken[1].as_object_mut().unwrap().remove("amount");
    database.write(&mut ctx, &broken).unwrap();
    assert!(matches!(
        database.process(&mut ctx),
        Err(DataStoreError::MissingAmount { row: 1, .. })
    ));

    assert_eq!(std::fs::read(&path).unwrap(), before);
}

#[test]
fn test_copy_writes_independent_files() {
    let temp_dir = TempDir::new().unwrap();
    let mut ctx = StoreContext::open(config(&temp_dir)).unwrap();

    let source = DataStore::new(&ctx, Database, "steel");
    source.register(&mut ctx, metadata(json!({"format": "test"}))).unwrap();
    source.write(&mut ctx, &steel_inventory()).unwrap();
    source.process(&mut ctx).unwrap();

    let copied = source.copy(&mut ctx, "steel copy").unwrap();
    assert_ne!(copied.filename(), source.filename());

    copied.write(&mut ctx, &steel_inventory()[..1]).unwrap();
    copied.process(&mut ctx).unwrap();

    assert_eq!(source.load(&ctx).unwrap().len(), 3);
    assert_eq!(source.processed(&ctx).unwrap().len(), 3);
    assert_eq!(copied.processed(&ctx).unwrap().len(), 1);
}

#[test]
fn test_uncompressed_configuration() {
    let temp_dir = TempDir::new().unwrap();
    let config = config(&temp_dir)
        .with_compression(CompressionAlgorithm::Uncompressed)
        .without_statistics();
    let mut ctx = StoreContext::open(config).unwrap();

    let weighting = DataStore::new(&ctx, Weighting, "panel");
    weighting.register(&mut ctx, metadata(json!({}))).unwrap();
    weighting.write(&mut ctx, &[json!({"amount": 0.4})]).unwrap();
    weighting.process(&mut ctx).unwrap();

    let row = weighting.processed(&ctx).unwrap().row(0).unwrap();
    assert_eq!(row[1], FieldValue::Float32(0.4));
}
