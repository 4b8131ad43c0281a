//! Copying stores

use super::{attributes, exchanges, memory_context};
use crate::data_store::DataStore;
use crate::error::DataStoreError;
use crate::kinds::{Database, Method};
use serde_json::json;

#[test]
fn test_copy_registers_writes_and_processes() {
    let mut ctx = memory_context();
    let source = DataStore::new(&ctx, Database, "A");
    source
        .register(&mut ctx, attributes(json!({"format": "test", "depends": []})))
        .unwrap();
    source.write(&mut ctx, &exchanges()).unwrap();
    source.process(&mut ctx).unwrap();

    let copied = source.copy(&mut ctx, "B").unwrap();
    assert_eq!(copied.name(), "B");
    assert_eq!(copied.metadata(&ctx).unwrap(), source.metadata(&ctx).unwrap());
    assert_eq!(copied.load(&ctx).unwrap(), exchanges());
    assert!(
        copied
            .processed(&ctx)
            .unwrap()
            .bit_identical(&source.processed(&ctx).unwrap())
            .unwrap()
    );
}

#[test]
fn test_copy_is_independent_of_source() {
    let mut ctx = memory_context();
    let source = DataStore::new(&ctx, Method, "A");
    source.register(&mut ctx, attributes(json!({}))).unwrap();
    source
        .write(&mut ctx, &[json!([["biosphere", "co2"], 1.0])])
        .unwrap();
    source.process(&mut ctx).unwrap();
    let source_before = source.processed(&ctx).unwrap();

    let copied = source.copy(&mut ctx, "B").unwrap();
    copied
        .write(&mut ctx, &[json!([["biosphere", "ch4"], 28.0])])
        .unwrap();
    copied.process(&mut ctx).unwrap();

    assert_eq!(
        source.load(&ctx).unwrap(),
        vec![json!([["biosphere", "co2"], 1.0])]
    );
    assert!(
        source
            .processed(&ctx)
            .unwrap()
            .bit_identical(&source_before)
            .unwrap()
    );
    assert!(
        !copied
            .processed(&ctx)
            .unwrap()
            .bit_identical(&source_before)
            .unwrap()
    );
}

#[test]
fn test_copy_onto_registered_name_fails() {
    let mut ctx = memory_context();
    let source = DataStore::new(&ctx, Method, "A");
    source.register(&mut ctx, attributes(json!({}))).unwrap();
    source.write(&mut ctx, &[]).unwrap();

    let target = DataStore::new(&ctx, Method, "B");
    target.register(&mut ctx, attributes(json!({"keep": true}))).unwrap();

    match source.copy(&mut ctx, "B") {
        Err(DataStoreError::AlreadyExists { name, .. }) => assert_eq!(name, "B"),
        other => panic!("Expected AlreadyExists error, got {:?}", other),
    }
    assert_eq!(
        target.metadata(&ctx).unwrap().get("keep"),
        Some(&json!(true))
    );
}

#[test]
fn test_copy_of_unregistered_source_fails() {
    let mut ctx = memory_context();
    let source = DataStore::new(&ctx, Method, "ghost");

    assert!(matches!(
        source.copy(&mut ctx, "B"),
        Err(DataStoreError::UnknownObject { .. })
    ));
    assert!(!ctx.is_registered("methods", "B"));
}
