//! Named, one-time data upgrades tracked in preferences.
//!
//! The preferences entry `updates` maps update names to `true` once they
//! have been applied. A context without that entry is a fresh install:
//! nothing old can need upgrading, so every known update is marked applied.

use crate::constants::{UPDATES_PREFERENCE_KEY, UPTODATE_WARNING};
use crate::context::StoreContext;
use crate::data_store::DataStore;
use crate::error::{DataStoreError, Result};
use crate::kinds::{Database, Method, Normalization, StoreKind, Weighting};
use serde_json::{Map, Value};
use tracing::{info, warn};

/// Update body; the observer receives `(kind label, stores done, stores of this kind)`
pub type UpdateProcedure =
    fn(&mut StoreContext, &mut dyn FnMut(&str, usize, usize)) -> Result<ReprocessReport>;

/// One store that failed during a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReprocessFailure {
    pub kind: String,
    pub name: String,
    pub error: String,
}

/// Outcome of a batch run over many stores
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReprocessReport {
    pub processed: usize,
    pub failed: Vec<ReprocessFailure>,
}

impl ReprocessReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    fn merge(&mut self, other: ReprocessReport) {
        self.processed += other.processed;
        self.failed.extend(other.failed);
    }
}

#[derive(Debug, Clone)]
pub struct Update {
    pub name: &'static str,
    pub explanation: &'static str,
    pub procedure: UpdateProcedure,
}

#[derive(Debug, Clone)]
pub struct Updates {
    updates: Vec<Update>,
}

impl Updates {
    pub fn new(updates: Vec<Update>) -> Self {
        Self { updates }
    }

    /// The updates shipped with this crate
    pub fn builtin() -> Self {
        Self::new(vec![Update {
            name: "1.0 reprocess all objects",
            explanation: "1.0 relaxed previous restrictions on what had to be included in \
                          databases, methods, weightings and normalizations. These objects \
                          need to be reprocessed to put in default values.",
            procedure: reprocess_all,
        }])
    }

    /// Known update names, sorted
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.updates.iter().map(|u| u.name).collect();
        names.sort_unstable();
        names
    }

    pub fn get(&self, name: &str) -> Result<&Update> {
        self.updates
            .iter()
            .find(|u| u.name == name)
            .ok_or_else(|| DataStoreError::UnknownUpdate {
                name: name.to_string(),
            })
    }

    pub fn explain(&self, name: &str) -> Result<&'static str> {
        Ok(self.get(name)?.explanation)
    }

    /// Names of updates still to apply, sorted
    ///
    /// On a fresh install every update is marked applied and the result is
    /// empty.
    pub fn check_status(&self, ctx: &mut StoreContext) -> Result<Vec<String>> {
        let pending = match ctx.preferences().get(UPDATES_PREFERENCE_KEY) {
            None => {
                let applied: Map<String, Value> = self
                    .updates
                    .iter()
                    .map(|u| (u.name.to_string(), Value::Bool(true)))
                    .collect();
                ctx.preferences_mut()
                    .set(UPDATES_PREFERENCE_KEY, Value::Object(applied));
                ctx.preferences().save()?;
                info!("Fresh install: marked {} updates as applied", self.updates.len());
                Vec::new()
            }
            Some(applied) => self
                .names()
                .into_iter()
                .filter(|name| !applied.get(*name).and_then(Value::as_bool).unwrap_or(false))
                .map(str::to_string)
                .collect(),
        };

        if !pending.is_empty() {
            warn!("{}", UPTODATE_WARNING);
        }
        Ok(pending)
    }

    /// Run one update and record it as applied
    pub fn do_update(
        &self,
        ctx: &mut StoreContext,
        name: &str,
        observer: &mut dyn FnMut(&str, usize, usize),
    ) -> Result<ReprocessReport> {
        let update = self.get(name)?;
        info!("Applying update '{}'", update.name);
        let report = (update.procedure)(ctx, observer)?;

        let preferences = ctx.preferences_mut();
        match preferences.get_mut(UPDATES_PREFERENCE_KEY) {
            Some(Value::Object(applied)) => {
                applied.insert(update.name.to_string(), Value::Bool(true));
            }
            _ => {
                let mut applied = Map::new();
                applied.insert(update.name.to_string(), Value::Bool(true));
                preferences.set(UPDATES_PREFERENCE_KEY, Value::Object(applied));
            }
        }
        preferences.save()?;

        if !report.is_clean() {
            warn!(
                "Update '{}' finished with {} failed stores",
                update.name,
                report.failed.len()
            );
        }
        Ok(report)
    }
}

/// Reprocess every registered store
///
/// Kinds are walked in the order methods, weightings, normalizations,
/// databases. A failing store is logged and recorded; the batch continues.
pub fn reprocess_all(
    ctx: &mut StoreContext,
    observer: &mut dyn FnMut(&str, usize, usize),
) -> Result<ReprocessReport> {
    let mut report = ReprocessReport::default();
    report.merge(reprocess_kind(ctx, Method, observer));
    report.merge(reprocess_kind(ctx, Weighting, observer));
    report.merge(reprocess_kind(ctx, Normalization, observer));
    report.merge(reprocess_kind(ctx, Database, observer));
    info!(
        "Reprocessed {} stores, {} failed",
        report.processed,
        report.failed.len()
    );
    Ok(report)
}

/// Reprocess every registered store of one kind
pub fn reprocess_kind<K: StoreKind>(
    ctx: &mut StoreContext,
    kind: K,
    observer: &mut dyn FnMut(&str, usize, usize),
) -> ReprocessReport {
    let mut report = ReprocessReport::default();
    let names = ctx
        .registry(kind.registry())
        .map(|registry| registry.names())
        .unwrap_or_default();
    if names.is_empty() {
        return report;
    }

    info!("Updating all {} stores ({})", kind.label(), names.len());
    let total = names.len();
    for (index, name) in names.into_iter().enumerate() {
        let store = DataStore::new(ctx, kind.clone(), name);
        match store.process(ctx) {
            Ok(_) => report.processed += 1,
            Err(e) => {
                warn!("Failed to reprocess {} '{}': {}", kind.label(), store.name(), e);
                report.failed.push(ReprocessFailure {
                    kind: kind.label().to_string(),
                    name: store.name().to_string(),
                    error: e.to_string(),
                });
            }
        }
        observer(kind.label(), index + 1, total);
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use crate::models::Metadata;
    use serde_json::json;
    use tempfile::TempDir;

    fn context() -> StoreContext {
        StoreContext::in_memory(StoreConfig::default().with_dont_warn()).unwrap()
    }

    fn noop(_: &mut StoreContext, _: &mut dyn FnMut(&str, usize, usize)) -> Result<ReprocessReport> {
        Ok(ReprocessReport::default())
    }

    fn two_updates() -> Updates {
        Updates::new(vec![
            Update {
                name: "2.0 second",
                explanation: "second",
                procedure: noop,
            },
            Update {
                name: "1.0 first",
                explanation: "first",
                procedure: noop,
            },
        ])
    }

    fn register_weighting(ctx: &mut StoreContext, name: &str, data: &[Value]) {
        let store = DataStore::new(ctx, Weighting, name);
        store.register(ctx, Metadata::new()).unwrap();
        store.write(ctx, data).unwrap();
    }

    #[test]
    fn test_fresh_install_marks_everything_applied() {
        let mut ctx = context();
        let updates = two_updates();

        assert!(updates.check_status(&mut ctx).unwrap().is_empty());
        assert_eq!(
            ctx.preferences().get("updates"),
            Some(&json!({"2.0 second": true, "1.0 first": true}))
        );
        assert!(updates.check_status(&mut ctx).unwrap().is_empty());
    }

    #[test]
    fn test_pending_updates_are_sorted() {
        let mut ctx = context();
        ctx.preferences_mut().set("updates", json!({}));

        assert_eq!(
            two_updates().check_status(&mut ctx).unwrap(),
            vec!["1.0 first".to_string(), "2.0 second".to_string()]
        );
    }

    #[test]
    fn test_do_update_marks_applied() {
        let mut ctx = context();
        ctx.preferences_mut()
            .set("updates", json!({"1.0 first": false}));
        let updates = two_updates();

        updates
            .do_update(&mut ctx, "1.0 first", &mut |_, _, _| {})
            .unwrap();
        assert_eq!(
            updates.check_status(&mut ctx).unwrap(),
            vec!["2.0 second".to_string()]
        );
    }

    #[test]
    fn test_unknown_update() {
        let mut ctx = context();
        let updates = Updates::builtin();
        assert!(matches!(
            updates.do_update(&mut ctx, "9.9 nothing", &mut |_, _, _| {}),
            Err(DataStoreError::UnknownUpdate { .. })
        ));
        assert!(matches!(
            updates.explain("9.9 nothing"),
            Err(DataStoreError::UnknownUpdate { .. })
        ));
    }

    #[test]
    fn test_builtin_update_is_explained() {
        let updates = Updates::builtin();
        assert_eq!(updates.names(), vec!["1.0 reprocess all objects"]);
        assert!(
            updates
                .explain("1.0 reprocess all objects")
                .unwrap()
                .contains("reprocessed")
        );
    }

    #[test]
    fn test_reprocess_all_reports_progress_in_kind_order() {
        let mut ctx = context();
        register_weighting(&mut ctx, "w1", &[json!(1.0)]);
        register_weighting(&mut ctx, "w2", &[json!(2.0)]);

        let method = DataStore::new(&ctx, Method, "m1");
        method.register(&mut ctx, Metadata::new()).unwrap();
        method
            .write(&mut ctx, &[json!([["biosphere", "co2"], 1.0])])
            .unwrap();

        let mut calls = Vec::new();
        let report = reprocess_all(&mut ctx, &mut |label: &str, done: usize, total: usize| {
            calls.push((label.to_string(), done, total))
        })
        .unwrap();

        assert_eq!(report.processed, 3);
        assert!(report.is_clean());
        assert_eq!(
            calls,
            vec![
                ("Method".to_string(), 1, 1),
                ("Weighting".to_string(), 1, 2),
                ("Weighting".to_string(), 2, 2),
            ]
        );
        assert_eq!(
            DataStore::new(&ctx, Weighting, "w2")
                .processed(&ctx)
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn test_reprocess_failure_is_isolated() {
        let mut ctx = context();
        register_weighting(&mut ctx, "a_broken", &[json!({"loc": 1.0})]);
        register_weighting(&mut ctx, "b_fine", &[json!(1.0)]);

        let report = reprocess_all(&mut ctx, &mut |_, _, _| {}).unwrap();
        assert_eq!(report.processed, 1);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].name, "a_broken");
        assert_eq!(report.failed[0].kind, "Weighting");
        assert!(
            DataStore::new(&ctx, Weighting, "b_fine")
                .processed(&ctx)
                .is_ok()
        );
    }

    #[test]
    fn test_applied_updates_persist() {
        let temp_dir = TempDir::new().unwrap();
        let config = StoreConfig::default()
            .with_data_dir(temp_dir.path())
            .with_dont_warn();

        {
            let mut ctx = StoreContext::open(config.clone()).unwrap();
            ctx.preferences_mut().set("updates", json!({}));
            Updates::builtin()
                .do_update(&mut ctx, "1.0 reprocess all objects", &mut |_, _, _| {})
                .unwrap();
        }

        let mut ctx = StoreContext::open(config).unwrap();
        assert!(Updates::builtin().check_status(&mut ctx).unwrap().is_empty());
    }
}
