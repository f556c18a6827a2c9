// src/remap.rs

//! Health-check reference remapping.
//!
//! Scenarios gate on health checks by ID. Copying a health check gives it a new
//! ID in the destination team, so every `statusCheckId` in a scenario has to be
//! rewritten before the scenario can be replayed.
//!
//! References can appear at any depth, either as a single ID or as a list of IDs.
//! References with no mapping are dropped and handed back to the caller.

use crate::model::Scenario;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Key under which scenarios reference health checks.
pub const REFERENCE_KEY: &str = "statusCheckId";

/// Source health-check ID → destination health-check ID, for one source team.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdMap {
    ids: BTreeMap<String, String>,
}

impl IdMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, source_id: impl Into<String>, dest_id: impl Into<String>) {
        self.ids.insert(source_id.into(), dest_id.into());
    }

    pub fn get(&self, source_id: &str) -> Option<&str> {
        self.ids.get(source_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// A remapped scenario plus the references that could not be resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Remapped {
    pub scenario: Scenario,
    pub dangling: Vec<String>,
}

/// Rewrite every health-check reference in `scenario` through `ids`.
///
/// The input is left untouched.
pub fn remap_scenario(scenario: &Scenario, ids: &IdMap) -> Remapped {
    let mut doc = scenario.0.clone();
    let mut dangling = Vec::new();
    rewrite_object(&mut doc, ids, &mut dangling);

    Remapped {
        scenario: Scenario(doc),
        dangling,
    }
}

fn rewrite_object(map: &mut Map<String, Value>, ids: &IdMap, dangling: &mut Vec<String>) {
    if let Some(reference) = map.remove(REFERENCE_KEY) {
        if let Some(resolved) = resolve(reference, ids, dangling) {
            map.insert(REFERENCE_KEY.to_string(), resolved);
        }
    }
    for (key, child) in map.iter_mut() {
        if key != REFERENCE_KEY {
            rewrite(child, ids, dangling);
        }
    }
}

fn rewrite(node: &mut Value, ids: &IdMap, dangling: &mut Vec<String>) {
    match node {
        Value::Object(map) => rewrite_object(map, ids, dangling),
        Value::Array(items) => {
            for item in items {
                rewrite(item, ids, dangling);
            }
        }
        _ => {}
    }
}

/// Map a single reference value. `None` means the key should be removed.
fn resolve(reference: Value, ids: &IdMap, dangling: &mut Vec<String>) -> Option<Value> {
    match reference {
        Value::Array(items) => {
            let mapped: Vec<Value> = items
                .into_iter()
                .filter_map(|item| lookup(item, ids, dangling))
                .collect();
            (!mapped.is_empty()).then_some(Value::Array(mapped))
        }
        single => lookup(single, ids, dangling),
    }
}

fn lookup(id: Value, ids: &IdMap, dangling: &mut Vec<String>) -> Option<Value> {
    let mapped = id.as_str().and_then(|s| ids.get(s));
    match mapped {
        Some(dest) => Some(Value::String(dest.to_string())),
        None => {
            let shown = match id {
                Value::String(s) => s,
                other => other.to_string(),
            };
            dangling.push(shown);
            None
        }
    }
}
