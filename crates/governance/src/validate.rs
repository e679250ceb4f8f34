//! Lightweight shape checks for the governance documents. Each validator
//! returns the list of problems found; an empty list means the document is
//! usable.

use crate::error::{GovernanceError, Result};
use serde_json::Value;
use std::path::Path;

const MISSING_SCHEMA_VERSION: &str = "missing schema_version";

fn load(path: &Path) -> Result<Value> {
    let bytes = std::fs::read(path).map_err(|err| GovernanceError::io(path, err))?;
    serde_json::from_slice(&bytes).map_err(|source| GovernanceError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn has_key(value: &Value, key: &str) -> bool {
    value.get(key).is_some()
}

/// True when `value[object]` is an object holding every key in `keys`.
fn object_has(value: &Value, object: &str, keys: &[&str]) -> bool {
    value
        .get(object)
        .and_then(Value::as_object)
        .is_some_and(|map| keys.iter().all(|k| map.contains_key(*k)))
}

fn schema_version(doc: &Value, problems: &mut Vec<String>) {
    if !has_key(doc, "schema_version") {
        problems.push(MISSING_SCHEMA_VERSION.to_string());
    }
}

pub fn check_ledger(doc: &Value) -> Vec<String> {
    let mut problems = Vec::new();
    schema_version(doc, &mut problems);
    if !object_has(doc, "project", &["name", "intent"]) {
        problems.push("project.name & project.intent required".to_string());
    }
    if !object_has(doc, "collaboration", &["style"]) {
        problems.push("collaboration.style required".to_string());
    }
    problems
}

pub fn check_decisions(doc: &Value) -> Vec<String> {
    let mut problems = Vec::new();
    schema_version(doc, &mut problems);
    if !doc.get("adrs").is_some_and(Value::is_array) {
        problems.push("adrs[] required".to_string());
    }
    problems
}

pub fn check_intent(doc: &Value) -> Vec<String> {
    let mut problems = Vec::new();
    schema_version(doc, &mut problems);
    if !object_has(doc, "goal", &["summary"]) {
        problems.push("goal.summary required".to_string());
    }
    problems
}

pub fn validate_ledger(path: &Path) -> Result<Vec<String>> {
    Ok(check_ledger(&load(path)?))
}

pub fn validate_decisions(path: &Path) -> Result<Vec<String>> {
    Ok(check_decisions(&load(path)?))
}

pub fn validate_intent(path: &Path) -> Result<Vec<String>> {
    Ok(check_intent(&load(path)?))
}
