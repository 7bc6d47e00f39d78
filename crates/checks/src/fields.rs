//! Field accessors that turn a missing or mistyped value into a [`CheckFailure`].

use crate::{CheckFailure, CheckResult};
use omrs_types::Reference;
use serde_json::{Map, Value};

pub(crate) type Object = Map<String, Value>;

pub(crate) fn as_object<'a>(value: &'a Value, path: &str) -> CheckResult<&'a Object> {
    value
        .as_object()
        .ok_or_else(|| CheckFailure::new(path, "an object", Some(value)))
}

pub(crate) fn child_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_owned()
    } else {
        format!("{parent}.{key}")
    }
}

pub(crate) fn object_field<'a>(
    map: &'a Object,
    parent: &str,
    key: &str,
) -> CheckResult<&'a Object> {
    let path = child_path(parent, key);
    match map.get(key) {
        Some(Value::Object(inner)) => Ok(inner),
        other => Err(CheckFailure::new(path, "an object", other)),
    }
}

pub(crate) fn str_field<'a>(map: &'a Object, parent: &str, key: &str) -> CheckResult<&'a str> {
    let path = child_path(parent, key);
    match map.get(key) {
        Some(Value::String(s)) => Ok(s),
        other => Err(CheckFailure::new(path, "a string", other)),
    }
}

/// A string with something left after trimming.
pub(crate) fn non_blank_field<'a>(
    map: &'a Object,
    parent: &str,
    key: &str,
) -> CheckResult<&'a str> {
    let value = str_field(map, parent, key)?;
    if value.trim().is_empty() {
        return Err(CheckFailure::new(
            child_path(parent, key),
            "a non-blank string",
            map.get(key),
        ));
    }
    Ok(value)
}

/// A reference (bare UUID or `{uuid}` object) to `expected`.
pub(crate) fn reference_field(
    map: &Object,
    parent: &str,
    key: &str,
    expected: &str,
) -> CheckResult {
    let value = map.get(key);
    let matches = value
        .and_then(Reference::from_value)
        .is_some_and(|reference| reference.refers_to(expected));
    if matches {
        return Ok(());
    }
    Err(CheckFailure::new(
        child_path(parent, key),
        format!("reference to {expected:?} (as \"<uuid>\" or {{\"uuid\": ...}})"),
        value,
    ))
}
