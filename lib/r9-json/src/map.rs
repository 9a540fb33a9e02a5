/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the r9 authors
 */

use anyhow::{Context, anyhow};
use serde_json::{Map, Value};

use super::{as_bool, as_str};

pub fn get_required<'a>(map: &'a Map<String, Value>, k: &str) -> anyhow::Result<&'a Value> {
    match map.get(k) {
        Some(v) => Ok(v),
        None => Err(anyhow!("no key {k} found in this map")),
    }
}

pub fn get_required_str<'a>(map: &'a Map<String, Value>, k: &str) -> anyhow::Result<&'a str> {
    match map.get(k) {
        Some(v) => as_str(v).context(format!("invalid string value for key {k}")),
        None => Err(anyhow!("no key {k} found in this map")),
    }
}

pub fn get_optional_str<'a>(
    map: &'a Map<String, Value>,
    k: &str,
) -> anyhow::Result<Option<&'a str>> {
    match map.get(k) {
        Some(v) => as_str(v)
            .map(Some)
            .context(format!("invalid string value for key {k}")),
        None => Ok(None),
    }
}

pub fn get_optional_bool(map: &Map<String, Value>, k: &str) -> anyhow::Result<Option<bool>> {
    match map.get(k) {
        Some(v) => as_bool(v)
            .map(Some)
            .context(format!("invalid bool value for key {k}")),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    #[test]
    fn required_str() {
        let m = map(json!({"cluster": "orders"}));
        assert_eq!(get_required_str(&m, "cluster").unwrap(), "orders");
        assert!(get_required_str(&m, "missing").is_err());

        let m = map(json!({"cluster": 3}));
        assert!(get_required_str(&m, "cluster").is_err());
    }

    #[test]
    fn optional_bool() {
        let m = map(json!({"is_dynamic": true}));
        assert_eq!(get_optional_bool(&m, "is_dynamic").unwrap(), Some(true));
        assert_eq!(get_optional_bool(&m, "missing").unwrap(), None);

        let m = map(json!({"is_dynamic": []}));
        assert!(get_optional_bool(&m, "is_dynamic").is_err());
    }
}
