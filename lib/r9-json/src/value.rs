/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the r9 authors
 */

use anyhow::anyhow;
use serde_json::Value;

pub fn as_str(v: &Value) -> anyhow::Result<&str> {
    match v {
        Value::String(s) => Ok(s),
        _ => Err(anyhow!("json value type for 'string' should be 'string'")),
    }
}

pub fn as_bool(v: &Value) -> anyhow::Result<bool> {
    match v {
        Value::String(s) => match s.to_lowercase().as_str() {
            "on" | "true" | "1" => Ok(true),
            "off" | "false" | "0" => Ok(false),
            _ => Err(anyhow!("invalid json string value for 'bool': {s}")),
        },
        Value::Bool(value) => Ok(*value),
        Value::Number(i) => {
            if let Some(n) = i.as_u64() {
                Ok(n != 0)
            } else if let Some(n) = i.as_i64() {
                Ok(n != 0)
            } else {
                Err(anyhow!("json real value can not be used as boolean value"))
            }
        }
        _ => Err(anyhow!(
            "json value type for 'bool' should be 'boolean' / 'string' / 'number'"
        )),
    }
}
