// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Self-describing serialization of the values attached to log records.
//!
//! Values are written as compact JSON text (UTF-8). JSON carries its own type
//! markers (quotes, brackets, braces, literals) so a collector in any language
//! can decode the payload without side information.
//!
//! Serialization goes through [`serde_json::Value`] first. Its object map keeps
//! keys sorted, so two logically equal values produce identical bytes even
//! when they started out as differently ordered maps.
//!
//! Only values that come back unchanged are accepted: non-finite floats and
//! nesting past [`MAX_VALUE_DEPTH`] are rejected on the way in, and floats
//! are parsed with exact round-tripping.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::constants::MAX_VALUE_DEPTH;
use crate::errors::ValueError;
use crate::finite::find_non_finite;

/// Serializes `value` into its canonical byte form.
pub fn serialize<T>(value: &T) -> Result<Vec<u8>, ValueError>
where
    T: Serialize + ?Sized,
{
    // serde_json would write these as `null`
    if let Some(v) = find_non_finite(value) {
        return Err(ValueError::NonFinite(v));
    }
    let canonical = serde_json::to_value(value).map_err(ValueError::Serialize)?;
    if nesting_exceeds(&canonical, MAX_VALUE_DEPTH) {
        return Err(ValueError::TooDeep(MAX_VALUE_DEPTH));
    }
    serde_json::to_vec(&canonical).map_err(ValueError::Serialize)
}

fn nesting_exceeds(value: &Value, limit: usize) -> bool {
    match value {
        Value::Array(items) => limit == 0 || items.iter().any(|v| nesting_exceeds(v, limit - 1)),
        Value::Object(map) => limit == 0 || map.values().any(|v| nesting_exceeds(v, limit - 1)),
        _ => false,
    }
}

/// Parses bytes produced by [`serialize`] back into a structured value.
///
/// Either the whole byte string is a single valid value or this fails;
/// trailing data is rejected.
pub fn deserialize(bytes: &[u8]) -> Result<Value, ValueError> {
    serde_json::from_slice(bytes).map_err(ValueError::Deserialize)
}

/// Like [`deserialize`] but lands in a caller-chosen type.
pub fn deserialize_as<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ValueError> {
    serde_json::from_slice(bytes).map_err(ValueError::Deserialize)
}
