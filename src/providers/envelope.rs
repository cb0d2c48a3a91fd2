// ABOUTME: Normalization of platform response envelopes that place payloads in varying locations
// ABOUTME: Looks up fields at the top level or under `data`, and extracts the `error` object
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Platform responses are not consistent about where a payload lives. Token
//! responses may put `access_token` at the top level or under `data`, creator
//! info may be wrapped in `data.creator_info` or be `data` itself. Callers use
//! these helpers once at the boundary and work with canonical structs after.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// The `error` object most platform responses carry, `code == "ok"` on success
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct PlatformError {
    /// Machine code (`ok`, `access_token_invalid`, ...)
    #[serde(default)]
    pub code: String,
    /// Human-readable message
    #[serde(default)]
    pub message: String,
    /// Request id for support tickets
    #[serde(default)]
    pub log_id: String,
}

impl PlatformError {
    /// True when the platform reported success
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.code.is_empty() || self.code == "ok"
    }
}

/// The `data` object, if the payload has one
#[must_use]
pub fn data(payload: &Value) -> Option<&Value> {
    payload.get("data").filter(|v| v.is_object())
}

/// Pick the object that owns `key`: the top level first, then `data`
#[must_use]
pub fn owner_of<'a>(payload: &'a Value, key: &str) -> Option<&'a Value> {
    if has_value(payload, key) {
        return Some(payload);
    }
    data(payload).filter(|d| has_value(d, key))
}

/// Look up `key` at the top level, then under `data`
#[must_use]
pub fn field<'a>(payload: &'a Value, key: &str) -> Option<&'a Value> {
    owner_of(payload, key).and_then(|owner| owner.get(key))
}

/// Non-empty string field at the top level or under `data`
#[must_use]
pub fn string_field(payload: &Value, key: &str) -> Option<String> {
    field(payload, key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// `data.{key}` when present, otherwise `data` itself
#[must_use]
pub fn nested_or_data<'a>(payload: &'a Value, key: &str) -> Option<&'a Value> {
    let data = data(payload)?;
    Some(data.get(key).filter(|v| v.is_object()).unwrap_or(data))
}

/// Deserialize `data.{key}` into `T`
#[must_use]
pub fn decode_data_field<T: DeserializeOwned>(payload: &Value, key: &str) -> Option<T> {
    data(payload)
        .and_then(|d| d.get(key))
        .and_then(|v| T::deserialize(v).ok())
}

/// Field deserializer that reads an explicit `null` as the type's default
///
/// # Errors
///
/// Returns the deserializer's error when the value has the wrong type
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The `error` object, if present
#[must_use]
pub fn platform_error(payload: &Value) -> Option<PlatformError> {
    payload
        .get("error")
        .and_then(|e| PlatformError::deserialize(e).ok())
}

/// Parse a body that should be JSON; non-JSON bodies become a string value
#[must_use]
pub fn parse_body(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_owned()))
}

fn has_value(object: &Value, key: &str) -> bool {
    match object.get(key) {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_prefers_top_level() {
        let payload = json!({"access_token": "top", "data": {"access_token": "nested"}});
        assert_eq!(string_field(&payload, "access_token").as_deref(), Some("top"));
    }

    #[test]
    fn test_field_falls_back_to_data() {
        let payload = json!({"data": {"access_token": "nested", "open_id": "u1"}});
        assert_eq!(string_field(&payload, "access_token").as_deref(), Some("nested"));
        assert!(owner_of(&payload, "access_token").is_some());
    }

    #[test]
    fn test_empty_string_counts_as_missing() {
        let payload = json!({"access_token": "", "data": {"access_token": "nested"}});
        assert_eq!(string_field(&payload, "access_token").as_deref(), Some("nested"));
        assert!(string_field(&json!({"access_token": ""}), "access_token").is_none());
    }

    #[test]
    fn test_nested_or_data() {
        let wrapped = json!({"data": {"creator_info": {"creator_username": "a"}}});
        let flat = json!({"data": {"creator_username": "b"}});
        assert_eq!(
            nested_or_data(&wrapped, "creator_info").and_then(|v| v.get("creator_username")),
            Some(&json!("a"))
        );
        assert_eq!(
            nested_or_data(&flat, "creator_info").and_then(|v| v.get("creator_username")),
            Some(&json!("b"))
        );
        assert!(nested_or_data(&json!({}), "creator_info").is_none());
    }

    #[test]
    fn test_null_as_default() {
        #[derive(Deserialize)]
        struct Sample {
            #[serde(default, deserialize_with = "null_as_default")]
            name: String,
            #[serde(default, deserialize_with = "null_as_default")]
            flags: Vec<String>,
        }
        let sample: Sample = serde_json::from_value(json!({"name": null, "flags": null})).unwrap();
        assert!(sample.name.is_empty());
        assert!(sample.flags.is_empty());
        assert!(serde_json::from_value::<Sample>(json!({"name": 3})).is_err());
    }

    #[test]
    fn test_platform_error() {
        let ok = json!({"error": {"code": "ok", "message": "", "log_id": "x"}});
        assert!(platform_error(&ok).is_some_and(|e| e.is_ok()));
        let bad = json!({"error": {"code": "scope_not_authorized", "message": "no"}});
        assert!(platform_error(&bad).is_some_and(|e| !e.is_ok()));
    }
}
