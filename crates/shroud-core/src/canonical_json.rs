//! Canonical JSON serialization for byte-stable output.
//!
//! The engine promises that two runs over the same rows and configuration
//! produce byte-identical output. That requires a single strict serializer:
//! object keys sorted lexicographically, no whitespace, UTF-8, and integers
//! only. Floats are rejected because their stringification is not portable
//! across serializer versions; counts and categories never need them.

use serde::Serialize;
use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Errors that can occur during canonical JSON serialization.
#[derive(Debug, Error)]
pub enum CanonicalJsonError {
    /// Serde JSON conversion failed.
    #[error("serde_json error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Float values are not allowed in canonical JSON. Use integers for all
    /// numeric values.
    #[error("float values are not allowed in canonical JSON (use integers)")]
    FloatNotAllowed,
}

/// Serializes `value` into a canonical JSON string.
///
/// # Errors
///
/// Returns [`CanonicalJsonError::Serde`] if serialization fails, or
/// [`CanonicalJsonError::FloatNotAllowed`] if the value contains floats.
#[must_use = "canonical output should be used for comparison or emission"]
pub fn to_canonical_string<T: Serialize>(value: &T) -> Result<String, CanonicalJsonError> {
    let v = serde_json::to_value(value)?;
    let mut out = String::new();
    write_value(&v, &mut out)?;
    Ok(out)
}

/// Serializes `value` into canonical JSON bytes.
///
/// # Errors
///
/// Same conditions as [`to_canonical_string`].
#[must_use = "canonical output should be used for comparison or emission"]
pub fn to_canonical_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, CanonicalJsonError> {
    to_canonical_string(value).map(String::into_bytes)
}

/// Writes a JSON string literal (quotes and escapes included) to `out`.
///
/// Escaping follows RFC 8259: quote, backslash, and control characters only,
/// with the short escapes where they exist. This is the one string encoding
/// used for canonical output and for dimension tuples embedded in redaction
/// reasons.
pub fn write_json_string(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

fn write_value(v: &Value, out: &mut String) -> Result<(), CanonicalJsonError> {
    match v {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Number(n) => write_number(n, out)?,
        Value::String(s) => write_json_string(s, out),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(item, out)?;
            }
            out.push(']');
        }
        Value::Object(map) => write_object(map, out)?,
    }
    Ok(())
}

fn write_object(map: &Map<String, Value>, out: &mut String) -> Result<(), CanonicalJsonError> {
    out.push('{');

    // Map iteration order depends on serde_json's preserve_order feature;
    // sort explicitly so it never matters.
    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort();

    for (i, key) in keys.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_json_string(key, out);
        out.push(':');
        if let Some(value) = map.get(*key) {
            write_value(value, out)?;
        }
    }

    out.push('}');
    Ok(())
}

fn write_number(n: &Number, out: &mut String) -> Result<(), CanonicalJsonError> {
    if let Some(i) = n.as_i64() {
        out.push_str(&i.to_string());
        return Ok(());
    }
    if let Some(u) = n.as_u64() {
        out.push_str(&u.to_string());
        return Ok(());
    }
    // serde_json::Number only stores a float when the value fits neither
    // integer representation.
    Err(CanonicalJsonError::FloatNotAllowed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sorts_object_keys_and_has_no_whitespace() {
        let v = json!({"zip_code": "00000", "age": 35});
        let s = to_canonical_string(&v).unwrap();
        assert_eq!(s, r#"{"age":35,"zip_code":"00000"}"#);
    }

    #[test]
    fn sorts_nested_objects_recursively() {
        let v = json!({"b": {"d": 2, "c": 1}, "a": 0});
        let s = to_canonical_string(&v).unwrap();
        assert_eq!(s, r#"{"a":0,"b":{"c":1,"d":2}}"#);
    }

    #[test]
    fn preserves_array_order() {
        let v = json!([3, 2, 1]);
        assert_eq!(to_canonical_string(&v).unwrap(), "[3,2,1]");
    }

    #[test]
    fn rejects_floats() {
        let v = json!({"rate": 0.25});
        assert!(matches!(
            to_canonical_string(&v),
            Err(CanonicalJsonError::FloatNotAllowed)
        ));
    }

    #[test]
    fn string_escaping_is_stable() {
        let v = json!({"s": "a\"b\nc"});
        assert_eq!(to_canonical_string(&v).unwrap(), r#"{"s":"a\"b\nc"}"#);
    }

    #[test]
    fn escapes_control_characters() {
        let mut out = String::new();
        write_json_string("x\u{01}y", &mut out);
        assert_eq!(out, "\"x\\u0001y\"");
    }

    #[test]
    fn handles_null_bool_and_empty_containers() {
        assert_eq!(to_canonical_string(&json!(null)).unwrap(), "null");
        assert_eq!(to_canonical_string(&json!(true)).unwrap(), "true");
        assert_eq!(to_canonical_string(&json!({})).unwrap(), "{}");
        assert_eq!(to_canonical_string(&json!([])).unwrap(), "[]");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;
        use std::collections::{BTreeMap, HashMap};

        proptest! {
            #[test]
            fn insertion_order_does_not_affect_canonical_output(
                pairs in prop::collection::vec(("[a-z]{1,8}", "[a-z0-9]{1,16}"), 1..10)
            ) {
                let hashmap: HashMap<String, String> = pairs.iter().cloned().collect();
                let btreemap: BTreeMap<String, String> = pairs.iter().cloned().collect();

                let from_hash = to_canonical_string(&hashmap).unwrap();
                let from_btree = to_canonical_string(&btreemap).unwrap();
                prop_assert_eq!(from_hash, from_btree);
            }

            #[test]
            fn canonical_output_is_parseable_json(
                pairs in prop::collection::vec(("[a-z]{1,5}", -1000i64..1000i64), 0..6)
            ) {
                let map: BTreeMap<String, i64> = pairs.iter().cloned().collect();
                let s = to_canonical_string(&map).unwrap();
                let parsed: BTreeMap<String, i64> = serde_json::from_str(&s).unwrap();
                prop_assert_eq!(map, parsed);
            }
        }
    }
}
