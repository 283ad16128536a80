//! Body serialisation for outgoing requests.
//!
//! Form bodies are built from the record's fields in insertion order. String
//! values are encoded verbatim and other scalars by their textual form. A
//! `null` value renders as a bare key, an array as one pair per element (an
//! empty array contributes nothing), and objects as compact JSON text.

use serde_json::Value;

use super::url_encoding::form_encode;
use crate::record::Fields;

/// Textual form of a scalar or object value inside a form body.
fn form_text(value: &Value) -> Result<String, serde_json::Error> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => serde_json::to_string(value),
    }
}

/// Append the pair for `key` and a single value; `null` yields a bare key.
fn push_pair(pairs: &mut Vec<String>, key: &str, value: &Value) -> Result<(), serde_json::Error> {
    match value {
        Value::Null => pairs.push(key.to_owned()),
        other => pairs.push(format!("{key}={}", form_encode(&form_text(other)?))),
    }
    Ok(())
}

/// Serialise fields as `key=value` pairs joined by `&`.
///
/// # Errors
///
/// Returns an error if a nested value cannot be rendered as JSON.
pub fn serialise_form(fields: &Fields) -> Result<String, serde_json::Error> {
    let mut pairs = Vec::with_capacity(fields.len());
    for (key, value) in fields {
        let key = form_encode(key);
        match value {
            Value::Array(items) => {
                for item in items {
                    push_pair(&mut pairs, &key, item)?;
                }
            }
            other => push_pair(&mut pairs, &key, other)?,
        }
    }
    Ok(pairs.join("&"))
}

/// Serialise fields as a JSON object.
///
/// # Errors
///
/// Returns an error if serialisation fails.
pub fn serialise_json(fields: &Fields) -> Result<String, serde_json::Error> {
    serde_json::to_string(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[fixture]
    fn access_log() -> Fields {
        fields(json!({
            "host": "10.0.0.1",
            "path": "/index.html?q=a b",
            "code": 200,
            "secure": false,
            "referer": null,
            "tags": ["a", "b"],
        }))
    }

    #[test]
    fn form_preserves_key_order() {
        let body = serialise_form(&fields(json!({"a": "1", "b": "2"}))).expect("serialise");
        assert_eq!(body, "a=1&b=2");
        let body = serialise_form(&fields(json!({"b": "2", "a": "1"}))).expect("serialise");
        assert_eq!(body, "b=2&a=1");
    }

    #[rstest]
    fn form_renders_value_kinds(access_log: Fields) {
        let body = serialise_form(&access_log).expect("serialise");
        assert_eq!(
            body,
            "host=10.0.0.1&path=%2Findex.html%3Fq%3Da+b&code=200&secure=false&referer&tags=a&tags=b"
        );
    }

    #[rstest]
    #[case(json!({"k": null}), "k")]
    #[case(json!({"tags": ["a", "b"]}), "tags=a&tags=b")]
    #[case(json!({"tags": [], "x": "1"}), "x=1")]
    #[case(json!({"mixed": [1, null, "a b"]}), "mixed=1&mixed&mixed=a+b")]
    #[case(json!({"meta": {"k": "v"}}), "meta=%7B%22k%22%3A%22v%22%7D")]
    fn form_expands_nulls_and_arrays(#[case] value: Value, #[case] expected: &str) {
        assert_eq!(serialise_form(&fields(value)).expect("serialise"), expected);
    }

    #[test]
    fn form_of_empty_record_is_empty() {
        assert_eq!(serialise_form(&Fields::new()).expect("serialise"), "");
    }

    #[rstest]
    fn json_round_trips(access_log: Fields) {
        let body = serialise_json(&access_log).expect("serialise");
        let parsed: Value = serde_json::from_str(&body).expect("parse");
        assert_eq!(parsed, Value::Object(access_log));
    }

    #[test]
    fn json_keeps_insertion_order() {
        let body = serialise_json(&fields(json!({"z": 1, "a": 2}))).expect("serialise");
        assert_eq!(body, r#"{"z":1,"a":2}"#);
    }
}
