//! Structured event records to typed telemetry attributes
//!
//! Pure conversion layer: no I/O, no SDK types, callable from any thread.

use serde_json::{Map, Value};

use crate::error::RecordError;

/// Reserved record key whose string value becomes the log body.
pub const MESSAGE_KEY: &str = "message";

/// Typed attribute value carried on a log record or span.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    String(String),
    Bool(bool),
    Double(f64),
}

/// Flat set of unique-keyed attributes produced by one conversion pass.
pub type FlatAttributeSet = Vec<(String, AttrValue)>;

/// Converted content of a log record: optional body plus attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct LogContent {
    pub body: Option<String>,
    pub attributes: FlatAttributeSet,
}

/// Convert an event record into log-record content.
///
/// The top level must be a JSON object. A string-valued `message` entry
/// becomes the body and is not repeated as an attribute. Strings, booleans
/// and numbers map to their typed attribute; numbers are always widened to
/// double precision. Anything else, nested objects included, becomes a
/// string attribute holding the value's canonical JSON text.
pub fn convert_for_log(record: &Value) -> Result<LogContent, RecordError> {
    let object = record
        .as_object()
        .ok_or_else(|| RecordError::NotAnObject(json_kind(record)))?;

    let mut body = None;
    let mut attributes = Vec::with_capacity(object.len());
    for (key, value) in object {
        if key == MESSAGE_KEY {
            if let Value::String(text) = value {
                if body.is_none() {
                    body = Some(text.clone());
                }
                continue;
            }
        }
        attributes.push((key.clone(), classify(value)));
    }
    Ok(LogContent { body, attributes })
}

/// Convert an event record into flattened span attributes.
///
/// Nested objects are flattened recursively, child keys joined to their
/// parent with `.`; `message` gets no special treatment here. Arrays and
/// nulls produce no attribute at any depth, unlike the log path which
/// stringifies them: span attributes feed backend-side indexing, where a
/// stringified array is worse than absence. A non-object top level yields
/// an empty set.
pub fn convert_for_span(record: &Value, prefix: &str) -> FlatAttributeSet {
    let mut attributes = Vec::new();
    if let Some(object) = record.as_object() {
        flatten_into(&mut attributes, object, prefix);
    }
    attributes
}

fn flatten_into(out: &mut FlatAttributeSet, object: &Map<String, Value>, prefix: &str) {
    for (key, value) in object {
        let full_key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::Object(nested) => flatten_into(out, nested, &full_key),
            Value::String(text) => out.push((full_key, AttrValue::String(text.clone()))),
            Value::Bool(flag) => out.push((full_key, AttrValue::Bool(*flag))),
            Value::Number(number) => out.push((
                full_key,
                AttrValue::Double(number.as_f64().unwrap_or_default()),
            )),
            Value::Array(_) | Value::Null => {}
        }
    }
}

fn classify(value: &Value) -> AttrValue {
    match value {
        Value::String(text) => AttrValue::String(text.clone()),
        Value::Bool(flag) => AttrValue::Bool(*flag),
        Value::Number(number) => AttrValue::Double(number.as_f64().unwrap_or_default()),
        other => AttrValue::String(other.to_string()),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attr<'a>(set: &'a FlatAttributeSet, key: &str) -> &'a AttrValue {
        &set.iter()
            .find(|(k, _)| k == key)
            .unwrap_or_else(|| panic!("missing attribute {key}"))
            .1
    }

    mod log_path {
        use super::*;

        #[test]
        fn test_empty_record() {
            let content = convert_for_log(&json!({})).unwrap();
            assert!(content.body.is_none());
            assert!(content.attributes.is_empty());
        }

        #[test]
        fn test_message_only() {
            let content = convert_for_log(&json!({"message": "login ok"})).unwrap();
            assert_eq!(content.body.as_deref(), Some("login ok"));
            assert!(content.attributes.is_empty());
        }

        #[test]
        fn test_message_with_attributes() {
            let record = json!({"message": "login ok", "user_id": "42", "success": true});
            let content = convert_for_log(&record).unwrap();
            assert_eq!(content.body.as_deref(), Some("login ok"));
            assert_eq!(content.attributes.len(), 2);
            assert_eq!(
                attr(&content.attributes, "user_id"),
                &AttrValue::String("42".to_string())
            );
            assert_eq!(attr(&content.attributes, "success"), &AttrValue::Bool(true));
        }

        #[test]
        fn test_non_string_message_stays_attribute() {
            let content = convert_for_log(&json!({"message": 7})).unwrap();
            assert!(content.body.is_none());
            assert_eq!(attr(&content.attributes, "message"), &AttrValue::Double(7.0));
        }

        #[test]
        fn test_integral_number_widens_to_double() {
            let content = convert_for_log(&json!({"count": 5})).unwrap();
            assert_eq!(attr(&content.attributes, "count"), &AttrValue::Double(5.0));
        }

        #[test]
        fn test_fractional_number() {
            let content = convert_for_log(&json!({"ratio": 0.25})).unwrap();
            assert_eq!(attr(&content.attributes, "ratio"), &AttrValue::Double(0.25));
        }

        #[test]
        fn test_nested_object_is_stringified() {
            let content = convert_for_log(&json!({"user": {"id": "abc"}})).unwrap();
            assert_eq!(
                attr(&content.attributes, "user"),
                &AttrValue::String("{\"id\":\"abc\"}".to_string())
            );
        }

        #[test]
        fn test_array_and_null_are_stringified() {
            let content = convert_for_log(&json!({"tags": ["a", "b"], "gone": null})).unwrap();
            assert_eq!(
                attr(&content.attributes, "tags"),
                &AttrValue::String("[\"a\",\"b\"]".to_string())
            );
            assert_eq!(
                attr(&content.attributes, "gone"),
                &AttrValue::String("null".to_string())
            );
        }

        #[test]
        fn test_one_attribute_per_top_level_key() {
            let record = json!({"a": 1, "b": "x", "c": false, "d": {"e": 2}});
            let content = convert_for_log(&record).unwrap();
            assert!(content.body.is_none());
            assert_eq!(content.attributes.len(), 4);
        }

        #[test]
        fn test_top_level_not_an_object() {
            let err = convert_for_log(&json!(["not", "a", "map"])).unwrap_err();
            assert!(matches!(err, RecordError::NotAnObject("array")));

            let err = convert_for_log(&json!("plain string")).unwrap_err();
            assert!(matches!(err, RecordError::NotAnObject("string")));
        }

        #[test]
        fn test_conversion_is_idempotent() {
            let record = json!({"message": "hi", "n": 3, "ok": true});
            let first = convert_for_log(&record).unwrap();
            let second = convert_for_log(&record).unwrap();
            assert_eq!(first, second);
        }
    }

    mod span_path {
        use super::*;

        #[test]
        fn test_nested_object_is_flattened() {
            let attrs = convert_for_span(&json!({"user": {"id": "abc"}}), "");
            assert_eq!(attrs.len(), 1);
            assert_eq!(attr(&attrs, "user.id"), &AttrValue::String("abc".to_string()));
        }

        #[test]
        fn test_deep_nesting_joins_every_level() {
            let attrs = convert_for_span(&json!({"a": {"b": {"c": true}}}), "");
            assert_eq!(attr(&attrs, "a.b.c"), &AttrValue::Bool(true));
        }

        #[test]
        fn test_prefix_is_applied() {
            let attrs = convert_for_span(&json!({"user": {"id": "abc"}}), "ctx");
            assert_eq!(
                attr(&attrs, "ctx.user.id"),
                &AttrValue::String("abc".to_string())
            );
        }

        #[test]
        fn test_message_has_no_special_case() {
            let attrs = convert_for_span(&json!({"message": "hello"}), "");
            assert_eq!(
                attr(&attrs, "message"),
                &AttrValue::String("hello".to_string())
            );
        }

        #[test]
        fn test_arrays_and_nulls_are_skipped() {
            let attrs = convert_for_span(&json!({"tags": ["a"], "gone": null, "kept": 1}), "");
            assert_eq!(attrs.len(), 1);
            assert_eq!(attr(&attrs, "kept"), &AttrValue::Double(1.0));
        }

        #[test]
        fn test_numbers_widen_to_double() {
            let attrs = convert_for_span(&json!({"count": 5}), "");
            assert_eq!(attr(&attrs, "count"), &AttrValue::Double(5.0));
        }

        #[test]
        fn test_non_object_top_level_yields_empty_set() {
            assert!(convert_for_span(&json!("text"), "").is_empty());
            assert!(convert_for_span(&json!([1, 2]), "").is_empty());
        }
    }
}
